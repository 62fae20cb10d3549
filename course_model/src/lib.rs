//! # Course Model
//!
//! The curriculum crate - courses, units, lectures and knowledge nodes, plus
//! the chapter markers used to rank and group knowledge nodes.
//! This crate only describes the data; parsing and querying live in `graph_engine`.

pub mod chapter;
pub mod entities;

pub use chapter::*;
pub use entities::*;

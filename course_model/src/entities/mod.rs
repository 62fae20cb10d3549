//! Entity definitions for the curriculum.

mod knowledge;
mod unit;

pub use knowledge::*;
pub use unit::*;

use serde::{Deserialize, Serialize};

/// Stable handle of a knowledge node inside a graph store.
///
/// Handles are assigned in declaration order and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeHandle(pub usize);

/// Stable handle of a unit inside a graph store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitHandle(pub usize);

impl NodeHandle {
    pub fn index(self) -> usize {
        self.0
    }
}

impl UnitHandle {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A course: the top of the containment hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Free-text level label (e.g. "undergraduate").
    pub level: String,

    /// Units in the order their CONTAINS edges were declared.
    #[serde(default)]
    pub units: Vec<UnitHandle>,
}

impl Course {
    /// Create a course with no units.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        level: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            level: level.into(),
            units: Vec::new(),
        }
    }

    /// Attach a unit to the end of the course.
    pub fn add_unit(&mut self, unit: UnitHandle) {
        self.units.push(unit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_course() {
        let course = Course::new("c1", "Artificial Intelligence", "Intro course", "beginner");
        assert_eq!(course.id, "c1");
        assert_eq!(course.level, "beginner");
        assert!(course.units.is_empty());
    }

    #[test]
    fn test_course_keeps_unit_order() {
        let mut course = Course::new("c1", "AI", "", "beginner");
        course.add_unit(UnitHandle(3));
        course.add_unit(UnitHandle(1));

        assert_eq!(course.units, vec![UnitHandle(3), UnitHandle(1)]);
    }
}

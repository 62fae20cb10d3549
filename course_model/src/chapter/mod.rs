//! Chapter markers: mapping free-text chapter labels onto unit ranks.
//!
//! A chapter label such as `"第三单元 搜索算法"` or `"Unit 3 Search"` starts
//! with a unit marker. Two derived values are read from it:
//! - **rank**: the secondary sort key of learning paths (prefix match)
//! - **group**: the visualization cluster of a node (substring match)

use serde::{Deserialize, Serialize};

/// Ordered table of unit markers. Rank `n` (1-based) is matched by any of
/// the aliases at position `n - 1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChapterMarkers {
    ranks: Vec<Vec<String>>,
}

const LOCALIZED_MARKERS: [&str; 8] = [
    "第一单元",
    "第二单元",
    "第三单元",
    "第四单元",
    "第五单元",
    "第六单元",
    "第七单元",
    "第八单元",
];

impl Default for ChapterMarkers {
    fn default() -> Self {
        let ranks = LOCALIZED_MARKERS
            .iter()
            .enumerate()
            .map(|(i, localized)| vec![localized.to_string(), format!("Unit {}", i + 1)])
            .collect();
        Self { ranks }
    }
}

impl ChapterMarkers {
    /// Build a marker table from alias lists in rank order.
    pub fn new(ranks: Vec<Vec<String>>) -> Self {
        Self { ranks }
    }

    /// Number of ranked units.
    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    /// Iterate over the alias lists in rank order.
    pub fn ranks(&self) -> impl Iterator<Item = &[String]> {
        self.ranks.iter().map(Vec::as_slice)
    }

    /// Rank given to labels that match no marker.
    pub fn unranked(&self) -> u32 {
        self.ranks.len() as u32 + 1
    }

    /// 1-based rank of the first marker that prefixes `chapter`, or
    /// [`unranked`](Self::unranked) when none does.
    pub fn rank(&self, chapter: &str) -> u32 {
        self.position(|alias| {
            chapter.starts_with(alias) && !continues_number(&chapter[alias.len()..])
        })
        .unwrap_or_else(|| self.unranked())
    }

    /// Visualization group: 1-based index of the first marker contained
    /// anywhere in `chapter`, or 0.
    pub fn group(&self, chapter: &str) -> u32 {
        self.position(|alias| {
            chapter
                .match_indices(alias)
                .any(|(start, _)| !continues_number(&chapter[start + alias.len()..]))
        })
        .unwrap_or(0)
    }

    fn position<F>(&self, matches: F) -> Option<u32>
    where
        F: Fn(&str) -> bool,
    {
        self.ranks
            .iter()
            .position(|aliases| aliases.iter().any(|alias| matches(alias)))
            .map(|i| i as u32 + 1)
    }
}

/// An alias ending in a digit must not match the start of a longer number:
/// "Unit 1" is not a marker of "Unit 10".
fn continues_number(rest: &str) -> bool {
    rest.starts_with(|c: char| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_localized_and_english() {
        let markers = ChapterMarkers::default();

        assert_eq!(markers.rank("第一单元 人工智能概述"), 1);
        assert_eq!(markers.rank("第八单元 强化学习"), 8);
        assert_eq!(markers.rank("Unit 3 Search"), 3);
    }

    #[test]
    fn test_rank_requires_prefix() {
        let markers = ChapterMarkers::default();

        assert_eq!(markers.rank("Appendix"), 9);
        assert_eq!(markers.rank("Review of Unit 2"), 9);
        assert_eq!(markers.unranked(), 9);
    }

    #[test]
    fn test_rank_unit_ten_is_unranked() {
        let markers = ChapterMarkers::default();

        assert_eq!(markers.rank("Unit 10 Advanced"), 9);
        assert_eq!(markers.rank("Unit 12"), 9);
        assert_eq!(markers.group("Unit 10 Advanced"), 0);
        assert_eq!(markers.group("Review of Unit 12"), 0);
        assert_eq!(markers.rank("Unit 1: Intro"), 1);
    }

    #[test]
    fn test_group_skips_longer_numbers() {
        let markers = ChapterMarkers::default();

        // The first "Unit 1" is part of "Unit 11"; the second one counts.
        assert_eq!(markers.group("Unit 11 and Unit 1"), 1);
        assert_eq!(markers.group("Unit 13 then Unit 2"), 2);
    }

    #[test]
    fn test_group_uses_substring() {
        let markers = ChapterMarkers::default();

        assert_eq!(markers.group("Review of Unit 2"), 2);
        assert_eq!(markers.group("第五单元"), 5);
        assert_eq!(markers.group("Appendix"), 0);
    }

    #[test]
    fn test_custom_markers() {
        let markers = ChapterMarkers::new(vec![
            vec!["Week 1".to_string()],
            vec!["Week 2".to_string(), "W2".to_string()],
        ]);

        assert_eq!(markers.len(), 2);
        assert_eq!(markers.rank("W2: graphs"), 2);
        assert_eq!(markers.rank("Week 3"), 3);
        assert_eq!(markers.group("Week 3"), 0);
    }
}

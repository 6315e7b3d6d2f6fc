//! Heading hierarchy validation.

use crate::types::{HeadingStructure, Headings};

/// Judge the heading outline of a page.
///
/// The hierarchy is proper iff exactly one h1 exists and the populated
/// levels below it form a contiguous prefix: once a level is empty, every
/// deeper level must be empty too (h2 present, h3 absent, h4 present is a
/// skipped level).
pub fn analyze_heading_structure(headings: &Headings) -> HeadingStructure {
    let counts: Vec<usize> = (1..=6).map(|l| headings.level(l).len()).collect();

    let mut skipped_levels = false;
    for level in 2..=6 {
        if counts[level - 1] == 0 && counts[level..].iter().any(|&c| c > 0) {
            skipped_levels = true;
            break;
        }
    }

    let proper_hierarchy = counts[0] == 1 && !skipped_levels;

    HeadingStructure {
        h1_count: counts[0],
        h2_count: counts[1],
        h3_count: counts[2],
        h4_count: counts[3],
        h5_count: counts[4],
        h6_count: counts[5],
        proper_hierarchy,
        skipped_levels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headings_with_counts(counts: [usize; 6]) -> Headings {
        let fill = |n: usize| vec!["heading".to_string(); n];
        Headings {
            h1: fill(counts[0]),
            h2: fill(counts[1]),
            h3: fill(counts[2]),
            h4: fill(counts[3]),
            h5: fill(counts[4]),
            h6: fill(counts[5]),
        }
    }

    #[test]
    fn contiguous_outline_is_proper() {
        let structure = analyze_heading_structure(&headings_with_counts([1, 3, 2, 0, 0, 0]));
        assert!(structure.proper_hierarchy);
        assert!(!structure.skipped_levels);
    }

    #[test]
    fn skipped_level_invalidates_hierarchy() {
        // h3 absent while h4 is populated.
        let structure = analyze_heading_structure(&headings_with_counts([1, 3, 0, 2, 0, 0]));
        assert!(!structure.proper_hierarchy);
        assert!(structure.skipped_levels);
    }

    #[test]
    fn missing_h1_is_improper_without_skips() {
        let structure = analyze_heading_structure(&headings_with_counts([0, 2, 1, 0, 0, 0]));
        assert!(!structure.proper_hierarchy);
        assert!(!structure.skipped_levels);
    }

    #[test]
    fn multiple_h1_is_improper() {
        let structure = analyze_heading_structure(&headings_with_counts([2, 1, 0, 0, 0, 0]));
        assert!(!structure.proper_hierarchy);
        assert_eq!(structure.h1_count, 2);
    }

    #[test]
    fn h1_only_page_is_proper() {
        let structure = analyze_heading_structure(&headings_with_counts([1, 0, 0, 0, 0, 0]));
        assert!(structure.proper_hierarchy);
    }
}

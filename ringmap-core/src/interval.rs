//! Circular interval overlap.
//!
//! A range `(start, stop)` with `start > stop` wraps across the sequence origin. A range with
//! `start == stop` is a single point and never wraps.

use crate::types::BasePos;

/// Inclusive range on a circular sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircularSpan {
    pub start: BasePos,
    pub stop: BasePos,
}

impl CircularSpan {
    pub fn new(start: BasePos, stop: BasePos) -> Self {
        Self { start, stop }
    }

    pub fn wraps(&self) -> bool {
        self.start > self.stop
    }

    /// Three-case overlap test:
    /// neither wraps: plain inclusive overlap;
    /// one wraps: overlap unless the plain range sits entirely inside the gap the wrap leaves open;
    /// both wrap: both contain the origin, so they always overlap.
    pub fn overlaps(&self, other: &CircularSpan) -> bool {
        let (s1, e1, s2, e2) = (self.start, self.stop, other.start, other.stop);
        match (self.wraps(), other.wraps()) {
            (false, false) => !(s2 > e1 || e2 < s1),
            (true, true) => true,
            // other leaves the gap (e2, s2) open
            (false, true) => !(s1 > e2 && e1 < s2),
            // self leaves the gap (e1, s1) open
            (true, false) => !(s2 > e1 && e2 < s1),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ranges_overlap(s1: BasePos, e1: BasePos, s2: BasePos, e2: BasePos) -> bool {
        CircularSpan::new(s1, e1).overlaps(&CircularSpan::new(s2, e2))
    }

    #[test]
    fn test_plain_ranges() {
        assert!(!ranges_overlap(100, 200, 300, 400));
        assert!(ranges_overlap(100, 200, 150, 250));
        assert!(ranges_overlap(100, 200, 200, 300));
        assert!(!ranges_overlap(100, 200, 201, 300));
    }

    #[test]
    fn test_wrapping_range_covers_origin() {
        // 6899..10 on a 7000 bp circle
        assert!(ranges_overlap(6899, 10, 5, 8));
        assert!(ranges_overlap(6899, 10, 6950, 6960));
        assert!(ranges_overlap(6899, 10, 6000, 6900));
        assert!(!ranges_overlap(6899, 10, 100, 6000));
        assert!(!ranges_overlap(100, 6000, 6899, 10));
    }

    #[test]
    fn test_two_wrapping_ranges_always_overlap() {
        assert!(ranges_overlap(6990, 2, 6995, 1));
        assert!(ranges_overlap(5000, 10, 6999, 3));
    }

    #[test]
    fn test_point_features() {
        assert!(ranges_overlap(50, 50, 50, 50));
        assert!(!ranges_overlap(50, 50, 51, 51));
        assert!(ranges_overlap(50, 50, 10, 60));
        assert!(!ranges_overlap(50, 50, 6000, 10));
        assert!(ranges_overlap(5, 5, 6000, 10));
    }

    #[test]
    fn test_span_overlaps() {
        let origin = CircularSpan::new(6899, 10);
        assert!(origin.wraps());
        assert!(!CircularSpan::new(1, 1).wraps());
        assert!(origin.overlaps(&CircularSpan::new(3, 3)));
        assert!(!origin.overlaps(&CircularSpan::new(11, 6898)));
        assert!(CircularSpan::new(11, 6898).overlaps(&CircularSpan::new(6898, 6898)));
    }

    proptest! {
        #[test]
        fn overlap_is_symmetric(s1 in 1u32..5000, e1 in 1u32..5000, s2 in 1u32..5000, e2 in 1u32..5000) {
            prop_assert_eq!(ranges_overlap(s1, e1, s2, e2), ranges_overlap(s2, e2, s1, e1));
        }

        #[test]
        fn every_range_overlaps_itself(s in 1u32..5000, e in 1u32..5000) {
            prop_assert!(ranges_overlap(s, e, s, e));
        }

        #[test]
        fn wrapping_range_overlaps_its_tail(s in 2000u32..5000, e in 1u32..1000, p in 1u32..1000) {
            // any point at or before the wrapped stop lies inside the wrapped span
            prop_assume!(p <= e);
            prop_assert!(ranges_overlap(s, e, p, p));
        }
    }
}

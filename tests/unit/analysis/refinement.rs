//! Tests for erosion, dilation and largest-component selection

#[cfg(test)]
mod tests {
    use crate::{ellipse_mask, rect_mask};
    use fetal_biometry::analysis::refinement::{
        dilate_once, erode_once, keep_largest_component, label_components, refine,
    };
    use fetal_biometry::spatial::Mask;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    // Tests erosion with the cross element strips one pixel from each side
    // Verified by using a 3x3 square element
    #[test]
    fn test_erode_shrinks_rectangle() {
        let mask = rect_mask(20, 20, 5, 5, 15, 15);

        let eroded = erode_once(&mask);

        assert_eq!(eroded.area(), 8 * 8);
        assert!(eroded.is_set(6, 6));
        assert!(!eroded.is_set(5, 5));
    }

    // Tests dilation with the cross element leaves the corners unset
    // Verified by using a 3x3 square element
    #[test]
    fn test_dilate_single_pixel_is_cross() {
        let mut mask = Mask::new(5, 5);
        mask.set(2, 2, true);

        let dilated = dilate_once(&mask);

        assert_eq!(dilated.area(), 5);
        assert!(dilated.is_set(2, 1));
        assert!(dilated.is_set(1, 2));
        assert!(!dilated.is_set(1, 1));
    }

    // Tests a one-pixel bridge between blobs is cut by the opening
    // Verified by skipping the erosion step
    #[test]
    fn test_refine_cuts_thin_bridge() {
        let mut mask = rect_mask(40, 20, 2, 2, 12, 18);
        for y in 3..17 {
            for x in 25..39 {
                mask.set(x, y, true);
            }
        }
        for x in 12..25 {
            mask.set(x, 10, true);
        }
        assert_eq!(mask.component_count(), 1);

        let refined = refine(&mask);

        assert_eq!(refined.component_count(), 1);
        assert!(refined.is_set(30, 10), "larger blob should survive");
        assert!(!refined.is_set(5, 10), "smaller blob should be dropped");
        assert!(!refined.is_set(18, 10), "bridge should be removed");
    }

    // Tests isolated speckle disappears entirely
    // Verified by skipping the erosion step
    #[test]
    fn test_refine_removes_speckle() {
        let mut mask = Mask::new(10, 10);
        mask.set(3, 3, true);
        mask.set(7, 2, true);

        assert!(refine(&mask).is_empty());
    }

    // Tests all-zero input yields all-zero output of the same shape
    // Verified by returning a 1x1 mask for empty input
    #[test]
    fn test_refine_empty_mask() {
        let mask = Mask::new(12, 7);

        let refined = refine(&mask);

        assert!(refined.is_empty());
        assert_eq!(refined.dimensions(), (12, 7));
    }

    // Tests equal-area regions resolve to the first in raster order
    // Verified by using >= when comparing areas
    #[test]
    fn test_largest_component_tie_prefers_first() {
        let mut mask = rect_mask(30, 10, 1, 1, 5, 5);
        for y in 1..5 {
            for x in 20..24 {
                mask.set(x, y, true);
            }
        }

        let largest = keep_largest_component(&mask);

        assert_eq!(largest.area(), 16);
        assert!(largest.is_set(1, 1));
        assert!(!largest.is_set(20, 1));
    }

    // Tests component areas are reported per label
    // Verified by counting background as a component
    #[test]
    fn test_label_components_areas() {
        let mut mask = rect_mask(30, 10, 0, 0, 3, 3);
        for y in 5..7 {
            for x in 10..20 {
                mask.set(x, y, true);
            }
        }

        let (labels, components) = label_components(&mask);

        assert_eq!(labels.dimensions(), (30, 10));
        let mut areas: Vec<usize> = components.iter().map(|c| c.area).collect();
        areas.sort_unstable();
        assert_eq!(areas, vec![9, 20]);
        assert!(components.iter().all(|c| c.label > 0));
    }

    // Tests the output is one region with the maximum opened area for random blob sets
    // Verified by keeping the first region instead of the largest
    #[test]
    fn test_refine_keeps_single_largest_region() {
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..20 {
            let mut mask = Mask::new(64, 64);
            let blobs = rng.random_range(2..6);
            for _ in 0..blobs {
                let cx = rng.random_range(8.0..56.0);
                let cy = rng.random_range(8.0..56.0);
                let a = rng.random_range(3.0..12.0);
                let b = rng.random_range(3.0..12.0);
                let angle = rng.random_range(0.0..180.0);
                let blob = ellipse_mask(64, 64, [cx, cy], [a, b], angle);
                for y in 0..64 {
                    for x in 0..64 {
                        if blob.is_set(x, y) {
                            mask.set(x, y, true);
                        }
                    }
                }
            }

            let opened = dilate_once(&erode_once(&mask));
            let (_, components) = label_components(&opened);
            let expected = components.iter().map(|c| c.area).max().unwrap_or(0);

            let refined = refine(&mask);

            assert_eq!(refined.area(), expected);
            assert!(refined.component_count() <= 1);
            if expected > 0 {
                assert_eq!(refined.component_count(), 1);
            }
        }
    }
}

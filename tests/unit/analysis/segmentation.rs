//! Tests for model input preparation and probability map thresholding

#[cfg(test)]
mod tests {
    use fetal_biometry::BiometryError;
    use fetal_biometry::analysis::segmentation::{
        Segmenter, prepare_input, probability_to_mask,
    };
    use image::{GrayImage, Luma};
    use ndarray::Array2;

    // Tests the model input is square, fixed size and scaled to [0, 1]
    // Verified by skipping the 1/255 scaling
    #[test]
    fn test_prepare_input_shape_and_range() {
        let image = GrayImage::from_fn(300, 200, |x, _| Luma([(x % 256) as u8]));

        let input = prepare_input(&image, 256).unwrap_or_default();

        assert_eq!(input.dim(), (256, 256));
        assert!(input.iter().all(|&v| (0.0..=1.0).contains(&v)));
        assert!(input.iter().any(|&v| v > 0.5));
    }

    // Tests a uniform image stays uniform after resizing
    // Verified by using a sharpening filter
    #[test]
    fn test_prepare_input_uniform_image() {
        let image = GrayImage::from_pixel(50, 80, Luma([255]));

        let input = prepare_input(&image, 16).unwrap_or_default();

        assert!(input.iter().all(|&v| (v - 1.0).abs() < 1e-6));
    }

    // Tests empty images are rejected before inference
    // Verified by removing the dimension check
    #[test]
    fn test_prepare_input_rejects_empty_image() {
        let image = GrayImage::new(0, 10);

        let result = prepare_input(&image, 256);

        assert!(matches!(result, Err(BiometryError::InvalidInput { .. })));
    }

    // Tests thresholding happens after resizing back to the source resolution
    // Verified by returning the map at model resolution
    #[test]
    fn test_probability_to_mask_restores_resolution() {
        let probabilities = Array2::from_shape_fn((8, 8), |(row, _)| if row < 4 { 1.0 } else { 0.0 });

        let mask = probability_to_mask(&probabilities, 16, 32, 0.5).unwrap_or_else(|_| {
            fetal_biometry::spatial::Mask::new(0, 0)
        });

        assert_eq!(mask.dimensions(), (16, 32));
        assert!(mask.is_set(8, 2));
        assert!(!mask.is_set(8, 30));
    }

    // Tests the comparison is strictly greater than the threshold
    // Verified by using >= in the comparison
    #[test]
    fn test_probability_exactly_at_threshold_is_background() {
        let probabilities = Array2::from_elem((4, 4), 0.2_f32);

        let mask = probability_to_mask(&probabilities, 4, 4, 0.2).unwrap_or_else(|_| {
            fetal_biometry::spatial::Mask::new(1, 1)
        });

        // 0.2 quantises to 51/255 = 0.2 exactly
        assert!(mask.is_empty());
        assert_eq!(mask.dimensions(), (4, 4));
    }

    // Tests out-of-range probabilities are clamped rather than wrapped
    // Verified by casting without clamping
    #[test]
    fn test_probability_values_are_clamped() {
        let probabilities = Array2::from_elem((4, 4), 3.0_f32);

        let mask = probability_to_mask(&probabilities, 4, 4, 0.5).unwrap_or_else(|_| {
            fetal_biometry::spatial::Mask::new(1, 1)
        });

        assert_eq!(mask.area(), 16);
    }

    // Tests malformed maps are reported as invalid input
    // Verified by removing the shape check
    #[test]
    fn test_probability_to_mask_rejects_bad_maps() {
        let rectangular = Array2::<f32>::zeros((4, 6));
        let with_nan = Array2::from_elem((4, 4), f32::NAN);

        assert!(matches!(
            probability_to_mask(&rectangular, 10, 10, 0.5),
            Err(BiometryError::InvalidInput { .. })
        ));
        assert!(matches!(
            probability_to_mask(&with_nan, 10, 10, 0.5),
            Err(BiometryError::InvalidInput { .. })
        ));
        assert!(probability_to_mask(&Array2::<f32>::zeros((4, 4)), 0, 10, 0.5).is_err());
    }

    // Tests closures can stand in for a model
    // Verified by removing the blanket implementation
    #[test]
    fn test_closure_segmenter() {
        let mut calls = 0;
        let mut model = |input: &Array2<f32>| -> fetal_biometry::Result<Array2<f32>> {
            calls += 1;
            Ok(input.mapv(|v| 1.0 - v))
        };

        let output = model.segment(&Array2::zeros((2, 2))).unwrap_or_default();

        assert_eq!(output, Array2::from_elem((2, 2), 1.0));
        assert_eq!(calls, 1);
    }
}

//! Tests for the end-to-end prediction pipeline

#[cfg(test)]
mod tests {
    use crate::{EllipseModel, ellipse_mask, ellipse_probabilities};
    use approx::assert_relative_eq;
    use fetal_biometry::algorithm::pipeline::{
        PipelineConfig, measure_mask, run_prediction, segment_head,
    };
    use fetal_biometry::analysis::refinement::refine;
    use fetal_biometry::analysis::segmentation::Segmenter;
    use fetal_biometry::spatial::Mask;
    use fetal_biometry::{BiometryError, Result};
    use image::{GrayImage, Luma};
    use ndarray::Array2;

    fn gray(width: u32, height: u32) -> GrayImage {
        GrayImage::from_pixel(width, height, Luma([80]))
    }

    // Tests a model-sized image measures the ellipse the model marked
    // Verified by skipping the resize back to source resolution
    #[test]
    fn test_run_prediction_same_size() {
        let mut model = EllipseModel {
            semi_axes: [60.0, 40.0],
        };

        let result = run_prediction(&mut model, &gray(256, 256), 1.0, &PipelineConfig::default());

        assert!(result.is_ok(), "prediction failed: {result:?}");
        if let Ok(measurement) = result {
            assert_relative_eq!(measurement.ellipse.center[0], 128.0, epsilon = 1.5);
            assert_relative_eq!(measurement.ellipse.center[1], 128.0, epsilon = 1.5);
            assert_relative_eq!(measurement.ellipse.semi_major, 60.0, epsilon = 1.5);
            assert_relative_eq!(measurement.ellipse.semi_minor, 40.0, epsilon = 1.5);
            assert_relative_eq!(measurement.biometry.bpd_mm, 120.0, epsilon = 3.0);
            assert_relative_eq!(measurement.pixel_size_mm, 1.0);
        }
    }

    // Tests the mask is mapped back to non-square source dimensions
    // Verified by measuring in model coordinates
    #[test]
    fn test_run_prediction_rescales_to_source() {
        let mut model = EllipseModel {
            semi_axes: [60.0, 40.0],
        };

        let result = run_prediction(&mut model, &gray(512, 384), 0.5, &PipelineConfig::default());

        assert!(result.is_ok(), "prediction failed: {result:?}");
        if let Ok(measurement) = result {
            // x scales by 2 and y by 1.5
            assert_relative_eq!(measurement.ellipse.semi_major, 120.0, epsilon = 3.0);
            assert_relative_eq!(measurement.ellipse.semi_minor, 60.0, epsilon = 3.0);
            assert_relative_eq!(measurement.biometry.bpd_mm, 120.0, epsilon = 3.0);
            assert_relative_eq!(measurement.biometry.ofd_mm, 60.0, epsilon = 3.0);
        }
    }

    // Tests an all-background probability map reports no detection
    // Verified by fitting an ellipse to an empty contour
    #[test]
    fn test_empty_segmentation() {
        let mut model = |input: &Array2<f32>| -> Result<Array2<f32>> {
            Ok(Array2::zeros(input.dim()))
        };

        let result = run_prediction(&mut model, &gray(100, 80), 1.0, &PipelineConfig::default());

        assert!(matches!(result, Err(BiometryError::NoDetection)));
    }

    // Tests model failures propagate unchanged
    // Verified by mapping every failure to no detection
    #[test]
    fn test_model_failure_propagates() {
        let mut model = |_: &Array2<f32>| -> Result<Array2<f32>> {
            Err(BiometryError::Inference {
                reason: "session closed".to_string(),
            })
        };

        let result = run_prediction(&mut model, &gray(64, 64), 1.0, &PipelineConfig::default());

        assert!(matches!(result, Err(BiometryError::Inference { .. })));
    }

    // Tests a probability map of the wrong shape is rejected
    // Verified by removing the shape check
    #[test]
    fn test_wrong_output_shape() {
        let mut model =
            |_: &Array2<f32>| -> Result<Array2<f32>> { Ok(Array2::from_elem((10, 10), 1.0)) };

        let result = segment_head(&mut model, &gray(64, 64), &PipelineConfig::default());

        assert!(matches!(result, Err(BiometryError::InvalidInput { .. })));
    }

    // Tests refinement leaves only the largest detected region
    // Verified by skipping component selection
    #[test]
    fn test_segment_head_keeps_largest_region() {
        let mut model = |input: &Array2<f32>| -> Result<Array2<f32>> {
            let mut map = ellipse_probabilities(input.dim(), [50.0, 30.0]);
            for r in 5..20 {
                for c in 5..20 {
                    map[(r, c)] = 1.0;
                }
            }
            Ok(map)
        };

        let mask = segment_head(&mut model, &gray(256, 256), &PipelineConfig::default());

        assert!(mask.is_ok());
        if let Ok(mask) = mask {
            assert_eq!(mask.component_count(), 1);
            assert!(mask.is_set(128, 128));
            assert!(!mask.is_set(12, 12));
        }
    }

    // Tests a custom input size reaches the model
    // Verified by ignoring the configured size
    #[test]
    fn test_custom_input_size() {
        let mut seen = None;
        let mut model = |input: &Array2<f32>| -> Result<Array2<f32>> {
            seen = Some(input.dim());
            Ok(ellipse_probabilities(input.dim(), [20.0, 12.0]))
        };
        let config = PipelineConfig {
            input_size: 64,
            threshold: 0.5,
        };

        let result = segment_head(&mut model, &gray(128, 128), &config);

        assert!(result.is_ok());
        assert_eq!(seen, Some((64, 64)));
    }

    // Tests measuring a synthetic mask directly
    // Verified by using the minor axis for BPD
    #[test]
    fn test_measure_mask() {
        let mask = ellipse_mask(200, 200, [100.0, 100.0], [70.0, 45.0], 30.0);

        let result = measure_mask(&mask, 0.1);

        assert!(result.is_ok());
        if let Ok(measurement) = result {
            assert_relative_eq!(measurement.ellipse.angle_deg, 30.0, epsilon = 2.0);
            assert_relative_eq!(measurement.biometry.bpd_mm, 14.0, epsilon = 0.3);
            assert_relative_eq!(measurement.biometry.ofd_mm, 9.0, epsilon = 0.3);
        }
    }

    // Tests an empty mask has nothing to measure
    // Verified by returning a zero-sized ellipse
    #[test]
    fn test_measure_empty_mask() {
        assert!(matches!(
            measure_mask(&Mask::new(32, 32), 1.0),
            Err(BiometryError::NoDetection)
        ));
    }

    // Tests the default configuration matches the model contract
    // Verified by changing the default threshold
    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();

        assert_eq!(config.input_size, 256);
        assert_relative_eq!(config.threshold, 0.5);
    }

    // Tests trait objects can drive the pipeline
    // Verified by requiring a concrete segmenter type
    #[test]
    fn test_boxed_segmenter() {
        let mut boxed: Box<dyn Segmenter> = Box::new(EllipseModel {
            semi_axes: [40.0, 40.0],
        });

        let result = run_prediction(boxed.as_mut(), &gray(256, 256), 1.0, &PipelineConfig::default());

        assert!(result.is_ok());
    }

    // Tests a head clipped by the left edge of the frame is still measured
    // Verified by tracing contours without a background frame
    #[test]
    fn test_measure_head_clipped_on_left_edge() {
        let mask = refine(&ellipse_mask(120, 100, [-5.0, 50.0], [60.0, 40.0], 0.0));
        assert!(!mask.is_empty());

        let result = measure_mask(&mask, 1.0);

        assert!(result.is_ok(), "clipped head not measured: {result:?}");
        if let Ok(measurement) = result {
            assert!(measurement.biometry.hc_mm > 0.0);
        }
    }

    // Tests the stored pixel size is the one the lengths were computed with
    // Verified by storing the raw argument
    #[test]
    fn test_measurement_stores_applied_pixel_size() {
        let mask = ellipse_mask(100, 100, [50.0, 50.0], [30.0, 20.0], 0.0);

        let negative = measure_mask(&mask, -3.0);
        let infinite = measure_mask(&mask, f64::INFINITY);

        assert!(negative.is_ok_and(|m| {
            m.pixel_size_mm == 1.0 && (m.biometry.bpd_mm - 2.0 * m.ellipse.semi_major).abs() < 1e-9
        }));
        assert!(infinite.is_ok_and(|m| m.pixel_size_mm == 1.0 && m.biometry.hc_mm.is_finite()));
    }
}

//! Pipeline constants, clinical coefficients and file naming conventions

/// Side length of the square image the segmentation model expects
pub const MODEL_INPUT_SIZE: u32 = 256;

/// Probability above which a pixel counts as head
pub const PROBABILITY_THRESHOLD: f32 = 0.5;

/// Millimetres per pixel when no usable calibration is available
pub const DEFAULT_PIXEL_SIZE_MM: f64 = 1.0;

// Contour fitting needs an over-determined conic system
/// Minimum number of contour points accepted by the ellipse fit
pub const MIN_FIT_POINTS: usize = 6;

// Gestational age regression, days from HC in centimetres
/// Linear coefficient of the gestational age polynomial
pub const GA_LINEAR_COEFFICIENT: f64 = 1.49;
/// Quadratic coefficient of the gestational age polynomial
pub const GA_QUADRATIC_COEFFICIENT: f64 = 0.13;
/// Constant term of the gestational age polynomial
pub const GA_INTERCEPT_DAYS: f64 = 73.38;
/// Days per gestational week
pub const DAYS_PER_WEEK: f64 = 7.0;

// Model and calibration artifacts, resolved against the working directory
/// Default segmentation model file
pub const DEFAULT_MODEL_PATH: &str = "network.onnx";
/// Calibration table shipped with the training set
pub const TRAINING_CALIBRATION_FILE: &str = "training_set_pixel_size_and_HC.csv";
/// Calibration table shipped with the test set
pub const TEST_CALIBRATION_FILE: &str = "test_set_pixel_size.csv";

// Output settings
/// Suffix appended to the source filename for the text report
pub const METADATA_SUFFIX: &str = "_metaData.txt";
/// Suffix appended to the source filename for the annotated image
pub const ANNOTATION_SUFFIX: &str = "annotation.jpeg";
/// Suffix appended to the source file stem for the on-screen style overlay
pub const OVERLAY_SUFFIX: &str = "_overlay.png";

// Drawing settings
/// Ellipse colour used for the interactive overlay (#2ecc71)
pub const OVERLAY_COLOR: [u8; 3] = [46, 204, 113];
/// Ellipse stroke width of the interactive overlay in pixels
pub const OVERLAY_THICKNESS: u32 = 1;
/// Ellipse colour burned into exported annotations
pub const ANNOTATION_COLOR: [u8; 3] = [0, 255, 0];
/// Ellipse stroke width of exported annotations in pixels
pub const ANNOTATION_THICKNESS: u32 = 2;
/// Number of segments used to approximate an ellipse outline
pub const ELLIPSE_SEGMENTS: usize = 360;

// Progress bar display settings
/// Width of the progress bar in characters
pub const PROGRESS_BAR_WIDTH: u16 = 40;

//! Morphological clean-up of thresholded segmentation masks
//!
//! One opening-like pass (erode then dilate with a 3x3 cross) removes thin
//! bridges and speckle, after which only the largest 8-connected region is
//! kept. Out-of-image pixels count as foreground while eroding, so regions
//! touching the border are not eaten from outside.

use crate::spatial::mask::{BACKGROUND, Mask};
use image::{ImageBuffer, Luma};
use imageproc::distance_transform::Norm;
use imageproc::morphology::{dilate, erode};
use imageproc::region_labelling::{Connectivity, connected_components};
use std::collections::HashMap;

/// Per-pixel region labels, 0 for background
pub type LabelImage = ImageBuffer<Luma<u32>, Vec<u32>>;

// L1 radius 1 is the 4-neighbourhood cross
const STRUCTURING_NORM: Norm = Norm::L1;
const STRUCTURING_RADIUS: u8 = 1;

/// Area statistics for one labelled region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Component {
    /// Label assigned by the connected-component pass, never 0
    pub label: u32,
    /// Number of pixels in the region
    pub area: usize,
}

/// Erode the mask once with the fixed cross structuring element
pub fn erode_once(mask: &Mask) -> Mask {
    Mask::from_image(&erode(mask.as_image(), STRUCTURING_NORM, STRUCTURING_RADIUS))
}

/// Dilate the mask once with the fixed cross structuring element
pub fn dilate_once(mask: &Mask) -> Mask {
    Mask::from_image(&dilate(mask.as_image(), STRUCTURING_NORM, STRUCTURING_RADIUS))
}

/// Label 8-connected regions and report their areas
///
/// Components are listed in the order their first pixel is met in a raster
/// scan.
pub fn label_components(mask: &Mask) -> (LabelImage, Vec<Component>) {
    let labels = connected_components(mask.as_image(), Connectivity::Eight, Luma([BACKGROUND]));

    let mut index_of: HashMap<u32, usize> = HashMap::new();
    let mut components: Vec<Component> = Vec::new();
    for &label in labels.as_raw() {
        if label == 0 {
            continue;
        }
        let index = *index_of.entry(label).or_insert_with(|| {
            components.push(Component { label, area: 0 });
            components.len() - 1
        });
        if let Some(component) = components.get_mut(index) {
            component.area += 1;
        }
    }

    (labels, components)
}

/// Keep only the region with the largest area
///
/// Ties go to the region met first in raster order, which is also the
/// lowest label. An empty mask comes back empty.
pub fn keep_largest_component(mask: &Mask) -> Mask {
    let (labels, components) = label_components(mask);

    let mut largest: Option<Component> = None;
    for component in components {
        if largest.is_none_or(|best| component.area > best.area) {
            largest = Some(component);
        }
    }

    let Some(largest) = largest else {
        return Mask::new(mask.width(), mask.height());
    };

    Mask::from_fn(mask.width(), mask.height(), |x, y| {
        labels.get_pixel(x, y).0[0] == largest.label
    })
}

/// Full refinement: erode, dilate, keep the largest region
///
/// Never fails. An all-background result means nothing was detected and the
/// caller must check for it before fitting.
pub fn refine(mask: &Mask) -> Mask {
    let opened = dilate_once(&erode_once(mask));
    keep_largest_component(&opened)
}

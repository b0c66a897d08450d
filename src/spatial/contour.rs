//! Outer border extraction for refined masks

use crate::spatial::mask::{BACKGROUND, Mask};
use image::imageops::replace;
use image::{GrayImage, Luma};
use imageproc::contours::{BorderType, Contour, find_contours};

/// Trace borders on a copy framed by one pixel of background
///
/// The tracer only starts an outer border after a background pixel, so a
/// region touching column 0 would otherwise be reported as a hole. Points
/// are shifted back into mask coordinates.
fn framed_borders(mask: &Mask) -> Vec<Contour<i32>> {
    let (width, height) = mask.dimensions();
    let mut framed = GrayImage::from_pixel(width + 2, height + 2, Luma([BACKGROUND]));
    replace(&mut framed, mask.as_image(), 1, 1);

    let mut contours = find_contours::<i32>(&framed);
    for contour in &mut contours {
        for point in &mut contour.points {
            point.x -= 1;
            point.y -= 1;
        }
    }
    contours
}

/// Returns the points of the first outer border found in the mask
///
/// Borders are traced with the Suzuki-Abe algorithm. Hole borders are
/// skipped, so a ring-shaped region yields only its outside edge. Points are
/// pixel centres in (x, y) order. `None` means the mask has no foreground.
pub fn external_contour(mask: &Mask) -> Option<Vec<[f64; 2]>> {
    framed_borders(mask)
        .into_iter()
        .find(|contour| contour.border_type == BorderType::Outer && contour.parent.is_none())
        .map(|contour| {
            contour
                .points
                .iter()
                .map(|p| [f64::from(p.x), f64::from(p.y)])
                .collect()
        })
}

/// Number of outer borders in the mask, one per 8-connected region
pub fn external_contour_count(mask: &Mask) -> usize {
    framed_borders(mask)
        .iter()
        .filter(|contour| contour.border_type == BorderType::Outer)
        .count()
}

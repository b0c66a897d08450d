pub mod refinement;
pub mod segmentation;

//! Geometric transform operations: rotate/flip compositing and cropping.
//!
//! # Transform Order
//!
//! Rendering composites in a fixed order: translate to center, rotate by the
//! 90-degree step, mirror for the flip flags, draw the source centered. Crop
//! operates on the raw natural image, never on the rotated view.
//!
//! # Coordinate System
//!
//! - Rotation is clockwise in degrees, restricted to {0, 90, 180, 270}
//! - Crop coordinates are percentages of the displayed image
//! - Origin is the top-left corner

mod crop;
mod state;

pub use crop::{crop_to_natural, CropRegion};
pub use state::{render_transformed, TransformState};

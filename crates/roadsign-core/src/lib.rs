//! Data model shared by the roadsign pipeline: masks, label grids,
//! rectangles and regions.

pub mod connectivity;
pub mod grid;
pub mod labels;
pub mod mask;
pub mod rect;
pub mod region;

pub use connectivity::Connectivity;
pub use grid::Grid;
pub use labels::{LabelGrid, UNLABELED};
pub use mask::PixelMask;
pub use rect::Rectangle;
pub use region::Region;

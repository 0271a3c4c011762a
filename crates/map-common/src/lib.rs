//! Common types shared by the symbolization and contour engines.

pub mod bbox;
pub mod error;
pub mod geometry;
pub mod grid;

pub use bbox::BoundingBox;
pub use error::{MapError, MapResult};
pub use geometry::{GeometryType, Point};
pub use grid::{EdgeFix, Grid, RasterInterpretation};

//! Contours & continua decomposition of a scalar image interpreted as a
//! bilinearly interpolated 2D function.

pub mod cell;
pub mod geometry;
pub mod io;
pub mod merge;
pub mod rect;
pub mod topology;

pub use crate::geometry::{DPoint, Pos};
pub use crate::rect::Rect;
pub use crate::topology::{Contour, Continuum, CC};

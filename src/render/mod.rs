//! Rasterization of chart marks.
//!
//! Charts describe themselves as a list of [`Mark`]s in pixel space; the
//! raster backend draws them with [`Drawable`], the vector backend turns the
//! same list into SVG elements.

mod primitives;

pub use primitives::{draw_line, draw_rect, draw_rect_outline, Drawable, Mark};

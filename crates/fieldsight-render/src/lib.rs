//! Presentation of visibility grids.
//!
//! [`OverlayRenderer`] paints a [`VisibilityPair`](fieldsight_los::VisibilityPair)
//! as a translucent RGBA overlay that can be blended onto a picture of the
//! field and written out as PNG. [`TerminalPreview`] draws the same four
//! coverage colors with ANSI backgrounds.

pub mod overlay;
pub mod term;

pub use fieldsight_los::Coverage;
pub use overlay::{OverlayRenderer, Palette, RenderError, coverage_grid, load_background, save_png};
pub use term::{PreviewCell, TerminalPreview};

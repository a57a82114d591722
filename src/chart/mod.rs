//! Chart rendering.
//!
//! Each chart is drawn on a fresh bitmap surface and saved as a PNG under the
//! output directory. Colors are picked at random per source.

pub mod backend;
pub mod renderer;

pub use renderer::{ChartRenderer, NamedSeries};

pub mod hist1d;
pub mod hist2d;
pub mod overlay;
pub mod stats;

mod axes_draw;

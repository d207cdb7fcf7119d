pub mod canvas;
pub mod histogram;

pub use canvas::ClickLayer;

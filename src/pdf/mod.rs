pub mod canvas;
pub mod color;
pub mod font;
pub mod graphics_state;
pub mod optimizer;
pub mod reader;
pub mod style;
pub mod surface;

pub use canvas::PdfCanvas;
pub use color::Color;

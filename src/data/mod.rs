//! Font output: UFO conversion, saving, and compilation

pub mod compiler;
pub mod conversions;
pub mod ufo;

pub use compiler::FontCompiler;
pub use ufo::save_ufo;

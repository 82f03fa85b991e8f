//! inkfont
//!
//! Builds a UFO font from handwriting samples: decode the sample directory,
//! calibrate each written line, normalize glyphs onto the em, compose
//! accents, marks and digraphs, kern, and write the font project.
pub mod config;
pub mod core;
pub mod data;
pub mod font_source;
pub mod geometry;
pub mod logging;
pub mod pipeline;
#[cfg(test)]
mod tests;

//! Diagnostic reporting: plot data, renderers, and report formatting.
//!
//! [`report::analyze`] turns a loaded table and a time-block index into a
//! [`report::DiagnosticReport`]. Its figures are plain data
//! ([`figure::Figure`]) handed to a swappable [`render::Renderer`].

pub mod figure;
pub mod render;
pub mod report;
pub mod terminal;

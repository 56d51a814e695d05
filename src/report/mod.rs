//! Before/after PDF report.
//!
//! `layout` sizes and stacks the region cards from measured text, `palette`
//! holds the static colors and labels, and `pdf` draws the single A4 page.

pub mod layout;
pub mod palette;
pub mod pdf;

pub use layout::*;
pub use palette::*;
pub use pdf::*;

use std::path::PathBuf;

/// Errors from building the report.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Cannot read image {path}: {reason}")]
    Image { path: PathBuf, reason: String },

    #[error("PDF generation failed: {0}")]
    Pdf(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

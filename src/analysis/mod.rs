//! Before/after facial analysis: the assistant round trip and the
//! normalization of its reply into [`AnalysisResult`].

pub mod assistant;
pub mod orchestrator;
pub mod parser;
pub mod prompt;
pub mod types;

pub use assistant::*;
pub use orchestrator::*;
pub use parser::*;
pub use prompt::*;
pub use types::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Assistant service error: {0}")]
    ExternalService(String),

    #[error("Timed out after {waited_secs}s waiting for the assistant run")]
    Timeout { waited_secs: u64 },

    #[error("Could not parse assistant response: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// Feedback normalization: turns raw Lever feedback forms into report rows.
// Three variants share the same filtering and field helpers:
//   pipeline  - regular interview loops (headers + bodies)
//   intern    - intern evaluation forms, v1 and v2 layouts
//   ballista  - structured interviews with color-tagged questions

pub mod ballista;
pub mod fields;
pub mod handlers;
pub mod header;
pub mod intern;
pub mod ordering;
pub mod pipeline;

use thiserror::Error;

/// Title prefix reserved for the intern evaluation form.
pub const INTERN_EVALUATION_PREFIX: &str = "Intern Evaluations";

/// Per-record failure. Always caught by the pipelines; the record is logged and dropped.
#[derive(Debug, Error)]
pub enum FeedbackError {
    #[error("Missing required field '{0}'")]
    MissingField(String),

    #[error("Could not resolve interviewer {user_id}: {reason}")]
    UserLookup { user_id: String, reason: String },

    #[error("Unknown subdimension color '{0}'")]
    UnknownSubdimension(String),
}

pub use ballista::{compile_ballista_feedback, BallistaReport};
pub use intern::{compile_intern_feedback, InternReport};
pub use pipeline::{compile_feedback, compile_feedback_from, FeedbackReport};

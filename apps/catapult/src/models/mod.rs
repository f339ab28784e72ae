pub mod lever;

pub use lever::{
    Candidate, FeedbackRecord, FeedbackSubmission, Field, FieldValue, NewCandidate, Page, Posting,
    User,
};

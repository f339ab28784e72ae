use crate::feedback::FeedbackError;
use crate::models::Field;

/// The overall hire/no-hire score.
pub const RATING_KEY: &str = "Rating";
/// Older short-form team fit question.
pub const TEAM_SUGGESTIONS_KEY: &str = "Team Suggestions";
pub const TEAM_FEEDBACK_KEY: &str = "Did the candidate give you any information about their interests that would help determine team fit?";
pub const ANYTHING_ELSE_TO_KNOW_KEY: &str =
    "Is there anything else we should consider when making the final hiring decision?";

/// Fields pulled out separately and therefore left out of the generic body.
pub const FIELD_EXCLUSIONS: &[&str] = &[TEAM_FEEDBACK_KEY, ANYTHING_ELSE_TO_KNOW_KEY, RATING_KEY];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPolicy {
    Required,
    AllowMissing,
}

/// Value of the first field whose label is exactly `key`.
pub fn find_field<'a>(fields: &'a [Field], key: &str) -> Option<&'a str> {
    fields
        .iter()
        .find(|f| f.text == key)
        .map(|f| f.value.as_str())
}

/// Looks up `key`; under `AllowMissing` an absent field yields an empty string.
pub fn field_value(fields: &[Field], key: &str, policy: FieldPolicy) -> Result<String, FeedbackError> {
    match (find_field(fields, key), policy) {
        (Some(value), _) => Ok(value.to_string()),
        (None, FieldPolicy::AllowMissing) => Ok(String::new()),
        (None, FieldPolicy::Required) => Err(FeedbackError::MissingField(key.to_string())),
    }
}

pub fn is_excluded(field: &Field) -> bool {
    FIELD_EXCLUSIONS.contains(&field.text.as_str())
}

//! Structured ("ballista") interviews.
//!
//! Question fields are labelled `[Color] question text`; the color names the
//! subdimension being assessed. Each question is followed by an
//! "Additional context" field carrying the interviewer's notes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::feedback::fields::{field_value, is_excluded, FieldPolicy, RATING_KEY};
use crate::feedback::header::Header;
use crate::feedback::pipeline::reportable_records;
use crate::feedback::FeedbackError;
use crate::lever_client::RecruitingApi;
use crate::models::{FeedbackRecord, User};
use crate::user_cache::UserDirectory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Subdimension {
    #[serde(rename = "Technical Skill")]
    TechnicalSkill,
    #[serde(rename = "Leadership")]
    Leadership,
    #[serde(rename = "Business Insight")]
    BusinessInsight,
    #[serde(rename = "Ownership")]
    Ownership,
    #[serde(rename = "Continuous Improvement")]
    ContinuousImprovement,
}

impl Subdimension {
    pub fn from_color(color: &str) -> Option<Subdimension> {
        match color {
            "Blue" => Some(Subdimension::TechnicalSkill),
            "Green" => Some(Subdimension::Leadership),
            "Purple" => Some(Subdimension::BusinessInsight),
            "Red" => Some(Subdimension::Ownership),
            "Orange" => Some(Subdimension::ContinuousImprovement),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Subdimension::TechnicalSkill => "Technical Skill",
            Subdimension::Leadership => "Leadership",
            Subdimension::BusinessInsight => "Business Insight",
            Subdimension::Ownership => "Ownership",
            Subdimension::ContinuousImprovement => "Continuous Improvement",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub question_text: String,
    pub subdimension: Subdimension,
    pub question_answer: String,
    pub additional_context: String,
    pub user: String,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallistaHeader {
    #[serde(flatten)]
    pub header: Header,
    pub problem_solving_question: Option<String>,
    pub system_design_question: Option<String>,
}

/// subdimension -> question text -> answers from every interviewer.
pub type QuestionGroups = BTreeMap<Subdimension, BTreeMap<String, Vec<Question>>>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallistaReport {
    pub headers: Vec<BallistaHeader>,
    pub questions: QuestionGroups,
}

/// Text after the closing bracket, trimmed.
fn after_brackets(text: &str) -> &str {
    match text.find(']') {
        Some(i) => text[i + 1..].trim(),
        None => text.trim(),
    }
}

/// Text between the brackets, trimmed.
fn inside_brackets(text: &str) -> &str {
    let start = text.find('[').map(|i| i + 1).unwrap_or(0);
    let end = text.find(']').unwrap_or(text.len());
    text.get(start..end).unwrap_or_default().trim()
}

/// Pairs bracketed questions with the "Additional context" field that follows them.
pub fn extract_questions(record: &FeedbackRecord, user: &User) -> Result<Vec<Question>, FeedbackError> {
    let mut questions = Vec::new();
    let mut current: Option<(&str, &str)> = None;

    for field in record.fields.iter().filter(|f| !is_excluded(f)) {
        if field.text.trim().starts_with('[') {
            current = Some((field.text.as_str(), field.value.as_str()));
        }

        if field.text.starts_with("Additional") {
            // Context with no labelled question before it means the form was
            // mislabelled; ignore it rather than fail the whole record.
            let Some((question, answer)) = current.take() else {
                continue;
            };
            let color = inside_brackets(question);
            let subdimension = Subdimension::from_color(color)
                .ok_or_else(|| FeedbackError::UnknownSubdimension(color.to_string()))?;
            questions.push(Question {
                question_text: after_brackets(question).to_string(),
                subdimension,
                question_answer: answer.to_string(),
                additional_context: field.value.clone(),
                user: user.name.clone(),
                username: user.username.clone(),
            });
        }
    }

    Ok(questions)
}

fn first_field_mentioning(record: &FeedbackRecord, needle: &str) -> Option<String> {
    record
        .fields
        .first()
        .filter(|f| f.text.contains(needle))
        .map(|f| f.value.clone())
}

fn compile_record(
    record: &FeedbackRecord,
    user: &User,
) -> Result<(BallistaHeader, Vec<Question>), FeedbackError> {
    let score = field_value(&record.fields, RATING_KEY, FieldPolicy::Required)?;
    let questions = extract_questions(record, user)?;
    let header = BallistaHeader {
        header: Header::new(&score, &user.username, &record.title),
        problem_solving_question: first_field_mentioning(record, "Problem Solving"),
        system_design_question: first_field_mentioning(record, "System Design"),
    };
    Ok((header, questions))
}

pub async fn compile_ballista_feedback(
    api: &dyn RecruitingApi,
    users: &UserDirectory,
    candidate_id: &str,
) -> BallistaReport {
    let records = api.list_candidate_feedback(candidate_id).await;
    compile_ballista_feedback_from(records, users).await
}

pub async fn compile_ballista_feedback_from(
    records: Vec<FeedbackRecord>,
    users: &UserDirectory,
) -> BallistaReport {
    let mut report = BallistaReport::default();

    for record in reportable_records(records) {
        let user = match users.get_or_fetch(&record.user).await {
            Ok(user) => user,
            Err(e) => {
                warn!("Skipping structured feedback {}: {e}", record.id);
                continue;
            }
        };

        match compile_record(&record, &user) {
            Ok((header, questions)) => {
                report.headers.push(header);
                for question in questions {
                    report
                        .questions
                        .entry(question.subdimension)
                        .or_default()
                        .entry(question.question_text.clone())
                        .or_default()
                        .push(question);
                }
            }
            Err(e) => warn!("Skipping structured feedback {} ({}): {e}", record.id, record.title),
        }
    }

    debug!(
        "Compiled {} structured interviews across {} subdimensions",
        report.headers.len(),
        report.questions.len()
    );
    report
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::testing::{directory, record, user, FakeLever};

    #[test]
    fn test_bracket_helpers() {
        assert_eq!(inside_brackets("[ Blue ] How do you debug?"), "Blue");
        assert_eq!(after_brackets("[Blue]  How do you debug? "), "How do you debug?");
    }

    #[test]
    fn test_extract_pairs_question_with_context() {
        let r = record(
            "b1",
            "Structured - Leadership",
            "u1",
            Some(1),
            &[
                ("Additional context", "orphan"),
                ("[Green] Tell me about a conflict", "Handled it well"),
                ("Additional context", "Took initiative"),
                ("[Blue] Explain a hash map", "Correct"),
                ("Rating", "3"),
                ("Additional context", "Fast"),
            ],
        );
        let questions = extract_questions(&r, &user("u1", "Ada")).unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].subdimension, Subdimension::Leadership);
        assert_eq!(questions[0].question_text, "Tell me about a conflict");
        assert_eq!(questions[0].question_answer, "Handled it well");
        assert_eq!(questions[0].additional_context, "Took initiative");
        assert_eq!(questions[1].subdimension, Subdimension::TechnicalSkill);
        assert_eq!(questions[1].additional_context, "Fast");
    }

    #[test]
    fn test_unknown_color_is_error() {
        let r = record(
            "b2",
            "Structured",
            "u1",
            Some(1),
            &[("[Teal] Something", "x"), ("Additional context", "y")],
        );
        let err = extract_questions(&r, &user("u1", "Ada")).unwrap_err();
        assert!(matches!(err, FeedbackError::UnknownSubdimension(c) if c == "Teal"));
    }

    #[tokio::test]
    async fn test_unknown_color_skips_only_that_record() {
        let api = Arc::new(
            FakeLever::new()
                .with_user(user("u1", "Ada"))
                .with_user(user("u2", "Grace")),
        );
        let input = vec![
            record(
                "good",
                "Engineering - Problem Solving",
                "u1",
                Some(10),
                &[
                    ("Problem Solving question", "Two sum"),
                    ("[Blue] Walk through your approach", "Clear"),
                    ("Additional context", "Optimal"),
                    ("Rating", "4 - hire"),
                ],
            ),
            record(
                "bad",
                "Engineering - Ownership",
                "u2",
                Some(20),
                &[
                    ("[Teal] Unknown", "x"),
                    ("Additional context", "y"),
                    ("Rating", "2"),
                ],
            ),
        ];

        let report = compile_ballista_feedback_from(input, &directory(api)).await;
        assert_eq!(report.headers.len(), 1);
        let header = &report.headers[0];
        assert_eq!(header.header.interviewer, "ada");
        assert_eq!(header.header.score, "4");
        assert_eq!(header.problem_solving_question.as_deref(), Some("Two sum"));
        assert!(header.system_design_question.is_none());

        let technical = &report.questions[&Subdimension::TechnicalSkill];
        assert_eq!(technical["Walk through your approach"].len(), 1);
        assert!(!report.questions.contains_key(&Subdimension::Ownership));
    }

    #[tokio::test]
    async fn test_same_question_grouped_across_interviewers() {
        let api = Arc::new(
            FakeLever::new()
                .with_user(user("u1", "Ada"))
                .with_user(user("u2", "Grace")),
        );
        let fields = [
            ("[Orange] What did you learn last year?", "Rust"),
            ("Additional context", "Curious"),
            ("Rating", "3"),
        ];
        let input = vec![
            record("a", "Growth", "u1", Some(10), &fields),
            record("b", "Growth", "u2", Some(20), &fields),
        ];
        let report = compile_ballista_feedback_from(input, &directory(api)).await;
        let answers =
            &report.questions[&Subdimension::ContinuousImprovement]["What did you learn last year?"];
        let who: Vec<&str> = answers.iter().map(|q| q.user.as_str()).collect();
        assert_eq!(who, vec!["Ada", "Grace"]);
    }
}

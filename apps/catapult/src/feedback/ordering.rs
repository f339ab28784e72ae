//! Report ordering for interview loops.
//!
//! Phone screens always come first, then the canonical onsite interviews in
//! the order the hiring docs list them, then everything else by completion
//! time. Unclassified records use their raw `completedAt` (epoch ms) as the
//! key, so they land after every classified rank in practice.

use crate::models::FeedbackRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum InterviewType {
    ProblemSolving,
    SystemDesign,
    PlaysWellWithOthers,
    Ownership,
}

impl InterviewType {
    pub const ORDERED: [InterviewType; 4] = [
        InterviewType::ProblemSolving,
        InterviewType::SystemDesign,
        InterviewType::PlaysWellWithOthers,
        InterviewType::Ownership,
    ];

    pub fn needle(self) -> &'static str {
        match self {
            InterviewType::ProblemSolving => "problem solving",
            InterviewType::SystemDesign => "system design",
            InterviewType::PlaysWellWithOthers => "plays well with others",
            InterviewType::Ownership => "ownership",
        }
    }

    /// 1-based; 0 is reserved for phone interviews.
    pub fn rank(self) -> i64 {
        match self {
            InterviewType::ProblemSolving => 1,
            InterviewType::SystemDesign => 2,
            InterviewType::PlaysWellWithOthers => 3,
            InterviewType::Ownership => 4,
        }
    }

    pub fn classify(title: &str) -> Option<InterviewType> {
        let title = title.to_lowercase();
        Self::ORDERED
            .into_iter()
            .find(|t| title.contains(t.needle()))
    }
}

const PHONE_RANK: i64 = 0;

pub fn is_phone(record: &FeedbackRecord) -> bool {
    record.title.to_lowercase().contains("phone")
}

/// Primary sort key of a record.
pub fn sort_key(record: &FeedbackRecord) -> i64 {
    if is_phone(record) {
        return PHONE_RANK;
    }
    if let Some(kind) = InterviewType::classify(&record.title) {
        return kind.rank();
    }
    record.completed_at.unwrap_or(i64::MAX)
}

/// Sorts in place. Phone screens lead even when another record's timestamp
/// key is zero or negative. Ties fall back to completion time and then record
/// id, which makes the result independent of API arrival order.
pub fn order_feedback(records: &mut [FeedbackRecord]) {
    records.sort_by(|a, b| {
        is_phone(b)
            .cmp(&is_phone(a))
            .then_with(|| sort_key(a).cmp(&sort_key(b)))
            .then_with(|| a.completed_at.cmp(&b.completed_at))
            .then_with(|| a.id.cmp(&b.id))
    });
}

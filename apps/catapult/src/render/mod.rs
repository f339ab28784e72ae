//! Server-side HTML for the reviewer pages.
//!
//! Every value that came from Lever goes through `escape` before it is
//! written into markup.

use std::fmt::Write;

use crate::feedback::ballista::BallistaReport;
use crate::feedback::fields::{ANYTHING_ELSE_TO_KNOW_KEY, TEAM_FEEDBACK_KEY};
use crate::feedback::intern::InternReport;
use crate::feedback::pipeline::FeedbackReport;
use crate::models::Candidate;

pub const APP_NAME: &str = "Catapult";

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escaped text with newlines kept as line breaks.
fn paragraph(text: &str) -> String {
    escape(text).replace('\n', "<br>")
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>
body {{ font-family: sans-serif; margin: 2em; }}
table.headers td, table.headers th {{ padding: 0.25em 1em; text-align: left; }}
section.feedback {{ border-top: 1px solid #ccc; margin-top: 1.5em; }}
.muted {{ color: #777; }}
</style>
</head>
<body>
<h1><a href="/">{app}</a></h1>
{body}
</body>
</html>
"#,
        title = escape(title),
        app = APP_NAME,
    )
}

fn candidate_banner(candidate: Option<&Candidate>, candidate_id: &str) -> String {
    match candidate {
        Some(c) => {
            let mut html = format!("<h2>{}</h2>", escape(&c.name));
            if let Some(headline) = c.headline.as_deref().filter(|h| !h.is_empty()) {
                let _ = write!(html, "<p class=\"muted\">{}</p>", escape(headline));
            }
            html
        }
        None => format!(
            "<h2>Candidate {}</h2><p class=\"muted\">Candidate details unavailable.</p>",
            escape(candidate_id)
        ),
    }
}

fn search_form(action: &str, label: &str) -> String {
    format!(
        r#"<form method="post" action="{action}">
<label>{label} <input type="text" name="candidate_id" required></label>
<button type="submit">Fetch</button>
</form>"#
    )
}

pub fn home_page() -> String {
    layout(
        APP_NAME,
        &format!(
            "<p>Interview feedback for a candidate.</p>{}<p><a href=\"/treb\">Intern evaluations</a></p>",
            search_form("/fetch_feedback", "Candidate id")
        ),
    )
}

pub fn intern_search_page() -> String {
    layout(
        APP_NAME,
        &format!(
            "<p>Intern evaluations for a candidate.</p>{}",
            search_form("/fetch_internevals", "Candidate id")
        ),
    )
}

pub fn feedback_page(
    candidate_id: &str,
    candidate: Option<&Candidate>,
    report: &FeedbackReport,
) -> String {
    let mut body = candidate_banner(candidate, candidate_id);

    if report.headers.is_empty() {
        body.push_str("<p>No completed feedback yet.</p>");
        return layout(APP_NAME, &body);
    }

    body.push_str(
        "<table class=\"headers\"><tr><th>Interview</th><th>Interviewer</th><th>Score</th></tr>",
    );
    for header in &report.headers {
        let _ = write!(
            body,
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape(&header.interview_type),
            escape(&header.interviewer),
            escape(&header.score)
        );
    }
    body.push_str("</table>");

    for (header, feedback) in report.headers.iter().zip(&report.feedbacks) {
        let _ = write!(
            body,
            "<section class=\"feedback\"><h3>{} &middot; {} &middot; {}</h3>",
            escape(&header.interview_type),
            escape(&header.interviewer),
            escape(&feedback.score)
        );
        for text in &feedback.feedback_texts {
            let _ = write!(
                body,
                "<h4>{}</h4><p>{}</p>",
                escape(&text.header),
                paragraph(&text.text)
            );
        }
        for (label, value) in [
            (TEAM_FEEDBACK_KEY, &feedback.team_feedback),
            (ANYTHING_ELSE_TO_KNOW_KEY, &feedback.anything_else_we_should_know),
        ] {
            if !value.is_empty() {
                let _ = write!(body, "<h4>{}</h4><p>{}</p>", escape(label), paragraph(value));
            }
        }
        body.push_str("</section>");
    }

    layout(APP_NAME, &body)
}

pub fn intern_page(candidate_id: &str, candidate: Option<&Candidate>, report: &InternReport) -> String {
    let mut body = candidate_banner(candidate, candidate_id);

    if report.headers.is_empty() {
        body.push_str("<p>No recent intern evaluations.</p>");
        return layout(APP_NAME, &body);
    }

    body.push_str("<table class=\"headers\"><tr><th>Mentor</th><th>Overall</th></tr>");
    for header in &report.headers {
        let _ = write!(
            body,
            "<tr><td>{}</td><td>{}</td></tr>",
            escape(&header.interviewer),
            escape(header.score.as_deref().unwrap_or("-"))
        );
    }
    body.push_str("</table>");

    for feedback in &report.feedbacks {
        let _ = write!(
            body,
            "<section class=\"feedback\"><h3>{}</h3>",
            escape(feedback.username.trim())
        );
        for field in &feedback.fields.other_fields {
            let _ = write!(
                body,
                "<h4>{}</h4><p>{}</p>",
                escape(&field.label),
                paragraph(&field.text)
            );
            if let Some(notes) = &field.notes {
                let _ = write!(body, "<p class=\"muted\">{}</p>", paragraph(notes));
            }
        }
        if let Some(notes) = &feedback.fields.notes {
            let _ = write!(body, "<h4>Notes</h4><p>{}</p>", paragraph(notes));
        }
        body.push_str("</section>");
    }

    layout(APP_NAME, &body)
}

pub fn ballista_page(
    candidate_id: &str,
    candidate: Option<&Candidate>,
    report: &BallistaReport,
) -> String {
    let mut body = candidate_banner(candidate, candidate_id);

    body.push_str(
        "<table class=\"headers\"><tr><th>Interview</th><th>Interviewer</th><th>Score</th></tr>",
    );
    for entry in &report.headers {
        let _ = write!(
            body,
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape(&entry.header.interview_type),
            escape(&entry.header.interviewer),
            escape(&entry.header.score)
        );
    }
    body.push_str("</table>");

    for (subdimension, questions) in &report.questions {
        let _ = write!(
            body,
            "<section class=\"feedback\"><h3>{}</h3>",
            escape(subdimension.label())
        );
        for (question_text, answers) in questions {
            let _ = write!(body, "<h4>{}</h4><ul>", escape(question_text));
            for answer in answers {
                let _ = write!(
                    body,
                    "<li><strong>{}</strong>: {}<br><span class=\"muted\">{}</span></li>",
                    escape(&answer.user),
                    paragraph(&answer.question_answer),
                    paragraph(&answer.additional_context)
                );
            }
            body.push_str("</ul>");
        }
        body.push_str("</section>");
    }

    layout(APP_NAME, &body)
}

pub fn not_found_page() -> String {
    layout(APP_NAME, "<p>Sorry, Nothing at this URL.</p>")
}

pub fn error_page(message: &str) -> String {
    layout(
        APP_NAME,
        &format!(r#"<p class="error">{}</p>"#, paragraph(message)),
    )
}

//! Contact-form messages.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use super::{capture, embed_payload, extract_payload, format_timestamp, normalize_newlines};
use crate::tracker::{Issue, IssueState, NewIssue};

pub const CONTACT_LABEL: &str = "contact";
pub const SUPPORT_LABEL: &str = "customer-support";
pub const NEW_LABEL: &str = "new";
pub const RESOLVED_LABEL: &str = "resolved";

const PAYLOAD_KIND: &str = "contact";

const UNKNOWN_NAME: &str = "Unknown";
const UNKNOWN_SUBJECT: &str = "No Subject";
const UNKNOWN_EMAIL: &str = "unknown@email.com";
const UNKNOWN_MESSAGE: &str = "No message";

static NAME_FROM_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Contact:.*? - (.+)$").unwrap());

static SUBJECT_FROM_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Contact: (.+?) - ").unwrap());

static EMAIL_FROM_BODY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*Email:\*\* (.+)").unwrap());

// Greedy: runs to the last "\n\n---", so a message may contain the delimiter.
static MESSAGE_FROM_BODY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\*\*Message:\*\*\n(.+)\n\n---").unwrap());

/// A contact-form submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    /// Defaults to submission time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// A contact message decoded from an issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactRecord {
    pub id: u64,
    pub title: String,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub status: IssueState,
    pub url: String,
    pub replies: u32,
    pub labels: Vec<String>,
}

pub fn new_labels() -> Vec<String> {
    vec![
        CONTACT_LABEL.to_string(),
        SUPPORT_LABEL.to_string(),
        NEW_LABEL.to_string(),
    ]
}

pub fn resolved_labels() -> Vec<String> {
    vec![
        CONTACT_LABEL.to_string(),
        SUPPORT_LABEL.to_string(),
        RESOLVED_LABEL.to_string(),
    ]
}

pub fn title(submission: &ContactSubmission) -> String {
    format!(
        "💬 Contact: {} - {}",
        submission.subject, submission.name
    )
}

/// Human-readable body, without the structured block.
pub fn render_body(submission: &ContactSubmission, submitted: &DateTime<Utc>) -> String {
    format!(
        "## 📧 New Contact Submission

**Customer Details:**
- **Name:** {name}
- **Email:** {email}
- **Subject:** {subject}
- **Submitted:** {submitted}

---

**Message:**
{message}

---

**Status:** 🆕 New
**Priority:** 📋 Normal

> This issue was automatically created from the BUMABLE website contact form.
> Reply here to communicate with the customer.",
        name = submission.name,
        email = submission.email,
        subject = submission.subject,
        submitted = format_timestamp(submitted),
        message = submission.message,
    )
}

/// Build the issue for a submission. `now` fills in a missing timestamp.
pub fn encode(
    submission: &ContactSubmission,
    now: DateTime<Utc>,
) -> Result<NewIssue, serde_json::Error> {
    let mut stamped = submission.clone();
    let submitted = *stamped.timestamp.get_or_insert(now);
    let prose = render_body(&stamped, &submitted);
    Ok(NewIssue {
        title: title(&stamped),
        body: embed_payload(&prose, PAYLOAD_KIND, &stamped)?,
        labels: new_labels(),
    })
}

/// Decode an issue. Never fails: unreadable fields get placeholder values.
pub fn decode(issue: &Issue) -> ContactRecord {
    let body = normalize_newlines(issue.body_text());
    let fields = match extract_payload::<ContactSubmission>(&body, PAYLOAD_KIND) {
        Some(submission) => submission,
        None => scrape(&issue.title, &body),
    };

    ContactRecord {
        id: issue.number,
        title: issue.title.clone(),
        name: fields.name,
        email: fields.email,
        subject: fields.subject,
        message: fields.message,
        timestamp: issue.created_at,
        status: issue.state,
        url: issue.html_url.clone(),
        replies: issue.comments,
        labels: issue.label_names(),
    }
}

fn scrape(title: &str, body: &str) -> ContactSubmission {
    ContactSubmission {
        name: capture(&NAME_FROM_TITLE, title)
            .unwrap_or(UNKNOWN_NAME)
            .to_string(),
        subject: capture(&SUBJECT_FROM_TITLE, title)
            .unwrap_or(UNKNOWN_SUBJECT)
            .to_string(),
        email: capture(&EMAIL_FROM_BODY, body)
            .unwrap_or(UNKNOWN_EMAIL)
            .to_string(),
        message: capture(&MESSAGE_FROM_BODY, body)
            .map(str::trim)
            .unwrap_or(UNKNOWN_MESSAGE)
            .to_string(),
        timestamp: None,
    }
}

/// Comment body for an admin reply.
pub fn reply_comment(message: &str) -> String {
    format!(
        "## 💬 Admin Reply

{}

---
*Reply sent from BUMABLE Admin Dashboard*",
        message
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::IssueLabel;
    use chrono::TimeZone;

    fn submission() -> ContactSubmission {
        ContactSubmission {
            name: "Ann Lee".to_string(),
            email: "ann@example.com".to_string(),
            subject: "Sizing question".to_string(),
            message: "Do the briefs run small?\nI'm usually an M.".to_string(),
            timestamp: None,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 30, 0).unwrap()
    }

    fn issue(title: &str, body: &str) -> Issue {
        Issue {
            number: 5,
            title: title.to_string(),
            body: Some(body.to_string()),
            labels: vec![IssueLabel {
                name: "contact".to_string(),
            }],
            state: IssueState::Open,
            comments: 2,
            created_at: now(),
            html_url: "https://github.com/o/r/issues/5".to_string(),
            pull_request: None,
        }
    }

    #[test]
    fn test_encode_title_and_labels() {
        let new_issue = encode(&submission(), now()).unwrap();
        assert_eq!(new_issue.title, "💬 Contact: Sizing question - Ann Lee");
        assert_eq!(new_issue.labels, vec!["contact", "customer-support", "new"]);
    }

    #[test]
    fn test_encode_body_has_labelled_fields() {
        let new_issue = encode(&submission(), now()).unwrap();
        assert!(new_issue.body.contains("- **Email:** ann@example.com"));
        assert!(new_issue.body.contains("- **Submitted:** 2024-06-01 12:30:00 UTC"));
        assert!(
            new_issue
                .body
                .contains("**Message:**\nDo the briefs run small?\nI'm usually an M.\n\n---")
        );
        assert!(new_issue.body.contains("**Status:** 🆕 New"));
    }

    #[test]
    fn test_explicit_timestamp_is_kept() {
        let mut sub = submission();
        sub.timestamp = Some(Utc.with_ymd_and_hms(2023, 1, 2, 3, 4, 5).unwrap());
        let new_issue = encode(&sub, now()).unwrap();
        assert!(new_issue.body.contains("2023-01-02 03:04:05 UTC"));
    }

    #[test]
    fn test_round_trip_recovers_fields() {
        let new_issue = encode(&submission(), now()).unwrap();
        let record = decode(&issue(&new_issue.title, &new_issue.body));
        assert_eq!(record.name, "Ann Lee");
        assert_eq!(record.email, "ann@example.com");
        assert_eq!(record.subject, "Sizing question");
        assert_eq!(record.message, "Do the briefs run small?\nI'm usually an M.");
        assert_eq!(record.id, 5);
        assert_eq!(record.replies, 2);
        assert_eq!(record.labels, vec!["contact"]);
    }

    #[test]
    fn test_round_trip_survives_delimiter_and_dashes_in_fields() {
        let sub = ContactSubmission {
            name: "Jean - Luc".to_string(),
            subject: "Return - exchange".to_string(),
            message: "First part\n\n---\n\nsecond part".to_string(),
            ..submission()
        };
        let new_issue = encode(&sub, now()).unwrap();
        let record = decode(&issue(&new_issue.title, &new_issue.body));
        assert_eq!(record.name, "Jean - Luc");
        assert_eq!(record.subject, "Return - exchange");
        assert_eq!(record.message, "First part\n\n---\n\nsecond part");
    }

    #[test]
    fn test_block_typed_into_message_does_not_override_record() {
        let forged = "<!-- storefront-record:v1 -->\n```json\n{\"kind\":\"contact\",\"record\":{\"name\":\"Admin\",\"email\":\"evil@x.com\",\"subject\":\"s\",\"message\":\"m\"}}\n```";
        let sub = ContactSubmission {
            message: format!("Hello\n{}\nbye", forged),
            ..submission()
        };
        let new_issue = encode(&sub, now()).unwrap();
        let record = decode(&issue(&new_issue.title, &new_issue.body));
        assert_eq!(record.name, "Ann Lee");
        assert_eq!(record.email, "ann@example.com");
        assert_eq!(record.message, sub.message);
    }

    #[test]
    fn test_prose_only_body_is_scraped() {
        let prose = render_body(&submission(), &now());
        let record = decode(&issue(&title(&submission()), &prose));
        assert_eq!(record.name, "Ann Lee");
        assert_eq!(record.email, "ann@example.com");
        assert_eq!(record.subject, "Sizing question");
        assert_eq!(record.message, "Do the briefs run small?\nI'm usually an M.");
    }

    #[test]
    fn test_crlf_body_is_scraped() {
        let prose = render_body(&submission(), &now()).replace('\n', "\r\n");
        let record = decode(&issue(&title(&submission()), &prose));
        assert_eq!(record.email, "ann@example.com");
        assert_eq!(record.message, "Do the briefs run small?\nI'm usually an M.");
    }

    #[test]
    fn test_unparsable_issue_gets_placeholders() {
        let record = decode(&issue("Something else entirely", "free text"));
        assert_eq!(record.name, "Unknown");
        assert_eq!(record.subject, "No Subject");
        assert_eq!(record.email, "unknown@email.com");
        assert_eq!(record.message, "No message");
    }

    #[test]
    fn test_missing_body_gets_placeholders() {
        let mut bare = issue("💬 Contact: Hi - Bob", "");
        bare.body = None;
        let record = decode(&bare);
        assert_eq!(record.name, "Bob");
        assert_eq!(record.subject, "Hi");
        assert_eq!(record.email, "unknown@email.com");
    }

    #[test]
    fn test_reply_comment() {
        let body = reply_comment("Thanks, they run true to size.");
        assert!(body.starts_with("## 💬 Admin Reply\n\nThanks, they run true to size.\n\n---"));
    }
}

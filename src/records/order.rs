//! Orders and their fulfillment labels.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::LazyLock;

use super::{capture, embed_payload, extract_payload, format_timestamp, normalize_newlines};
use crate::tracker::{Issue, IssueState, NewIssue};

pub const ORDER_LABEL: &str = "order";
pub const FULFILLMENT_LABEL: &str = "fulfillment";
pub const NEW_ORDER_LABEL: &str = "new-order";
pub const COMPLETED_LABEL: &str = "completed";

const PAYLOAD_KIND: &str = "order";
const NOT_PROVIDED: &str = "Not provided";

const UNKNOWN_ORDER_ID: &str = "Unknown";
const UNKNOWN_TOTAL: &str = "0.00";
const UNKNOWN_NAME: &str = "Unknown";
const UNKNOWN_EMAIL: &str = "unknown@email.com";

static ORDER_ID_FROM_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Order #(.+?) -").unwrap());

static TOTAL_FROM_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(\$(.+)\)$").unwrap());

static NAME_FROM_BODY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*Name:\*\* (.+)").unwrap());

static EMAIL_FROM_BODY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*Email:\*\* (.+)").unwrap());

static PHONE_FROM_BODY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*Phone:\*\* (.+)").unwrap());

static ADDRESS_FROM_BODY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*Address:\*\* (.+)").unwrap());

static ITEMS_SECTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\*\*Items:\*\*\n(.+)\n\n---").unwrap());

static ITEM_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"- \*\*(.+)\*\* \((.+)\) - Qty: (\d+) - \$(.+)").unwrap()
});

/// Fulfillment stage, encoded in the issue's labels.
///
/// `New → Pending → Processing → Shipped → Delivered | Cancelled`. The order
/// is advisory; any stage may be set from any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FulfillmentStatus {
    New,
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl FulfillmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    /// Full label set written when an order enters this stage.
    pub fn labels(&self) -> Vec<String> {
        let mut labels = vec![ORDER_LABEL.to_string(), FULFILLMENT_LABEL.to_string()];
        match self {
            Self::New => labels.push(NEW_ORDER_LABEL.to_string()),
            Self::Delivered => {
                labels.push(Self::Delivered.as_str().to_string());
                labels.push(COMPLETED_LABEL.to_string());
            }
            other => labels.push(other.as_str().to_string()),
        }
        labels
    }

    /// Terminal stages close the issue.
    pub fn closes_issue(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Stage to apply for a status update. `new` and unknown values fall
    /// back to `Pending`.
    pub fn for_update(status: &str) -> Self {
        match status.parse() {
            Ok(Self::New) | Err(_) => Self::Pending,
            Ok(stage) => stage,
        }
    }

    /// Most advanced stage named by an issue's labels.
    pub fn from_labels<S: AsRef<str>>(labels: &[S]) -> Self {
        let has = |name: &str| labels.iter().any(|l| l.as_ref() == name);
        [
            Self::Cancelled,
            Self::Delivered,
            Self::Shipped,
            Self::Processing,
            Self::Pending,
        ]
        .into_iter()
        .find(|stage| has(stage.as_str()))
        .unwrap_or(Self::New)
    }
}

impl std::fmt::Display for FulfillmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FulfillmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(Self::New),
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("Invalid fulfillment status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// One ordered product. `price` is the unit price as a decimal string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    pub size: String,
    pub quantity: u32,
    pub price: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSubmission {
    /// Caller supplied; the store does not enforce uniqueness.
    pub order_id: String,
    pub customer: Customer,
    pub items: Vec<LineItem>,
    pub total: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    pub id: u64,
    pub order_id: String,
    pub title: String,
    pub customer: Customer,
    pub items: Vec<LineItem>,
    pub total: String,
    pub timestamp: DateTime<Utc>,
    pub fulfillment: FulfillmentStatus,
    pub status: IssueState,
    pub url: String,
    pub labels: Vec<String>,
}

pub fn title(submission: &OrderSubmission) -> String {
    format!(
        "🛍️ Order #{} - {} (${})",
        submission.order_id, submission.customer.name, submission.total
    )
}

fn or_not_provided(value: &Option<String>) -> &str {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(NOT_PROVIDED)
}

pub fn render_item(item: &LineItem) -> String {
    format!(
        "- **{}** ({}) - Qty: {} - ${}",
        item.name, item.size, item.quantity, item.price
    )
}

/// Human-readable body, without the structured block.
pub fn render_body(submission: &OrderSubmission, placed: &DateTime<Utc>) -> String {
    let items = submission
        .items
        .iter()
        .map(render_item)
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "## 🛒 New Order

**Order Details:**
- **Order ID:** {order_id}
- **Date:** {placed}
- **Total:** ${total}

**Customer:**
- **Name:** {name}
- **Email:** {email}
- **Phone:** {phone}
- **Address:** {address}

**Items:**
{items}

---

**Status:** 🆕 New Order
**Payment:** Pending
**Fulfillment:** Pending

> This order was automatically created from the BUMABLE website.",
        order_id = submission.order_id,
        placed = format_timestamp(placed),
        total = submission.total,
        name = submission.customer.name,
        email = submission.customer.email,
        phone = or_not_provided(&submission.customer.phone),
        address = or_not_provided(&submission.customer.address),
        items = items,
    )
}

/// Build the issue for an order. `now` fills in a missing timestamp.
pub fn encode(
    submission: &OrderSubmission,
    now: DateTime<Utc>,
) -> Result<NewIssue, serde_json::Error> {
    let mut stamped = submission.clone();
    let placed = *stamped.timestamp.get_or_insert(now);
    let prose = render_body(&stamped, &placed);
    Ok(NewIssue {
        title: title(&stamped),
        body: embed_payload(&prose, PAYLOAD_KIND, &stamped)?,
        labels: FulfillmentStatus::New.labels(),
    })
}

/// Decode an issue. Never fails: missing fields get placeholder values and
/// unreadable item lines are dropped.
pub fn decode(issue: &Issue) -> OrderRecord {
    let body = normalize_newlines(issue.body_text());
    let labels = issue.label_names();
    let fields = match extract_payload::<OrderSubmission>(&body, PAYLOAD_KIND) {
        Some(submission) => submission,
        None => scrape(&issue.title, &body),
    };

    OrderRecord {
        id: issue.number,
        order_id: fields.order_id,
        title: issue.title.clone(),
        customer: fields.customer,
        items: fields.items,
        total: fields.total,
        timestamp: issue.created_at,
        fulfillment: FulfillmentStatus::from_labels(labels.as_slice()),
        status: issue.state,
        url: issue.html_url.clone(),
        labels,
    }
}

fn scrape(title: &str, body: &str) -> OrderSubmission {
    let optional = |re: &Regex| {
        capture(re, body)
            .filter(|v| *v != NOT_PROVIDED)
            .map(str::to_string)
    };

    OrderSubmission {
        order_id: capture(&ORDER_ID_FROM_TITLE, title)
            .unwrap_or(UNKNOWN_ORDER_ID)
            .to_string(),
        customer: Customer {
            name: capture(&NAME_FROM_BODY, body)
                .unwrap_or(UNKNOWN_NAME)
                .to_string(),
            email: capture(&EMAIL_FROM_BODY, body)
                .unwrap_or(UNKNOWN_EMAIL)
                .to_string(),
            phone: optional(&PHONE_FROM_BODY),
            address: optional(&ADDRESS_FROM_BODY),
        },
        items: scrape_items(body),
        total: capture(&TOTAL_FROM_TITLE, title)
            .unwrap_or(UNKNOWN_TOTAL)
            .to_string(),
        timestamp: None,
    }
}

fn scrape_items(body: &str) -> Vec<LineItem> {
    let Some(section) = capture(&ITEMS_SECTION, body) else {
        return Vec::new();
    };

    section
        .lines()
        .filter(|line| line.trim().starts_with('-'))
        .filter_map(parse_item)
        .collect()
}

fn parse_item(line: &str) -> Option<LineItem> {
    let caps = ITEM_LINE.captures(line)?;
    Some(LineItem {
        name: caps[1].to_string(),
        size: caps[2].to_string(),
        quantity: caps[3].parse().ok()?,
        price: caps[4].to_string(),
    })
}

/// Comment body for a status change.
pub fn status_comment(status: &str, notes: &str) -> String {
    format!(
        "## 📋 Order Status Update

**New Status:** {}

**Notes:** {}

---
*Update from BUMABLE Admin Dashboard*",
        status.to_uppercase(),
        notes
    )
}

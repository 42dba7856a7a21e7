//! Core ticket data types.

use regex_lite::Regex;
use serde::{Deserialize, Serialize};

// ============================================================================
// Customer Identifier
// ============================================================================

/// A validated customer identifier.
///
/// The only accepted format is `CUST` followed by exactly three digits
/// (e.g. `CUST001`). Anything else is treated as absent rather than an
/// error, so a malformed identifier in a ticket never fails the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(String);

impl CustomerId {
    /// Parse a candidate string, returning `None` unless it matches
    /// `CUST` + three digits exactly.
    pub fn parse(raw: &str) -> Option<Self> {
        let rest = raw.strip_prefix("CUST")?;
        if rest.len() == 3 && rest.chars().all(|c| c.is_ascii_digit()) {
            Some(Self(raw.to_string()))
        } else {
            None
        }
    }

    /// Scan free-form ticket text for the first valid customer identifier.
    ///
    /// Identifiers typically appear after phrases like "Customer ID:" or
    /// "Customer:", but the format itself is unambiguous enough to match
    /// anywhere in the text.
    pub fn extract(text: &str) -> Option<Self> {
        // The pattern is fixed, so compilation cannot fail.
        let re = Regex::new(r"\bCUST[0-9]{3}\b").expect("valid pattern");
        re.find(text).map(|m| Self(m.as_str().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CustomerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Classification
// ============================================================================

/// Ticket category as determined by the classification provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Billing,
    Technical,
    Account,
    GeneralInquiry,
    Complaint,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Billing => "billing",
            Self::Technical => "technical",
            Self::Account => "account",
            Self::GeneralInquiry => "general_inquiry",
            Self::Complaint => "complaint",
        }
    }
}

/// How quickly the ticket needs attention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Low,
    Medium,
    High,
    Critical,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

/// Customer sentiment read from the ticket text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    Neutral,
    Frustrated,
    Angry,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Neutral => "neutral",
            Self::Frustrated => "frustrated",
            Self::Angry => "angry",
        }
    }
}

/// Estimated effort to resolve the ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EstimatedEffort {
    #[serde(rename = "5min")]
    FiveMin,
    #[serde(rename = "15min")]
    FifteenMin,
    #[serde(rename = "30min")]
    ThirtyMin,
    #[serde(rename = "1hour+")]
    OneHourPlus,
}

impl EstimatedEffort {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FiveMin => "5min",
            Self::FifteenMin => "15min",
            Self::ThirtyMin => "30min",
            Self::OneHourPlus => "1hour+",
        }
    }
}

/// Classification of a support ticket.
///
/// Produced once per ticket by the classification provider and immutable
/// afterwards. Downstream stages read it but never mutate it. The two
/// `needs_*` flags are authoritative and independent of `category`:
/// a `technical` ticket with `needs_technical_help = false` skips the
/// resolution stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketClassification {
    pub category: Category,
    pub urgency: Urgency,
    pub sentiment: Sentiment,
    pub needs_customer_data: bool,
    pub needs_technical_help: bool,
    pub estimated_effort: EstimatedEffort,
}

impl TicketClassification {
    /// The safe default substituted when the classification call fails or
    /// returns unparseable output.
    ///
    /// A degraded ticket must still receive a reply, so the fallback
    /// activates no optional stages. Pure and deterministic: the same
    /// malformed input always yields this exact classification.
    pub fn fallback() -> Self {
        Self {
            category: Category::GeneralInquiry,
            urgency: Urgency::Medium,
            sentiment: Sentiment::Neutral,
            needs_customer_data: false,
            needs_technical_help: false,
            estimated_effort: EstimatedEffort::FifteenMin,
        }
    }
}

// ============================================================================
// Ticket
// ============================================================================

/// An incoming support ticket. Immutable input to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Raw ticket text as received.
    pub raw_text: String,
    /// Customer identifier, if one was supplied or extracted.
    pub customer_id: Option<CustomerId>,
}

impl Ticket {
    /// Build a ticket, extracting the customer identifier from the text
    /// when one was not supplied explicitly.
    pub fn new(raw_text: impl Into<String>, customer_id: Option<CustomerId>) -> Self {
        let raw_text = raw_text.into();
        let customer_id = customer_id.or_else(|| CustomerId::extract(&raw_text));
        Self {
            raw_text,
            customer_id,
        }
    }
}

// ============================================================================
// Stage results
// ============================================================================

/// Customer data returned by a directory lookup.
///
/// Fields are optional because the billing and history query variants
/// deliberately return partial records. `support_history` is ordered
/// oldest-first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub customer_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
    /// ISO date, e.g. "2023-04-01".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_date: Option<String>,
    /// ISO date of the most recent payment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_payment: Option<String>,
    /// Prior support interactions, oldest first.
    #[serde(default)]
    pub support_history: Vec<String>,
}

/// Output of the technical resolution stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalResolution {
    /// Remediation steps in order.
    pub steps: Vec<String>,
    /// Free-text diagnosis / summary.
    pub summary: String,
}

impl TechnicalResolution {
    /// A resolution with neither steps nor a summary carries no
    /// information and is treated as absent by the coordinator.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty() && self.summary.trim().is_empty()
    }
}

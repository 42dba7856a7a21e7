//! Routing plan types.

use serde::{Deserialize, Serialize};

use crate::ticket::CustomerId;

/// Which slice of customer data the lookup stage should fetch.
///
/// The mapping from category is total: billing and account have dedicated
/// variants, every other category falls through to `Full`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryVariant {
    /// Name, plan and payment status only.
    Billing,
    /// Name, join date and prior support interactions.
    History,
    /// The complete customer record.
    Full,
}

impl QueryVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Billing => "billing",
            Self::History => "history",
            Self::Full => "full",
        }
    }
}

/// Why a stage was left out of execution.
///
/// Skip entries are mandatory: a stage is never silently dropped from the
/// plan, it is marked skipped with one of these reasons so the trace and
/// the reply stage can act on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The classification did not request this stage.
    NotRequired,
    /// Customer data was requested but no valid identifier is present.
    /// The reply stage should ask the customer for their identifier.
    MissingIdentifier,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotRequired => "not_required",
            Self::MissingIdentifier => "missing_identifier",
        }
    }
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::NotRequired => "not required by classification",
            Self::MissingIdentifier => "customer data needed but no valid identifier present",
        };
        f.write_str(text)
    }
}

/// Parameters for a planned customer lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupRequest {
    pub customer_id: CustomerId,
    pub variant: QueryVariant,
}

/// Parameters for a planned technical resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionRequest {
    /// Set for critical-urgency tickets. Affects only how the downstream
    /// call is framed, never which stages run.
    pub priority: bool,
}

/// Decision for the customer lookup stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum LookupDecision {
    Execute(LookupRequest),
    Skip { reason: SkipReason },
}

impl LookupDecision {
    pub fn is_planned(&self) -> bool {
        matches!(self, Self::Execute(_))
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Execute(req) => format!("execute ({} query)", req.variant.as_str()),
            Self::Skip { reason } => format!("skip: {}", reason),
        }
    }
}

/// Decision for the technical resolution stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum ResolutionDecision {
    Execute(ResolutionRequest),
    Skip { reason: SkipReason },
}

impl ResolutionDecision {
    pub fn is_planned(&self) -> bool {
        matches!(self, Self::Execute(_))
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Execute(req) if req.priority => "execute (priority)".to_string(),
            Self::Execute(_) => "execute".to_string(),
            Self::Skip { reason } => format!("skip: {}", reason),
        }
    }
}

/// The routing plan for one ticket.
///
/// Ephemeral and derived: a pure function of the classification and the
/// presence of a valid customer identifier, never persisted, fully
/// reconstructible. Carries an explicit entry for every optional stage;
/// reply generation is always executed and so has no entry here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingPlan {
    pub lookup: LookupDecision,
    pub resolution: ResolutionDecision,
}

impl RoutingPlan {
    /// Number of optional stages the plan activates.
    pub fn planned_stage_count(&self) -> usize {
        usize::from(self.lookup.is_planned()) + usize::from(self.resolution.is_planned())
    }
}

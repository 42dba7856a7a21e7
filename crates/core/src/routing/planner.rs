//! The decision engine: classification in, routing plan out.

use crate::ticket::{Category, CustomerId, TicketClassification, Urgency};

use super::plan::{
    LookupDecision, LookupRequest, ResolutionDecision, ResolutionRequest, RoutingPlan, SkipReason,
};

/// Interpret a classification result, applying the fallback policy.
///
/// When the classification call failed (`None`), the safe default is
/// substituted so the ticket still flows through the pipeline and
/// receives a reply. Returns the effective classification together with
/// the plan derived from it.
pub fn interpret(
    classification: Option<TicketClassification>,
    customer_id: Option<&CustomerId>,
) -> (TicketClassification, RoutingPlan) {
    let classification = classification.unwrap_or_else(TicketClassification::fallback);
    let plan = plan(&classification, customer_id);
    (classification, plan)
}

/// Compute the routing plan for a ticket. Pure: no I/O, no hidden state.
///
/// Rules, in priority order:
/// 1. Customer lookup runs iff `needs_customer_data` and a valid
///    identifier is present; a data request without an identifier becomes
///    an explicit missing-identifier skip, not a silent drop.
/// 2. The lookup's query variant follows the category: billing and
///    account get their dedicated variants, everything else the full
///    record.
/// 3. Technical resolution runs iff `needs_technical_help`, independent
///    of the lookup.
/// 4. Critical urgency adds a priority marker to the resolution request;
///    the marker never changes which stages run.
pub fn plan(
    classification: &TicketClassification,
    customer_id: Option<&CustomerId>,
) -> RoutingPlan {
    let lookup = match (classification.needs_customer_data, customer_id) {
        (true, Some(id)) => LookupDecision::Execute(LookupRequest {
            customer_id: id.clone(),
            variant: query_variant(classification.category),
        }),
        (true, None) => LookupDecision::Skip {
            reason: SkipReason::MissingIdentifier,
        },
        (false, _) => LookupDecision::Skip {
            reason: SkipReason::NotRequired,
        },
    };

    let resolution = if classification.needs_technical_help {
        ResolutionDecision::Execute(ResolutionRequest {
            priority: classification.urgency == Urgency::Critical,
        })
    } else {
        ResolutionDecision::Skip {
            reason: SkipReason::NotRequired,
        }
    };

    RoutingPlan { lookup, resolution }
}

/// Query variant for a category. Total: no category is left unmapped.
pub fn query_variant(category: Category) -> super::QueryVariant {
    use super::QueryVariant;
    match category {
        Category::Billing => QueryVariant::Billing,
        Category::Account => QueryVariant::History,
        Category::Technical | Category::GeneralInquiry | Category::Complaint => QueryVariant::Full,
    }
}

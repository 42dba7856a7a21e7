//! Routing - the orchestration decision engine.
//!
//! Interprets a ticket's classification and derives a plan for which
//! optional stages (customer lookup, technical resolution) run, with
//! what parameters, and explicit skip reasons for everything that does
//! not. The plan is a pure function of the classification plus the
//! presence of a valid customer identifier; execution order and
//! degradation are handled by the orchestrator, not here.

mod plan;
mod planner;

pub use plan::{
    LookupDecision, LookupRequest, QueryVariant, ResolutionDecision, ResolutionRequest,
    RoutingPlan, SkipReason,
};
pub use planner::{interpret, plan, query_variant};

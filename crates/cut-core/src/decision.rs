use serde::Serialize;

use crate::flags::FlagMap;
use crate::trigger::TriggerDecision;

// ---------------------------------------------------------------------------
// Event decision & payload
// ---------------------------------------------------------------------------

/// The event-level verdict plus its audit trail: one boolean per cut, in
/// application order, and the trigger outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventDecision {
    /// The single overall verdict.
    pub passed: bool,
    /// Per-cut event-level sub-results, in application order.
    pub cut_results: Vec<bool>,
    pub triggers: TriggerDecision,
}

/// Everything the engine produces for one event, consumed by external
/// reporting, plotting, and object-filtering collaborators.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionPayload {
    /// Each cut's independent per-object decisions.
    pub object_flags: FlagMap,
    /// Whether each object has survived all cuts up to and including each
    /// cut index. Monotone non-increasing per object.
    pub cumulative_flags: FlagMap,
    pub decision: EventDecision,
}

impl DecisionPayload {
    /// Whether an object survived every cut — the question an external
    /// object filter asks before keeping an object.
    pub fn passes_all(&self, collection: &str, object: usize) -> bool {
        match self.cumulative_flags.last_row(collection) {
            Some(row) => row.get(object).copied().unwrap_or(false),
            None => false,
        }
    }
}

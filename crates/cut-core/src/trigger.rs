use cut_config::TriggerConfig;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Trigger evaluation
// ---------------------------------------------------------------------------

/// Outcome of the trigger requirements for one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TriggerDecision {
    /// At least one required trigger fired (vacuously true when the
    /// required list is empty).
    pub accepted: bool,
    /// A veto trigger fired — the event is forced to fail regardless of
    /// every other cut.
    pub vetoed: bool,
}

impl TriggerDecision {
    pub fn passed(&self) -> bool {
        self.accepted && !self.vetoed
    }
}

/// Evaluate the required/veto trigger lists against the triggers that fired
/// for this event.
pub fn evaluate_triggers(config: &TriggerConfig, fired: &[String]) -> TriggerDecision {
    let accepted = config.required.is_empty()
        || config
            .required
            .iter()
            .any(|name| fired.iter().any(|f| f == name));
    let vetoed = config
        .veto
        .iter()
        .any(|name| fired.iter().any(|f| f == name));
    TriggerDecision { accepted, vetoed }
}

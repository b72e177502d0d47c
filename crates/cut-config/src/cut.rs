use cut_lang::ast::CmpOp;

// ---------------------------------------------------------------------------
// Threshold
// ---------------------------------------------------------------------------

/// How many objects must pass a cut for the event-level sub-result to hold.
/// Resolved from the flat `number_required` config field: `-1` means every
/// object in the collection, `0` marks the cut event-wide (no object
/// counting), `N >= 1` means at least N.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Threshold {
    /// At least this many objects must pass.
    AtLeast(usize),
    /// Every object in the collection must pass.
    All,
    /// The cut does not gate the event through object counting.
    EventWide,
}

impl Threshold {
    pub fn from_number_required(n: i64) -> anyhow::Result<Self> {
        match n {
            -1 => Ok(Threshold::All),
            0 => Ok(Threshold::EventWide),
            n if n >= 1 => Ok(Threshold::AtLeast(n as usize)),
            other => anyhow::bail!("number_required must be >= -1, got {other}"),
        }
    }
}

// ---------------------------------------------------------------------------
// CutSpec
// ---------------------------------------------------------------------------

/// One resolved line of the selection configuration. Expression compilation
/// happens later, in the engine's startup phase — this type only carries the
/// validated shape.
#[derive(Debug, Clone)]
pub struct CutSpec {
    /// Unique name within the selection.
    pub name: String,
    /// Target collection; hyphen-joined names (`"muons-jets"`) declare a
    /// cross-collection correlation cut; empty means event-scoped.
    pub input_collection: String,
    /// The raw cut expression.
    pub cut_string: String,
    /// Comparison applied to each leaf value against [`value`](Self::value).
    /// Ignored when the expression already yields a truth value.
    pub operator: CmpOp,
    /// Reference value for the comparison.
    pub value: f64,
    pub threshold: Threshold,
    /// Veto cut: objects *failing* the raw comparison are the ones kept.
    pub is_veto: bool,
    /// Names of earlier cuts whose cumulative object state this cut
    /// depends on (cross-talk).
    pub depends_on: Vec<String>,
}

impl CutSpec {
    /// Split the (possibly hyphen-joined) input collection into its member
    /// collection names. Empty for event-scoped cuts.
    pub fn input_members(&self) -> Vec<&str> {
        if self.input_collection.is_empty() {
            Vec::new()
        } else {
            self.input_collection.split('-').collect()
        }
    }

    /// True when this cut correlates objects from more than one collection.
    pub fn is_correlation(&self) -> bool {
        self.input_collection.contains('-')
    }

    /// True when this cut has no per-object dimension at all.
    pub fn is_event_scoped(&self) -> bool {
        self.input_collection.is_empty()
    }
}

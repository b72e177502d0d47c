use cut_core::EventDecision;

// ---------------------------------------------------------------------------
// Cut-flow report
// ---------------------------------------------------------------------------

/// Accumulates the classic cut-flow table over a run: how many events
/// survive the triggers and each cut applied sequentially.
pub struct CutFlowReport {
    selection: String,
    cut_names: Vec<String>,
    has_triggers: bool,
    total: u64,
    trigger_surviving: u64,
    surviving: Vec<u64>,
    passed: u64,
}

impl CutFlowReport {
    pub fn new(selection: &str, cut_names: &[&str], has_triggers: bool) -> Self {
        Self {
            selection: selection.to_string(),
            cut_names: cut_names.iter().map(|n| n.to_string()).collect(),
            has_triggers,
            total: 0,
            trigger_surviving: 0,
            surviving: vec![0; cut_names.len()],
            passed: 0,
        }
    }

    pub fn record(&mut self, decision: &EventDecision) {
        self.total += 1;
        let trigger_ok = decision.triggers.accepted && !decision.triggers.vetoed;
        if trigger_ok {
            self.trigger_surviving += 1;
        }
        let mut alive = trigger_ok;
        for (i, &result) in decision.cut_results.iter().enumerate() {
            alive = alive && result;
            if alive {
                self.surviving[i] += 1;
            }
        }
        if decision.passed {
            self.passed += 1;
        }
    }

    pub fn render(&self) -> String {
        let width = self
            .cut_names
            .iter()
            .map(|n| n.len())
            .chain(["trigger".len(), "passed".len()].into_iter())
            .max()
            .unwrap_or(0);

        let mut out = format!(
            "cut flow for `{}`: {} events\n",
            self.selection, self.total
        );
        if self.has_triggers {
            out.push_str(&self.line(width, "trigger", self.trigger_surviving));
        }
        for (name, &count) in self.cut_names.iter().zip(&self.surviving) {
            out.push_str(&self.line(width, name, count));
        }
        out.push_str(&self.line(width, "passed", self.passed));
        out
    }

    fn line(&self, width: usize, name: &str, count: u64) -> String {
        let percent = if self.total == 0 {
            0.0
        } else {
            100.0 * count as f64 / self.total as f64
        };
        format!("  {name:<width$}  {count:>10}  {percent:>6.2}%\n")
    }
}

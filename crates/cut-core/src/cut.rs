use cut_config::CutSpec;
use cut_lang::ExprTree;
use cut_lang::ast::CmpOp;

use crate::accessor::is_sentinel;

// ---------------------------------------------------------------------------
// Comparison
// ---------------------------------------------------------------------------

/// Apply a comparison operator to two doubles. Equality uses an epsilon so
/// that arithmetic results compare the way the source values were written.
pub fn compare(op: CmpOp, lhs: f64, rhs: f64) -> bool {
    match op {
        CmpOp::Eq => (lhs - rhs).abs() < f64::EPSILON,
        CmpOp::Ne => (lhs - rhs).abs() >= f64::EPSILON,
        CmpOp::Lt => lhs < rhs,
        CmpOp::Gt => lhs > rhs,
        CmpOp::Le => lhs <= rhs,
        CmpOp::Ge => lhs >= rhs,
    }
}

// ---------------------------------------------------------------------------
// CompiledCut
// ---------------------------------------------------------------------------

/// One cut with its expression compiled: the configuration record, the
/// arena tree, and the pre-split input member collections.
#[derive(Debug, Clone)]
pub(crate) struct CompiledCut {
    pub spec: CutSpec,
    pub tree: ExprTree,
    pub members: Vec<String>,
}

impl CompiledCut {
    /// Per-object (or per-tuple) flag for one leaf value.
    ///
    /// A sentinel leaf never passes — not even under veto, where keeping an
    /// object whose value is unknown would resurrect unmeasurable objects.
    /// When the expression already yields a truth value it is used
    /// directly; otherwise the leaf is compared against the cut's
    /// configured reference value.
    pub fn leaf_flag(&self, leaf: f64) -> bool {
        if is_sentinel(leaf) {
            return false;
        }
        let raw = if self.tree.yields_boolean() {
            leaf != 0.0
        } else {
            compare(self.spec.operator, leaf, self.spec.value)
        };
        raw != self.spec.is_veto
    }
}

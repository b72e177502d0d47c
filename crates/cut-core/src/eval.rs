use cut_lang::ast::{BinOp, UnaryOp};
use cut_lang::tree::{ExprNode, ExprTree, NodeId};

use crate::accessor::{FieldAccessor, SENTINEL, is_sentinel};
use crate::object::EventObjects;

// ---------------------------------------------------------------------------
// Tree evaluation for one object combination
// ---------------------------------------------------------------------------

/// Evaluation context binding a compiled tree to one event's collections.
pub(crate) struct EvalCx<'a> {
    pub tree: &'a ExprTree,
    pub event: &'a EventObjects,
    pub accessor: &'a FieldAccessor,
}

impl EvalCx<'_> {
    /// Evaluate the tree for one combination of objects. `indices` is
    /// aligned with `tree.collections()` — entry k selects the object of
    /// collection k. Every referenced collection must be present in the
    /// event; absence is handled by the callers (sentinel substitution or
    /// engine degradation) before evaluation.
    pub(crate) fn eval(&self, indices: &[usize]) -> f64 {
        self.eval_node(self.tree.root(), indices)
    }

    fn eval_node(&self, id: NodeId, indices: &[usize]) -> f64 {
        match self.tree.node(id) {
            ExprNode::Literal(n) => *n,
            ExprNode::Field { collection, field } => {
                let name = &self.tree.collections()[*collection];
                let objects = self
                    .event
                    .get(name)
                    .expect("referenced collection present");
                let handle = objects.get(indices[*collection]);
                self.accessor.get(objects.type_tag(), &**handle, field)
            }
            ExprNode::Unary { op, operand } => {
                let value = self.eval_node(*operand, indices);
                if is_sentinel(value) {
                    return SENTINEL;
                }
                match op {
                    UnaryOp::Neg => -value,
                    UnaryOp::Not => bool_to_leaf(value == 0.0),
                }
            }
            ExprNode::Binary { op, lhs, rhs } => {
                let left = self.eval_node(*lhs, indices);
                let right = self.eval_node(*rhs, indices);
                if is_sentinel(left) || is_sentinel(right) {
                    return SENTINEL;
                }
                eval_binary(*op, left, right)
            }
            ExprNode::Call { func, args } => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    let value = self.eval_node(*arg, indices);
                    if is_sentinel(value) {
                        return SENTINEL;
                    }
                    values.push(value);
                }
                func.apply(&values)
            }
        }
    }
}

fn eval_binary(op: BinOp, left: f64, right: f64) -> f64 {
    match op {
        BinOp::Or => bool_to_leaf(left != 0.0 || right != 0.0),
        BinOp::And => bool_to_leaf(left != 0.0 && right != 0.0),
        BinOp::Eq => bool_to_leaf((left - right).abs() < f64::EPSILON),
        BinOp::Ne => bool_to_leaf((left - right).abs() >= f64::EPSILON),
        BinOp::Lt => bool_to_leaf(left < right),
        BinOp::Gt => bool_to_leaf(left > right),
        BinOp::Le => bool_to_leaf(left <= right),
        BinOp::Ge => bool_to_leaf(left >= right),
        BinOp::Add => left + right,
        BinOp::Sub => left - right,
        BinOp::Mul => left * right,
        BinOp::Div => {
            if right == 0.0 {
                SENTINEL
            } else {
                left / right
            }
        }
        BinOp::Mod => {
            if right == 0.0 {
                SENTINEL
            } else {
                left % right
            }
        }
    }
}

fn bool_to_leaf(b: bool) -> f64 {
    if b { 1.0 } else { 0.0 }
}

/// Truth value of a leaf: non-zero and not the sentinel.
pub fn leaf_truth(value: f64) -> bool {
    !is_sentinel(value) && value != 0.0
}

// ---------------------------------------------------------------------------
// LeafValues — the lazy per-combination sequence
// ---------------------------------------------------------------------------

/// Lazy, finite sequence of leaf values for one compiled expression against
/// one event:
///
/// * no referenced collections → exactly one leaf (event scalar);
/// * one collection with n objects → n leaves, in collection order;
/// * k collections → the full cross product in row-major order (the first
///   referenced collection varies slowest);
/// * any referenced collection missing from the event → every leaf is the
///   sentinel (the sequence length treats the missing collection as size
///   one), and no error escapes.
///
/// Restartable: create a new `LeafValues` from the same tree and event to
/// iterate again; evaluation never mutates the tree.
pub struct LeafValues<'a> {
    cx: EvalCx<'a>,
    sizes: Vec<usize>,
    any_missing: bool,
    position: usize,
    total: usize,
    indices: Vec<usize>,
}

impl<'a> LeafValues<'a> {
    pub fn new(tree: &'a ExprTree, event: &'a EventObjects, accessor: &'a FieldAccessor) -> Self {
        let mut sizes = Vec::with_capacity(tree.collections().len());
        let mut any_missing = false;
        for name in tree.collections() {
            match event.get(name) {
                Some(objects) => sizes.push(objects.len()),
                None => {
                    any_missing = true;
                    sizes.push(1);
                }
            }
        }
        let total = sizes.iter().product::<usize>();
        let indices = vec![0; sizes.len()];
        Self {
            cx: EvalCx {
                tree,
                event,
                accessor,
            },
            sizes,
            any_missing,
            position: 0,
            total,
            indices,
        }
    }

    /// Number of leaves this sequence will produce.
    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Per-collection sizes, aligned with the tree's referenced collections
    /// (a missing collection counts as size one).
    pub fn shape(&self) -> &[usize] {
        &self.sizes
    }
}

impl Iterator for LeafValues<'_> {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        if self.position >= self.total {
            return None;
        }
        let value = if self.any_missing {
            SENTINEL
        } else {
            // Decode the current position: row-major, first collection
            // slowest.
            let mut rem = self.position;
            for k in (0..self.sizes.len()).rev() {
                self.indices[k] = rem % self.sizes[k];
                rem /= self.sizes[k];
            }
            self.cx.eval(&self.indices)
        };
        self.position += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total - self.position;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for LeafValues<'_> {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

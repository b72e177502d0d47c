use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Field references
// ---------------------------------------------------------------------------

/// Field reference in cut expressions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldRef {
    /// Bare identifier, e.g. `pt` — resolved against the caller's implicit
    /// collection at compile time.
    Simple(String),
    /// Qualified, e.g. `jets.pt`.
    Qualified(String, String),
}

// ---------------------------------------------------------------------------
// Operators
// ---------------------------------------------------------------------------

/// Comparison operator used by cut definitions (`operator = ">="` in the
/// selection config) and by comparison nodes inside expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

impl CmpOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            CmpOp::Eq => "==",
            CmpOp::Ne => "!=",
            CmpOp::Lt => "<",
            CmpOp::Gt => ">",
            CmpOp::Le => "<=",
            CmpOp::Ge => ">=",
        }
    }
}

impl FromStr for CmpOp {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "==" => Ok(CmpOp::Eq),
            "!=" => Ok(CmpOp::Ne),
            "<" => Ok(CmpOp::Lt),
            ">" => Ok(CmpOp::Gt),
            "<=" => Ok(CmpOp::Le),
            ">=" => Ok(CmpOp::Ge),
            other => anyhow::bail!("unknown comparison operator {other:?}"),
        }
    }
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Or,
    And,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl BinOp {
    /// True for comparison and logical operators — the ones whose result is
    /// a 1.0/0.0 truth value rather than an arithmetic quantity.
    pub fn yields_boolean(&self) -> bool {
        matches!(
            self,
            BinOp::Or
                | BinOp::And
                | BinOp::Eq
                | BinOp::Ne
                | BinOp::Lt
                | BinOp::Gt
                | BinOp::Le
                | BinOp::Ge
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Arithmetic negation, `-x`.
    Neg,
    /// Logical not, `!x`.
    Not,
}

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

/// Parser-output expression. Compilation lowers this into an arena-backed
/// [`ExprTree`](crate::tree::ExprTree).
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Number literal (integer or float).
    Number(f64),
    /// Field reference.
    Field(FieldRef),
    /// Unary operation: negation or logical not.
    Unary { op: UnaryOp, operand: Box<Expr> },
    /// Binary operation.
    BinOp {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Function call: `name(args...)`.
    FuncCall { name: String, args: Vec<Expr> },
}

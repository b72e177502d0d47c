use winnow::combinator::{alt, cut_err, opt, separated};
use winnow::error::{StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::literal;

use crate::ast::*;
use crate::parse_utils::{ident, number_literal, ws_skip};


// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Parse a complete cut/variable expression string into an [`Expr`].
///
/// The whole input must be consumed; trailing garbage is a parse error.
pub fn parse_expression(input: &str) -> anyhow::Result<Expr> {
    cut_expr
        .parse(input)
        .map_err(|e| anyhow::anyhow!("parse error: {e}"))
}

fn cut_expr(input: &mut &str) -> ModalResult<Expr> {
    ws_skip.parse_next(input)?;
    let expr = or_expr.parse_next(input)?;
    ws_skip.parse_next(input)?;
    Ok(expr)
}

// ---------------------------------------------------------------------------
// Precedence levels (lowest to highest)
// ---------------------------------------------------------------------------

/// `or_expr = and_expr { "||" and_expr }`
fn or_expr(input: &mut &str) -> ModalResult<Expr> {
    let mut left = and_expr.parse_next(input)?;
    loop {
        ws_skip.parse_next(input)?;
        if opt(literal("||")).parse_next(input)?.is_some() {
            ws_skip.parse_next(input)?;
            let right = cut_err(and_expr).parse_next(input)?;
            left = Expr::BinOp {
                op: BinOp::Or,
                left: Box::new(left),
                right: Box::new(right),
            };
        } else {
            break;
        }
    }
    Ok(left)
}

/// `and_expr = eq_expr { "&&" eq_expr }`
fn and_expr(input: &mut &str) -> ModalResult<Expr> {
    let mut left = eq_expr.parse_next(input)?;
    loop {
        ws_skip.parse_next(input)?;
        if opt(literal("&&")).parse_next(input)?.is_some() {
            ws_skip.parse_next(input)?;
            let right = cut_err(eq_expr).parse_next(input)?;
            left = Expr::BinOp {
                op: BinOp::And,
                left: Box::new(left),
                right: Box::new(right),
            };
        } else {
            break;
        }
    }
    Ok(left)
}

/// `eq_expr = rel_expr { ("==" | "!=") rel_expr }`
fn eq_expr(input: &mut &str) -> ModalResult<Expr> {
    let mut left = rel_expr.parse_next(input)?;
    loop {
        ws_skip.parse_next(input)?;
        let op = opt(alt((
            literal("==").value(BinOp::Eq),
            literal("!=").value(BinOp::Ne),
        )))
        .parse_next(input)?;
        if let Some(op) = op {
            ws_skip.parse_next(input)?;
            let right = cut_err(rel_expr).parse_next(input)?;
            left = Expr::BinOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        } else {
            break;
        }
    }
    Ok(left)
}

/// `rel_expr = add_expr { ("<=" | ">=" | "<" | ">") add_expr }`
fn rel_expr(input: &mut &str) -> ModalResult<Expr> {
    let mut left = add_expr.parse_next(input)?;
    loop {
        ws_skip.parse_next(input)?;
        let op = opt(alt((
            literal("<=").value(BinOp::Le),
            literal(">=").value(BinOp::Ge),
            literal("<").value(BinOp::Lt),
            literal(">").value(BinOp::Gt),
        )))
        .parse_next(input)?;
        if let Some(op) = op {
            ws_skip.parse_next(input)?;
            let right = cut_err(add_expr).parse_next(input)?;
            left = Expr::BinOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        } else {
            break;
        }
    }
    Ok(left)
}

/// `add_expr = mul_expr { ("+" | "-") mul_expr }`
fn add_expr(input: &mut &str) -> ModalResult<Expr> {
    let mut left = mul_expr.parse_next(input)?;
    loop {
        ws_skip.parse_next(input)?;
        let op = opt(alt((
            literal("+").value(BinOp::Add),
            literal("-").value(BinOp::Sub),
        )))
        .parse_next(input)?;
        if let Some(op) = op {
            ws_skip.parse_next(input)?;
            let right = cut_err(mul_expr).parse_next(input)?;
            left = Expr::BinOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        } else {
            break;
        }
    }
    Ok(left)
}

/// `mul_expr = unary_expr { ("*" | "/" | "%") unary_expr }`
fn mul_expr(input: &mut &str) -> ModalResult<Expr> {
    let mut left = unary_expr.parse_next(input)?;
    loop {
        ws_skip.parse_next(input)?;
        let op = opt(alt((
            literal("*").value(BinOp::Mul),
            literal("/").value(BinOp::Div),
            literal("%").value(BinOp::Mod),
        )))
        .parse_next(input)?;
        if let Some(op) = op {
            ws_skip.parse_next(input)?;
            let right = cut_err(unary_expr).parse_next(input)?;
            left = Expr::BinOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        } else {
            break;
        }
    }
    Ok(left)
}

/// `unary_expr = ("-" | "!") unary_expr | primary`
fn unary_expr(input: &mut &str) -> ModalResult<Expr> {
    let op = opt(alt((
        literal("-").value(UnaryOp::Neg),
        literal("!").value(UnaryOp::Not),
    )))
    .parse_next(input)?;
    if let Some(op) = op {
        ws_skip.parse_next(input)?;
        let inner = cut_err(unary_expr).parse_next(input)?;
        Ok(Expr::Unary {
            op,
            operand: Box::new(inner),
        })
    } else {
        primary.parse_next(input)
    }
}

// ---------------------------------------------------------------------------
// Primary
// ---------------------------------------------------------------------------

fn primary(input: &mut &str) -> ModalResult<Expr> {
    alt((
        // Number literal
        number_literal.map(Expr::Number),
        // Parenthesized expression
        paren_expr,
        // Ident-based: field ref or function call
        ident_primary,
    ))
    .context(StrContext::Expected(StrContextValue::Description(
        "expression",
    )))
    .parse_next(input)
}

fn paren_expr(input: &mut &str) -> ModalResult<Expr> {
    literal("(").parse_next(input)?;
    ws_skip.parse_next(input)?;
    let inner = cut_err(or_expr).parse_next(input)?;
    ws_skip.parse_next(input)?;
    cut_err(literal(")"))
        .context(StrContext::Expected(StrContextValue::Description(
            "closing parenthesis",
        )))
        .parse_next(input)?;
    Ok(inner)
}

/// Parse an ident-based primary: function call, qualified field reference
/// (with an arbitrarily deep dotted path), or bare field reference.
fn ident_primary(input: &mut &str) -> ModalResult<Expr> {
    let first = ident.parse_next(input)?;
    ws_skip.parse_next(input)?;

    // first( ... ) → function call
    if opt(literal("(")).parse_next(input)?.is_some() {
        return parse_func_call_args(first.to_string(), input);
    }

    // first.second[.third ...] → qualified field ref; the tail past the
    // collection segment is kept as a dotted path for the field accessor.
    let mut path: Vec<String> = Vec::new();
    loop {
        let checkpoint = *input;
        if opt(literal(".")).parse_next(input)?.is_some() {
            ws_skip.parse_next(input)?;
            match opt(ident).parse_next(input)? {
                Some(seg) => {
                    path.push(seg.to_string());
                    ws_skip.parse_next(input)?;
                }
                None => {
                    // Not a path segment — leave the dot unconsumed.
                    *input = checkpoint;
                    break;
                }
            }
        } else {
            break;
        }
    }

    if path.is_empty() {
        Ok(Expr::Field(FieldRef::Simple(first.to_string())))
    } else {
        Ok(Expr::Field(FieldRef::Qualified(
            first.to_string(),
            path.join("."),
        )))
    }
}

fn parse_func_call_args(name: String, input: &mut &str) -> ModalResult<Expr> {
    ws_skip.parse_next(input)?;

    // Empty args?
    if opt(literal(")")).parse_next(input)?.is_some() {
        return Ok(Expr::FuncCall { name, args: vec![] });
    }

    let args: Vec<Expr> =
        separated(1.., (ws_skip, or_expr).map(|(_, e)| e), literal(",")).parse_next(input)?;
    ws_skip.parse_next(input)?;
    cut_err(literal(")"))
        .context(StrContext::Expected(StrContextValue::Description(
            "closing parenthesis after arguments",
        )))
        .parse_next(input)?;

    Ok(Expr::FuncCall { name, args })
}

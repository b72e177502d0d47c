use crate::ast::{Expr, FieldRef};
use crate::error::CompileError;
use crate::functions::Func;
use crate::parser::parse_expression;
use crate::tree::{ExprNode, ExprTree, TreeBuilder};

// ---------------------------------------------------------------------------
// Public entry points
// ---------------------------------------------------------------------------

/// Compile a cut/variable expression against the declared collection names.
///
/// Pure: no event data is consulted and the result is reusable across any
/// number of events. When exactly one collection is declared, bare field
/// names resolve against it implicitly.
pub fn compile(expression: &str, declared: &[&str]) -> Result<ExprTree, CompileError> {
    let implicit = if declared.len() == 1 {
        Some(declared[0])
    } else {
        None
    };
    compile_inner(expression, declared, implicit)
}

/// Compile with an explicit implicit collection for bare field names.
///
/// `jets.pt` style references still resolve against `declared`; a bare
/// `pt` resolves to `implicit.pt`. A qualified reference whose qualifier is
/// not declared is reinterpreted as a dotted field path on `implicit`
/// (e.g. `mother.pt` on a collection without a `mother` sibling).
pub fn compile_with_default(
    expression: &str,
    declared: &[&str],
    implicit: &str,
) -> Result<ExprTree, CompileError> {
    compile_inner(expression, declared, Some(implicit))
}

fn compile_inner(
    expression: &str,
    declared: &[&str],
    implicit: Option<&str>,
) -> Result<ExprTree, CompileError> {
    let ast = parse_expression(expression).map_err(|e| CompileError::SyntaxError {
        expression: expression.to_string(),
        detail: e.to_string(),
    })?;

    let mut builder = TreeBuilder::default();
    let cx = Cx {
        expression,
        declared,
        implicit,
    };
    let root = lower(&ast, &mut builder, &cx)?;
    Ok(builder.finish(root, expression))
}

// ---------------------------------------------------------------------------
// Lowering: parsed AST -> arena tree
// ---------------------------------------------------------------------------

struct Cx<'a> {
    expression: &'a str,
    declared: &'a [&'a str],
    implicit: Option<&'a str>,
}

fn lower(expr: &Expr, builder: &mut TreeBuilder, cx: &Cx<'_>) -> Result<crate::tree::NodeId, CompileError> {
    match expr {
        Expr::Number(n) => Ok(builder.push(ExprNode::Literal(*n))),
        Expr::Field(fref) => {
            let (collection, field) = resolve_field(fref, cx)?;
            let collection = builder.intern_collection(&collection);
            Ok(builder.push(ExprNode::Field { collection, field }))
        }
        Expr::Unary { op, operand } => {
            let operand = lower(operand, builder, cx)?;
            Ok(builder.push(ExprNode::Unary { op: *op, operand }))
        }
        Expr::BinOp { op, left, right } => {
            let lhs = lower(left, builder, cx)?;
            let rhs = lower(right, builder, cx)?;
            Ok(builder.push(ExprNode::Binary { op: *op, lhs, rhs }))
        }
        Expr::FuncCall { name, args } => {
            let func = Func::by_name(name).ok_or_else(|| CompileError::SyntaxError {
                expression: cx.expression.to_string(),
                detail: format!("unknown function `{name}`"),
            })?;
            if args.len() != func.arity() {
                return Err(CompileError::ArityMismatch {
                    function: name.clone(),
                    expected: func.arity(),
                    found: args.len(),
                    expression: cx.expression.to_string(),
                });
            }
            let args = args
                .iter()
                .map(|a| lower(a, builder, cx))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(builder.push(ExprNode::Call { func, args }))
        }
    }
}

/// Resolve a field reference to (collection name, field path).
fn resolve_field(fref: &FieldRef, cx: &Cx<'_>) -> Result<(String, String), CompileError> {
    match fref {
        FieldRef::Qualified(qualifier, field) => {
            if cx.declared.contains(&qualifier.as_str()) {
                return Ok((qualifier.clone(), field.clone()));
            }
            // Undeclared qualifier: with an implicit collection the whole
            // reference is a dotted field path on it.
            if let Some(implicit) = cx.implicit {
                return Ok((implicit.to_string(), format!("{qualifier}.{field}")));
            }
            Err(CompileError::UnknownCollection {
                collection: qualifier.clone(),
                expression: cx.expression.to_string(),
            })
        }
        FieldRef::Simple(field) => match cx.implicit {
            Some(implicit) => Ok((implicit.to_string(), field.clone())),
            None => Err(CompileError::UnknownCollection {
                collection: field.clone(),
                expression: cx.expression.to_string(),
            }),
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::BinOp;

    #[test]
    fn compile_qualified_field() {
        let tree = compile("jets.pt > 50", &["jets", "muons"]).unwrap();
        assert_eq!(tree.collections(), &["jets".to_string()]);
        assert!(tree.yields_boolean());
        assert_eq!(tree.source(), "jets.pt > 50");
    }

    #[test]
    fn compile_bare_field_single_declared() {
        let tree = compile("pt * 2", &["jets"]).unwrap();
        assert_eq!(tree.collections(), &["jets".to_string()]);
        assert!(!tree.yields_boolean());
    }

    #[test]
    fn compile_bare_field_ambiguous_fails() {
        let err = compile("pt > 50", &["jets", "muons"]).unwrap_err();
        assert!(matches!(err, CompileError::UnknownCollection { .. }));
    }

    #[test]
    fn compile_with_default_dotted_path() {
        let tree = compile_with_default("mother.pt > 10", &["mcparticles"], "mcparticles").unwrap();
        assert_eq!(tree.collections(), &["mcparticles".to_string()]);
        let field = tree
            .nodes()
            .find_map(|n| match n {
                ExprNode::Field { field, .. } => Some(field.clone()),
                _ => None,
            })
            .expect("field node");
        assert_eq!(field, "mother.pt");
    }

    #[test]
    fn undeclared_qualifier_falls_back_to_implicit_path() {
        // With a single declared collection, `taus` is not an error: it is
        // a dotted field path on the implicit collection.
        let tree = compile("taus.pt > 20", &["jets"]).unwrap();
        assert_eq!(tree.collections(), &["jets".to_string()]);
    }

    #[test]
    fn compile_unknown_collection() {
        let err = compile("taus.pt > 20", &["jets", "muons"]).unwrap_err();
        assert!(matches!(
            err,
            CompileError::UnknownCollection { ref collection, .. } if collection == "taus"
        ));
    }

    #[test]
    fn compile_collections_ordered_dedup() {
        let tree = compile(
            "muons.pt + jets.pt + muons.eta",
            &["jets", "muons"],
        )
        .unwrap();
        assert_eq!(
            tree.collections(),
            &["muons".to_string(), "jets".to_string()]
        );
    }

    #[test]
    fn compile_event_scalar() {
        let tree = compile("2 * 3 + 1", &[]).unwrap();
        assert!(tree.collections().is_empty());
    }

    #[test]
    fn compile_arity_mismatch() {
        let err = compile("min(jets.pt)", &["jets"]).unwrap_err();
        match err {
            CompileError::ArityMismatch {
                function,
                expected,
                found,
                ..
            } => {
                assert_eq!(function, "min");
                assert_eq!(expected, 2);
                assert_eq!(found, 1);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn compile_unknown_function() {
        let err = compile("frobnicate(jets.pt)", &["jets"]).unwrap_err();
        assert!(matches!(err, CompileError::SyntaxError { .. }));
    }

    #[test]
    fn compile_syntax_error_reports_expression() {
        let err = compile("jets.pt >", &["jets"]).unwrap_err();
        match err {
            CompileError::SyntaxError { expression, .. } => {
                assert_eq!(expression, "jets.pt >")
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn compiled_tree_is_shareable() {
        let tree = compile("jets.pt > 50 && abs(jets.eta) < 2.4", &["jets"]).unwrap();
        let clone = tree.clone();
        assert_eq!(tree, clone);
        match tree.node(tree.root()) {
            ExprNode::Binary { op: BinOp::And, .. } => {}
            other => panic!("expected And root, got {other:?}"),
        }
    }

}

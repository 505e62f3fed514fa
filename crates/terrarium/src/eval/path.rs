//! Identifier resolution
//!
//! Only single-segment paths exist in the snippet language; every
//! lookup goes through the environment, which is seeded exclusively
//! from the scope table and the engine intrinsics. A miss here is what
//! ultimately surfaces as an unbound-identifier fault.

use crate::context::EvalContext;
use crate::environment::Environment;
use crate::error::EvalError;
use crate::value::Value;

use super::Evaluate;

impl Evaluate for syn::ExprPath {
    fn eval(&self, env: &mut Environment, _ctx: &EvalContext) -> Result<Value, EvalError> {
        if self.path.segments.len() != 1 {
            return Err(EvalError::UnsupportedExpr {
                kind: format!("qualified path `{}`", path_to_string(&self.path)),
                span: self.path.segments.first().map(|s| s.ident.span()),
            });
        }

        let segment = &self.path.segments[0];
        if !matches!(segment.arguments, syn::PathArguments::None) {
            return Err(EvalError::UnsupportedExpr {
                kind: format!("path with type arguments `{}`", segment.ident),
                span: Some(segment.ident.span()),
            });
        }

        let name = segment.ident.to_string();
        env.get(&name)
            .cloned()
            .ok_or_else(|| EvalError::UndefinedVariable {
                name,
                span: Some(segment.ident.span()),
            })
    }
}

/// Render a path as text for error messages.
pub fn path_to_string(path: &syn::Path) -> String {
    path.segments
        .iter()
        .map(|s| s.ident.to_string())
        .collect::<Vec<_>>()
        .join("::")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_found() {
        let expr: syn::ExprPath = syn::parse_quote!(x);
        let mut env = Environment::new();
        let ctx = EvalContext::default();
        env.define("x", Value::Int(42));

        assert_eq!(expr.eval(&mut env, &ctx).unwrap(), Value::Int(42));
    }

    #[test]
    fn test_lookup_missing_is_undefined() {
        let expr: syn::ExprPath = syn::parse_quote!(Unknown);
        let mut env = Environment::new();
        let ctx = EvalContext::default();

        match expr.eval(&mut env, &ctx).unwrap_err() {
            EvalError::UndefinedVariable { name, .. } => assert_eq!(name, "Unknown"),
            other => panic!("expected UndefinedVariable, got {other:?}"),
        }
    }

    #[test]
    fn test_qualified_path_unsupported() {
        let expr: syn::ExprPath = syn::parse_quote!(std::mem::drop);
        let mut env = Environment::new();
        let ctx = EvalContext::default();

        match expr.eval(&mut env, &ctx).unwrap_err() {
            EvalError::UnsupportedExpr { kind, .. } => {
                assert!(kind.contains("std::mem::drop"));
            }
            other => panic!("expected UnsupportedExpr, got {other:?}"),
        }
    }
}

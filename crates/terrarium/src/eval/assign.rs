//! Assignment expression evaluation

use crate::context::EvalContext;
use crate::environment::Environment;
use crate::error::EvalError;
use crate::value::Value;

use super::Evaluate;

/// Evaluate `target = value`. Only plain identifiers are assignable.
pub fn eval_assign(
    assign: &syn::ExprAssign,
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<Value, EvalError> {
    let value = assign.right.eval(env, ctx)?;

    match assign.left.as_ref() {
        syn::Expr::Path(path) if path.path.segments.len() == 1 => {
            let name = path.path.segments[0].ident.to_string();
            env.assign(&name, value)?;
            Ok(Value::Unit)
        }
        other => Err(EvalError::InvalidAssignTarget {
            span: Some(super::expr_span(other)),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assign_updates_binding() {
        let mut env = Environment::new();
        let ctx = EvalContext::default();
        env.define_mut("x", Value::Int(1));

        let expr: syn::Expr = syn::parse_str("x = 7").expect("parse failed");
        assert_eq!(expr.eval(&mut env, &ctx).unwrap(), Value::Unit);
        assert_eq!(env.get("x"), Some(&Value::Int(7)));
    }

    #[test]
    fn test_assign_to_index_is_invalid_target() {
        let mut env = Environment::new();
        let ctx = EvalContext::default();
        env.define_mut("xs", Value::list(vec![Value::Int(1)]));

        let expr: syn::Expr = syn::parse_str("xs[0] = 7").expect("parse failed");
        assert!(matches!(
            expr.eval(&mut env, &ctx),
            Err(EvalError::InvalidAssignTarget { .. })
        ));
    }
}

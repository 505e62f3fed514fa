//! Unary operation evaluation

use syn::spanned::Spanned;

use crate::context::EvalContext;
use crate::environment::Environment;
use crate::error::{type_name, EvalError};
use crate::value::Value;

use super::Evaluate;

impl Evaluate for syn::ExprUnary {
    fn eval(&self, env: &mut Environment, ctx: &EvalContext) -> Result<Value, EvalError> {
        let operand = self.expr.eval(env, ctx)?;
        let span = Some(self.op.span());

        match (&self.op, operand) {
            (syn::UnOp::Neg(_), Value::Int(n)) => {
                n.checked_neg()
                    .map(Value::Int)
                    .ok_or_else(|| EvalError::Arithmetic {
                        message: "negation overflow".to_string(),
                        span,
                    })
            }
            (syn::UnOp::Neg(_), Value::Float(n)) => Ok(Value::Float(-n)),
            (syn::UnOp::Not(_), Value::Bool(b)) => Ok(Value::Bool(!b)),

            (syn::UnOp::Neg(_), other) => Err(EvalError::TypeError {
                message: format!("cannot negate `{}`", type_name(&other)),
                span,
            }),
            (syn::UnOp::Not(_), other) => Err(EvalError::TypeError {
                message: format!("cannot apply `!` to `{}`", type_name(&other)),
                span,
            }),
            (_, other) => Err(EvalError::UnsupportedExpr {
                kind: format!("unary operator on `{}`", type_name(&other)),
                span,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(src: &str) -> Result<Value, EvalError> {
        let expr: syn::Expr = syn::parse_str(src).expect("parse failed");
        let mut env = Environment::new();
        let ctx = EvalContext::default();
        expr.eval(&mut env, &ctx)
    }

    #[test]
    fn test_negation() {
        assert_eq!(eval("-5").unwrap(), Value::Int(-5));
        assert_eq!(eval("-2.5").unwrap(), Value::Float(-2.5));
    }

    #[test]
    fn test_not() {
        assert_eq!(eval("!true").unwrap(), Value::Bool(false));
    }

    #[test]
    fn test_not_on_int_is_type_error() {
        assert!(matches!(eval("!3"), Err(EvalError::TypeError { .. })));
    }
}

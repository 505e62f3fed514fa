//! Binary operation evaluation
//!
//! Arithmetic is checked: overflow and division by zero are evaluation
//! errors, never panics. Mixed int/float arithmetic is rejected rather
//! than coerced.

use syn::spanned::Spanned;

use crate::context::EvalContext;
use crate::environment::Environment;
use crate::error::{type_name, EvalError};
use crate::value::Value;

use super::Evaluate;

impl Evaluate for syn::ExprBinary {
    fn eval(&self, env: &mut Environment, ctx: &EvalContext) -> Result<Value, EvalError> {
        // Short-circuit operators evaluate their own operands
        match &self.op {
            syn::BinOp::And(_) => return eval_and(&self.left, &self.right, env, ctx),
            syn::BinOp::Or(_) => return eval_or(&self.left, &self.right, env, ctx),
            _ => {}
        }

        // Compound assignment desugars: `x += y` is `x = x + y`
        if let Some(op) = desugared_op(&self.op) {
            return eval_compound_assign(self, op, env, ctx);
        }

        let left = self.left.eval(env, ctx)?;
        let right = self.right.eval(env, ctx)?;
        let span = Some(self.op.span());
        apply_binop(&self.op, left, right, span)
    }
}

fn apply_binop(
    op: &syn::BinOp,
    left: Value,
    right: Value,
    span: Option<proc_macro2::Span>,
) -> Result<Value, EvalError> {
    match op {
        syn::BinOp::Add(_) => eval_add(left, right, span),
        syn::BinOp::Sub(_) => eval_arith(left, right, span, "-", i64::checked_sub, |a, b| a - b),
        syn::BinOp::Mul(_) => eval_arith(left, right, span, "*", i64::checked_mul, |a, b| a * b),
        syn::BinOp::Div(_) => eval_div(left, right, span),
        syn::BinOp::Rem(_) => eval_rem(left, right, span),

        syn::BinOp::Eq(_) => Ok(Value::Bool(left == right)),
        syn::BinOp::Ne(_) => Ok(Value::Bool(left != right)),
        syn::BinOp::Lt(_) => eval_compare(left, right, span, "<", |o| o.is_lt()),
        syn::BinOp::Le(_) => eval_compare(left, right, span, "<=", |o| o.is_le()),
        syn::BinOp::Gt(_) => eval_compare(left, right, span, ">", |o| o.is_gt()),
        syn::BinOp::Ge(_) => eval_compare(left, right, span, ">=", |o| o.is_ge()),

        other => Err(EvalError::UnsupportedExpr {
            kind: "binary operator".to_string(),
            span: Some(other.span()),
        }),
    }
}

fn eval_and(
    left: &syn::Expr,
    right: &syn::Expr,
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<Value, EvalError> {
    match left.eval(env, ctx)? {
        Value::Bool(false) => Ok(Value::Bool(false)),
        Value::Bool(true) => expect_bool(right.eval(env, ctx)?, "&&"),
        other => Err(EvalError::TypeError {
            message: format!("expected `bool` on left of `&&`, found `{}`", type_name(&other)),
            span: None,
        }),
    }
}

fn eval_or(
    left: &syn::Expr,
    right: &syn::Expr,
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<Value, EvalError> {
    match left.eval(env, ctx)? {
        Value::Bool(true) => Ok(Value::Bool(true)),
        Value::Bool(false) => expect_bool(right.eval(env, ctx)?, "||"),
        other => Err(EvalError::TypeError {
            message: format!("expected `bool` on left of `||`, found `{}`", type_name(&other)),
            span: None,
        }),
    }
}

fn expect_bool(value: Value, op: &str) -> Result<Value, EvalError> {
    match value {
        Value::Bool(_) => Ok(value),
        other => Err(EvalError::TypeError {
            message: format!("expected `bool` on right of `{op}`, found `{}`", type_name(&other)),
            span: None,
        }),
    }
}

/// `+` also concatenates strings.
fn eval_add(
    left: Value,
    right: Value,
    span: Option<proc_macro2::Span>,
) -> Result<Value, EvalError> {
    if let (Value::String(a), Value::String(b)) = (&left, &right) {
        return Ok(Value::string(format!("{a}{b}")));
    }
    eval_arith(left, right, span, "+", i64::checked_add, |a, b| a + b)
}

fn eval_arith(
    left: Value,
    right: Value,
    span: Option<proc_macro2::Span>,
    op: &str,
    int_op: impl Fn(i64, i64) -> Option<i64>,
    float_op: impl Fn(f64, f64) -> f64,
) -> Result<Value, EvalError> {
    match (&left, &right) {
        (Value::Int(a), Value::Int(b)) => {
            int_op(*a, *b)
                .map(Value::Int)
                .ok_or_else(|| EvalError::Arithmetic {
                    message: format!("integer overflow in `{op}`"),
                    span,
                })
        }
        (Value::Float(a), Value::Float(b)) => Ok(Value::Float(float_op(*a, *b))),
        _ => Err(binop_type_error(op, &left, &right, span)),
    }
}

fn eval_div(
    left: Value,
    right: Value,
    span: Option<proc_macro2::Span>,
) -> Result<Value, EvalError> {
    if right == Value::Int(0) {
        return Err(EvalError::Arithmetic {
            message: "division by zero".to_string(),
            span,
        });
    }
    eval_arith(left, right, span, "/", i64::checked_div, |a, b| a / b)
}

fn eval_rem(
    left: Value,
    right: Value,
    span: Option<proc_macro2::Span>,
) -> Result<Value, EvalError> {
    if right == Value::Int(0) {
        return Err(EvalError::Arithmetic {
            message: "remainder by zero".to_string(),
            span,
        });
    }
    eval_arith(left, right, span, "%", i64::checked_rem, |a, b| a % b)
}

fn eval_compare(
    left: Value,
    right: Value,
    span: Option<proc_macro2::Span>,
    op: &str,
    check: impl Fn(std::cmp::Ordering) -> bool,
) -> Result<Value, EvalError> {
    let ordering = match (&left, &right) {
        (Value::Int(a), Value::Int(b)) => a.cmp(b),
        (Value::Char(a), Value::Char(b)) => a.cmp(b),
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Float(a), Value::Float(b)) => a
            .partial_cmp(b)
            .ok_or_else(|| EvalError::Arithmetic {
                message: format!("cannot order NaN with `{op}`"),
                span,
            })?,
        _ => return Err(binop_type_error(op, &left, &right, span)),
    };
    Ok(Value::Bool(check(ordering)))
}

fn binop_type_error(
    op: &str,
    left: &Value,
    right: &Value,
    span: Option<proc_macro2::Span>,
) -> EvalError {
    EvalError::TypeError {
        message: format!(
            "`{op}` not defined for `{}` and `{}`",
            type_name(left),
            type_name(right)
        ),
        span,
    }
}

/// The plain operator a compound assignment desugars to, if any.
fn desugared_op(op: &syn::BinOp) -> Option<syn::BinOp> {
    let token = proc_macro2::Span::call_site();
    match op {
        syn::BinOp::AddAssign(_) => Some(syn::BinOp::Add(syn::token::Plus(token))),
        syn::BinOp::SubAssign(_) => Some(syn::BinOp::Sub(syn::token::Minus(token))),
        syn::BinOp::MulAssign(_) => Some(syn::BinOp::Mul(syn::token::Star(token))),
        syn::BinOp::DivAssign(_) => Some(syn::BinOp::Div(syn::token::Slash(token))),
        syn::BinOp::RemAssign(_) => Some(syn::BinOp::Rem(syn::token::Percent(token))),
        _ => None,
    }
}

fn eval_compound_assign(
    binary: &syn::ExprBinary,
    op: syn::BinOp,
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<Value, EvalError> {
    let name = match binary.left.as_ref() {
        syn::Expr::Path(path) if path.path.segments.len() == 1 => {
            path.path.segments[0].ident.to_string()
        }
        _ => {
            return Err(EvalError::InvalidAssignTarget {
                span: Some(super::expr_span(&binary.left)),
            })
        }
    };

    let current = binary.left.eval(env, ctx)?;
    let operand = binary.right.eval(env, ctx)?;
    let updated = apply_binop(&op, current, operand, Some(binary.op.span()))?;
    env.assign(&name, updated)?;
    Ok(Value::Unit)
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
    fn test_int_arithmetic() {
        assert_eq!(eval("2 + 3 * 4").unwrap(), Value::Int(14));
        assert_eq!(eval("10 % 3").unwrap(), Value::Int(1));
    }

    #[test]
    fn test_float_arithmetic() {
        assert_eq!(eval("1.5 + 2.5").unwrap(), Value::Float(4.0));
    }

    #[test]
    fn test_string_concat() {
        assert_eq!(eval("\"a\" + \"b\"").unwrap(), Value::string("ab"));
    }

    #[test]
    fn test_mixed_numeric_is_type_error() {
        assert!(matches!(eval("1 + 2.0"), Err(EvalError::TypeError { .. })));
    }

    #[test]
    fn test_division_by_zero() {
        match eval("1 / 0").unwrap_err() {
            EvalError::Arithmetic { message, .. } => {
                assert!(message.contains("division by zero"));
            }
            other => panic!("expected arithmetic error, got {other:?}"),
        }
    }

    #[test]
    fn test_overflow_is_error_not_panic() {
        let max = i64::MAX;
        assert!(matches!(
            eval(&format!("{max} + 1")),
            Err(EvalError::Arithmetic { .. })
        ));
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(eval("1 < 2").unwrap(), Value::Bool(true));
        assert_eq!(eval("\"a\" < \"b\"").unwrap(), Value::Bool(true));
        assert_eq!(eval("2 >= 3").unwrap(), Value::Bool(false));
    }

    #[test]
    fn test_equality_across_types_is_false() {
        assert_eq!(eval("1 == \"1\"").unwrap(), Value::Bool(false));
    }

    #[test]
    fn test_short_circuit_and() {
        // The right side would fault; && must not evaluate it
        assert_eq!(eval("false && (1 / 0 == 0)").unwrap(), Value::Bool(false));
    }

    #[test]
    fn test_short_circuit_or() {
        assert_eq!(eval("true || (1 / 0 == 0)").unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_compound_assign() {
        let mut env = Environment::new();
        let ctx = EvalContext::default();
        env.define_mut("x", Value::Int(1));

        let expr: syn::Expr = syn::parse_str("x += 4").expect("parse failed");
        expr.eval(&mut env, &ctx).unwrap();
        assert_eq!(env.get("x"), Some(&Value::Int(5)));
    }
}

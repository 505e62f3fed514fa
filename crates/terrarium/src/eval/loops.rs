//! For loops, ranges, and the break/continue signals

use crate::context::EvalContext;
use crate::environment::Environment;
use crate::error::{type_name, EvalError};
use crate::value::Value;

use super::control::ControlFlow;
use super::if_expr::eval_block;
use super::local::bind_pattern;
use super::Evaluate;

impl Evaluate for syn::ExprForLoop {
    fn eval(&self, env: &mut Environment, ctx: &EvalContext) -> Result<Value, EvalError> {
        if self.label.is_some() {
            return Err(EvalError::UnsupportedExpr {
                kind: "labeled loop".to_string(),
                span: None,
            });
        }

        let iterable = self.expr.eval(env, ctx)?;
        let items: Vec<Value> = match &iterable {
            Value::Range(start, end) => (*start..*end).map(Value::Int).collect(),
            Value::List(items) => items.iter().cloned().collect(),
            other => {
                return Err(EvalError::TypeError {
                    message: format!("cannot iterate over `{}`", type_name(other)),
                    span: Some(super::expr_span(&self.expr)),
                });
            }
        };

        for item in items {
            if ctx.is_interrupted() {
                return Err(EvalError::Interrupted);
            }

            let mut scope = env.scope_guard();
            bind_pattern(&self.pat, item, &mut scope)?;

            match eval_block(&self.body, &mut scope, ctx) {
                Ok(_) => {}
                Err(EvalError::ControlFlow(ControlFlow::Break { value })) => {
                    return Ok(value);
                }
                Err(EvalError::ControlFlow(ControlFlow::Continue)) => {}
                Err(other) => return Err(other),
            }
        }

        Ok(Value::Unit)
    }
}

impl Evaluate for syn::ExprBreak {
    fn eval(&self, env: &mut Environment, ctx: &EvalContext) -> Result<Value, EvalError> {
        if self.label.is_some() {
            return Err(EvalError::UnsupportedExpr {
                kind: "labeled break".to_string(),
                span: None,
            });
        }
        let value = match &self.expr {
            Some(expr) => expr.eval(env, ctx)?,
            None => Value::Unit,
        };
        Err(EvalError::ControlFlow(ControlFlow::Break { value }))
    }
}

impl Evaluate for syn::ExprContinue {
    fn eval(&self, _env: &mut Environment, _ctx: &EvalContext) -> Result<Value, EvalError> {
        if self.label.is_some() {
            return Err(EvalError::UnsupportedExpr {
                kind: "labeled continue".to_string(),
                span: None,
            });
        }
        Err(EvalError::ControlFlow(ControlFlow::Continue))
    }
}

/// Evaluate a `start..end` range over ints.
pub fn eval_range(
    range: &syn::ExprRange,
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<Value, EvalError> {
    if matches!(range.limits, syn::RangeLimits::Closed(_)) {
        return Err(EvalError::UnsupportedExpr {
            kind: "inclusive range".to_string(),
            span: None,
        });
    }
    let (Some(start), Some(end)) = (&range.start, &range.end) else {
        return Err(EvalError::UnsupportedExpr {
            kind: "open-ended range".to_string(),
            span: None,
        });
    };

    let start = expect_int(start.eval(env, ctx)?, "range start")?;
    let end = expect_int(end.eval(env, ctx)?, "range end")?;
    Ok(Value::Range(start, end))
}

fn expect_int(value: Value, what: &str) -> Result<i64, EvalError> {
    value.as_int().ok_or_else(|| EvalError::TypeError {
        message: format!("{what} must be an int, found `{}`", type_name(&value)),
        span: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(src: &str) -> Result<Value, EvalError> {
        let expr: syn::Expr = syn::parse_str(&format!("{{ {src} }}")).expect("parse failed");
        let mut env = Environment::new();
        let ctx = EvalContext::default();
        expr.eval(&mut env, &ctx)
    }

    #[test]
    fn test_for_over_range() {
        let src = "let mut total = 0; for i in 0..5 { total += i; } total";
        assert_eq!(eval(src).unwrap(), Value::Int(10));
    }

    #[test]
    fn test_for_over_list() {
        let src = "let mut total = 0; for n in [2, 3, 4] { total += n; } total";
        assert_eq!(eval(src).unwrap(), Value::Int(9));
    }

    #[test]
    fn test_break_with_value() {
        let src = "for i in 0..10 { if i == 3 { break i * 100; } }";
        assert_eq!(eval(src).unwrap(), Value::Int(300));
    }

    #[test]
    fn test_continue_skips() {
        let src = "let mut total = 0; for i in 0..5 { if i % 2 == 0 { continue; } total += i; } total";
        assert_eq!(eval(src).unwrap(), Value::Int(4));
    }

    #[test]
    fn test_empty_range_never_runs() {
        let src = "let mut hits = 0; for i in 3..3 { hits += 1; } hits";
        assert_eq!(eval(src).unwrap(), Value::Int(0));
    }

    #[test]
    fn test_break_outside_loop_is_error() {
        assert!(matches!(
            eval("break"),
            Err(EvalError::ControlFlow(ControlFlow::Break { .. }))
        ));
    }

    #[test]
    fn test_iterating_non_sequence_is_type_error() {
        assert!(matches!(
            eval("for x in 5 { x; }"),
            Err(EvalError::TypeError { .. })
        ));
    }
}

//! `let` binding evaluation
//!
//! Supports identifier patterns (with optional `mut`), tuple patterns
//! of identifiers, and `_`. Anything refutable is out of the snippet
//! language.

use crate::context::EvalContext;
use crate::environment::Environment;
use crate::error::{type_name, EvalError};
use crate::value::Value;

use super::Evaluate;

/// Evaluate a `let` statement, binding into the current scope.
pub fn eval_local(
    local: &syn::Local,
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<(), EvalError> {
    let init = local.init.as_ref().ok_or_else(|| EvalError::UnsupportedExpr {
        kind: "`let` without initializer".to_string(),
        span: None,
    })?;
    if init.diverge.is_some() {
        return Err(EvalError::UnsupportedExpr {
            kind: "`let .. else`".to_string(),
            span: None,
        });
    }

    let value = init.expr.eval(env, ctx)?;
    bind_pattern(&local.pat, value, env)
}

/// Bind a value against an irrefutable pattern.
pub fn bind_pattern(
    pat: &syn::Pat,
    value: Value,
    env: &mut Environment,
) -> Result<(), EvalError> {
    match pat {
        syn::Pat::Ident(ident) => {
            let name = ident.ident.to_string();
            if ident.mutability.is_some() {
                env.define_mut(name, value);
            } else {
                env.define(name, value);
            }
            Ok(())
        }

        syn::Pat::Wild(_) => Ok(()),

        syn::Pat::Type(typed) => bind_pattern(&typed.pat, value, env),

        syn::Pat::Tuple(tuple) => {
            let items = match &value {
                Value::Tuple(items) => items.clone(),
                other => {
                    return Err(EvalError::PatternMismatch {
                        message: format!(
                            "tuple pattern cannot bind `{}`",
                            type_name(other)
                        ),
                        span: None,
                    });
                }
            };
            if items.len() != tuple.elems.len() {
                return Err(EvalError::PatternMismatch {
                    message: format!(
                        "tuple pattern of {} element(s) cannot bind a tuple of {}",
                        tuple.elems.len(),
                        items.len()
                    ),
                    span: None,
                });
            }
            for (elem, item) in tuple.elems.iter().zip(items.iter()) {
                bind_pattern(elem, item.clone(), env)?;
            }
            Ok(())
        }

        _ => Err(EvalError::UnsupportedExpr {
            kind: "pattern".to_string(),
            span: None,
        }),
    }
}

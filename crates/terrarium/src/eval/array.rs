//! List, tuple, and index evaluation

use crate::context::EvalContext;
use crate::environment::Environment;
use crate::error::{type_name, EvalError};
use crate::value::Value;

use super::Evaluate;

/// Evaluate an array literal to a list.
pub fn eval_array(
    array: &syn::ExprArray,
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<Value, EvalError> {
    let elements = array
        .elems
        .iter()
        .map(|elem| elem.eval(env, ctx))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Value::list(elements))
}

/// Evaluate a tuple literal.
pub fn eval_tuple(
    tuple: &syn::ExprTuple,
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<Value, EvalError> {
    if tuple.elems.is_empty() {
        return Ok(Value::Unit);
    }
    let elements = tuple
        .elems
        .iter()
        .map(|elem| elem.eval(env, ctx))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Value::tuple(elements))
}

/// Evaluate `sequence[index]` with bounds checking.
pub fn eval_index(
    index: &syn::ExprIndex,
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<Value, EvalError> {
    let sequence = index.expr.eval(env, ctx)?;
    let position = index.index.eval(env, ctx)?;
    let span = Some(index.bracket_token.span.join());

    let items = match &sequence {
        Value::List(items) | Value::Tuple(items) => items,
        other => {
            return Err(EvalError::TypeError {
                message: format!("cannot index `{}`", type_name(other)),
                span,
            });
        }
    };

    let i = position.as_int().ok_or_else(|| EvalError::TypeError {
        message: format!("index must be an int, found `{}`", type_name(&position)),
        span,
    })?;

    usize::try_from(i)
        .ok()
        .and_then(|i| items.get(i))
        .cloned()
        .ok_or_else(|| EvalError::Arithmetic {
            message: format!("index {i} out of bounds for length {}", items.len()),
            span,
        })
}

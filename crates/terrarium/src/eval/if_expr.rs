//! If expressions and block evaluation

use crate::context::EvalContext;
use crate::environment::Environment;
use crate::error::{type_name, EvalError};
use crate::value::Value;

use super::{eval_stmt, Evaluate};

impl Evaluate for syn::ExprIf {
    fn eval(&self, env: &mut Environment, ctx: &EvalContext) -> Result<Value, EvalError> {
        let cond = self.cond.eval(env, ctx)?;
        let cond = match cond {
            Value::Bool(b) => b,
            other => {
                return Err(EvalError::TypeError {
                    message: format!(
                        "expected `bool` in if condition, found `{}`",
                        type_name(&other)
                    ),
                    span: Some(super::expr_span(&self.cond)),
                });
            }
        };

        if cond {
            eval_block(&self.then_branch, env, ctx)
        } else if let Some((_, else_branch)) = &self.else_branch {
            match else_branch.as_ref() {
                syn::Expr::Block(block) => eval_block(&block.block, env, ctx),
                syn::Expr::If(else_if) => else_if.eval(env, ctx),
                other => other.eval(env, ctx),
            }
        } else {
            Ok(Value::Unit)
        }
    }
}

/// Evaluate a block in a fresh scope, returning its tail value.
pub fn eval_block(
    block: &syn::Block,
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<Value, EvalError> {
    let mut scope = env.scope_guard();

    let mut last = Value::Unit;
    for stmt in &block.stmts {
        last = eval_stmt(stmt, &mut scope, ctx)?;
    }
    Ok(last)
}

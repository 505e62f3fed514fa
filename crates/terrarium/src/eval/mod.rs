//! Expression evaluation
//!
//! Tree-walking interpretation of the parsed snippet. Each supported
//! expression kind implements [`Evaluate`]; the dispatcher below routes
//! to them and rejects everything outside the snippet language.

pub mod array;
pub mod assign;
pub mod binary;
pub mod call;
pub mod control;
pub mod if_expr;
pub mod literal;
pub mod local;
pub mod loops;
pub mod path;
pub mod unary;

use crate::context::EvalContext;
use crate::environment::Environment;
use crate::error::EvalError;
use crate::value::Value;

pub use control::ControlFlow;
pub use if_expr::eval_block;

/// Trait for evaluating syntax nodes to values.
pub trait Evaluate {
    /// Evaluate this node in the given environment.
    fn eval(&self, env: &mut Environment, ctx: &EvalContext) -> Result<Value, EvalError>;
}

impl Evaluate for syn::Expr {
    fn eval(&self, env: &mut Environment, ctx: &EvalContext) -> Result<Value, EvalError> {
        // Cooperative interruption, checked once per expression
        if ctx.is_interrupted() {
            return Err(EvalError::Interrupted);
        }

        match self {
            syn::Expr::Lit(expr) => expr.eval(env, ctx),
            syn::Expr::Path(expr) => expr.eval(env, ctx),
            syn::Expr::Unary(expr) => expr.eval(env, ctx),
            syn::Expr::Binary(expr) => expr.eval(env, ctx),

            syn::Expr::If(expr) => expr.eval(env, ctx),
            syn::Expr::ForLoop(expr) => expr.eval(env, ctx),
            syn::Expr::Break(expr) => expr.eval(env, ctx),
            syn::Expr::Continue(expr) => expr.eval(env, ctx),

            syn::Expr::Call(expr) => expr.eval(env, ctx),
            syn::Expr::MethodCall(expr) => expr.eval(env, ctx),
            syn::Expr::Closure(expr) => expr.eval(env, ctx),

            syn::Expr::Array(expr) => array::eval_array(expr, env, ctx),
            syn::Expr::Tuple(expr) => array::eval_tuple(expr, env, ctx),
            syn::Expr::Index(expr) => array::eval_index(expr, env, ctx),
            syn::Expr::Range(expr) => loops::eval_range(expr, env, ctx),

            syn::Expr::Assign(expr) => assign::eval_assign(expr, env, ctx),

            syn::Expr::Block(expr) => if_expr::eval_block(&expr.block, env, ctx),
            syn::Expr::Paren(expr) => expr.expr.eval(env, ctx),
            syn::Expr::Group(expr) => expr.expr.eval(env, ctx),

            _ => Err(EvalError::UnsupportedExpr {
                kind: expr_kind_name(self).to_string(),
                span: Some(expr_span(self)),
            }),
        }
    }
}

/// Evaluate a statement.
pub fn eval_stmt(
    stmt: &syn::Stmt,
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<Value, EvalError> {
    match stmt {
        // Expression without semicolon: its value is the statement's value
        syn::Stmt::Expr(expr, None) => expr.eval(env, ctx),

        // Expression with semicolon: evaluate for effect, yield unit
        syn::Stmt::Expr(expr, Some(_)) => {
            expr.eval(env, ctx)?;
            Ok(Value::Unit)
        }

        syn::Stmt::Local(local) => {
            local::eval_local(local, env, ctx)?;
            Ok(Value::Unit)
        }

        syn::Stmt::Item(_) => Err(EvalError::UnsupportedExpr {
            kind: "item declaration".to_string(),
            span: None,
        }),

        syn::Stmt::Macro(stmt_macro) => Err(EvalError::UnsupportedExpr {
            kind: format!(
                "macro invocation `{}!`",
                stmt_macro
                    .mac
                    .path
                    .segments
                    .last()
                    .map(|s| s.ident.to_string())
                    .unwrap_or_default()
            ),
            span: None,
        }),
    }
}

/// Human-readable name for an expression kind, for error messages.
fn expr_kind_name(expr: &syn::Expr) -> &'static str {
    match expr {
        syn::Expr::Async(_) => "async block",
        syn::Expr::Await(_) => "await",
        syn::Expr::Cast(_) => "cast",
        syn::Expr::Const(_) => "const block",
        syn::Expr::Field(_) => "field access",
        syn::Expr::Infer(_) => "inferred value",
        syn::Expr::Let(_) => "let guard",
        syn::Expr::Loop(_) => "bare loop",
        syn::Expr::Macro(_) => "macro invocation",
        syn::Expr::Match(_) => "match",
        syn::Expr::Reference(_) => "reference",
        syn::Expr::Repeat(_) => "array repeat",
        syn::Expr::Return(_) => "return",
        syn::Expr::Struct(_) => "struct literal",
        syn::Expr::Try(_) => "try operator",
        syn::Expr::TryBlock(_) => "try block",
        syn::Expr::Unsafe(_) => "unsafe block",
        syn::Expr::While(_) => "while loop",
        syn::Expr::Yield(_) => "yield",
        _ => "expression",
    }
}

/// Best-effort span of an expression, for error messages.
pub(crate) fn expr_span(expr: &syn::Expr) -> proc_macro2::Span {
    use quote::ToTokens;
    expr.to_token_stream()
        .into_iter()
        .next()
        .map(|t| t.span())
        .unwrap_or_else(proc_macro2::Span::call_site)
}

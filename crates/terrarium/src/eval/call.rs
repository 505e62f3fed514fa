//! Call evaluation: closures, native functions, intrinsics, methods

use std::sync::Arc;

use crate::context::EvalContext;
use crate::environment::Environment;
use crate::error::{type_name, EvalError};
use crate::intrinsics;
use crate::value::{ClosureValue, NativeFn, Value};

use super::Evaluate;

impl Evaluate for syn::ExprCall {
    fn eval(&self, env: &mut Environment, ctx: &EvalContext) -> Result<Value, EvalError> {
        let callee = self.func.eval(env, ctx)?;

        let args: Vec<Value> = self
            .args
            .iter()
            .map(|arg| arg.eval(env, ctx))
            .collect::<Result<Vec<_>, _>>()?;

        call_value(callee, args, env, ctx, Some(super::expr_span(&self.func)))
    }
}

impl Evaluate for syn::ExprMethodCall {
    fn eval(&self, env: &mut Environment, ctx: &EvalContext) -> Result<Value, EvalError> {
        let receiver = self.receiver.eval(env, ctx)?;
        let args: Vec<Value> = self
            .args
            .iter()
            .map(|arg| arg.eval(env, ctx))
            .collect::<Result<Vec<_>, _>>()?;

        let method = self.method.to_string();
        builtin_method(&method, &receiver, &args, Some(self.method.span()))
    }
}

impl Evaluate for syn::ExprClosure {
    fn eval(&self, env: &mut Environment, _ctx: &EvalContext) -> Result<Value, EvalError> {
        let mut params = Vec::with_capacity(self.inputs.len());
        for input in &self.inputs {
            match input {
                syn::Pat::Ident(ident) => params.push(ident.ident.to_string()),
                syn::Pat::Type(typed) => match typed.pat.as_ref() {
                    syn::Pat::Ident(ident) => params.push(ident.ident.to_string()),
                    _ => {
                        return Err(EvalError::UnsupportedExpr {
                            kind: "closure parameter pattern".to_string(),
                            span: None,
                        })
                    }
                },
                _ => {
                    return Err(EvalError::UnsupportedExpr {
                        kind: "closure parameter pattern".to_string(),
                        span: None,
                    })
                }
            }
        }

        Ok(Value::Closure(Arc::new(ClosureValue {
            params,
            body: Arc::new(self.body.as_ref().clone()),
            captures: Arc::new(env.capture()),
        })))
    }
}

/// Call a value as a function.
pub fn call_value(
    callee: Value,
    args: Vec<Value>,
    env: &mut Environment,
    ctx: &EvalContext,
    span: Option<proc_macro2::Span>,
) -> Result<Value, EvalError> {
    match callee {
        Value::Closure(closure) => call_closure(&closure, args, ctx),
        Value::Native(native) => call_native(&native, &args),
        Value::Intrinsic(intrinsic) => intrinsics::apply(intrinsic, args, env, ctx, span),
        other => Err(EvalError::TypeError {
            message: format!("expected a function, found `{}`", type_name(&other)),
            span,
        }),
    }
}

/// Call a snippet-defined closure.
///
/// The body runs in a fresh environment built from the capture
/// snapshot, so nothing from the call site leaks in. Captures are
/// by value: assignments inside do not propagate out.
fn call_closure(
    closure: &ClosureValue,
    args: Vec<Value>,
    ctx: &EvalContext,
) -> Result<Value, EvalError> {
    if args.len() != closure.params.len() {
        return Err(EvalError::ArityMismatch {
            name: "closure".to_string(),
            expected: closure.params.len(),
            got: args.len(),
            span: None,
        });
    }

    ctx.enter_call()?;

    let mut env = Environment::new();
    for (name, value) in closure.captures.iter() {
        env.define(name.clone(), value.clone());
    }
    env.push_frame();
    for (param, arg) in closure.params.iter().zip(args) {
        env.define(param.clone(), arg);
    }

    let result = closure.body.eval(&mut env, ctx);
    ctx.exit_call();
    result
}

fn call_native(native: &NativeFn, args: &[Value]) -> Result<Value, EvalError> {
    if native.arity >= 0 && args.len() != native.arity as usize {
        return Err(EvalError::ArityMismatch {
            name: native.name.clone(),
            expected: native.arity as usize,
            got: args.len(),
            span: None,
        });
    }

    (native.func)(args).map_err(|message| EvalError::Native {
        name: native.name.clone(),
        message,
    })
}

/// Built-in methods on receiver values. Unknown names are type errors;
/// there is no fallback to scope lookup.
fn builtin_method(
    method: &str,
    receiver: &Value,
    args: &[Value],
    span: Option<proc_macro2::Span>,
) -> Result<Value, EvalError> {
    let no_args = |result: Result<Value, EvalError>| {
        if args.is_empty() {
            result
        } else {
            Err(EvalError::ArityMismatch {
                name: method.to_string(),
                expected: 0,
                got: args.len(),
                span,
            })
        }
    };

    match (receiver, method) {
        (Value::String(s), "len") => no_args(Ok(Value::Int(s.chars().count() as i64))),
        (Value::String(s), "to_uppercase") => no_args(Ok(Value::string(s.to_uppercase()))),
        (Value::String(s), "to_lowercase") => no_args(Ok(Value::string(s.to_lowercase()))),
        (Value::String(s), "trim") => no_args(Ok(Value::string(s.trim()))),
        (Value::String(s), "is_empty") => no_args(Ok(Value::Bool(s.is_empty()))),

        (Value::List(items), "len") => no_args(Ok(Value::Int(items.len() as i64))),
        (Value::List(items), "is_empty") => no_args(Ok(Value::Bool(items.is_empty()))),

        (Value::Int(_) | Value::Float(_) | Value::Bool(_) | Value::Char(_), "to_string") => {
            no_args(Ok(Value::string(receiver.to_string())))
        }
        (Value::String(_), "to_string") => no_args(Ok(receiver.clone())),

        _ => Err(EvalError::TypeError {
            message: format!("no method `{method}` on `{}`", type_name(receiver)),
            span,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval_with_env(src: &str, env: &mut Environment) -> Result<Value, EvalError> {
        let expr: syn::Expr = syn::parse_str(&format!("{{ {src} }}")).expect("parse failed");
        let ctx = EvalContext::default();
        expr.eval(env, &ctx)
    }

    fn eval(src: &str) -> Result<Value, EvalError> {
        eval_with_env(src, &mut Environment::new())
    }

    #[test]
    fn test_closure_call() {
        let src = "let double = |n| n * 2; double(21)";
        assert_eq!(eval(src).unwrap(), Value::Int(42));
    }

    #[test]
    fn test_closure_captures_by_value() {
        let src = "let mut base = 10; let add = |n| base + n; base = 100; add(5)";
        assert_eq!(eval(src).unwrap(), Value::Int(15));
    }

    #[test]
    fn test_closure_arity_mismatch() {
        let src = "let f = |a, b| a + b; f(1)";
        assert!(matches!(eval(src), Err(EvalError::ArityMismatch { .. })));
    }

    #[test]
    fn test_native_call() {
        let mut env = Environment::new();
        env.define(
            "triple",
            Value::Native(NativeFn::new("triple", 1, |args| match args[0] {
                Value::Int(n) => Ok(Value::Int(n * 3)),
                _ => Err("expected an int".to_string()),
            })),
        );
        assert_eq!(eval_with_env("triple(14)", &mut env).unwrap(), Value::Int(42));
    }

    #[test]
    fn test_native_error_is_contained() {
        let mut env = Environment::new();
        env.define(
            "fail",
            Value::Native(NativeFn::new("fail", 0, |_| Err("nope".to_string()))),
        );
        match eval_with_env("fail()", &mut env).unwrap_err() {
            EvalError::Native { name, message } => {
                assert_eq!(name, "fail");
                assert_eq!(message, "nope");
            }
            other => panic!("expected native error, got {other:?}"),
        }
    }

    #[test]
    fn test_calling_non_callable_is_type_error() {
        let src = "let x = 5; x(1)";
        assert!(matches!(eval(src), Err(EvalError::TypeError { .. })));
    }

    #[test]
    fn test_string_methods() {
        assert_eq!(eval("\"Hi\".to_lowercase()").unwrap(), Value::string("hi"));
        assert_eq!(eval("\"  x \".trim()").unwrap(), Value::string("x"));
        assert_eq!(eval("\"abc\".len()").unwrap(), Value::Int(3));
    }

    #[test]
    fn test_list_len() {
        assert_eq!(eval("[1, 2, 3].len()").unwrap(), Value::Int(3));
    }

    #[test]
    fn test_to_string_on_int() {
        assert_eq!(eval("42.to_string()").unwrap(), Value::string("42"));
    }

    #[test]
    fn test_unknown_method_is_type_error() {
        assert!(matches!(
            eval("\"x\".reverse()"),
            Err(EvalError::TypeError { .. })
        ));
    }

    #[test]
    fn test_call_depth_limit_is_enforced() {
        use std::sync::atomic::AtomicBool;
        use std::sync::Arc;

        let ctx = EvalContext::new(4, Arc::new(AtomicBool::new(false)));
        let mut env = Environment::new();
        // Five closures, each calling the previous inside its body, so
        // the calls genuinely nest.
        let expr: syn::Expr = syn::parse_str(
            "{
                let f1 = |x| x;
                let f2 = |x| f1(x);
                let f3 = |x| f2(x);
                let f4 = |x| f3(x);
                let f5 = |x| f4(x);
                f5(1)
            }",
        )
        .expect("parse failed");
        let result = expr.eval(&mut env, &ctx);
        assert!(matches!(result, Err(EvalError::DepthExceeded { max: 4 })));
    }
}

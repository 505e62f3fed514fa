//! Literal evaluation

use crate::context::EvalContext;
use crate::environment::Environment;
use crate::error::EvalError;
use crate::value::Value;

use super::Evaluate;

impl Evaluate for syn::ExprLit {
    fn eval(&self, _env: &mut Environment, _ctx: &EvalContext) -> Result<Value, EvalError> {
        eval_lit(&self.lit)
    }
}

/// Evaluate a literal to a value.
///
/// The snippet language has one integer type and one float type, so
/// numeric suffixes are rejected rather than silently widened.
pub fn eval_lit(lit: &syn::Lit) -> Result<Value, EvalError> {
    match lit {
        syn::Lit::Str(s) => Ok(Value::string(s.value())),

        syn::Lit::Char(c) => Ok(Value::Char(c.value())),

        syn::Lit::Bool(b) => Ok(Value::Bool(b.value())),

        syn::Lit::Int(i) => {
            if !i.suffix().is_empty() {
                return Err(EvalError::UnsupportedLiteral {
                    kind: format!("integer with `{}` suffix", i.suffix()),
                    span: Some(lit.span()),
                });
            }
            i.base10_parse::<i64>()
                .map(Value::Int)
                .map_err(|_| EvalError::Arithmetic {
                    message: "integer literal out of range".to_string(),
                    span: Some(lit.span()),
                })
        }

        syn::Lit::Float(f) => {
            if !f.suffix().is_empty() {
                return Err(EvalError::UnsupportedLiteral {
                    kind: format!("float with `{}` suffix", f.suffix()),
                    span: Some(lit.span()),
                });
            }
            f.base10_parse::<f64>()
                .map(Value::Float)
                .map_err(|_| EvalError::Arithmetic {
                    message: "float literal out of range".to_string(),
                    span: Some(lit.span()),
                })
        }

        syn::Lit::ByteStr(_) => Err(EvalError::UnsupportedLiteral {
            kind: "byte string literal".to_string(),
            span: Some(lit.span()),
        }),

        syn::Lit::Byte(_) => Err(EvalError::UnsupportedLiteral {
            kind: "byte literal".to_string(),
            span: Some(lit.span()),
        }),

        _ => Err(EvalError::UnsupportedLiteral {
            kind: "literal".to_string(),
            span: Some(lit.span()),
        }),
    }
}

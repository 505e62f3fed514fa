//! Control flow signal for break/continue
//!
//! `break` and `continue` ride the error channel as
//! `EvalError::ControlFlow(..)` until the enclosing loop catches them.
//! If one escapes all loops it surfaces as a runtime fault.

use crate::value::Value;

/// Non-local jump raised by `break` or `continue`.
#[derive(Debug, Clone)]
pub enum ControlFlow {
    /// Break out of the enclosing loop, optionally with a value.
    Break {
        /// Value the loop evaluates to
        value: Value,
    },

    /// Skip to the next iteration of the enclosing loop.
    Continue,
}

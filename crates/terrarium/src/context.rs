//! Per-cycle evaluation context
//!
//! One [`EvalContext`] is created for each evaluation and threaded through
//! every `eval` call. It carries the call-depth limit, the host's
//! cooperative interrupt flag, and the output slot that `render(..)`
//! writes into.

use std::cell::{Cell, RefCell};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::EvalError;
use crate::value::Value;

/// Configuration and per-cycle state for evaluation.
#[derive(Debug)]
pub struct EvalContext {
    /// Maximum call nesting before evaluation aborts
    max_call_depth: usize,

    /// Current call nesting
    call_depth: Cell<usize>,

    /// Cooperative interrupt flag, shared with the host
    interrupt: Arc<AtomicBool>,

    /// The value most recently passed to `render(..)` this cycle
    rendered: RefCell<Option<Value>>,
}

impl EvalContext {
    /// Create a context with the given depth limit and interrupt flag.
    pub fn new(max_call_depth: usize, interrupt: Arc<AtomicBool>) -> Self {
        Self {
            max_call_depth,
            call_depth: Cell::new(0),
            interrupt,
            rendered: RefCell::new(None),
        }
    }

    /// Whether the host has requested interruption.
    pub fn is_interrupted(&self) -> bool {
        self.interrupt.load(Ordering::Relaxed)
    }

    /// Enter a call frame.
    ///
    /// # Errors
    ///
    /// `DepthExceeded` once nesting passes the configured limit.
    pub fn enter_call(&self) -> Result<(), EvalError> {
        let depth = self.call_depth.get();
        if depth >= self.max_call_depth {
            return Err(EvalError::DepthExceeded {
                max: self.max_call_depth,
            });
        }
        self.call_depth.set(depth + 1);
        Ok(())
    }

    /// Exit a call frame.
    pub fn exit_call(&self) {
        self.call_depth.set(self.call_depth.get().saturating_sub(1));
    }

    /// Record a value as the cycle's output. Last call wins.
    pub fn record_render(&self, value: Value) {
        *self.rendered.borrow_mut() = Some(value);
    }

    /// Take the recorded output, leaving the slot empty.
    pub fn take_rendered(&self) -> Option<Value> {
        self.rendered.borrow_mut().take()
    }
}

impl Default for EvalContext {
    fn default() -> Self {
        Self::new(
            crate::sandbox::Limits::default().max_call_depth,
            Arc::new(AtomicBool::new(false)),
        )
    }
}

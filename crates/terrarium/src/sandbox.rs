//! Sandboxed evaluation
//!
//! The sandbox runs a transformed program against the scope table and
//! converts every possible failure into an [`Evaluation::Failure`].
//! Nothing escapes [`Sandbox::evaluate`] as an error or a panic; this
//! is the engine's central containment contract. Only *errors* are
//! contained - user code is free to burn CPU within the interpreter
//! and depth limits, and that is out of scope here.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::context::EvalContext;
use crate::environment::Environment;
use crate::error::{type_name, Fault};
use crate::eval;
use crate::intrinsics;
use crate::node::Node;
use crate::scope::ScopeTable;
use crate::transform::Program;
use crate::value::Value;

/// Evaluation limits. These guard the interpreter itself; they are not
/// a resource sandbox.
#[derive(Debug, Clone, Copy)]
pub struct Limits {
    /// Maximum call nesting
    pub max_call_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self { max_call_depth: 256 }
    }
}

/// Result of one evaluation: exactly one variant, never both.
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    /// The program rendered this node
    Success(Node),

    /// The cycle failed; the fault describes why
    Failure(Fault),
}

impl Evaluation {
    /// Whether this is a success.
    pub fn is_success(&self) -> bool {
        matches!(self, Evaluation::Success(_))
    }
}

/// A sandboxed evaluator for one playground instance.
///
/// Holds the immutable scope table and limits; every call to
/// [`evaluate`](Self::evaluate) builds a fresh environment, so cycles
/// cannot observe each other.
#[derive(Debug, Clone)]
pub struct Sandbox {
    scope: Arc<ScopeTable>,
    limits: Limits,
    interrupt: Arc<AtomicBool>,
}

impl Sandbox {
    /// Create a sandbox over a scope table with default limits.
    pub fn new(scope: ScopeTable) -> Self {
        Self::with_limits(scope, Limits::default())
    }

    /// Create a sandbox with explicit limits.
    pub fn with_limits(scope: ScopeTable, limits: Limits) -> Self {
        Self {
            scope: Arc::new(scope),
            limits,
            interrupt: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The scope table this sandbox resolves identifiers from.
    pub fn scope(&self) -> &ScopeTable {
        &self.scope
    }

    /// Handle the host can use to interrupt a running evaluation.
    pub fn interrupt_handle(&self) -> Arc<AtomicBool> {
        self.interrupt.clone()
    }

    /// Run a program to completion and classify the outcome.
    ///
    /// Never panics and never returns an error type: faults - including
    /// panics raised by host-supplied native functions - come back as
    /// [`Evaluation::Failure`].
    pub fn evaluate(&self, program: &Program) -> Evaluation {
        let ctx = EvalContext::new(self.limits.max_call_depth, self.interrupt.clone());

        let mut env = Environment::new();
        intrinsics::install(&mut env);
        for (name, value) in self.scope.iter() {
            env.define(name, value.clone());
        }
        env.push_frame();

        trace!(bindings = self.scope.len(), "evaluating program");

        let walked = panic::catch_unwind(AssertUnwindSafe(|| {
            let mut last = Value::Unit;
            for stmt in &program.stmts {
                last = eval::eval_stmt(stmt, &mut env, &ctx)?;
            }
            Ok(last)
        }));

        let evaluation = match walked {
            Err(payload) => Evaluation::Failure(Fault::Runtime {
                message: format!("panic: {}", panic_message(&payload)),
            }),
            Ok(Err(err)) => Evaluation::Failure(Fault::from_eval(err)),
            Ok(Ok(_tail)) => match ctx.take_rendered() {
                None => Evaluation::Failure(Fault::NotRenderable {
                    message: "no render(..) call was executed".to_string(),
                }),
                Some(value) => match coerce_node(&value) {
                    Ok(node) => Evaluation::Success(node),
                    Err(message) => Evaluation::Failure(Fault::NotRenderable { message }),
                },
            },
        };

        if let Evaluation::Failure(fault) = &evaluation {
            debug!(%fault, "evaluation failed");
        }
        evaluation
    }
}

/// Coerce a rendered value to a node.
///
/// Strings, ints, floats, and chars render as text; lists render as
/// fragments of their coerced elements. Everything else is unusable.
pub(crate) fn coerce_node(value: &Value) -> Result<Node, String> {
    match value {
        Value::Node(node) => Ok(node.as_ref().clone()),
        Value::String(s) => Ok(Node::text(s.as_str())),
        Value::Int(_) | Value::Float(_) | Value::Char(_) => Ok(Node::text(value.to_string())),
        Value::List(items) => items
            .iter()
            .map(coerce_node)
            .collect::<Result<Vec<_>, _>>()
            .map(Node::Fragment),
        other => Err(format!("`{}` is not renderable", type_name(other))),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

//! Error types for transformation and evaluation

use thiserror::Error;

use crate::eval::ControlFlow;
use crate::value::Value;

/// A line/column position in snippet source (1-indexed).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// Line number (1-indexed)
    pub line: usize,

    /// Column number (1-indexed)
    pub column: usize,
}

impl Position {
    /// Create a new position.
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Failure to turn snippet source into an executable program.
///
/// Transformation never runs user code, so these are purely structural:
/// the markup rewrite rejected the source, the rewritten source did not
/// parse, or the program never produces output.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
    /// Malformed embedded markup (unterminated element, bad attribute, ...)
    #[error("TransformError: {message} at {position}")]
    Markup {
        /// What went wrong
        message: String,
        /// Where in the original source
        position: Position,
    },

    /// The rewritten source is not valid snippet syntax.
    ///
    /// Positions refer to the rewritten text, which may be shifted from
    /// the original where markup was expanded.
    #[error("TransformError: {message}{}", fmt_opt_position(.position))]
    Parse {
        /// Parser message
        message: String,
        /// Position in the rewritten source, when known
        position: Option<Position>,
    },

    /// The source never calls `render(..)`, so no output can be produced.
    #[error("TransformError: source contains no render(..) call")]
    NoOutputExpression,
}

fn fmt_opt_position(position: &Option<Position>) -> String {
    match position {
        Some(p) => format!(" at {p}"),
        None => String::new(),
    }
}

/// Internal evaluation error, carried through the tree walk.
///
/// These never cross the sandbox boundary: [`crate::sandbox::Sandbox`]
/// converts them into a [`Fault`] before returning.
#[derive(Error, Debug, Clone)]
pub enum EvalError {
    /// Identifier not present in the bound scope
    #[error("undefined identifier `{name}`")]
    UndefinedVariable {
        /// The missing name
        name: String,
        /// Where it was referenced
        span: Option<proc_macro2::Span>,
    },

    /// Value of the wrong type for an operation
    #[error("type error: {message}")]
    TypeError {
        /// Description of the mismatch
        message: String,
        /// Where it happened
        span: Option<proc_macro2::Span>,
    },

    /// Wrong number of call arguments
    #[error("`{name}` expects {expected} argument(s), got {got}")]
    ArityMismatch {
        /// Callee name
        name: String,
        /// Declared parameter count
        expected: usize,
        /// Supplied argument count
        got: usize,
        /// Call site
        span: Option<proc_macro2::Span>,
    },

    /// Arithmetic fault (overflow, division by zero)
    #[error("arithmetic error: {message}")]
    Arithmetic {
        /// Description
        message: String,
        /// Operator site
        span: Option<proc_macro2::Span>,
    },

    /// Expression kind the snippet language does not support
    #[error("unsupported expression: {kind}")]
    UnsupportedExpr {
        /// Human-readable expression kind
        kind: String,
        /// Where it appeared
        span: Option<proc_macro2::Span>,
    },

    /// Literal kind the snippet language does not support
    #[error("unsupported literal: {kind}")]
    UnsupportedLiteral {
        /// Human-readable literal kind
        kind: String,
        /// Where it appeared
        span: Option<proc_macro2::Span>,
    },

    /// Assignment to something that is not an assignable place
    #[error("invalid assignment target")]
    InvalidAssignTarget {
        /// Where it appeared
        span: Option<proc_macro2::Span>,
    },

    /// Assignment to a binding declared without `mut`
    #[error("cannot assign to immutable binding `{name}`")]
    ImmutableBinding {
        /// The binding's name
        name: String,
    },

    /// A `let` pattern that cannot bind the given value
    #[error("pattern does not match value: {message}")]
    PatternMismatch {
        /// Description of the mismatch
        message: String,
        /// Pattern site
        span: Option<proc_macro2::Span>,
    },

    /// Call nesting exceeded the configured limit
    #[error("call depth limit of {max} exceeded")]
    DepthExceeded {
        /// The configured limit
        max: usize,
    },

    /// Evaluation was interrupted by the host
    #[error("evaluation interrupted")]
    Interrupted,

    /// Error reported by a host-supplied native function
    #[error("`{name}` failed: {message}")]
    Native {
        /// The function's bound name
        name: String,
        /// The function's error message
        message: String,
    },

    /// Non-local jump (`break`/`continue`) rode the error channel past
    /// its enclosing loop.
    #[error("`break` or `continue` outside of a loop")]
    ControlFlow(ControlFlow),
}

/// Terminal failure of one edit cycle, as surfaced to the error slot.
///
/// Every fault is terminal for its cycle and non-fatal for the playground
/// instance: the next edit starts a fresh cycle. Display output carries an
/// error-class prefix so hosts can show the class without parsing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    /// The source could not be transformed into a program.
    #[error("{0}")]
    Transform(#[from] TransformError),

    /// The program referenced a name missing from the scope table.
    #[error("UnboundIdentifier: {name}")]
    UnboundIdentifier {
        /// The missing name
        name: String,
    },

    /// The program faulted while executing.
    #[error("RuntimeFault: {message}")]
    Runtime {
        /// Description of the fault
        message: String,
    },

    /// The program completed but its output cannot be rendered.
    #[error("NotRenderable: {message}")]
    NotRenderable {
        /// Why the output is unusable
        message: String,
    },
}

impl Fault {
    /// Convert an internal evaluation error into its public fault class.
    pub(crate) fn from_eval(err: EvalError) -> Self {
        match err {
            EvalError::UndefinedVariable { name, .. } => Fault::UnboundIdentifier { name },
            other => Fault::Runtime {
                message: other.to_string(),
            },
        }
    }
}

/// Human-readable name of a value's runtime type, for error messages.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Unit => "()",
        Value::Bool(_) => "bool",
        Value::Char(_) => "char",
        Value::Int(_) => "int",
        Value::Float(_) => "float",
        Value::String(_) => "string",
        Value::List(_) => "list",
        Value::Tuple(_) => "tuple",
        Value::Range(..) => "range",
        Value::Node(_) => "node",
        Value::Closure(_) => "closure",
        Value::Native(_) => "native function",
        Value::Intrinsic(_) => "intrinsic",
    }
}

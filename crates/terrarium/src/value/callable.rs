//! Callable value types: closures and host-supplied native functions

use std::sync::Arc;

use super::Value;

/// Type alias for native function pointers.
///
/// Native functions see only their arguments and report failures as plain
/// strings; the evaluator wraps those into its own error type. No `Send`
/// bound: values never cross threads.
pub type NativeFnPtr = Arc<dyn Fn(&[Value]) -> Result<Value, String>>;

/// A snippet-defined closure with by-value captures.
///
/// The capture snapshot is taken when the closure expression is
/// evaluated; later mutation of the originals is not observed.
#[derive(Debug, Clone)]
pub struct ClosureValue {
    /// Parameter names
    pub params: Vec<String>,

    /// The closure body
    pub body: Arc<syn::Expr>,

    /// Captured bindings, outermost first with shadowing already resolved
    pub captures: Arc<Vec<(String, Value)>>,
}

/// A host-supplied native function bound into the scope table.
#[derive(Clone)]
pub struct NativeFn {
    /// Bound name (for display and error messages)
    pub name: String,

    /// Expected argument count, or -1 for variadic
    pub arity: i32,

    /// The function itself
    pub func: NativeFnPtr,
}

impl NativeFn {
    /// Wrap a Rust function as a native value.
    pub fn new(
        name: impl Into<String>,
        arity: i32,
        func: impl Fn(&[Value]) -> Result<Value, String> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            arity,
            func: Arc::new(func),
        }
    }
}

impl std::fmt::Debug for NativeFn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NativeFn({})", self.name)
    }
}

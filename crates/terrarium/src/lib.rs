//! # Terrarium
//!
//! A live code playground engine. Terrarium takes user-edited snippet
//! source - expression code extended with embedded element markup -
//! rewrites the markup to plain call form, evaluates the result against
//! a caller-supplied allow-list of named values, and folds each
//! evaluation into a render state that keeps the last good output
//! visible even when a new edit fails.
//!
//! ## Architecture
//!
//! - **Transform**: markup rewrite + parse + output check ([`transform`])
//! - **Scope**: the immutable allow-list user code resolves against ([`ScopeTable`])
//! - **Sandbox**: tree-walking evaluation with total fault containment ([`Sandbox`])
//! - **Bridge**: evaluation outcomes folded into visible state ([`RenderBridge`])
//! - **Playground**: the edit loop, with stale cycles discarded by
//!   generation token ([`Playground`])
//!
//! ## Example
//!
//! ```
//! use terrarium::{Element, Playground, PlaygroundConfig, ScopeTable};
//!
//! let scope = ScopeTable::builder()
//!     .bind("Box", Element::new("div").attr("id", "b"))
//!     .build();
//!
//! let mut playground =
//!     Playground::new(PlaygroundConfig::new("render(<Box/>)", scope));
//! assert_eq!(playground.render_state().html(), Some(r#"<div id="b"/>"#));
//!
//! // A broken edit surfaces its error but keeps the last good output.
//! let state = playground.submit("render(<Unknown/>)");
//! assert_eq!(state.error(), Some("UnboundIdentifier: Unknown"));
//! assert_eq!(state.html(), Some(r#"<div id="b"/>"#));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bridge;
pub mod context;
pub mod environment;
pub mod error;
pub mod eval;
mod intrinsics;
mod markup;
pub mod node;
pub mod playground;
pub mod sandbox;
pub mod scope;
pub mod transform;
pub mod value;

// Re-export main types
pub use bridge::{Mounted, RenderBridge, RenderState, Surface};
pub use context::EvalContext;
pub use environment::{Binding, Environment, ScopeGuard};
pub use error::{EvalError, Fault, Position, TransformError};
pub use node::{Element, Node};
pub use playground::{Cycle, CycleOutcome, Playground, PlaygroundConfig, Presentation};
pub use sandbox::{Evaluation, Limits, Sandbox};
pub use scope::{ScopeTable, ScopeTableBuilder};
pub use transform::{transform, Program};
pub use value::{ClosureValue, Intrinsic, NativeFn, Value};

/// Terrarium version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }
}

//! Render bridge: folding evaluations into visible state
//!
//! The bridge owns the render state for one playground instance. A
//! success replaces the output and clears the error slot; a failure
//! fills the error slot and leaves the previous output untouched, so a
//! broken edit never destroys the last good render. An optional
//! [`Surface`] receives mounts and error updates; with `mount_output`
//! off the state is still computed but nothing is mounted.

use tracing::trace;

use crate::node::Node;
use crate::sandbox::Evaluation;

/// Host-side display region. Implementations are free to interpret
/// `mount` however they like (DOM patching, terminal output, ...);
/// theming tokens pass through opaquely in whatever the host renders.
pub trait Surface {
    /// Replace the displayed output.
    fn mount(&mut self, html: &str);

    /// Show an error message, or clear it with `None`.
    fn error(&mut self, message: Option<&str>);
}

/// A successfully presented output: the node and its serialized form.
#[derive(Debug, Clone, PartialEq)]
pub struct Mounted {
    /// The rendered node
    pub node: Node,

    /// Its HTML serialization
    pub html: String,
}

/// What an observer of the playground sees: the last good output plus
/// an optional current error. Both can be present at once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderState {
    output: Option<Mounted>,
    error: Option<String>,
}

impl RenderState {
    /// The last successfully rendered output, if any.
    pub fn output(&self) -> Option<&Mounted> {
        self.output.as_ref()
    }

    /// The HTML of the last successful render, if any.
    pub fn html(&self) -> Option<&str> {
        self.output.as_ref().map(|m| m.html.as_str())
    }

    /// The currently displayed error, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Maps evaluation outcomes onto render state and an optional surface.
pub struct RenderBridge {
    state: RenderState,
    surface: Option<Box<dyn Surface>>,
    mount_output: bool,
}

impl RenderBridge {
    /// Create a bridge with no surface.
    pub fn new(mount_output: bool) -> Self {
        Self {
            state: RenderState::default(),
            surface: None,
            mount_output,
        }
    }

    /// Create a bridge that forwards to a surface.
    pub fn with_surface(mount_output: bool, surface: Box<dyn Surface>) -> Self {
        Self {
            state: RenderState::default(),
            surface: Some(surface),
            mount_output,
        }
    }

    /// Fold an evaluation into the render state.
    ///
    /// Presenting the same success twice is idempotent: the output is
    /// not re-mounted unless the rendered node actually changed.
    pub fn present(&mut self, evaluation: Evaluation) -> &RenderState {
        match evaluation {
            Evaluation::Success(node) => {
                let unchanged = self
                    .state
                    .output
                    .as_ref()
                    .is_some_and(|mounted| mounted.node == node);

                if unchanged {
                    trace!("output unchanged, skipping mount");
                } else {
                    let html = node.to_html();
                    if self.mount_output {
                        if let Some(surface) = &mut self.surface {
                            surface.mount(&html);
                        }
                    }
                    self.state.output = Some(Mounted { node, html });
                }

                if self.state.error.take().is_some() {
                    if let Some(surface) = &mut self.surface {
                        surface.error(None);
                    }
                }
            }

            Evaluation::Failure(fault) => {
                let message = fault.to_string();
                if let Some(surface) = &mut self.surface {
                    surface.error(Some(&message));
                }
                self.state.error = Some(message);
            }
        }

        &self.state
    }

    /// The current render state.
    pub fn state(&self) -> &RenderState {
        &self.state
    }
}

impl std::fmt::Debug for RenderBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderBridge")
            .field("state", &self.state)
            .field("mount_output", &self.mount_output)
            .field("has_surface", &self.surface.is_some())
            .finish()
    }
}

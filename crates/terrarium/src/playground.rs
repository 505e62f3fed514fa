//! Edit loop controller
//!
//! One [`Playground`] per live snippet. It owns the source buffer, the
//! render bridge, and a monotonically increasing generation counter.
//! Every edit starts a cycle (transform → evaluate → present); when a
//! newer edit begins before an older cycle presents, the older outcome
//! is discarded at the presentation step by comparing generations.
//! There is no cancellation primitive and no retry: a superseded cycle
//! simply runs to completion and its outcome is dropped, and a failed
//! cycle waits for the next edit.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::bridge::{RenderBridge, RenderState, Surface};
use crate::sandbox::{Evaluation, Limits, Sandbox};
use crate::scope::ScopeTable;
use crate::transform::transform;

/// Construction-time configuration for a playground instance.
#[derive(Debug, Clone)]
pub struct PlaygroundConfig {
    /// Source shown (and evaluated) before the first edit
    pub initial_source: String,

    /// The allow-list of names user code may reference
    pub scope: ScopeTable,

    /// When false, render state is computed but nothing is mounted
    pub mount_output: bool,

    /// Evaluation limits
    pub limits: Limits,
}

impl PlaygroundConfig {
    /// Configuration with mounting on and default limits.
    pub fn new(initial_source: impl Into<String>, scope: ScopeTable) -> Self {
        Self {
            initial_source: initial_source.into(),
            scope,
            mount_output: true,
            limits: Limits::default(),
        }
    }

    /// Set whether output is mounted.
    pub fn mount_output(mut self, mount: bool) -> Self {
        self.mount_output = mount;
        self
    }

    /// Set evaluation limits.
    pub fn limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }
}

/// A live playground instance.
pub struct Playground {
    sandbox: Arc<Sandbox>,
    bridge: RenderBridge,
    source: String,
    generation: u64,
}

/// One in-flight edit cycle: a generation token plus the source
/// snapshot it was begun with. Holds its own handle to the sandbox, so
/// it can run while the playground accepts newer edits.
#[derive(Debug, Clone)]
pub struct Cycle {
    generation: u64,
    source: String,
    sandbox: Arc<Sandbox>,
}

/// The result of running a cycle, not yet presented.
#[derive(Debug, Clone)]
pub struct CycleOutcome {
    generation: u64,
    evaluation: Evaluation,
}

/// What [`Playground::present`] did with an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presentation {
    /// The outcome was current and reached the render bridge
    Presented,

    /// The outcome was superseded by a newer edit and was dropped
    Discarded,
}

impl Playground {
    /// Create a playground and run the initial cycle.
    pub fn new(config: PlaygroundConfig) -> Self {
        let bridge = RenderBridge::new(config.mount_output);
        Self::build(config, bridge)
    }

    /// Create a playground that presents onto a surface.
    pub fn with_surface(config: PlaygroundConfig, surface: Box<dyn Surface>) -> Self {
        let bridge = RenderBridge::with_surface(config.mount_output, surface);
        Self::build(config, bridge)
    }

    fn build(config: PlaygroundConfig, bridge: RenderBridge) -> Self {
        let mut playground = Self {
            sandbox: Arc::new(Sandbox::with_limits(config.scope, config.limits)),
            bridge,
            source: String::new(),
            generation: 0,
        };
        let initial = playground.begin(config.initial_source);
        let outcome = initial.run();
        playground.present(outcome);
        playground
    }

    /// Start a cycle for new source text.
    ///
    /// Overwrites the source buffer and bumps the generation, which
    /// immediately supersedes any cycle still in flight.
    pub fn begin(&mut self, source: impl Into<String>) -> Cycle {
        self.source = source.into();
        self.generation += 1;
        trace!(generation = self.generation, "edit accepted");
        Cycle {
            generation: self.generation,
            source: self.source.clone(),
            sandbox: self.sandbox.clone(),
        }
    }

    /// Present a cycle's outcome, unless a newer edit superseded it.
    pub fn present(&mut self, outcome: CycleOutcome) -> Presentation {
        if outcome.generation != self.generation {
            debug!(
                outcome = outcome.generation,
                current = self.generation,
                "discarding stale cycle"
            );
            return Presentation::Discarded;
        }
        self.bridge.present(outcome.evaluation);
        Presentation::Presented
    }

    /// Run one full edit cycle: begin, run, present.
    pub fn submit(&mut self, source: impl Into<String>) -> &RenderState {
        let cycle = self.begin(source);
        let outcome = cycle.run();
        self.present(outcome);
        self.render_state()
    }

    /// The current source buffer.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The current generation (the number of edits accepted so far).
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The current render state.
    pub fn render_state(&self) -> &RenderState {
        self.bridge.state()
    }

    /// The sandbox shared by this instance's cycles.
    pub fn sandbox(&self) -> &Sandbox {
        &self.sandbox
    }
}

impl std::fmt::Debug for Playground {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Playground")
            .field("generation", &self.generation)
            .field("source_len", &self.source.len())
            .field("state", self.bridge.state())
            .finish()
    }
}

impl Cycle {
    /// The generation token this cycle carries.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The source snapshot this cycle will evaluate.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Transform and evaluate, without presenting.
    pub fn run(self) -> CycleOutcome {
        trace!(generation = self.generation, "transforming");
        let evaluation = match transform(&self.source) {
            Err(err) => Evaluation::Failure(err.into()),
            Ok(program) => {
                trace!(generation = self.generation, "evaluating");
                self.sandbox.evaluate(&program)
            }
        };
        CycleOutcome {
            generation: self.generation,
            evaluation,
        }
    }
}

impl CycleOutcome {
    /// The generation token this outcome belongs to.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The evaluation carried by this outcome.
    pub fn evaluation(&self) -> &Evaluation {
        &self.evaluation
    }
}

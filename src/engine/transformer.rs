//! Frame transformer — runs one root block and records a frame for every
//! observable step.
//!
//! The transformer never touches the caller's previous frame: it clones it
//! into a private working frame, and every emitted frame is a clone of that
//! working frame at the moment of emission.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::engine::blocks::{BlockKind, Simulate};
use crate::engine::graph::{BlockGraph, Node};
use crate::error::SimulationError;
use crate::types::{Frame, Timeline, Value, VariableBinding};

/// Upper bound on frames for one whole simulation run.
pub const MAX_FRAMES: usize = 10_000;

/// Nesting depth for value expressions; deeper chains are treated as cycles.
const MAX_VALUE_DEPTH: usize = 64;

/// Nesting depth for statement blocks (`if` inside `repeat` inside ...).
pub const MAX_STATEMENT_DEPTH: usize = 128;

pub struct Transformer<'a> {
    graph: &'a BlockGraph,
    variables: &'a [VariableBinding],
    timeline: Timeline,
    budget: usize,
}

impl<'a> Transformer<'a> {
    pub fn new(graph: &'a BlockGraph, variables: &'a [VariableBinding], timeline: Timeline) -> Self {
        Transformer {
            graph,
            variables,
            timeline,
            budget: MAX_FRAMES,
        }
    }

    /// Limit how many frames this invocation may produce.
    pub fn with_budget(mut self, budget: usize) -> Self {
        self.budget = budget;
        self
    }

    /// Simulate a single top-level block (a pre-setup item).
    pub fn generate_frame(
        &self,
        block_id: &str,
        previous: Option<&Frame>,
    ) -> Result<Vec<Frame>, SimulationError> {
        let mut sim = self.simulation(previous);
        let Some(node) = self.graph.node(block_id) else {
            warn!(block = block_id, "no such block");
            return Ok(Vec::new());
        };
        sim.run_block(node)?;
        Ok(sim.frames)
    }

    /// Simulate a root block: one frame for the root itself, then the
    /// statements attached to its `input` in order.
    pub fn generate_input_frame(
        &self,
        block_id: &str,
        input: &str,
        previous: Option<&Frame>,
    ) -> Result<Vec<Frame>, SimulationError> {
        let mut sim = self.simulation(previous);
        let Some(node) = self.graph.node(block_id) else {
            warn!(block = block_id, "no such block");
            return Ok(Vec::new());
        };
        sim.active.insert(node.id.clone());
        node.kind.simulate(node, &mut sim)?;
        sim.run_statements(node, input)?;
        debug!(
            block = block_id,
            timeline = %self.timeline,
            frames = sim.frames.len(),
            "generated frames"
        );
        Ok(sim.frames)
    }

    fn simulation(&self, previous: Option<&Frame>) -> Simulation<'a> {
        let mut state = previous
            .cloned()
            .unwrap_or_else(|| Frame::empty(self.timeline));
        state.timeline = self.timeline;
        Simulation {
            graph: self.graph,
            variables: self.variables,
            timeline: self.timeline,
            budget: self.budget,
            state,
            frames: Vec::new(),
            active: HashSet::new(),
            depth: 0,
        }
    }
}

/// Mutable state of one transformer invocation.
pub struct Simulation<'a> {
    graph: &'a BlockGraph,
    variables: &'a [VariableBinding],
    timeline: Timeline,
    budget: usize,
    state: Frame,
    frames: Vec<Frame>,
    /// Statement blocks currently executing, for cycle detection.
    active: HashSet<String>,
    depth: usize,
}

impl<'a> Simulation<'a> {
    pub fn timeline(&self) -> Timeline {
        self.timeline
    }

    pub fn state(&self) -> &Frame {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut Frame {
        &mut self.state
    }

    pub fn binding(&self, variable_id: &str) -> Option<&'a VariableBinding> {
        self.variables.iter().find(|v| v.id == variable_id)
    }

    /// Record the working frame as produced by `node`.
    pub fn emit(&mut self, node: &Node, explanation: String) -> Result<(), SimulationError> {
        if self.frames.len() >= self.budget {
            return Err(SimulationError::FrameLimit(MAX_FRAMES));
        }
        let mut frame = self.state.clone();
        frame.block_id = node.id.clone();
        frame.block_name = node.name.clone();
        frame.explanation = explanation;
        self.frames.push(frame);
        Ok(())
    }

    /// Run the statement chain hanging off `node`'s `input`.
    pub fn run_statements(&mut self, node: &Node, input: &str) -> Result<(), SimulationError> {
        let Some(first) = node.input(input) else {
            return Ok(());
        };
        let graph = self.graph;
        let mut seen = HashSet::new();
        let mut current = Some(first.to_string());

        while let Some(id) = current {
            if !seen.insert(id.clone()) {
                return Err(SimulationError::Cycle(id));
            }
            let Some(next_node) = graph.node(&id) else {
                warn!(block = %id, "statement chain points at a missing block");
                break;
            };
            self.run_block(next_node)?;
            current = next_node.next.clone();
        }
        Ok(())
    }

    fn run_block(&mut self, node: &Node) -> Result<(), SimulationError> {
        if self.depth >= MAX_STATEMENT_DEPTH {
            return Err(SimulationError::NestingTooDeep(MAX_STATEMENT_DEPTH));
        }
        if !self.active.insert(node.id.clone()) {
            return Err(SimulationError::Cycle(node.id.clone()));
        }
        self.depth += 1;
        let result = node.kind.simulate(node, self);
        self.depth -= 1;
        self.active.remove(&node.id);
        result
    }

    // -----------------------------------------------------------------------
    // Value inputs
    // -----------------------------------------------------------------------

    /// Evaluate the value block plugged into `input`, if any.
    pub fn value(&self, node: &Node, input: &str) -> Result<Option<Value>, SimulationError> {
        match node.input(input) {
            Some(id) => self.evaluate(id, 0),
            None => Ok(None),
        }
    }

    pub fn number(&self, node: &Node, input: &str) -> Result<f64, SimulationError> {
        Ok(self.value(node, input)?.map_or(0.0, |v| v.as_number()))
    }

    pub fn boolean(&self, node: &Node, input: &str) -> Result<bool, SimulationError> {
        Ok(self.value(node, input)?.is_some_and(|v| v.as_bool()))
    }

    pub(crate) fn evaluate(&self, id: &str, depth: usize) -> Result<Option<Value>, SimulationError> {
        if depth > MAX_VALUE_DEPTH {
            return Err(SimulationError::Cycle(id.to_string()));
        }
        let Some(node) = self.graph.node(id) else {
            warn!(block = id, "value input points at a missing block");
            return Ok(None);
        };
        match &node.kind {
            BlockKind::Value(value) => value.evaluate(node, self, depth).map(Some),
            _ => {
                warn!(block = id, name = %node.name, "not a value block");
                Ok(None)
            }
        }
    }
}

use crate::engine::graph::Node;
use crate::engine::transformer::Simulation;
use crate::error::SimulationError;

use super::Simulate;

/// `controls_repeat_ext`: runs `DO` as many times as `TIMES` evaluates to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Repeat;

impl Simulate for Repeat {
    fn simulate(&self, node: &Node, sim: &mut Simulation<'_>) -> Result<(), SimulationError> {
        let times = sim.number(node, "TIMES")?.floor().max(0.0) as u64;
        for pass in 1..=times {
            sim.emit(node, format!("Repeating {pass} of {times} times."))?;
            sim.run_statements(node, "DO")?;
        }
        Ok(())
    }
}

/// `controls_if` with a single condition and an optional else branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct If;

impl Simulate for If {
    fn simulate(&self, node: &Node, sim: &mut Simulation<'_>) -> Result<(), SimulationError> {
        let condition = sim.boolean(node, "IF0")?;
        sim.emit(node, format!("Checking if condition is {condition}."))?;
        if condition {
            sim.run_statements(node, "DO0")
        } else {
            sim.run_statements(node, "ELSE")
        }
    }
}

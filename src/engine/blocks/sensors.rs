use tracing::debug;

use crate::engine::graph::Node;
use crate::engine::sensor::SensorSetup;
use crate::engine::transformer::Simulation;
use crate::error::SimulationError;

use super::Simulate;

impl Simulate for SensorSetup {
    fn simulate(&self, node: &Node, sim: &mut Simulation<'_>) -> Result<(), SimulationError> {
        match self.state_at(&sim.timeline()) {
            Ok(state) => {
                let explanation = format!("Setting up {}.", state.label());
                sim.state_mut().upsert_component(state);
                sim.emit(node, explanation)
            }
            Err(e) => {
                debug!(block = %node.id, error = %e, "sensor left out");
                Ok(())
            }
        }
    }
}

use tracing::warn;

use crate::engine::graph::Node;
use crate::engine::transformer::Simulation;
use crate::error::{BlockError, SimulationError};
use crate::types::{Value, Variable, VariableBinding, VariableType};

use super::{Fields, Simulate};

/// Largest number list `create_list_number_block` may declare.
pub const MAX_LIST_SIZE: u32 = 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetVariable {
    pub variable_id: String,
    pub variable_type: VariableType,
}

impl SetVariable {
    pub fn parse(block_name: &str, fields: &Fields<'_>) -> Result<Self, BlockError> {
        let variable_type = match block_name {
            "variables_set_string" => VariableType::String,
            "variables_set_boolean" => VariableType::Boolean,
            _ => VariableType::Number,
        };
        Ok(SetVariable {
            variable_id: fields.text("VAR")?.to_string(),
            variable_type,
        })
    }
}

impl Simulate for SetVariable {
    fn simulate(&self, node: &Node, sim: &mut Simulation<'_>) -> Result<(), SimulationError> {
        let Some(binding) = resolve(sim, node, &self.variable_id) else {
            return Ok(());
        };
        let raw = sim.value(node, "VALUE")?;
        let value = match (self.variable_type, raw) {
            (t, None) => Value::zero(t),
            (VariableType::Number, Some(v)) => Value::Number(v.as_number()),
            (VariableType::Boolean, Some(v)) => Value::Boolean(v.as_bool()),
            (VariableType::String, Some(Value::Text(s))) => Value::Text(s),
            (VariableType::String, Some(v)) => Value::Text(v.to_string()),
            (VariableType::NumberList, Some(v)) => v,
        };
        let explanation = format!("Setting {} to {value}.", binding.name);
        store(sim, binding, value);
        sim.emit(node, explanation)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateNumberList {
    pub variable_id: String,
    pub size: u32,
}

impl CreateNumberList {
    pub fn parse(fields: &Fields<'_>) -> Result<Self, BlockError> {
        let size = fields.count("SIZE")?;
        if size > MAX_LIST_SIZE {
            return Err(BlockError::MalformedField {
                block: fields.block_id().to_string(),
                field: "SIZE",
                value: size.to_string(),
            });
        }
        Ok(CreateNumberList {
            variable_id: fields.text("VAR")?.to_string(),
            size,
        })
    }
}

impl Simulate for CreateNumberList {
    fn simulate(&self, node: &Node, sim: &mut Simulation<'_>) -> Result<(), SimulationError> {
        let Some(binding) = resolve(sim, node, &self.variable_id) else {
            return Ok(());
        };
        store(sim, binding, Value::NumberList(vec![0.0; self.size as usize]));
        sim.emit(
            node,
            format!("Creating a list called {} with {} numbers.", binding.name, self.size),
        )
    }
}

/// Writes one element of a number list. `POSITION` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetListItem {
    pub variable_id: String,
}

impl SetListItem {
    pub fn parse(fields: &Fields<'_>) -> Result<Self, BlockError> {
        Ok(SetListItem {
            variable_id: fields.text("VAR")?.to_string(),
        })
    }
}

impl Simulate for SetListItem {
    fn simulate(&self, node: &Node, sim: &mut Simulation<'_>) -> Result<(), SimulationError> {
        let Some(binding) = resolve(sim, node, &self.variable_id) else {
            return Ok(());
        };
        let position = sim.number(node, "POSITION")?.round();
        let value = sim.number(node, "VALUE")?;

        let slot = sim
            .state_mut()
            .variables
            .get_mut(&binding.name)
            .and_then(|v| match &mut v.value {
                Value::NumberList(items) if position >= 1.0 => items.get_mut(position as usize - 1),
                _ => None,
            });
        let explanation = match slot {
            Some(slot) => {
                *slot = value;
                format!("Setting position {position} in {} to {value}.", binding.name)
            }
            None => {
                warn!(block = %node.id, position, list = %binding.name, "list position out of range");
                format!("Position {position} does not exist in {}.", binding.name)
            }
        };
        sim.emit(node, explanation)
    }
}

fn resolve<'a>(sim: &Simulation<'a>, node: &Node, variable_id: &str) -> Option<&'a VariableBinding> {
    let binding = sim.binding(variable_id);
    if binding.is_none() {
        warn!(block = %node.id, variable = variable_id, "unknown variable, block skipped");
    }
    binding
}

fn store(sim: &mut Simulation<'_>, binding: &VariableBinding, value: Value) {
    sim.state_mut().variables.insert(
        binding.name.clone(),
        Variable {
            id: binding.id.clone(),
            name: binding.name.clone(),
            value,
        },
    );
}

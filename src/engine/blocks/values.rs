use crate::engine::graph::Node;
use crate::engine::transformer::Simulation;
use crate::error::{BlockError, SimulationError};
use crate::types::{ComponentState, Value, VariableType};

use super::Fields;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl CompareOp {
    fn parse(fields: &Fields<'_>) -> Result<Self, BlockError> {
        let op = fields.text("OP")?;
        Ok(match op {
            "EQ" => CompareOp::Eq,
            "NEQ" => CompareOp::Neq,
            "LT" => CompareOp::Lt,
            "LTE" => CompareOp::Lte,
            "GT" => CompareOp::Gt,
            "GTE" => CompareOp::Gte,
            other => {
                return Err(BlockError::MalformedField {
                    block: fields.block_id().to_string(),
                    field: "OP",
                    value: other.to_string(),
                });
            }
        })
    }

    fn apply<T: PartialOrd>(self, a: T, b: T) -> bool {
        match self {
            CompareOp::Eq => a == b,
            CompareOp::Neq => a != b,
            CompareOp::Lt => a < b,
            CompareOp::Lte => a <= b,
            CompareOp::Gt => a > b,
            CompareOp::Gte => a >= b,
        }
    }
}

/// Blocks that produce a value for a statement's input.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueBlock {
    Number(f64),
    Text(String),
    Boolean(bool),
    Compare(CompareOp),
    GetVariable {
        variable_id: String,
        variable_type: VariableType,
    },
    UltrasonicDistance,
    ButtonPressed { pin: String },
    PhotoReading { pin: String },
}

impl ValueBlock {
    /// `None` when `block_name` is not a value block at all.
    pub fn parse(block_name: &str, fields: &Fields<'_>) -> Option<Result<Self, BlockError>> {
        let get_variable = |variable_type| {
            fields.text("VAR").map(|id| ValueBlock::GetVariable {
                variable_id: id.to_string(),
                variable_type,
            })
        };
        Some(match block_name {
            "math_number" => fields.parse("NUM").map(ValueBlock::Number),
            "text" => fields.text("TEXT").map(|t| ValueBlock::Text(t.to_string())),
            "logic_boolean" => fields.flag("BOOL").map(ValueBlock::Boolean),
            "logic_compare" => CompareOp::parse(fields).map(ValueBlock::Compare),
            "variables_get_number" => get_variable(VariableType::Number),
            "variables_get_string" => get_variable(VariableType::String),
            "variables_get_boolean" => get_variable(VariableType::Boolean),
            "ultrasonic_sensor_get_distance" => Ok(ValueBlock::UltrasonicDistance),
            "button_is_pressed" => fields.text("PIN").map(|pin| ValueBlock::ButtonPressed {
                pin: pin.to_string(),
            }),
            "photo_sensor_read" => fields.text("PIN").map(|pin| ValueBlock::PhotoReading {
                pin: pin.to_string(),
            }),
            _ => return None,
        })
    }

    pub fn evaluate(
        &self,
        node: &Node,
        sim: &Simulation<'_>,
        depth: usize,
    ) -> Result<Value, SimulationError> {
        let components = &sim.state().components;
        Ok(match self {
            ValueBlock::Number(n) => Value::Number(*n),
            ValueBlock::Text(t) => Value::Text(t.clone()),
            ValueBlock::Boolean(b) => Value::Boolean(*b),
            ValueBlock::Compare(op) => {
                let operand = |input: &str| match node.input(input) {
                    Some(id) => sim.evaluate(id, depth + 1),
                    None => Ok(None),
                };
                let result = match (operand("A")?, operand("B")?) {
                    (Some(Value::Text(a)), Some(Value::Text(b))) => op.apply(a, b),
                    (a, b) => op.apply(
                        a.map_or(0.0, |v| v.as_number()),
                        b.map_or(0.0, |v| v.as_number()),
                    ),
                };
                Value::Boolean(result)
            }
            ValueBlock::GetVariable {
                variable_id,
                variable_type,
            } => sim
                .binding(variable_id)
                .and_then(|b| sim.state().variables.get(&b.name))
                .map(|v| v.value.clone())
                .unwrap_or_else(|| Value::zero(*variable_type)),
            ValueBlock::UltrasonicDistance => {
                let cm = components.iter().find_map(|c| match c {
                    ComponentState::UltrasonicSensor(s) => Some(s.cm),
                    _ => None,
                });
                Value::Number(f64::from(cm.unwrap_or(0)))
            }
            ValueBlock::ButtonPressed { pin } => {
                let pressed = components.iter().any(|c| {
                    matches!(c, ComponentState::Button(s) if &s.pin == pin && s.is_pressed)
                });
                Value::Boolean(pressed)
            }
            ValueBlock::PhotoReading { pin } => {
                let reading = components.iter().find_map(|c| match c {
                    ComponentState::PhotoSensor(s) if &s.pin == pin => Some(s.reading),
                    _ => None,
                });
                Value::Number(f64::from(reading.unwrap_or(0)))
            }
        })
    }
}

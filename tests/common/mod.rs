#![allow(dead_code)]

use blocksim::types::{Block, BlockEvent};
use serde_json::{json, Value};

/// Fluent builder for editor-shaped blocks.
pub struct B {
    json: Value,
}

pub fn block(id: &str, block_type: &str, name: &str) -> B {
    B {
        json: json!({
            "id": id,
            "type": block_type,
            "blockName": name,
            "fieldValues": [],
            "inputBlocks": [],
        }),
    }
}

impl B {
    pub fn field(mut self, name: &str, value: &str) -> Self {
        self.json["fieldValues"]
            .as_array_mut()
            .unwrap()
            .push(json!({ "name": name, "value": value }));
        self
    }

    pub fn input(mut self, name: &str, block_id: &str) -> Self {
        self.json["inputBlocks"]
            .as_array_mut()
            .unwrap()
            .push(json!({ "name": name, "blockId": block_id }));
        self
    }

    pub fn next(mut self, block_id: &str) -> Self {
        self.json["nextBlockId"] = json!(block_id);
        self
    }

    pub fn metadata(mut self, metadata: Value) -> Self {
        self.json["metadata"] = json!(metadata.to_string());
        self
    }

    pub fn build(self) -> Block {
        serde_json::from_value(self.json).unwrap()
    }
}

pub fn arduino_loop(times: u32) -> B {
    block("loop", "ARDUINO", "arduino_loop").field("LOOP_TIMES", &times.to_string())
}

pub fn arduino_setup() -> B {
    block("setup", "ARDUINO", "arduino_setup")
}

pub fn number(id: &str, n: f64) -> Block {
    block(id, "VALUE", "math_number").field("NUM", &n.to_string()).build()
}

pub fn ultrasonic(id: &str, valid_through: u32, per_loop_cm: &[u32]) -> Block {
    let readings: Vec<Value> = per_loop_cm
        .iter()
        .enumerate()
        .map(|(i, cm)| json!({ "loop": i + 1, "cm": cm }))
        .collect();
    block(id, "SENSOR_SETUP", "ultrasonic_sensor_setup")
        .field("PIN_TRIG", "7")
        .field("PIN_ECHO", "8")
        .field("cm", "10")
        .field("LOOP", &valid_through.to_string())
        .metadata(Value::Array(readings))
        .build()
}

pub fn event(blocks: Vec<Block>) -> BlockEvent {
    event_with_variables(blocks, json!([]))
}

pub fn event_with_variables(blocks: Vec<Block>, variables: Value) -> BlockEvent {
    BlockEvent {
        blocks,
        variables: serde_json::from_value(variables).unwrap(),
        micro_controller: "uno".into(),
        new_value: None,
        field_name: None,
        block_id: None,
    }
}

//! Actions — follow-up edits derived from block events.
//!
//! Action factories look at a field-change event and decide which other
//! blocks must change so the program stays consistent. They only describe
//! the edits; `apply_actions` performs them on a block list.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::engine::helpers::{
    parse_count, ARDUINO_LOOP_BLOCK, LOOP_TIMES_FIELD, SENSOR_LOOP_FIELD,
};
use crate::types::{Block, BlockEvent, BlockType};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    #[serde(rename_all = "camelCase")]
    SetupSensorBlockLoopFieldUpdate {
        block_id: String,
        #[serde(rename = "loop")]
        loop_number: u32,
    },
}

/// Every action the event calls for, across all factories.
pub fn event_to_actions(event: &BlockEvent) -> Vec<Action> {
    update_loop_number_in_sensor_setup_blocks(event)
}

/// When the loop count shrinks, pull every sensor setup block that claims
/// validity past the new count down to it. Blocks at or below the new
/// count are still valid and are left alone.
pub fn update_loop_number_in_sensor_setup_blocks(event: &BlockEvent) -> Vec<Action> {
    let Some(changed) = event
        .block_id
        .as_deref()
        .and_then(|id| event.blocks.iter().find(|b| b.id == id))
    else {
        return Vec::new();
    };

    if changed.block_name != ARDUINO_LOOP_BLOCK {
        return Vec::new();
    }

    if event.field_name.as_deref() != Some(LOOP_TIMES_FIELD) {
        return Vec::new();
    }

    let Some(new_loop_number) = event.new_value.as_deref().and_then(parse_count) else {
        return Vec::new();
    };

    let actions: Vec<Action> = event
        .blocks
        .iter()
        .filter(|b| b.block_type == BlockType::SensorSetup)
        .filter(|b| {
            b.field(SENSOR_LOOP_FIELD)
                .and_then(parse_count)
                .is_some_and(|recorded| recorded > new_loop_number)
        })
        .map(|b| Action::SetupSensorBlockLoopFieldUpdate {
            block_id: b.id.clone(),
            loop_number: new_loop_number,
        })
        .collect();

    debug!(new_loop_number, actions = actions.len(), "loop count changed");
    actions
}

/// Write `actions` into `blocks`. Actions for blocks that no longer exist
/// are dropped.
pub fn apply_actions(blocks: &mut [Block], actions: &[Action]) {
    for action in actions {
        match action {
            Action::SetupSensorBlockLoopFieldUpdate {
                block_id,
                loop_number,
            } => {
                if let Some(block) = blocks.iter_mut().find(|b| &b.id == block_id) {
                    block.set_field(SENSOR_LOOP_FIELD, loop_number.to_string());
                }
            }
        }
    }
}

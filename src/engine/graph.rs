use std::collections::HashMap;

use crate::engine::blocks::BlockKind;
use crate::engine::helpers::{ARDUINO_LOOP_BLOCK, ARDUINO_SETUP_BLOCK};
use crate::error::SimulationError;
use crate::types::{Block, BlockType, InputBlock};

/// A validated block with its fields already read into `kind`.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: String,
    pub name: String,
    pub block_type: BlockType,
    pub kind: BlockKind,
    pub next: Option<String>,
    pub inputs: Vec<InputBlock>,
}

impl Node {
    pub fn input(&self, name: &str) -> Option<&str> {
        self.inputs
            .iter()
            .find(|i| i.name == name)
            .map(|i| i.block_id.as_str())
    }
}

/// The program as the simulator sees it: typed nodes keyed by id.
#[derive(Debug, Clone, Default)]
pub struct BlockGraph {
    nodes: HashMap<String, Node>,
}

impl BlockGraph {
    /// Build the graph, rejecting structural problems that would make the
    /// timeline meaningless. Field-level problems only mark single nodes
    /// `Invalid`.
    pub fn from_blocks(blocks: &[Block]) -> Result<Self, SimulationError> {
        let mut nodes = HashMap::with_capacity(blocks.len());
        let mut setups = 0;
        let mut loops = 0;

        for block in blocks {
            match block.block_name.as_str() {
                ARDUINO_SETUP_BLOCK => setups += 1,
                ARDUINO_LOOP_BLOCK => loops += 1,
                _ => {}
            }
            let node = Node {
                id: block.id.clone(),
                name: block.block_name.clone(),
                block_type: block.block_type,
                kind: BlockKind::parse(block),
                next: block.next_block_id.clone(),
                inputs: block.input_blocks.clone(),
            };
            if nodes.insert(block.id.clone(), node).is_some() {
                return Err(SimulationError::DuplicateBlockId(block.id.clone()));
            }
        }

        if setups > 1 {
            return Err(SimulationError::DuplicateRoot(ARDUINO_SETUP_BLOCK));
        }
        if loops > 1 {
            return Err(SimulationError::DuplicateRoot(ARDUINO_LOOP_BLOCK));
        }

        Ok(BlockGraph { nodes })
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }
}

use std::sync::Arc;

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::core::block::{Block, BlockId, SimpleBlock};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("block name `{0}` is already registered")]
    DuplicateName(String),
    #[error("block id space exhausted ({0} ids in use)")]
    Exhausted(usize),
}

/// Bidirectional name <-> id <-> behaviour table. Append-only.
pub struct BlockRegistry {
    by_id: Vec<Option<Arc<dyn Block>>>,
    ids: FxHashMap<String, BlockId>,
    next_id: usize,
}

impl Default for BlockRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockRegistry {
    pub fn new() -> Self {
        BlockRegistry {
            // Slot 0 is air and never filled.
            by_id: vec![None],
            ids: FxHashMap::default(),
            next_id: 1,
        }
    }

    /// The demo content: grass, dirt, stone and the placeable gold block.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        let defaults = [
            SimpleBlock::new(
                "grass",
                [
                    "dirt.png",
                    "grass.png",
                    "grass_side.png",
                    "grass_side.png",
                    "grass_side.png",
                    "grass_side.png",
                ],
            ),
            SimpleBlock::uniform("dirt", "dirt.png"),
            SimpleBlock::uniform("stone", "stone.png"),
            SimpleBlock::uniform("gold_block", "gold_block.png"),
        ];
        for block in defaults {
            registry
                .register(Arc::new(block))
                .expect("default block names are unique");
        }
        registry
    }

    pub fn register(&mut self, block: Arc<dyn Block>) -> Result<BlockId, RegistryError> {
        if self.ids.contains_key(block.name()) {
            return Err(RegistryError::DuplicateName(block.name().to_string()));
        }

        let id = self.alloc_id()?;
        let slot = id.0 as usize;
        if self.by_id.len() <= slot {
            self.by_id.resize(slot + 1, None);
        }
        self.ids.insert(block.name().to_string(), id);
        tracing::debug!("Registered block {} as id {}", block.name(), id.0);
        self.by_id[slot] = Some(block);
        Ok(id)
    }

    fn alloc_id(&mut self) -> Result<BlockId, RegistryError> {
        while self.next_id < self.by_id.len() && self.by_id[self.next_id].is_some() {
            self.next_id += 1;
        }
        if self.next_id > u16::MAX as usize {
            return Err(RegistryError::Exhausted(self.ids.len()));
        }
        let id = BlockId(self.next_id as u16);
        self.next_id += 1;
        Ok(id)
    }

    pub fn by_name(&self, name: &str) -> Option<Arc<dyn Block>> {
        self.ids.get(name).and_then(|id| self.by_id(*id))
    }

    pub fn by_id(&self, id: BlockId) -> Option<Arc<dyn Block>> {
        self.by_id.get(id.0 as usize).and_then(|block| block.clone())
    }

    /// Lookup is by name, so any instance with a registered name resolves.
    pub fn id_of(&self, block: &dyn Block) -> Option<BlockId> {
        self.ids.get(block.name()).copied()
    }

    pub fn id_of_name(&self, name: &str) -> Option<BlockId> {
        self.ids.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BlockId, &Arc<dyn Block>)> {
        self.by_id
            .iter()
            .enumerate()
            .filter_map(|(i, block)| block.as_ref().map(|b| (BlockId(i as u16), b)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_start_at_one() {
        let mut registry = BlockRegistry::new();
        let id = registry
            .register(Arc::new(SimpleBlock::uniform("stone", "stone.png")))
            .unwrap();
        assert_eq!(id, BlockId(1));
        assert!(registry.by_id(BlockId::AIR).is_none());
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut registry = BlockRegistry::new();
        registry
            .register(Arc::new(SimpleBlock::uniform("stone", "stone.png")))
            .unwrap();
        let err = registry
            .register(Arc::new(SimpleBlock::uniform("stone", "other.png")))
            .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateName("stone".to_string()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn id_space_is_bounded() {
        let mut registry = BlockRegistry::new();
        for i in 0..u16::MAX as usize {
            registry
                .register(Arc::new(SimpleBlock::uniform(format!("b{i}"), "x.png")))
                .unwrap();
        }
        let err = registry
            .register(Arc::new(SimpleBlock::uniform("one_more", "x.png")))
            .unwrap_err();
        assert!(matches!(err, RegistryError::Exhausted(_)));
    }

    #[test]
    fn defaults_include_the_placeable_block() {
        let registry = BlockRegistry::with_defaults();
        assert_eq!(registry.len(), 4);
        assert!(registry.by_name("gold_block").is_some());
        assert!(registry.by_name("bedrock").is_none());
    }
}

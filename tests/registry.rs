use std::sync::Arc;

use blockview::core::{Block, BlockId, BlockRegistry, RegistryError, SimpleBlock};

#[test]
fn defaults_resolve_both_ways() {
    let registry = BlockRegistry::with_defaults();
    assert_eq!(registry.len(), 4);
    for name in ["grass", "dirt", "stone", "gold_block"] {
        let block = registry.by_name(name).unwrap();
        let id = registry.id_of(block.as_ref()).unwrap();
        assert!(!id.is_air());
        assert_eq!(registry.by_id(id).unwrap().name(), name);
    }
    assert!(registry.by_id(BlockId::AIR).is_none());
    assert!(registry.by_id(BlockId(999)).is_none());
    assert!(registry.by_name("bedrock").is_none());
}

#[test]
fn names_are_unique_and_ids_dense() {
    let mut registry = BlockRegistry::new();
    let a = registry.register(Arc::new(SimpleBlock::uniform("a", "a.png"))).unwrap();
    let b = registry.register(Arc::new(SimpleBlock::uniform("b", "b.png"))).unwrap();
    assert_eq!((a, b), (BlockId(1), BlockId(2)));

    let again = registry.register(Arc::new(SimpleBlock::uniform("a", "other.png")));
    assert_eq!(again, Err(RegistryError::DuplicateName("a".to_string())));
    assert_eq!(registry.len(), 2);

    // Equal names resolve to the same id even for distinct instances.
    let twin = SimpleBlock::uniform("b", "b.png");
    assert_eq!(registry.id_of(&twin as &dyn Block), Some(b));
    let ids: Vec<_> = registry.iter().map(|(id, _)| id).collect();
    assert_eq!(ids, vec![a, b]);
}

//! Rule system declarations and type registries.
//!
//! # Supported Systems
//!
//! - D&D 5th Edition (`dnd5e`)

mod dnd5e;
mod traits;
mod type_registry;

pub use dnd5e::Dnd5eSystem;
pub use traits::RuleSystem;
pub use type_registry::{
    HostTypes, TypeProvider, TypeRegistry, FALLBACK_RECORD_TYPE, ITEM_TYPE_LABELS,
    RECORD_TYPE_LABELS,
};

use std::sync::Arc;

/// Registry of available rule systems.
pub struct RuleSystemRegistry {
    systems: Vec<Arc<dyn RuleSystem>>,
}

impl Default for RuleSystemRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleSystemRegistry {
    /// Create a new registry with all built-in rule systems.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(Dnd5eSystem::new()));
        registry
    }

    /// Create an empty registry without built-in systems.
    pub fn empty() -> Self {
        Self {
            systems: Vec::new(),
        }
    }

    /// Register a rule system.
    pub fn register(&mut self, system: Arc<dyn RuleSystem>) {
        self.systems.push(system);
    }

    /// Get a rule system by its ID.
    pub fn get(&self, system_id: &str) -> Option<Arc<dyn RuleSystem>> {
        self.systems
            .iter()
            .find(|s| s.system_id() == system_id)
            .cloned()
    }

    /// List all registered system IDs.
    pub fn list_systems(&self) -> Vec<&str> {
        self.systems.iter().map(|s| s.system_id()).collect()
    }
}

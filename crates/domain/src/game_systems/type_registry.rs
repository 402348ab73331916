//! Valid record and item types, resolved from an ordered list of sources.
//!
//! Each lookup walks its providers in order and returns the first non-empty
//! result. The usual chain is:
//!
//! 1. the active rule system's declared list
//! 2. the host's generic type list
//! 3. the static label table
//!
//! An empty result means no validation is possible; callers fall back to the
//! default type instead of rejecting everything.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use super::traits::RuleSystem;

/// A source of type names. Returns an empty list when the source is absent.
pub type TypeProvider = Arc<dyn Fn() -> Vec<String> + Send + Sync>;

/// Record type used when no rule system supplies one.
pub const FALLBACK_RECORD_TYPE: &str = "npc";

/// Static record-type label table (type key, display label).
pub const RECORD_TYPE_LABELS: &[(&str, &str)] = &[
    ("character", "Player Character"),
    ("npc", "Non-Player Character"),
    ("vehicle", "Vehicle"),
    ("group", "Group"),
];

/// Static item-type label table (type key, display label).
pub const ITEM_TYPE_LABELS: &[(&str, &str)] = &[
    ("weapon", "Weapon"),
    ("equipment", "Equipment"),
    ("consumable", "Consumable"),
    ("tool", "Tool"),
    ("loot", "Loot"),
    ("container", "Container"),
    ("spell", "Spell"),
    ("feat", "Feature"),
];

/// Type lists exposed by the host itself, independent of any rule system.
#[derive(Debug, Clone, Default)]
pub struct HostTypes {
    pub record_types: Vec<String>,
    pub item_types: Vec<String>,
}

#[derive(Clone)]
struct NamedProvider {
    name: &'static str,
    provider: TypeProvider,
}

/// Ordered type sources for records and items.
#[derive(Clone)]
pub struct TypeRegistry {
    record_sources: Vec<NamedProvider>,
    item_sources: Vec<NamedProvider>,
    default_record_type: String,
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field(
                "record_sources",
                &self.record_sources.iter().map(|s| s.name).collect::<Vec<_>>(),
            )
            .field(
                "item_sources",
                &self.item_sources.iter().map(|s| s.name).collect::<Vec<_>>(),
            )
            .field("default_record_type", &self.default_record_type)
            .finish()
    }
}

impl TypeRegistry {
    /// Create a registry with no sources.
    pub fn new(default_record_type: impl Into<String>) -> Self {
        Self {
            record_sources: Vec::new(),
            item_sources: Vec::new(),
            default_record_type: default_record_type.into(),
        }
    }

    /// Build the standard three-source chain.
    ///
    /// `system` is the active rule system, if any. The default record type
    /// comes from the system, falling back to [`FALLBACK_RECORD_TYPE`].
    pub fn for_host(system: Option<Arc<dyn RuleSystem>>, host: HostTypes) -> Self {
        let default_record_type = system
            .as_ref()
            .map(|s| s.default_record_type().to_string())
            .unwrap_or_else(|| FALLBACK_RECORD_TYPE.to_string());

        let record_system = system.clone();
        let item_system = system;
        let host_records = host.record_types;
        let host_items = host.item_types;

        Self::new(default_record_type)
            .with_record_source("rule_system", move || {
                record_system
                    .as_ref()
                    .map(|s| s.record_types().iter().map(|t| t.to_string()).collect())
                    .unwrap_or_default()
            })
            .with_record_source("host", move || host_records.clone())
            .with_record_source("labels", || label_keys(RECORD_TYPE_LABELS))
            .with_item_source("rule_system", move || {
                item_system
                    .as_ref()
                    .map(|s| s.item_types().iter().map(|t| t.to_string()).collect())
                    .unwrap_or_default()
            })
            .with_item_source("host", move || host_items.clone())
            .with_item_source("labels", || label_keys(ITEM_TYPE_LABELS))
    }

    pub fn with_record_source(
        mut self,
        name: &'static str,
        provider: impl Fn() -> Vec<String> + Send + Sync + 'static,
    ) -> Self {
        self.record_sources.push(NamedProvider {
            name,
            provider: Arc::new(provider),
        });
        self
    }

    pub fn with_item_source(
        mut self,
        name: &'static str,
        provider: impl Fn() -> Vec<String> + Send + Sync + 'static,
    ) -> Self {
        self.item_sources.push(NamedProvider {
            name,
            provider: Arc::new(provider),
        });
        self
    }

    /// Currently valid top-level record types.
    pub fn valid_record_types(&self) -> BTreeSet<String> {
        first_non_empty(&self.record_sources)
    }

    /// Currently valid item sub-types.
    pub fn valid_item_types(&self) -> BTreeSet<String> {
        first_non_empty(&self.item_sources)
    }

    pub fn default_record_type(&self) -> &str {
        &self.default_record_type
    }

    /// Record type substituted for an unrecognized one.
    ///
    /// The configured default when `valid` is empty or contains it,
    /// otherwise the first member of `valid`.
    pub fn fallback_record_type(&self, valid: &BTreeSet<String>) -> String {
        if valid.is_empty() || valid.contains(&self.default_record_type) {
            return self.default_record_type.clone();
        }
        valid
            .iter()
            .next()
            .cloned()
            .unwrap_or_else(|| self.default_record_type.clone())
    }
}

fn first_non_empty(sources: &[NamedProvider]) -> BTreeSet<String> {
    sources
        .iter()
        .map(|source| {
            (source.provider)()
                .into_iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect::<BTreeSet<_>>()
        })
        .find(|types| !types.is_empty())
        .unwrap_or_default()
}

fn label_keys(table: &[(&str, &str)]) -> Vec<String> {
    table.iter().map(|(key, _)| key.to_string()).collect()
}

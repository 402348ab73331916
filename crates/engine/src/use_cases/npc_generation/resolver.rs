//! Catalog resolution for generated items and actions.
//!
//! Spells and features named by the model are swapped for canonical catalog
//! copies when the catalog has them. Lookups are read-only, sequential and
//! case-insensitive exact name matches.

use std::sync::Arc;

use npcsmith_domain::{CatalogRecord, ItemSpec, NormalizedCharacter, RecordDraft};

use crate::infrastructure::ports::{CatalogError, CatalogKind, CatalogPort, SPELL_CATALOG_ID};

/// Item type of catalog entries that count as features.
pub const FEATURE_ITEM_TYPE: &str = "feat";

/// Item type resolved against the spell catalog.
pub const SPELL_ITEM_TYPE: &str = "spell";

/// Looks up canonical content by name.
#[derive(Clone)]
pub struct CatalogResolver {
    catalog: Arc<dyn CatalogPort>,
}

impl CatalogResolver {
    pub fn new(catalog: Arc<dyn CatalogPort>) -> Self {
        Self { catalog }
    }

    /// Find a spell in the designated spell catalog.
    ///
    /// An absent or unavailable catalog is a miss, not an error.
    pub async fn resolve_spell(&self, name: &str) -> Result<Option<CatalogRecord>, CatalogError> {
        let listed = self
            .catalog
            .list_catalogs()
            .await
            .iter()
            .any(|c| c.id == SPELL_CATALOG_ID);
        if !listed {
            tracing::debug!(catalog = SPELL_CATALOG_ID, "Spell catalog not available");
            return Ok(None);
        }
        self.lookup(SPELL_CATALOG_ID, name, None).await
    }

    /// Find a feature across every item catalog, first hit in enumeration
    /// order.
    pub async fn resolve_feature(
        &self,
        name: &str,
    ) -> Result<Option<CatalogRecord>, CatalogError> {
        for info in self.catalog.list_catalogs().await {
            if info.kind != CatalogKind::Item {
                continue;
            }
            if let Some(record) = self.lookup(&info.id, name, Some(FEATURE_ITEM_TYPE)).await? {
                return Ok(Some(record));
            }
        }
        Ok(None)
    }

    async fn lookup(
        &self,
        catalog_id: &str,
        name: &str,
        item_type: Option<&str>,
    ) -> Result<Option<CatalogRecord>, CatalogError> {
        let index = match self.catalog.index(catalog_id).await {
            Ok(index) => index,
            Err(e) if e.is_miss() => {
                tracing::debug!(catalog = catalog_id, error = %e, "Catalog index unavailable");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let Some(entry) = index
            .iter()
            .filter(|e| item_type.map_or(true, |t| t == e.item_type))
            .find(|e| e.matches_name(name))
        else {
            return Ok(None);
        };

        match self.catalog.document(catalog_id, &entry.entry_id).await {
            Ok(record) => Ok(Some(record)),
            Err(e) if e.is_miss() => {
                tracing::warn!(
                    catalog = catalog_id,
                    entry = %entry.entry_id,
                    error = %e,
                    "Indexed catalog entry has no document"
                );
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

/// How many sub-items came from the catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolutionStats {
    pub spells_resolved: usize,
    pub actions_resolved: usize,
    pub actions_omitted: usize,
}

/// Applies catalog resolution to a normalized draft.
#[derive(Clone)]
pub struct ItemResolver {
    catalog: CatalogResolver,
}

impl ItemResolver {
    pub fn new(catalog: CatalogResolver) -> Self {
        Self { catalog }
    }

    /// Resolve spells among the draft's items and turn its actions into
    /// feature items.
    ///
    /// Spell misses keep the generated item. Action misses are dropped.
    /// Any catalog access failure fails the whole record.
    pub async fn resolve(
        &self,
        draft: RecordDraft,
    ) -> Result<(NormalizedCharacter, ResolutionStats), CatalogError> {
        let RecordDraft {
            mut character,
            action_names,
            ..
        } = draft;
        let mut stats = ResolutionStats::default();

        let mut items = Vec::with_capacity(character.sub_items.len() + action_names.len());
        for item in std::mem::take(&mut character.sub_items) {
            items.push(self.resolve_item(item, &mut stats).await?);
        }

        for action in &action_names {
            match self.catalog.resolve_feature(action).await? {
                Some(record) => {
                    stats.actions_resolved += 1;
                    items.push(record.to_item_spec());
                }
                None => {
                    stats.actions_omitted += 1;
                    tracing::debug!(npc = %character.name, action = %action, "No catalog feature for action");
                }
            }
        }

        character.sub_items = items;
        Ok((character, stats))
    }

    async fn resolve_item(
        &self,
        item: ItemSpec,
        stats: &mut ResolutionStats,
    ) -> Result<ItemSpec, CatalogError> {
        if item.item_type != SPELL_ITEM_TYPE {
            return Ok(item);
        }
        match self.catalog.resolve_spell(&item.name).await? {
            Some(record) => {
                stats.spells_resolved += 1;
                Ok(record.to_item_spec())
            }
            None => {
                tracing::debug!(spell = %item.name, "Spell not in catalog, keeping generated item");
                Ok(item)
            }
        }
    }
}

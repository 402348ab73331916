//! Game system traits.
//!
//! A rule system declares which record types and item types it accepts.
//! The declared lists are the first source consulted by the type registry.

/// Core trait all rule systems implement.
pub trait RuleSystem: Send + Sync {
    /// Unique identifier for this rule system (e.g., "dnd5e").
    fn system_id(&self) -> &str;

    /// Human-readable display name (e.g., "D&D 5th Edition").
    fn display_name(&self) -> &str;

    /// Top-level record types this system defines.
    ///
    /// An empty slice means the system does not declare any, and the
    /// registry moves on to the next source.
    fn record_types(&self) -> &[&str];

    /// Item sub-types this system defines.
    fn item_types(&self) -> &[&str];

    /// Record type substituted when a generated value is not recognized.
    fn default_record_type(&self) -> &str {
        "npc"
    }
}

//! Catalog sources backed by external data dumps.

mod fivetools;
mod fivetools_types;

pub use fivetools::{
    FiveToolsCatalog, FEATS_CATALOG, ITEMS_CATALOG, OPTIONAL_FEATURES_CATALOG, SPELLS_CATALOG,
};

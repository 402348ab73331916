//! npcsmith Engine library.
//!
//! ## Structure
//!
//! - `use_cases/` - Generation orchestration
//! - `infrastructure/` - External dependency implementations (ports + adapters)
//! - `app` - Application composition

pub mod app;
pub mod infrastructure;
pub mod use_cases;

pub use app::App;

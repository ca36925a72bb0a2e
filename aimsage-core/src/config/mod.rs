//! Configuration management for aimsage.
//!
//! Settings live in a TOML file in the XDG config directory
//! (`~/.config/aimsage/config.toml`, overridable with `AIMSAGE_CONFIG`):
//!
//! ```toml
//! [knowledge]
//! embedding_url = "http://127.0.0.1:11434"
//! embedding_model = "nomic-embed-text"
//! embedding_dim = 768
//! index_name = "aim-training-content"
//!
//! [knowledge.search]
//! default_limit = 5
//! duplicate_threshold = 0.9
//! ```
//!
//! The optional user-facing structs in [`settings`] convert into the resolved
//! (non-optional) structs in [`knowledge`], which is what the engine consumes.

pub mod knowledge;
mod settings;

pub use knowledge::{KnowledgeSettings, SearchDefaults};
pub use settings::{KnowledgeToolsSettings, SearchSettings, Settings, SettingsError};

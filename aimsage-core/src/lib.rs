pub mod config;

// Config re-exports
pub use config::{
    KnowledgeSettings,
    KnowledgeToolsSettings,
    SearchDefaults,
    SearchSettings,
    Settings,
    SettingsError,
};

use std::path::PathBuf;

use aimsage_core::KnowledgeSettings;

use crate::errors::{KnowledgeError, KnowledgeResult};

pub const KNOWLEDGE_DIR: &str = "knowledge";

pub fn data_root() -> KnowledgeResult<PathBuf> {
    if let Ok(override_dir) = std::env::var("AIMSAGE_DATA_DIR") {
        return Ok(PathBuf::from(override_dir));
    }

    let dir = dirs::data_dir().ok_or(KnowledgeError::MissingDataDir)?;
    Ok(dir.join("aimsage"))
}

pub fn knowledge_db_path(settings: &KnowledgeSettings) -> KnowledgeResult<PathBuf> {
    if let Some(path) = &settings.db_path_override {
        return Ok(path.clone());
    }
    Ok(data_root()?.join(KNOWLEDGE_DIR).join("index.sqlite3"))
}

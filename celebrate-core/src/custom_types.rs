//! User-defined celebration types.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CelebrateError, CelebrateResult};

const TYPES_FILE: &str = "types.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomType {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
}

impl CustomType {
    pub fn label(&self) -> String {
        match &self.emoji {
            Some(emoji) => format!("{} {}", emoji, self.name),
            None => self.name.clone(),
        }
    }
}

/// Resolves display metadata for `CelebrationKind::Custom` ids.
pub trait CustomTypeLookup {
    fn custom_type(&self, id: &str) -> Option<&CustomType>;
}

/// Lookup that knows no custom types.
pub struct NoCustomTypes;

impl CustomTypeLookup for NoCustomTypes {
    fn custom_type(&self, _id: &str) -> Option<&CustomType> {
        None
    }
}

/// The user's custom types, persisted as `<data_dir>/types.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomTypeRegistry {
    types: Vec<CustomType>,
}

impl CustomTypeRegistry {
    pub fn path_in(data_dir: &Path) -> PathBuf {
        data_dir.join(TYPES_FILE)
    }

    /// Load the registry. A missing file is an empty registry.
    pub async fn load(data_dir: &Path) -> CelebrateResult<Self> {
        let path = Self::path_in(data_dir);

        if !tokio::fs::try_exists(&path).await? {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(&path).await?;
        let types: Vec<CustomType> = serde_json::from_str(&content)?;
        Ok(CustomTypeRegistry { types })
    }

    pub async fn save(&self, data_dir: &Path) -> CelebrateResult<()> {
        tokio::fs::create_dir_all(data_dir).await?;

        let path = Self::path_in(data_dir);
        let temp = data_dir.join(format!("{TYPES_FILE}.tmp"));

        let content = serde_json::to_string_pretty(&self.types)?;
        tokio::fs::write(&temp, content).await?;
        tokio::fs::rename(&temp, &path).await?;
        Ok(())
    }

    pub fn types(&self) -> &[CustomType] {
        &self.types
    }

    /// Add a type, replacing any existing type with the same id.
    pub fn upsert(&mut self, custom_type: CustomType) -> CelebrateResult<()> {
        if matches!(custom_type.id.as_str(), "birthday" | "nameday" | "other") {
            return Err(CelebrateError::Config(format!(
                "'{}' is a built-in type and cannot be redefined",
                custom_type.id
            )));
        }

        match self.types.iter_mut().find(|t| t.id == custom_type.id) {
            Some(existing) => *existing = custom_type,
            None => self.types.push(custom_type),
        }
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> CelebrateResult<CustomType> {
        let index = self
            .types
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| CelebrateError::CustomTypeNotFound(id.to_string()))?;
        Ok(self.types.remove(index))
    }
}

impl CustomTypeLookup for CustomTypeRegistry {
    fn custom_type(&self, id: &str) -> Option<&CustomType> {
        self.types.iter().find(|t| t.id == id)
    }
}

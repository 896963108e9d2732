//! Data-access collaborators.
//!
//! The export engine never reads storage directly. Every collection and every
//! app-level config goes through a [`DataSource`].

mod dir;
mod memory;

pub use dir::DirSource;
pub use memory::MemorySource;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::model::{Collection, EntityKind};

/// Request/response access to stored collections and configs.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Fetch the full record set (trash included) of one kind in one profile.
    async fn find(&self, kind: EntityKind, profile_id: &str) -> Result<Collection>;

    /// Fetch the value of an app-level config by name.
    async fn find_config(&self, name: &str) -> Result<Option<Value>>;

    /// Human-readable source name
    fn source_name(&self) -> &str;
}

/// Read the configured profile list.
///
/// The value is either a JSON array of names or a string holding one.
pub async fn configured_profiles(source: &dyn DataSource, name: &str) -> Result<Vec<String>> {
    let value = source
        .find_config(name)
        .await?
        .ok_or_else(|| Error::Config(format!("Config '{}' is not set", name)))?;

    let value = match value {
        Value::String(s) => serde_json::from_str(&s)
            .map_err(|e| Error::Config(format!("Config '{}' is not a profile list: {}", name, e)))?,
        other => other,
    };

    serde_json::from_value::<Vec<String>>(value)
        .map_err(|e| Error::Config(format!("Config '{}' is not a profile list: {}", name, e)))
}

/// Read the private key material.
///
/// Any string is returned as is, empty included.
pub async fn private_key(source: &dyn DataSource, name: &str) -> Result<String> {
    match source.find_config(name).await? {
        Some(Value::String(key)) => Ok(key),
        _ => Err(Error::KeyNotFound(name.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_profiles_from_array() {
        let source = MemorySource::new().with_config("appProfiles", json!(["default", "work"]));
        let profiles = configured_profiles(&source, "appProfiles").await.unwrap();
        assert_eq!(profiles, vec!["default", "work"]);
    }

    #[tokio::test]
    async fn test_profiles_from_encoded_string() {
        let source = MemorySource::new().with_config("appProfiles", json!("[\"default\"]"));
        let profiles = configured_profiles(&source, "appProfiles").await.unwrap();
        assert_eq!(profiles, vec!["default"]);
    }

    #[tokio::test]
    async fn test_profiles_missing_or_malformed() {
        let source = MemorySource::new();
        assert!(matches!(
            configured_profiles(&source, "appProfiles").await,
            Err(Error::Config(_))
        ));

        let source = MemorySource::new().with_config("appProfiles", json!({"a": 1}));
        assert!(configured_profiles(&source, "appProfiles").await.is_err());
    }

    #[tokio::test]
    async fn test_private_key() {
        let source = MemorySource::new().with_config("privateKey", json!("-----BEGIN PGP-----"));
        assert_eq!(
            private_key(&source, "privateKey").await.unwrap(),
            "-----BEGIN PGP-----"
        );

        let source = MemorySource::new().with_config("privateKey", json!(""));
        assert_eq!(private_key(&source, "privateKey").await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_private_key_missing_or_not_text() {
        let source = MemorySource::new();
        assert!(matches!(
            private_key(&source, "privateKey").await,
            Err(Error::KeyNotFound(_))
        ));

        let source = MemorySource::new().with_config("privateKey", json!({"armored": false}));
        assert!(matches!(
            private_key(&source, "privateKey").await,
            Err(Error::KeyNotFound(_))
        ));
    }
}

//! Typed connection roles and the registry resolving them to settings.
//!
//! Task parameters reference connections by role rather than by free-form
//! id string, so a typo becomes a build-time error instead of a failed run.
//! The registry itself is only a description: credentials storage and
//! authentication stay with the external connection store.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The role a connection plays in a warehouse loading workflow
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionRole {
    /// Relational source system the staging tasks read from
    Source,
    /// Warehouse database holding per-run staging tables
    StagingWarehouse,
    /// Warehouse database holding the raw datavault
    VaultWarehouse,
    /// Warehouse connection with rights to create databases
    WarehouseAdmin,
}

impl fmt::Display for ConnectionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionRole::Source => "source",
            ConnectionRole::StagingWarehouse => "staging_warehouse",
            ConnectionRole::VaultWarehouse => "vault_warehouse",
            ConnectionRole::WarehouseAdmin => "warehouse_admin",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionKind {
    Postgres,
    HiveCli,
}

/// Connection settings as the external connection store expects them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionSettings {
    /// Identifier under which the external store knows this connection
    pub id: String,
    pub kind: ConnectionKind,
    pub host: String,
    pub port: u16,
    pub schema: String,
    pub login: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Driver-specific options, stored verbatim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<serde_json::Value>,
}

/// Maps connection roles to concrete settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectionRegistry {
    connections: BTreeMap<ConnectionRole, ConnectionSettings>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry matching the adventureworks example environment
    pub fn defaults() -> Self {
        let mut registry = Self::new();
        registry.insert(
            ConnectionRole::Source,
            ConnectionSettings {
                id: "adventureworks".to_string(),
                kind: ConnectionKind::Postgres,
                host: "postgres".to_string(),
                port: 5432,
                schema: "adventureworks".to_string(),
                login: "oltp_read".to_string(),
                password: Some("oltp_read".to_string()),
                extra: None,
            },
        );
        registry.insert(
            ConnectionRole::WarehouseAdmin,
            hive_connection("hive_default", "default"),
        );
        registry.insert(
            ConnectionRole::StagingWarehouse,
            hive_connection("hive_advworks_staging", "advworks_staging"),
        );
        registry.insert(
            ConnectionRole::VaultWarehouse,
            hive_connection("hive_datavault_raw", "dv_raw"),
        );
        registry
    }

    pub fn insert(&mut self, role: ConnectionRole, settings: ConnectionSettings) {
        self.connections.insert(role, settings);
    }

    pub fn get(&self, role: ConnectionRole) -> Result<&ConnectionSettings> {
        self.connections
            .get(&role)
            .ok_or(Error::UnknownConnection(role))
    }

    /// Connection id the external store resolves for this role
    pub fn conn_id(&self, role: ConnectionRole) -> Result<&str> {
        self.get(role).map(|settings| settings.id.as_str())
    }

    pub fn roles(&self) -> impl Iterator<Item = (&ConnectionRole, &ConnectionSettings)> {
        self.connections.iter()
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_yaml()?)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }
}

fn hive_connection(id: &str, schema: &str) -> ConnectionSettings {
    ConnectionSettings {
        id: id.to_string(),
        kind: ConnectionKind::HiveCli,
        host: "hive".to_string(),
        port: 10000,
        schema: schema.to_string(),
        login: "cloudera".to_string(),
        password: Some("cloudera".to_string()),
        extra: Some(serde_json::json!({
            "hive_cli_params": "",
            "auth": "none",
            "use_beeline": "true",
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_all_roles() {
        let registry = ConnectionRegistry::defaults();
        assert_eq!(registry.len(), 4);
        for role in [
            ConnectionRole::Source,
            ConnectionRole::StagingWarehouse,
            ConnectionRole::VaultWarehouse,
            ConnectionRole::WarehouseAdmin,
        ] {
            assert!(registry.get(role).is_ok());
        }
    }

    #[test]
    fn test_conn_id_resolution() {
        let registry = ConnectionRegistry::defaults();
        assert_eq!(registry.conn_id(ConnectionRole::Source).unwrap(), "adventureworks");
        assert_eq!(
            registry.conn_id(ConnectionRole::StagingWarehouse).unwrap(),
            "hive_advworks_staging"
        );
        assert_eq!(
            registry.conn_id(ConnectionRole::VaultWarehouse).unwrap(),
            "hive_datavault_raw"
        );
    }

    #[test]
    fn test_missing_role_is_an_error() {
        let registry = ConnectionRegistry::new();
        let err = registry.get(ConnectionRole::Source).unwrap_err();
        assert!(err.to_string().contains("source"));
    }

    #[test]
    fn test_yaml_roundtrip() {
        let registry = ConnectionRegistry::defaults();
        let yaml = registry.to_yaml().unwrap();
        assert!(yaml.contains("hive_datavault_raw"));
        let parsed: ConnectionRegistry = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, registry);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("connections.yaml");

        let registry = ConnectionRegistry::defaults();
        registry.save(&path).unwrap();

        let loaded = ConnectionRegistry::load(&path).unwrap();
        assert_eq!(loaded, registry);
        assert!(!loaded.is_empty());
    }

    #[test]
    fn test_source_is_postgres() {
        let registry = ConnectionRegistry::defaults();
        let source = registry.get(ConnectionRole::Source).unwrap();
        assert_eq!(source.kind, ConnectionKind::Postgres);
        assert_eq!(source.port, 5432);
    }
}

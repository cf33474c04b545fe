//! Declarative DAG specifications.
//!
//! A `DagSpec` is the data-only twin of a programmatic [`DagBuilder`]
//! assembly: a YAML or JSON document enumerating the per-phase (file,
//! table) pairs plus the schedule block. Building a spec drives the same
//! builder, so both surfaces produce identical graph shapes.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::ScheduleConfig;
use crate::dag::builder::DagBuilder;
use crate::dag::graph::VaultDag;
use crate::error::Result;

/// One staging entry: extraction query and target table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagingEntry {
    pub sql: PathBuf,
    pub table: String,
    /// Overrides the DAG-wide record source for this table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_source: Option<String>,
}

/// One hub/link/satellite entry: load script and target table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadEntry {
    pub hql: PathBuf,
    pub table: String,
}

/// Declarative description of one datavault loading DAG
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DagSpec {
    pub dag: String,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    pub record_source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vault_schema: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_suffix: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub staging: Vec<StagingEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hubs: Vec<LoadEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<LoadEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub satellites: Vec<LoadEntry>,
}

impl DagSpec {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let spec = Self::from_yaml(&content)?;
        tracing::debug!("loaded dag spec '{}' from {}", spec.dag, path.display());
        Ok(spec)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Assemble the graph this spec describes
    pub fn build(&self) -> Result<VaultDag> {
        let mut builder = DagBuilder::new(
            self.dag.clone(),
            self.schedule.clone(),
            self.record_source.clone(),
        );

        if let Some(schema) = &self.vault_schema {
            builder = builder.vault_schema(schema.clone());
        }
        if let Some(suffix) = &self.table_suffix {
            builder = builder.table_suffix(suffix.clone());
        }

        for entry in &self.staging {
            builder = match &entry.record_source {
                Some(source) => {
                    builder.stage_table_as(entry.sql.clone(), &entry.table, source.clone())
                }
                None => builder.stage_table(entry.sql.clone(), &entry.table),
            };
        }
        for entry in &self.hubs {
            builder = builder.load_hub(entry.hql.clone(), &entry.table);
        }
        for entry in &self.links {
            builder = builder.load_link(entry.hql.clone(), &entry.table);
        }
        for entry in &self.satellites {
            builder = builder.load_satellite(entry.hql.clone(), &entry.table);
        }

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Interval;

    const SPEC: &str = r#"
dag: minimal_vault
schedule:
  owner: airflow
  start_days_ago: 1
  interval: "@daily"
  depends_on_past: true
  provide_context: true
  timeout_minutes: 60
  max_active_runs: 1
record_source: example.source
staging:
  - sql: staging/person.sql
    table: person
hubs:
  - hql: loading/hub_person.hql
    table: hub_person
satellites:
  - hql: loading/sat_person.hql
    table: sat_person
"#;

    #[test]
    fn test_parse_spec() {
        let spec = DagSpec::from_yaml(SPEC).unwrap();
        assert_eq!(spec.dag, "minimal_vault");
        assert_eq!(spec.schedule.interval, Interval::Daily);
        assert!(spec.schedule.depends_on_past);
        assert_eq!(spec.staging.len(), 1);
        assert_eq!(spec.hubs.len(), 1);
        assert!(spec.links.is_empty());
        assert_eq!(spec.satellites.len(), 1);
    }

    #[test]
    fn test_build_spec() {
        let dag = DagSpec::from_yaml(SPEC).unwrap().build().unwrap();

        // 4 barriers + 3 tasks
        assert_eq!(dag.task_count(), 7);
        assert!(dag.has_edge("stg_person", "staging_done"));
        assert!(dag.has_edge("staging_done", "hub_person"));
        assert!(dag.has_edge("hub_person", "hubs_done"));
        assert!(dag.has_edge("links_done", "sat_person"));
    }

    #[test]
    fn test_spec_matches_programmatic_builder() {
        let from_spec = DagSpec::from_yaml(SPEC).unwrap().build().unwrap();

        let schedule = ScheduleConfig {
            depends_on_past: true,
            timeout_minutes: Some(60),
            ..ScheduleConfig::default()
        };
        let programmatic = DagBuilder::new("minimal_vault", schedule, "example.source")
            .stage_table("staging/person.sql", "person")
            .load_hub("loading/hub_person.hql", "hub_person")
            .load_satellite("loading/sat_person.hql", "sat_person")
            .build()
            .unwrap();

        assert_eq!(from_spec.task_count(), programmatic.task_count());
        assert_eq!(from_spec.edge_count(), programmatic.edge_count());
        for task in programmatic.tasks() {
            assert_eq!(from_spec.get_task(&task.id), Some(task));
        }
    }

    #[test]
    fn test_spec_yaml_roundtrip() {
        let spec = DagSpec::from_yaml(SPEC).unwrap();
        let yaml = spec.to_yaml().unwrap();
        let parsed = DagSpec::from_yaml(&yaml).unwrap();
        assert_eq!(parsed, spec);
    }
}

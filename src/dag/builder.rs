//! Phase-aware DAG builder, the construction pattern every workflow
//! definition goes through.
//!
//! The builder creates the four phase barriers up front, chains them, and
//! exposes one factory per phase. Each factory call registers one task and
//! wires it to the barrier of the preceding phase (staging has none) and to
//! the barrier of its own phase, so tasks of one phase run concurrently
//! while phases stay strictly ordered.

use std::path::PathBuf;

use crate::config::ScheduleConfig;
use crate::connections::ConnectionRole;
use crate::dag::graph::VaultDag;
use crate::dag::phase::Phase;
use crate::dag::task::{ScriptRef, Task, TaskKind, LOAD_DTM, RUN_TS_SUFFIX};
use crate::error::{Error, Result};

/// Schema holding the raw datavault tables
pub const DEFAULT_VAULT_SCHEMA: &str = "dv_raw";

/// Builds one datavault loading DAG.
///
/// Factory calls are infallible and chainable; wiring problems (duplicate
/// ids, unknown tasks) are collected and surfaced by [`DagBuilder::build`].
pub struct DagBuilder {
    dag: VaultDag,
    record_source: String,
    vault_schema: String,
    table_suffix: String,
    errors: Vec<Error>,
}

impl DagBuilder {
    /// Create a builder with the four chained phase barriers in place
    pub fn new(
        dag_id: impl Into<String>,
        schedule: ScheduleConfig,
        record_source: impl Into<String>,
    ) -> Self {
        let mut builder = Self {
            dag: VaultDag::new(dag_id, schedule),
            record_source: record_source.into(),
            vault_schema: DEFAULT_VAULT_SCHEMA.to_string(),
            table_suffix: RUN_TS_SUFFIX.to_string(),
            errors: vec![],
        };

        for phase in Phase::ALL {
            builder.insert(Task::barrier(phase));
            if let Some(prev) = phase.predecessor() {
                builder.wire(prev.barrier_id(), phase.barrier_id());
            }
        }

        builder
    }

    /// Override the warehouse schema for hub/link/satellite loads
    pub fn vault_schema(mut self, schema: impl Into<String>) -> Self {
        self.vault_schema = schema.into();
        self
    }

    /// Override the run-timestamp suffix appended to staging table names
    pub fn table_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.table_suffix = suffix.into();
        self
    }

    /// Stage one source table, using the DAG-wide record source
    pub fn stage_table(self, sql: impl Into<PathBuf>, table: &str) -> Self {
        let record_source = self.record_source.clone();
        self.stage_table_as(sql, table, record_source)
    }

    /// Stage one source table under an explicit record source label
    pub fn stage_table_as(
        mut self,
        sql: impl Into<PathBuf>,
        table: &str,
        record_source: impl Into<String>,
    ) -> Self {
        let id = format!("stg_{}", table);
        let task = Task {
            id: id.clone(),
            kind: TaskKind::StageTable {
                sql: sql.into(),
                target_table: format!("{}_{}", table, self.table_suffix),
                source: ConnectionRole::Source,
                warehouse: ConnectionRole::StagingWarehouse,
                create: true,
                recreate: true,
                record_source: record_source.into(),
                load_dtm: LOAD_DTM.to_string(),
            },
            phase: Some(Phase::Staging),
        };

        self.insert(task);
        self.wire(&id, Phase::Staging.barrier_id());
        self
    }

    /// Load a hub table from the staged data
    pub fn load_hub(self, hql: impl Into<PathBuf>, table: &str) -> Self {
        self.load(Phase::Hubs, hql, table)
    }

    /// Load a link table, gated by the hub barrier
    pub fn load_link(self, hql: impl Into<PathBuf>, table: &str) -> Self {
        self.load(Phase::Links, hql, table)
    }

    /// Load a satellite table, gated by the link barrier
    pub fn load_satellite(self, hql: impl Into<PathBuf>, table: &str) -> Self {
        self.load(Phase::Satellites, hql, table)
    }

    fn load(mut self, phase: Phase, hql: impl Into<PathBuf>, table: &str) -> Self {
        let task = Task {
            id: table.to_string(),
            kind: TaskKind::Query {
                script: ScriptRef::File(hql.into()),
                schema: self.vault_schema.clone(),
                warehouse: ConnectionRole::VaultWarehouse,
            },
            phase: Some(phase),
        };

        self.insert(task);
        if let Some(prev) = phase.predecessor() {
            self.wire(prev.barrier_id(), table);
        }
        self.wire(table, phase.barrier_id());
        self
    }

    /// Finish construction, surfacing the first wiring error and verifying
    /// the edge set is acyclic
    pub fn build(mut self) -> Result<VaultDag> {
        if !self.errors.is_empty() {
            return Err(self.errors.remove(0));
        }

        self.dag.execution_order()?;

        tracing::debug!(
            "built dag '{}': {} tasks, {} edges",
            self.dag.id(),
            self.dag.task_count(),
            self.dag.edge_count()
        );

        Ok(self.dag)
    }

    fn insert(&mut self, task: Task) {
        if let Err(err) = self.dag.add_task(task) {
            self.errors.push(err);
        }
    }

    fn wire(&mut self, from: &str, to: &str) {
        if let Err(err) = self.dag.add_edge(from, to) {
            self.errors.push(err);
        }
    }
}

//! Task model: a node in the workflow graph plus the parameters its
//! external operator consumes.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::connections::ConnectionRole;
use crate::dag::phase::Phase;

/// Run-timestamp placeholder appended to staging table names, expanded by
/// the external engine's templating at execution time
pub const RUN_TS_SUFFIX: &str = "{{ts_nodash}}";

/// Date-only variant of [`RUN_TS_SUFFIX`]
pub const RUN_DS_SUFFIX: &str = "{{ds_nodash}}";

/// Load timestamp placeholder recorded on every staged row
pub const LOAD_DTM: &str = "{{execution_date}}";

/// A SQL/HQL statement reference: either a template file resolved against
/// the DAG's search path, or an inline statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptRef {
    File(PathBuf),
    Inline(String),
}

impl ScriptRef {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        ScriptRef::File(path.into())
    }

    pub fn inline(statement: impl Into<String>) -> Self {
        ScriptRef::Inline(statement.into())
    }

    pub fn as_file(&self) -> Option<&Path> {
        match self {
            ScriptRef::File(path) => Some(path),
            ScriptRef::Inline(_) => None,
        }
    }
}

/// Operator kind plus the parameters handed to it.
///
/// Every failure mode behind these parameters (missing file, bad query,
/// connection refused) surfaces at execution time in the external
/// operator, never at graph construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operator", rename_all = "snake_case")]
pub enum TaskKind {
    /// Synchronization no-op, executed by the engine's dummy operator
    Barrier,
    /// Stage one relational table into a per-run columnar table
    StageTable {
        /// Extraction query file, relative to the search path
        sql: PathBuf,
        /// Destination table name, carrying the run-timestamp placeholder
        target_table: String,
        source: ConnectionRole,
        warehouse: ConnectionRole,
        create: bool,
        recreate: bool,
        record_source: String,
        load_dtm: String,
    },
    /// Run a query file or inline statement in the warehouse
    Query {
        script: ScriptRef,
        schema: String,
        warehouse: ConnectionRole,
    },
}

impl TaskKind {
    /// Short operator name for display and manifests
    pub fn operator_name(&self) -> &'static str {
        match self {
            TaskKind::Barrier => "barrier",
            TaskKind::StageTable { .. } => "stage_table",
            TaskKind::Query { .. } => "query",
        }
    }
}

/// A single node of a workflow DAG.
///
/// Tasks are created once at graph assembly and never mutated; the whole
/// graph is rebuilt on every parse cycle of the external scheduler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique id within the DAG
    pub id: String,
    #[serde(flatten)]
    pub kind: TaskKind,
    /// Loading phase for factory-created tasks, `None` for tasks wired by
    /// hand (the init workflow)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<Phase>,
}

impl Task {
    /// Barrier task closing the given phase
    pub fn barrier(phase: Phase) -> Self {
        Self {
            id: phase.barrier_id().to_string(),
            kind: TaskKind::Barrier,
            phase: Some(phase),
        }
    }

    /// Ad-hoc synchronization point outside the phase convention
    pub fn checkpoint(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: TaskKind::Barrier,
            phase: None,
        }
    }

    /// Query-execution task
    pub fn query(
        id: impl Into<String>,
        script: ScriptRef,
        schema: impl Into<String>,
        warehouse: ConnectionRole,
    ) -> Self {
        Self {
            id: id.into(),
            kind: TaskKind::Query {
                script,
                schema: schema.into(),
                warehouse,
            },
            phase: None,
        }
    }

    pub fn with_phase(mut self, phase: Phase) -> Self {
        self.phase = Some(phase);
        self
    }

    pub fn is_barrier(&self) -> bool {
        matches!(self.kind, TaskKind::Barrier)
    }

    /// Script file this task references, if any
    pub fn script_file(&self) -> Option<&Path> {
        match &self.kind {
            TaskKind::Barrier => None,
            TaskKind::StageTable { sql, .. } => Some(sql),
            TaskKind::Query { script, .. } => script.as_file(),
        }
    }
}

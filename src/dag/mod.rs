mod builder;
mod graph;
mod phase;
mod spec;
mod task;

pub use builder::{DagBuilder, DEFAULT_VAULT_SCHEMA};
pub use graph::{DagState, DagStats, Edge, VaultDag};
pub use phase::Phase;
pub use spec::{DagSpec, LoadEntry, StagingEntry};
pub use task::{ScriptRef, Task, TaskKind, LOAD_DTM, RUN_DS_SUFFIX, RUN_TS_SUFFIX};

pub mod config;
pub mod connections;
pub mod dag;
pub mod definitions;
pub mod error;

pub use config::{Interval, ScheduleConfig, SearchPath};
pub use connections::{ConnectionKind, ConnectionRegistry, ConnectionRole, ConnectionSettings};
pub use dag::{
    DagBuilder, DagSpec, DagState, DagStats, Edge, Phase, ScriptRef, Task, TaskKind, VaultDag,
};
pub use error::{Error, Result};

//! Staging-only workflow for the sales source tables.
//!
//! Runs the data movement without any vault loading; the search path comes
//! from the engine's variable store and the staging tables are suffixed
//! per day instead of per run.

use crate::config::{ScheduleConfig, SearchPath};
use crate::dag::{DagBuilder, VaultDag, RUN_DS_SUFFIX};
use crate::error::Result;

pub const DAG_ID: &str = "adventureworks_staging";

pub fn dag() -> Result<VaultDag> {
    let schedule = ScheduleConfig {
        start_days_ago: 7,
        timeout_minutes: Some(60),
        search_path: Some(SearchPath::Variable("sql_path".into())),
        ..ScheduleConfig::default()
    };

    DagBuilder::new(DAG_ID, schedule, "adventureworks")
        .table_suffix(RUN_DS_SUFFIX)
        .stage_table("staging/salesorderheader.sql", "salesorderheader")
        .stage_table("staging/salesreason.sql", "salesreason")
        .stage_table("staging/salesorderheadersalesreason.sql", "salesorderheadersalesreason")
        .stage_table("staging/salesorderdetail.sql", "salesorderdetail")
        .stage_table("staging/product.sql", "product")
        .build()
}

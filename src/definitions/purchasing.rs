//! Purchasing domain: ship methods.

use crate::config::{ScheduleConfig, SearchPath};
use crate::dag::{DagBuilder, VaultDag};
use crate::error::Result;

pub const DAG_ID: &str = "adventureworks_purchasing";

pub fn dag() -> Result<VaultDag> {
    let schedule = ScheduleConfig {
        start_days_ago: 1,
        depends_on_past: true,
        timeout_minutes: Some(60),
        search_path: Some(SearchPath::Path("/usr/local/airflow/sql".into())),
        ..ScheduleConfig::default()
    };

    DagBuilder::new(DAG_ID, schedule, "adventureworks.purchasing")
        .stage_table("staging/shipmethod.sql", "shipmethod")
        .load_hub("loading/hub_shipmethod.hql", "hub_shipmethod")
        .load_satellite("loading/sat_shipmethod.hql", "sat_shipmethod")
        .build()
}

//! Sales domain: orders, order details and special offers.

use crate::config::{ScheduleConfig, SearchPath};
use crate::dag::{DagBuilder, VaultDag};
use crate::error::Result;

pub const DAG_ID: &str = "adventureworks_sales";

pub fn dag() -> Result<VaultDag> {
    let schedule = ScheduleConfig {
        start_days_ago: 7,
        depends_on_past: true,
        timeout_minutes: Some(60),
        search_path: Some(SearchPath::Path("/usr/local/airflow/sql".into())),
        ..ScheduleConfig::default()
    };

    DagBuilder::new(DAG_ID, schedule, "adventureworks.sales")
        // staging
        .stage_table("staging/salesorderheader.sql", "salesorderheader")
        .stage_table("staging/salesreason.sql", "salesreason")
        .stage_table("staging/salesorderheadersalesreason.sql", "salesorderheadersalesreason")
        .stage_table("staging/salesorderdetail.sql", "salesorderdetail")
        .stage_table("staging/specialoffer.sql", "specialoffer")
        // hubs
        .load_hub("loading/hub_salesorder.hql", "hub_salesorder")
        .load_hub("loading/hub_specialoffer.hql", "hub_specialoffer")
        // links
        .load_link("loading/link_salesorderdetail.hql", "link_salesorderdetail")
        .build()
}

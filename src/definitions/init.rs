//! Run-once provisioning workflow: creates the staging and vault databases
//! and the datavault tables themselves.
//!
//! This one is wired by hand against [`VaultDag`] rather than through the
//! phase factories: DDL creation has its own shape (database creation
//! first, then table groups behind ad-hoc checkpoints). Connection
//! registration itself lives in [`crate::connections::ConnectionRegistry`],
//! not in a task.

use crate::config::{Interval, ScheduleConfig, SearchPath};
use crate::connections::ConnectionRole;
use crate::dag::{ScriptRef, Task, VaultDag, DEFAULT_VAULT_SCHEMA};
use crate::error::Result;

pub const DAG_ID: &str = "init_datavault2_example";

const STAGING_DATABASE: &str = "advworks_staging";

pub fn dag() -> Result<VaultDag> {
    let schedule = ScheduleConfig {
        start_days_ago: 7,
        interval: Interval::Once,
        search_path: Some(SearchPath::Path("/usr/local/airflow/sql".into())),
        ..ScheduleConfig::default()
    };

    let mut dag = VaultDag::new(DAG_ID, schedule);

    dag.add_task(Task::query(
        "create_stg_database",
        ScriptRef::inline(format!(
            "CREATE DATABASE IF NOT EXISTS {}",
            STAGING_DATABASE
        )),
        "default",
        ConnectionRole::WarehouseAdmin,
    ))?;
    dag.add_task(Task::query(
        "create_dv_database",
        ScriptRef::inline(format!(
            "CREATE DATABASE IF NOT EXISTS {}",
            DEFAULT_VAULT_SCHEMA
        )),
        "default",
        ConnectionRole::WarehouseAdmin,
    ))?;
    dag.add_edge("create_stg_database", "create_dv_database")?;

    dag.add_task(Task::checkpoint("hubs_done"))?;
    dag.add_task(Task::checkpoint("links_done"))?;
    dag.add_task(Task::checkpoint("all_done"))?;

    // hubs
    create_table(&mut dag, "ddl/hub_salesorder.hql", "hub_salesorder", "create_dv_database", "hubs_done")?;
    create_table(&mut dag, "ddl/hub_specialoffer.hql", "hub_specialoffer", "create_dv_database", "hubs_done")?;
    create_table(&mut dag, "ddl/hub_product.hql", "hub_product", "create_dv_database", "hubs_done")?;

    // links
    create_table(&mut dag, "ddl/link_salesorderdetail.hql", "link_salesorderdetail", "hubs_done", "links_done")?;

    // satellites
    create_table(&mut dag, "ddl/sat_salesorderdetail.hql", "sat_salesorderdetail", "links_done", "all_done")?;
    create_table(&mut dag, "ddl/sat_salesorder.hql", "sat_salesorder", "links_done", "all_done")?;

    dag.execution_order()?;
    Ok(dag)
}

fn create_table(
    dag: &mut VaultDag,
    hql: &str,
    table: &str,
    upstream: &str,
    downstream: &str,
) -> Result<()> {
    let id = format!("table_{}", table);
    dag.add_task(Task::query(
        &id,
        ScriptRef::file(hql),
        DEFAULT_VAULT_SCHEMA,
        ConnectionRole::VaultWarehouse,
    ))?;
    dag.add_edge(upstream, &id)?;
    dag.add_edge(&id, downstream)?;
    Ok(())
}

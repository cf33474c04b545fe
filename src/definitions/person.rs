//! Person domain: addresses, persons and the region reference data.

use crate::config::{ScheduleConfig, SearchPath};
use crate::dag::{DagBuilder, VaultDag};
use crate::error::Result;

pub const DAG_ID: &str = "adventureworks_person";

pub fn dag() -> Result<VaultDag> {
    let schedule = ScheduleConfig {
        start_days_ago: 1,
        // Chronological order matters when loading the datavault
        depends_on_past: true,
        timeout_minutes: Some(60),
        search_path: Some(SearchPath::Path("/usr/local/airflow/sql".into())),
        ..ScheduleConfig::default()
    };

    DagBuilder::new(DAG_ID, schedule, "adventureworks.person")
        // staging
        .stage_table("staging/address.sql", "address")
        .stage_table("staging/countryregion.sql", "countryregion")
        .stage_table("staging/person.sql", "person")
        .stage_table("staging/stateprovince.sql", "stateprovince")
        // hubs
        .load_hub("loading/hub_address.hql", "hub_address")
        .load_hub("loading/ref_countryregion.hql", "ref_countryregion")
        .load_hub("loading/hub_person.hql", "hub_person")
        // links
        .load_link("loading/link_address_stateprovince.hql", "link_address_stateprovince")
        // satellites
        .load_satellite("loading/sat_address.hql", "sat_address")
        .load_satellite("loading/sat_person.hql", "sat_person")
        .build()
}

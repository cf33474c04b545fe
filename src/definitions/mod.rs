//! The concrete workflow definitions shipped with this crate, one module
//! per DAG, plus the registry the CLI works against.

pub mod init;
pub mod person;
pub mod purchasing;
pub mod sales;
pub mod staging;

use crate::dag::VaultDag;
use crate::error::{Error, Result};

/// Ids of every shipped definition, in registry order
pub fn ids() -> [&'static str; 5] {
    [
        init::DAG_ID,
        staging::DAG_ID,
        person::DAG_ID,
        sales::DAG_ID,
        purchasing::DAG_ID,
    ]
}

/// Assemble every shipped definition
pub fn all() -> Result<Vec<VaultDag>> {
    Ok(vec![
        init::dag()?,
        staging::dag()?,
        person::dag()?,
        sales::dag()?,
        purchasing::dag()?,
    ])
}

/// Assemble one definition by DAG id
pub fn by_id(id: &str) -> Result<VaultDag> {
    match id {
        _ if id == init::DAG_ID => init::dag(),
        _ if id == staging::DAG_ID => staging::dag(),
        _ if id == person::DAG_ID => person::dag(),
        _ if id == sales::DAG_ID => sales::dag(),
        _ if id == purchasing::DAG_ID => purchasing::dag(),
        _ => Err(Error::UnknownDag(id.to_string())),
    }
}

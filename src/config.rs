//! Declarative scheduling configuration handed to the external scheduler.
//!
//! Nothing here is interpreted by this crate beyond serialization: the
//! orchestration engine owns scheduling, retries and timeouts. The fields
//! mirror what the engine accepts per DAG.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Scheduling interval preset, or a raw cron expression
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Interval {
    /// Run exactly once after the start date
    Once,
    Hourly,
    Daily,
    /// Raw cron expression, passed through to the scheduler unparsed
    Cron(String),
}

impl From<String> for Interval {
    fn from(s: String) -> Self {
        match s.as_str() {
            "@once" => Interval::Once,
            "@hourly" => Interval::Hourly,
            "@daily" => Interval::Daily,
            _ => Interval::Cron(s),
        }
    }
}

impl From<Interval> for String {
    fn from(interval: Interval) -> Self {
        interval.to_string()
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interval::Once => write!(f, "@once"),
            Interval::Hourly => write!(f, "@hourly"),
            Interval::Daily => write!(f, "@daily"),
            Interval::Cron(expr) => write!(f, "{}", expr),
        }
    }
}

/// Where the external engine should look for SQL/HQL template files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchPath {
    /// Fixed filesystem path on the scheduler host
    Path(PathBuf),
    /// Named variable resolved by the engine's variable store at parse time
    Variable(String),
}

/// Per-DAG configuration block consumed by the external scheduler.
///
/// Every field is optional in serialized form and falls back to
/// [`ScheduleConfig::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub owner: String,
    /// Start date expressed as days before the current parse time
    pub start_days_ago: i64,
    pub interval: Interval,
    /// Chronological ordering: a run waits for the previous run to succeed.
    /// Required when loading the datavault so history stays in order.
    pub depends_on_past: bool,
    pub provide_context: bool,
    /// Run timeout in minutes, unlimited when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_minutes: Option<u64>,
    /// Serialized as a single-entry map (`path: ...` or `variable: ...`)
    /// in both YAML and JSON
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_yaml::with::singleton_map_recursive"
    )]
    pub search_path: Option<SearchPath>,
    pub max_active_runs: u32,
}

impl ScheduleConfig {
    /// Concrete start date at the moment of export
    pub fn start_date(&self) -> DateTime<Utc> {
        Utc::now() - Duration::days(self.start_days_ago)
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            owner: "airflow".to_string(),
            start_days_ago: 1,
            interval: Interval::Daily,
            depends_on_past: false,
            provide_context: true,
            timeout_minutes: None,
            search_path: None,
            max_active_runs: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_presets_roundtrip() {
        for (text, interval) in [
            ("@once", Interval::Once),
            ("@hourly", Interval::Hourly),
            ("@daily", Interval::Daily),
        ] {
            assert_eq!(Interval::from(text.to_string()), interval);
            assert_eq!(interval.to_string(), text);
        }
    }

    #[test]
    fn test_interval_cron_passthrough() {
        let interval = Interval::from("0 4 * * *".to_string());
        assert_eq!(interval, Interval::Cron("0 4 * * *".to_string()));
        assert_eq!(interval.to_string(), "0 4 * * *");
    }

    #[test]
    fn test_interval_serde_as_string() {
        let json = serde_json::to_string(&Interval::Daily).unwrap();
        assert_eq!(json, "\"@daily\"");
        let parsed: Interval = serde_json::from_str("\"@once\"").unwrap();
        assert_eq!(parsed, Interval::Once);
    }

    #[test]
    fn test_search_path_serde() {
        let config = ScheduleConfig {
            search_path: Some(SearchPath::Variable("sql_path".into())),
            ..ScheduleConfig::default()
        };
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(yaml.contains("variable: sql_path"));

        let parsed: ScheduleConfig = serde_yaml::from_str(
            "search_path:\n  path: /usr/local/airflow/sql\n",
        )
        .unwrap();
        assert_eq!(
            parsed.search_path,
            Some(SearchPath::Path(PathBuf::from("/usr/local/airflow/sql")))
        );
    }

    #[test]
    fn test_start_date_days_ago() {
        let config = ScheduleConfig {
            start_days_ago: 7,
            ..ScheduleConfig::default()
        };
        let elapsed = Utc::now() - config.start_date();
        assert_eq!(elapsed.num_days(), 7);
    }

    #[test]
    fn test_default_config() {
        let config = ScheduleConfig::default();
        assert_eq!(config.owner, "airflow");
        assert_eq!(config.interval, Interval::Daily);
        assert_eq!(config.max_active_runs, 1);
        assert!(!config.depends_on_past);
    }
}

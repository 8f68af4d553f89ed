use std::io::Read;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

pub(crate) fn read_rows<T, R>(reader: R) -> Result<Vec<T>, csv::Error>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    csv_reader.deserialize::<T>().collect()
}

#[derive(Debug, Deserialize)]
pub(crate) struct EmployeeRow {
    pub(crate) id: String,
    pub(crate) name: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) rank: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) is_admin: Option<String>,
}

impl EmployeeRow {
    pub(crate) fn admin(&self) -> bool {
        matches!(
            self.is_admin
                .as_deref()
                .map(|value| value.to_ascii_lowercase())
                .as_deref(),
            Some("true" | "yes" | "1")
        )
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct TaskTypeRow {
    pub(crate) name: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) points: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TaskRow {
    pub(crate) id: String,
    pub(crate) assignee: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) task_type: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) completed_at: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) override_points: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TargetRow {
    pub(crate) employee_id: String,
    pub(crate) month: String,
    pub(crate) target_points: String,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

/// Accepts RFC 3339, `YYYY-MM-DD HH:MM[:SS]`, or a bare date (midnight).
pub(crate) fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }

    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt);
        }
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

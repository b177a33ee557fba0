//! Health check records and the SQL that stores them.
//!
//! Records are append-only. Text is interpolated as quoted literals; the
//! table name is validated as a plain identifier by configuration.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local};

use crate::store::{quote_literal, Dialect, Row, Value};

/// Timestamp layout written into records.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Observed liveness of a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Unhealthy => "unhealthy",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HealthStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "healthy" => Ok(HealthStatus::Healthy),
            "unhealthy" => Ok(HealthStatus::Unhealthy),
            other => Err(format!("unknown health status '{}'", other)),
        }
    }
}

/// One health fact: a region's observed liveness at a point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthCheckRecord {
    pub timestamp: String,
    pub region: String,
    pub status: HealthStatus,
    pub message: String,
}

impl HealthCheckRecord {
    /// A healthy record stamped with `now`.
    pub fn healthy_at(region: &str, now: DateTime<Local>) -> Self {
        let timestamp = now.format(TIMESTAMP_FORMAT).to_string();
        Self {
            message: format!("Health check at {}", timestamp),
            timestamp,
            region: region.to_string(),
            status: HealthStatus::Healthy,
        }
    }

    /// The record inserted when the schema is first initialized.
    pub fn seed(region: &str, now: DateTime<Local>) -> Self {
        Self {
            timestamp: now.format(TIMESTAMP_FORMAT).to_string(),
            region: region.to_string(),
            status: HealthStatus::Healthy,
            message: "Initial setup complete".to_string(),
        }
    }

    /// Rebuild a record from a row of [`recent_sql`].
    pub fn from_row(row: &Row) -> Option<Self> {
        let text = |column: &str| match row.get_named(column)? {
            Value::Null => None,
            value => Some(value.to_string()),
        };
        Some(Self {
            timestamp: text("timestamp")?,
            region: text("region")?,
            status: text("status")?.parse().ok()?,
            message: text("message").unwrap_or_default(),
        })
    }
}

impl fmt::Display for HealthCheckRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {} | {}", self.timestamp, self.region, self.status)
    }
}

/// DDL creating the record table if it does not exist.
pub fn create_table_sql(dialect: Dialect, table: &str) -> String {
    match dialect {
        Dialect::Postgres => format!(
            "CREATE TABLE IF NOT EXISTS {} (\
             id SERIAL PRIMARY KEY, \
             timestamp TIMESTAMP DEFAULT CURRENT_TIMESTAMP, \
             region VARCHAR(50), \
             status VARCHAR(20), \
             message TEXT)",
            table
        ),
        Dialect::Sqlite => format!(
            "CREATE TABLE IF NOT EXISTS {} (\
             id INTEGER PRIMARY KEY AUTOINCREMENT, \
             timestamp TEXT DEFAULT CURRENT_TIMESTAMP, \
             region TEXT, \
             status TEXT, \
             message TEXT)",
            table
        ),
    }
}

pub fn insert_sql(table: &str, record: &HealthCheckRecord) -> String {
    format!(
        "INSERT INTO {} (timestamp, region, status, message) VALUES ({}, {}, {}, {})",
        table,
        quote_literal(&record.timestamp),
        quote_literal(&record.region),
        quote_literal(record.status.as_str()),
        quote_literal(&record.message),
    )
}

/// Newest first; `id` breaks ties within the same second.
pub fn recent_sql(table: &str, limit: u32) -> String {
    format!(
        "SELECT timestamp, region, status, message FROM {} \
         ORDER BY timestamp DESC, id DESC LIMIT {}",
        table, limit
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 10, 15, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_healthy_record() {
        let record = HealthCheckRecord::healthy_at("us-east-1", fixed_now());
        assert_eq!(record.timestamp, "2026-10-15 09:30:00");
        assert_eq!(record.message, "Health check at 2026-10-15 09:30:00");
        assert_eq!(record.to_string(), "2026-10-15 09:30:00 | us-east-1 | healthy");
    }

    #[test]
    fn test_insert_quotes_text() {
        let mut record = HealthCheckRecord::seed("o'hare", fixed_now());
        record.message = "it's fine".to_string();
        let sql = insert_sql("health_check", &record);
        assert!(sql.contains("'o''hare'"));
        assert!(sql.contains("'it''s fine'"));
        assert!(sql.starts_with("INSERT INTO health_check"));
    }

    #[test]
    fn test_dialect_ddl() {
        assert!(create_table_sql(Dialect::Postgres, "hc").contains("SERIAL PRIMARY KEY"));
        assert!(create_table_sql(Dialect::Sqlite, "hc").contains("AUTOINCREMENT"));
    }

    #[test]
    fn test_from_row() {
        let row = Row::new(
            vec!["timestamp".into(), "region".into(), "status".into(), "message".into()],
            vec![
                Value::Text("2026-10-15 09:30:00".into()),
                Value::Text("eu-west-1".into()),
                Value::Text("unhealthy".into()),
                Value::Null,
            ],
        );
        let record = HealthCheckRecord::from_row(&row).unwrap();
        assert_eq!(record.status, HealthStatus::Unhealthy);
        assert_eq!(record.message, "");

        let bad = Row::new(vec!["region".into()], vec![Value::Text("x".into())]);
        assert!(HealthCheckRecord::from_row(&bad).is_none());
    }
}

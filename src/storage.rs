use anyhow::{anyhow, Result};
use rusqlite::{params, Connection};
use serde::Serialize;

use crate::open_db_connection;
use crate::session::PostureEvent;

pub const DEFAULT_DB_FILE: &str = "statistics.db";

/// Aggregates for one local calendar day.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DailyStats {
    /// Local date, `YYYY-MM-DD`.
    pub date: String,
    pub total_checks: u64,
    pub good_posture_count: u64,
    /// Share of good checks, as a percentage.
    pub average_posture_score: f64,
    pub total_duration_secs: u64,
}

impl DailyStats {
    fn from_counts(date: String, total: i64, good: i64, duration: i64) -> Self {
        let total_checks = total.max(0) as u64;
        let good_posture_count = good.max(0) as u64;
        let average_posture_score = if total_checks > 0 {
            good_posture_count as f64 / total_checks as f64 * 100.0
        } else {
            0.0
        };
        Self {
            date,
            total_checks,
            good_posture_count,
            average_posture_score,
            total_duration_secs: duration.max(0) as u64,
        }
    }
}

pub trait StatisticsStore: Send {
    /// Append one event observed at `at_s` (seconds since epoch).
    fn record_event(&mut self, event: &PostureEvent, at_s: u64) -> Result<()>;

    /// Aggregates for the local calendar day containing `now_s`.
    fn daily_stats(&self, now_s: u64) -> Result<DailyStats>;

    /// One entry per local day with records, over the 7 days ending with the
    /// day containing `now_s`, oldest first.
    fn weekly_stats(&self, now_s: u64) -> Result<Vec<DailyStats>>;
}

pub struct SqliteStatisticsStore {
    conn: Connection,
}

impl SqliteStatisticsStore {
    pub fn open(db_path: &str) -> Result<Self> {
        let conn = open_db_connection(db_path)?;
        let mut store = Self { conn };
        store.ensure_schema()?;
        Ok(store)
    }

    fn ensure_schema(&mut self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;

            CREATE TABLE IF NOT EXISTS posture_records (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              timestamp INTEGER NOT NULL,
              is_good_posture INTEGER NOT NULL,
              duration INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_timestamp ON posture_records(timestamp);
            "#,
        )?;
        Ok(())
    }

    pub fn record_count(&self) -> Result<u64> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM posture_records", [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }
}

fn to_sql_time(epoch_s: u64) -> Result<i64> {
    i64::try_from(epoch_s).map_err(|_| anyhow!("timestamp exceeds i64 range"))
}

impl StatisticsStore for SqliteStatisticsStore {
    fn record_event(&mut self, event: &PostureEvent, at_s: u64) -> Result<()> {
        let duration = i64::try_from(event.duration_secs)
            .map_err(|_| anyhow!("event duration exceeds i64 range"))?;
        self.conn.execute(
            r#"
            INSERT INTO posture_records(timestamp, is_good_posture, duration)
            VALUES (?1, ?2, ?3)
            "#,
            params![to_sql_time(at_s)?, event.is_good_posture, duration],
        )?;
        Ok(())
    }

    fn daily_stats(&self, now_s: u64) -> Result<DailyStats> {
        let now = to_sql_time(now_s)?;
        let stats = self.conn.query_row(
            r#"
            SELECT date(?1, 'unixepoch', 'localtime'),
                   COUNT(*),
                   SUM(CASE WHEN is_good_posture THEN 1 ELSE 0 END),
                   SUM(duration)
            FROM posture_records
            WHERE date(timestamp, 'unixepoch', 'localtime') = date(?1, 'unixepoch', 'localtime')
            "#,
            params![now],
            |row| {
                let date: String = row.get(0)?;
                let total: i64 = row.get(1)?;
                let good: Option<i64> = row.get(2)?;
                let duration: Option<i64> = row.get(3)?;
                Ok(DailyStats::from_counts(
                    date,
                    total,
                    good.unwrap_or(0),
                    duration.unwrap_or(0),
                ))
            },
        )?;
        Ok(stats)
    }

    fn weekly_stats(&self, now_s: u64) -> Result<Vec<DailyStats>> {
        let now = to_sql_time(now_s)?;
        let mut stmt = self.conn.prepare(
            r#"
            SELECT date(timestamp, 'unixepoch', 'localtime') AS day,
                   COUNT(*),
                   SUM(CASE WHEN is_good_posture THEN 1 ELSE 0 END),
                   SUM(duration)
            FROM posture_records
            WHERE day >= date(?1, 'unixepoch', 'localtime', '-6 days')
              AND day <= date(?1, 'unixepoch', 'localtime')
            GROUP BY day
            ORDER BY day ASC
            "#,
        )?;
        let mut rows = stmt.query(params![now])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let date: String = row.get(0)?;
            let total: i64 = row.get(1)?;
            let good: Option<i64> = row.get(2)?;
            let duration: Option<i64> = row.get(3)?;
            out.push(DailyStats::from_counts(
                date,
                total,
                good.unwrap_or(0),
                duration.unwrap_or(0),
            ));
        }
        Ok(out)
    }
}

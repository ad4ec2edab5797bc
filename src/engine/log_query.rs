//! Exercise log queries: turns the optional `from`/`to`/`limit` parameters
//! into a store filter plus a row cap, and shapes the matching records into
//! the log response.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::db::{Exercise, ExerciseFilter, Store, StoreError, User};
use crate::engine::dates::display_date;

/// Row cap used when the caller gives no usable limit.
pub const DEFAULT_LOG_LIMIT: i64 = 5000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogQuery {
    pub filter: ExerciseFilter,
    pub limit: i64,
}

impl LogQuery {
    /// `user_id` must already be known to exist.
    pub fn build(
        user_id: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        limit: Option<&str>,
    ) -> Self {
        let mut filter = ExerciseFilter::for_user(user_id);
        if let Some(from) = from {
            filter = filter.from_date(from);
        }
        if let Some(to) = to {
            filter = filter.to_date(to);
        }

        Self {
            filter,
            limit: parse_limit(limit),
        }
    }

    pub async fn run(&self, store: &dyn Store, user: &User) -> Result<LogResponse, StoreError> {
        debug!(
            user_id = %self.filter.user_id,
            bounded = self.filter.has_date_bounds(),
            limit = self.limit,
            "fetching exercise log"
        );
        let exercises = store.find_exercises(&self.filter, self.limit).await?;
        Ok(shape_log(user, &exercises))
    }
}

/// Positive integers are taken as-is; anything else falls back to
/// [`DEFAULT_LOG_LIMIT`].
pub fn parse_limit(raw: Option<&str>) -> i64 {
    raw.and_then(|value| value.trim().parse::<i64>().ok())
        .filter(|limit| *limit > 0)
        .unwrap_or(DEFAULT_LOG_LIMIT)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub description: String,
    pub duration: i64,
    pub date: String,
}

impl From<&Exercise> for LogEntry {
    fn from(exercise: &Exercise) -> Self {
        Self {
            description: exercise.description.clone(),
            duration: exercise.duration,
            date: display_date(exercise.date),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogResponse {
    pub username: String,
    /// Entries actually returned, after the limit.
    pub count: usize,
    pub id: String,
    pub log: Vec<LogEntry>,
}

pub fn shape_log(user: &User, exercises: &[Exercise]) -> LogResponse {
    let log: Vec<LogEntry> = exercises.iter().map(LogEntry::from).collect();
    LogResponse {
        username: user.username.clone(),
        count: log.len(),
        id: user.id.clone(),
        log,
    }
}

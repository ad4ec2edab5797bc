use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite, SqlitePool, sqlite::SqlitePoolOptions};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::db::filter::ExerciseFilter;
use crate::db::models::{Exercise, NewExercise, User};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Persistence operations the HTTP layer depends on. Identifiers are
/// assigned by the store on insert.
#[async_trait]
pub trait Store: Send + Sync {
    async fn insert_user(&self, username: &str) -> Result<User, StoreError>;

    /// All users in creation order.
    async fn list_users(&self) -> Result<Vec<User>, StoreError>;

    async fn find_user(&self, id: &str) -> Result<Option<User>, StoreError>;

    async fn insert_exercise(&self, exercise: NewExercise) -> Result<Exercise, StoreError>;

    /// Exercises matching `filter` in insertion order, at most `limit` rows.
    async fn find_exercises(
        &self,
        filter: &ExerciseFilter,
        limit: i64,
    ) -> Result<Vec<Exercise>, StoreError>;
}

pub fn new_record_id() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        // Every connection to an in-memory database gets its own private
        // database, so the pool must hold exactly one that never expires.
        let in_memory = url.contains(":memory:") || url.contains("mode=memory");
        let options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(max_connections)
        };

        let pool = options.connect(url).await?;
        info!(in_memory, "connected to sqlite store");

        let store = Self { pool };
        store.create_tables().await?;
        Ok(store)
    }

    pub async fn create_tables(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                username TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS exercises (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                description TEXT NOT NULL,
                duration INTEGER NOT NULL,
                date TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS exercises_user_date ON exercises (user_id, date)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn insert_user(&self, username: &str) -> Result<User, StoreError> {
        let user = User {
            id: new_record_id(),
            username: username.to_string(),
        };

        sqlx::query("INSERT INTO users (id, username) VALUES (?, ?)")
            .bind(&user.id)
            .bind(&user.username)
            .execute(&self.pool)
            .await?;

        Ok(user)
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let users = sqlx::query_as::<_, User>("SELECT id, username FROM users ORDER BY rowid")
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn find_user(&self, id: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>("SELECT id, username FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn insert_exercise(&self, exercise: NewExercise) -> Result<Exercise, StoreError> {
        let exercise = exercise.into_exercise(new_record_id());

        sqlx::query(
            r#"
            INSERT INTO exercises (id, user_id, description, duration, date)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&exercise.id)
        .bind(&exercise.user_id)
        .bind(&exercise.description)
        .bind(exercise.duration)
        .bind(exercise.date)
        .execute(&self.pool)
        .await?;

        Ok(exercise)
    }

    async fn find_exercises(
        &self,
        filter: &ExerciseFilter,
        limit: i64,
    ) -> Result<Vec<Exercise>, StoreError> {
        let mut query = QueryBuilder::<Sqlite>::new(
            "SELECT id, user_id, description, duration, date FROM exercises WHERE user_id = ",
        );
        query.push_bind(filter.user_id.as_str());
        if let Some(from) = filter.from {
            query.push(" AND date >= ").push_bind(from);
        }
        if let Some(to) = filter.to {
            query.push(" AND date <= ").push_bind(to);
        }
        query.push(" ORDER BY rowid LIMIT ").push_bind(limit);

        debug!(sql = query.sql(), "querying exercises");

        let exercises = query
            .build_query_as::<Exercise>()
            .fetch_all(&self.pool)
            .await?;
        Ok(exercises)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::engine::dates::parse_calendar_date;
    use chrono::NaiveDate;

    async fn memory_store() -> SqliteStore {
        SqliteStore::connect("sqlite::memory:", 5)
            .await
            .expect("in-memory sqlite")
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn new_exercise(user_id: &str, description: &str, date: NaiveDate) -> NewExercise {
        NewExercise {
            user_id: user_id.to_string(),
            description: description.to_string(),
            duration: 20,
            date,
        }
    }

    #[tokio::test]
    async fn test_insert_and_find_user() {
        let store = memory_store().await;

        let user = store.insert_user("fcc_test").await.unwrap();
        assert!(Uuid::parse_str(&user.id).is_ok());

        let found = store.find_user(&user.id).await.unwrap();
        assert_eq!(found, Some(user));
    }

    #[tokio::test]
    async fn test_find_unknown_user_is_none() {
        let store = memory_store().await;
        assert_eq!(store.find_user("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_list_users_in_creation_order() {
        let store = memory_store().await;
        assert!(store.list_users().await.unwrap().is_empty());

        let first = store.insert_user("alice").await.unwrap();
        let second = store.insert_user("alice").await.unwrap();

        let users = store.list_users().await.unwrap();
        assert_eq!(users, vec![first, second]);
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() {
        let store = memory_store().await;
        store.insert_user("alice").await.unwrap();
        store.create_tables().await.unwrap();
        assert_eq!(store.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_find_exercises_applies_filter_and_limit() {
        let store = memory_store().await;
        let alice = store.insert_user("alice").await.unwrap();
        let bob = store.insert_user("bob").await.unwrap();

        for d in [3, 1, 5, 9] {
            store
                .insert_exercise(new_exercise(&alice.id, &format!("day {d}"), day(d)))
                .await
                .unwrap();
        }
        store
            .insert_exercise(new_exercise(&bob.id, "other", day(5)))
            .await
            .unwrap();

        let all = store
            .find_exercises(&ExerciseFilter::for_user(&alice.id), 5000)
            .await
            .unwrap();
        let descriptions: Vec<_> = all.iter().map(|e| e.description.as_str()).collect();
        assert_eq!(descriptions, vec!["day 3", "day 1", "day 5", "day 9"]);

        let ranged = store
            .find_exercises(
                &ExerciseFilter::for_user(&alice.id)
                    .from_date(day(3))
                    .to_date(day(5)),
                5000,
            )
            .await
            .unwrap();
        let dates: Vec<_> = ranged.iter().map(|e| e.date).collect();
        assert_eq!(dates, vec![day(3), day(5)]);

        let limited = store
            .find_exercises(&ExerciseFilter::for_user(&alice.id), 2)
            .await
            .unwrap();
        assert_eq!(limited.len(), 2);
        assert_eq!(limited[0].description, "day 3");
    }

    #[tokio::test]
    async fn test_date_bounds_order_across_year_extremes() {
        let store = memory_store().await;
        let user = store.insert_user("alice").await.unwrap();

        for raw in ["0000-01-01", "0999-06-15", "2024-01-01", "9999-12-31"] {
            let date = parse_calendar_date(raw).unwrap();
            store
                .insert_exercise(new_exercise(&user.id, raw, date))
                .await
                .unwrap();
        }
        assert_eq!(parse_calendar_date("+12345-01-01"), None);

        let filter = ExerciseFilter::for_user(&user.id)
            .from_date(parse_calendar_date("0999-06-15").unwrap())
            .to_date(parse_calendar_date("9999-12-31").unwrap());

        let sqlite: Vec<_> = store
            .find_exercises(&filter, 5000)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.description)
            .collect();
        assert_eq!(sqlite, vec!["0999-06-15", "2024-01-01", "9999-12-31"]);

        let memory = MemoryStore::new();
        for exercise in store
            .find_exercises(&ExerciseFilter::for_user(&user.id), 5000)
            .await
            .unwrap()
        {
            memory
                .insert_exercise(new_exercise(&user.id, &exercise.description, exercise.date))
                .await
                .unwrap();
        }
        let in_memory: Vec<_> = memory
            .find_exercises(&filter, 5000)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.description)
            .collect();
        assert_eq!(in_memory, sqlite);
    }

    #[tokio::test]
    async fn test_inserted_exercise_round_trips() {
        let store = memory_store().await;
        let user = store.insert_user("alice").await.unwrap();

        let stored = store
            .insert_exercise(new_exercise(&user.id, "swim", day(2)))
            .await
            .unwrap();

        let found = store
            .find_exercises(&ExerciseFilter::for_user(&user.id), 10)
            .await
            .unwrap();
        assert_eq!(found, vec![stored]);
    }
}

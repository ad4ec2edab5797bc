use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::db::filter::ExerciseFilter;
use crate::db::models::{Exercise, NewExercise, User};
use crate::db::repo::{Store, StoreError, new_record_id};

/// In-process store keeping records in insertion order. Used as a test
/// double and for throwaway runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<Records>,
}

#[derive(Debug, Default)]
struct Records {
    users: Vec<User>,
    exercises: Vec<Exercise>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_user(&self, username: &str) -> Result<User, StoreError> {
        let user = User {
            id: new_record_id(),
            username: username.to_string(),
        };
        self.records.lock().await.users.push(user.clone());
        Ok(user)
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.records.lock().await.users.clone())
    }

    async fn find_user(&self, id: &str) -> Result<Option<User>, StoreError> {
        let records = self.records.lock().await;
        Ok(records.users.iter().find(|u| u.id == id).cloned())
    }

    async fn insert_exercise(&self, exercise: NewExercise) -> Result<Exercise, StoreError> {
        let exercise = exercise.into_exercise(new_record_id());
        self.records.lock().await.exercises.push(exercise.clone());
        Ok(exercise)
    }

    async fn find_exercises(
        &self,
        filter: &ExerciseFilter,
        limit: i64,
    ) -> Result<Vec<Exercise>, StoreError> {
        let cap = usize::try_from(limit).unwrap_or(0);
        let records = self.records.lock().await;
        Ok(records
            .exercises
            .iter()
            .filter(|e| filter.matches(e))
            .take(cap)
            .cloned()
            .collect())
    }
}

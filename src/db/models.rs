use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub username: String,
}

/// A stored exercise entry. `user_id` is checked against the users table by
/// the handler, not by the store.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Exercise {
    pub id: String,
    pub user_id: String,
    pub description: String,
    pub duration: i64,
    pub date: NaiveDate,
}

/// Exercise fields supplied by the caller; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewExercise {
    pub user_id: String,
    pub description: String,
    pub duration: i64,
    pub date: NaiveDate,
}

impl NewExercise {
    pub fn into_exercise(self, id: String) -> Exercise {
        Exercise {
            id,
            user_id: self.user_id,
            description: self.description,
            duration: self.duration,
            date: self.date,
        }
    }
}

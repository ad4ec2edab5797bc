use chrono::NaiveDate;

use crate::db::models::Exercise;

/// Predicate over exercise records: one user, optionally bounded by date.
/// Both bounds are inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExerciseFilter {
    pub user_id: String,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl ExerciseFilter {
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            from: None,
            to: None,
        }
    }

    pub fn from_date(mut self, from: NaiveDate) -> Self {
        self.from = Some(from);
        self
    }

    pub fn to_date(mut self, to: NaiveDate) -> Self {
        self.to = Some(to);
        self
    }

    pub fn has_date_bounds(&self) -> bool {
        self.from.is_some() || self.to.is_some()
    }

    pub fn matches(&self, exercise: &Exercise) -> bool {
        exercise.user_id == self.user_id
            && self.from.is_none_or(|from| exercise.date >= from)
            && self.to.is_none_or(|to| exercise.date <= to)
    }
}

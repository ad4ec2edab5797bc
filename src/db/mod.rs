pub mod filter;
pub mod memory;
pub mod models;
pub mod repo;

pub use filter::ExerciseFilter;
pub use memory::MemoryStore;
pub use models::{Exercise, NewExercise, User};
pub use repo::{SqliteStore, Store, StoreError};

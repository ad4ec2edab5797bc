pub mod dates;
pub mod log_query;

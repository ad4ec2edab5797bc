use clap::{Parser, ValueEnum};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://exercise-tracker.db?mode=rwc";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreKind {
    /// SQLite database at `database_url`.
    Sqlite,
    /// Process-local records, lost on exit.
    Memory,
}

/// Runtime settings, read from flags or the environment (a `.env` file is
/// loaded first when present).
#[derive(Debug, Clone, Parser)]
#[command(name = "exercise-tracker", version, about = "Exercise tracker HTTP API")]
pub struct Config {
    #[arg(long, env = "STORE", value_enum, default_value_t = StoreKind::Sqlite)]
    pub store: StoreKind,

    /// Store connection string.
    #[arg(long, env = "DATABASE_URL", default_value = DEFAULT_DATABASE_URL)]
    pub database_url: String,

    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    #[arg(long, env = "PORT", default_value_t = 3001)]
    pub port: u16,

    /// Upper bound on pooled store connections.
    #[arg(long, env = "DATABASE_MAX_CONNECTIONS", default_value_t = 5)]
    pub max_connections: u32,

    /// Directory containing `views/` and `public/`.
    #[arg(long, env = "STATIC_DIR", default_value = ".")]
    pub static_dir: PathBuf,
}

impl Config {
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

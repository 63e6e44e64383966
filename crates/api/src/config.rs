/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// SQLite location, a path or connection string.
    pub database_url: String,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Concurrent solves; sized to what the MILP backend licenses.
    pub solver_workers: usize,
    /// Bound on runs waiting for a worker; submissions beyond it get 503.
    pub queue_bound: usize,
    /// Shift ids subject to the senior/junior ratio constraint.
    pub critical_shift_ids: Vec<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                 |
    /// |------------------------|-------------------------|
    /// | `HOST`                 | `0.0.0.0`               |
    /// | `PORT`                 | `3000`                  |
    /// | `DATABASE_URL`         | `sqlite://rosterd.db`   |
    /// | `CORS_ORIGINS`         | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                    |
    /// | `SOLVER_WORKERS`       | `1`                     |
    /// | `QUEUE_BOUND`          | `16`                    |
    /// | `CRITICAL_SHIFT_IDS`   | (empty)                 |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://rosterd.db".into());

        let cors_origins = split_list(
            &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:5173".into()),
        );

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let solver_workers: usize = std::env::var("SOLVER_WORKERS")
            .unwrap_or_else(|_| "1".into())
            .parse()
            .expect("SOLVER_WORKERS must be a valid usize");

        let queue_bound: usize = std::env::var("QUEUE_BOUND")
            .unwrap_or_else(|_| "16".into())
            .parse()
            .expect("QUEUE_BOUND must be a valid usize");

        let critical_shift_ids =
            split_list(&std::env::var("CRITICAL_SHIFT_IDS").unwrap_or_default());

        Self {
            host,
            port,
            database_url,
            cors_origins,
            request_timeout_secs,
            solver_workers,
            queue_bound,
            critical_shift_ids,
        }
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

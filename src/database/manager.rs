use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::postgres::{PgArguments, PgConnectOptions, PgPoolOptions, PgRow};
use sqlx::{FromRow, PgPool, Postgres};
use std::str::FromStr;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::DatabaseConfig;

/// Errors from DatabaseManager
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Invalid database URL: {0}")]
    InvalidDatabaseUrl(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Coarse classification of store failures, used to pick a response status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Uniqueness or foreign-key violation
    Conflict,
    /// Value rejected by the store (not-null, check, malformed data)
    InvalidInput,
    /// Store could not be reached or the pool is exhausted
    Unavailable,
    Internal,
}

impl DatabaseError {
    pub fn kind(&self) -> FailureKind {
        use sqlx::error::ErrorKind;

        match self {
            DatabaseError::Sqlx(sqlx::Error::Database(db)) => match db.kind() {
                ErrorKind::UniqueViolation | ErrorKind::ForeignKeyViolation => FailureKind::Conflict,
                ErrorKind::NotNullViolation | ErrorKind::CheckViolation => FailureKind::InvalidInput,
                _ => match db.code() {
                    // SQLSTATE class 22: data exception
                    Some(code) if code.starts_with("22") => FailureKind::InvalidInput,
                    _ => FailureKind::Internal,
                },
            },
            DatabaseError::Sqlx(
                sqlx::Error::PoolTimedOut
                | sqlx::Error::PoolClosed
                | sqlx::Error::Io(_)
                | sqlx::Error::Tls(_),
            ) => FailureKind::Unavailable,
            _ => FailureKind::Internal,
        }
    }
}

/// Positional statement parameter. Every variant is nullable so absent values bind as typed NULLs.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Int(Option<i32>),
    Text(Option<String>),
    Date(Option<NaiveDate>),
    Decimal(Option<Decimal>),
}

/// Rows returned by a statement, in store order
#[derive(Debug)]
pub struct QueryResult<T> {
    pub rows: Vec<T>,
    pub row_count: usize,
}

impl<T> QueryResult<T> {
    pub fn into_first(self) -> Option<T> {
        self.rows.into_iter().next()
    }
}

/// Owns the shared PostgreSQL pool. Cloning is cheap; all clones share the same connections.
#[derive(Clone)]
pub struct DatabaseManager {
    pool: PgPool,
    enable_query_logging: bool,
    slow_query_threshold: Duration,
}

impl DatabaseManager {
    /// Build the pool. Connections are opened on first use, so the store does not need to be
    /// reachable at startup.
    pub fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let options = Self::connect_options(config)?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect_lazy_with(options);

        info!(
            "Created database pool (max {} connections)",
            config.max_connections
        );

        Ok(Self {
            pool,
            enable_query_logging: config.enable_query_logging,
            slow_query_threshold: Duration::from_millis(config.slow_query_threshold_ms),
        })
    }

    fn connect_options(config: &DatabaseConfig) -> Result<PgConnectOptions, DatabaseError> {
        if let Some(url) = &config.url {
            return PgConnectOptions::from_str(url)
                .map_err(|e| DatabaseError::InvalidDatabaseUrl(e.to_string()));
        }

        let mut options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .database(&config.name);
        if !config.user.is_empty() {
            options = options.username(&config.user);
        }
        if !config.password.is_empty() {
            options = options.password(&config.password);
        }
        Ok(options)
    }

    /// Run one statement on a pooled connection and collect every returned row
    pub async fn query<T>(&self, sql: &str, params: Vec<SqlParam>) -> Result<QueryResult<T>, DatabaseError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        if self.enable_query_logging {
            debug!(sql, params = ?params, "executing query");
        }

        let started = Instant::now();
        let mut q = sqlx::query_as::<_, T>(sql);
        for param in params {
            q = bind_param(q, param);
        }
        let rows = q.fetch_all(&self.pool).await?;

        let elapsed = started.elapsed();
        if elapsed > self.slow_query_threshold {
            warn!(sql, elapsed_ms = elapsed.as_millis() as u64, "slow query");
        }

        let row_count = rows.len();
        Ok(QueryResult { rows, row_count })
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Close the pool (e.g., on shutdown); waits for checked-out connections to return
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Closed database pool");
    }
}

fn bind_param<'q, O>(
    q: sqlx::query::QueryAs<'q, Postgres, O, PgArguments>,
    param: SqlParam,
) -> sqlx::query::QueryAs<'q, Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, PgRow>,
{
    match param {
        SqlParam::Int(v) => q.bind(v),
        SqlParam::Text(v) => q.bind(v),
        SqlParam::Date(v) => q.bind(v),
        SqlParam::Decimal(v) => q.bind(v),
    }
}

use std::time::Duration;
use thiserror::Error;

/// Client-correctable input problems. Never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("number of tickets must be positive, got {0}")]
    NonPositiveSeatCount(i32),
    #[error("seat numbers must be provided")]
    MissingSeatLabels,
    #[error("number of seat numbers ({labels}) must match number of tickets ({seat_count})")]
    SeatCountMismatch { seat_count: i32, labels: usize },
    #[error("duplicate seat number: {0}")]
    DuplicateSeatLabel(String),
    #[error("total tickets must be non-negative, got {0}")]
    NegativeCapacity(i32),
    #[error("{0} must not be blank")]
    BlankField(&'static str),
}

/// Infrastructure failures from an `InventoryStore` adapter.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

impl StoreError {
    /// Whether the caller may retry the whole operation with backoff.
    ///
    /// Only transport, pool and transaction-conflict failures qualify;
    /// constraint violations and decode errors would fail again.
    pub fn is_retryable(&self) -> bool {
        match self {
            StoreError::Database(e) => sqlx_is_transient(e),
            StoreError::Timeout { .. } | StoreError::Unavailable(_) => true,
            StoreError::Corrupt(_) => false,
        }
    }
}

// 40001 serialization_failure, 40P01 deadlock_detected
const TRANSIENT_SQLSTATES: [&str; 2] = ["40001", "40P01"];

fn sqlx_is_transient(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => true,
        sqlx::Error::Database(db) => db
            .code()
            .is_some_and(|code| TRANSIENT_SQLSTATES.contains(&code.as_ref())),
        _ => false,
    }
}

#[derive(Debug, Error)]
pub enum BookingError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("movie '{movie}' not found at theatre '{theatre}'")]
    NotFound { movie: String, theatre: String },
    #[error("not enough tickets available: requested {requested}, available {available}")]
    CapacityExceeded { requested: i32, available: i64 },
    #[error("movie '{movie}' already exists at theatre '{theatre}'")]
    AlreadyExists { movie: String, theatre: String },
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl BookingError {
    pub fn not_found(movie: &str, theatre: &str) -> Self {
        BookingError::NotFound {
            movie: movie.to_string(),
            theatre: theatre.to_string(),
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            BookingError::Store(e) => e.is_retryable(),
            _ => false,
        }
    }
}

/// Outbound notification failures. Logged, never fatal to a booking.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification channel closed")]
    ChannelClosed,
    #[error("notification timed out after {0:?}")]
    Timeout(Duration),
    #[error("redis publish failed: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("failed to encode event: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Failures while wiring the service at startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("database connection failed: {0}")]
    Database(#[from] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("redis connection failed: {0}")]
    Redis(#[from] redis::RedisError),
}

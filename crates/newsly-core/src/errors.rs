use thiserror::Error;

/// Failures of the bookmark store. Always surfaced, never retried here.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("Database connection failed: {0}")]
    Connection(#[from] diesel::ConnectionError),

    #[error("Database migration failed: {0}")]
    Migration(String),

    #[error("Database lock poisoned")]
    LockPoisoned,

    #[error("Storage task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Failures talking to the remote news feed.
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("No connectivity: {0}")]
    Offline(#[source] reqwest::Error),

    #[error("Request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Malformed feed response: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("Invalid feed endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl From<reqwest::Error> for FeedError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            FeedError::Offline(err)
        } else if err.is_decode() {
            FeedError::Decode(err)
        } else {
            FeedError::Transport(err)
        }
    }
}

/// Coarse classification for callers choosing what to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Offline,
    Upstream,
    Storage,
    Other,
}

/// Error returned by every [`crate::NewsService`] operation.
#[derive(Error, Debug)]
pub enum NewsError {
    #[error("No connectivity")]
    Offline(#[source] FeedError),

    #[error("Feed returned error status {status:?}{}", upstream_detail(.message))]
    Upstream {
        status: String,
        code: Option<String>,
        message: Option<String>,
    },

    #[error("Feed request failed: {0}")]
    Transport(#[source] FeedError),

    #[error("Bookmark storage failed: {0}")]
    Storage(#[from] StoreError),
}

fn upstream_detail(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(": {m}"))
        .unwrap_or_default()
}

impl NewsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            NewsError::Offline(_) => ErrorKind::Offline,
            NewsError::Upstream { .. } => ErrorKind::Upstream,
            NewsError::Storage(_) => ErrorKind::Storage,
            NewsError::Transport(_) => ErrorKind::Other,
        }
    }

    pub fn is_offline(&self) -> bool {
        self.kind() == ErrorKind::Offline
    }
}

impl From<FeedError> for NewsError {
    fn from(err: FeedError) -> Self {
        match err {
            FeedError::Offline(_) => NewsError::Offline(err),
            other => NewsError::Transport(other),
        }
    }
}

/// Invalid or missing configuration values.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required setting {0}")]
    Missing(&'static str),

    #[error("Invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

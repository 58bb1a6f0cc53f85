use thiserror::Error;

/// Errors from the remote bookmarking API.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// HTTP 429, or a rate-limit notice in the response body.
    #[error("rate limited by remote service")]
    RateLimited,

    /// Non-success HTTP status.
    #[error("remote service returned {status}: {body}")]
    Http { status: u16, body: String },

    /// Transport-level failure (DNS, connect, request timeout).
    #[error("network error: {0}")]
    Network(String),

    /// Response body did not match the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(String),
}

/// Errors from a save/update operation.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("not authenticated; run `pocketsync connect` first")]
    NotAuthenticated,

    /// The advisory rate gate refused the call. Nothing was sent; the
    /// caller retries later.
    #[error("rate limit exceeded; try again later")]
    RateLimitExceeded,

    /// The operation ran past its wall-clock budget. The underlying
    /// request may still land; the cache holds the authoritative outcome.
    #[error("save timed out; the request may still complete")]
    Timeout,

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Errors from a tag vocabulary sync run.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("not authenticated; run `pocketsync connect` first")]
    NotAuthenticated,

    #[error("tag suggestions are disabled")]
    Disabled,

    #[error("a sync is already running")]
    AlreadyRunning,

    #[error("rate limit exceeded; sync deferred")]
    RateLimited,

    /// Too many consecutive page failures. Progress up to the failing page
    /// is persisted; the next run resumes from the saved cursor.
    #[error("sync aborted after {consecutive} consecutive errors: {source}")]
    Aborted {
        consecutive: u32,
        #[source]
        source: RemoteError,
    },

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Errors from the browser-consent step of authentication.
#[derive(Debug, Error)]
pub enum AuthFlowError {
    /// The user closed or declined the authorization interaction.
    #[error("authorization was cancelled")]
    Cancelled,

    #[error("authorization flow failed: {0}")]
    Failed(String),
}

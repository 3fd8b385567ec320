use thiserror::Error;

/// Failure fetching bracket data from the upstream tax-data service.
///
/// The variants split into two classes which the retry policy inspects
/// through [`FetchError::is_transient`]: network trouble, timeouts and
/// server-side statuses may clear up on their own, while client-side
/// statuses and undecodable bodies will not.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("upstream server error {status}: {body}")]
    Server { status: u16, body: String },

    #[error("upstream rejected request with status {status}: {body}")]
    Client { status: u16, body: String },

    #[error("malformed tax data: {0}")]
    Decode(String),

    #[error("gave up after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        #[source]
        last: Box<FetchError>,
    },
}

impl FetchError {
    /// Classifies a non-success HTTP status. Anything at or above 500 is a
    /// server-side condition; everything else is the caller's fault.
    pub fn from_status(
        status: u16,
        body: String,
    ) -> Self {
        if status >= 500 {
            FetchError::Server { status, body }
        } else {
            FetchError::Client { status, body }
        }
    }

    /// Whether another attempt could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            FetchError::Network(_) | FetchError::Timeout(_) | FetchError::Server { .. }
        )
    }

    /// HTTP status reported by the upstream, if the failure carried one.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Server { status, .. } | FetchError::Client { status, .. } => Some(*status),
            FetchError::Exhausted { last, .. } => last.status(),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout(err.to_string())
        } else if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

use std::fmt;
use thiserror::Error;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the library
#[derive(Debug, Error)]
pub enum Error {
    /// The route registry could not be enumerated
    #[error("route discovery failed: {0}")]
    Discovery(String),

    /// The document could not be delivered to the aggregator
    #[error("delivery to {endpoint} failed: {failure}")]
    Delivery {
        endpoint: String,
        failure: DeliveryFailure,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The scan could not be scheduled, e.g. no tokio runtime is running
    #[error("cannot schedule scan: {0}")]
    Scheduling(String),
}

/// Why an outbound delivery failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryFailure {
    /// Nothing is listening at the aggregator address
    ConnectionRefused(String),
    /// The request did not complete within the configured timeout
    Timeout,
    /// The aggregator answered with a non-2xx status
    Status(u16),
    /// Any other transport-level failure
    Transport(String),
}

impl fmt::Display for DeliveryFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryFailure::ConnectionRefused(msg) => write!(f, "connection refused ({})", msg),
            DeliveryFailure::Timeout => write!(f, "request timed out"),
            DeliveryFailure::Status(code) => write!(f, "aggregator responded with HTTP {}", code),
            DeliveryFailure::Transport(msg) => write!(f, "transport error ({})", msg),
        }
    }
}

impl Error {
    /// Short name of the failure kind, used in diagnostic output.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Discovery(_) => "DiscoveryError",
            Error::Delivery { .. } => "DeliveryError",
            Error::InvalidConfig(_) => "ConfigError",
            Error::Scheduling(_) => "SchedulingError",
        }
    }

    /// Whether this is a delivery failure caused by a refused connection.
    pub fn is_connection_refused(&self) -> bool {
        matches!(
            self,
            Error::Delivery {
                failure: DeliveryFailure::ConnectionRefused(_),
                ..
            }
        )
    }
}

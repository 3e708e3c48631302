use sectorwars_logic::protocol::{Failure, FailureKind};
use sectorwars_logic::regeneration::TransitionError;
use sectorwars_logic::validation::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("configuration invalid: {}", join_errors(.0))]
    ConfigurationInvalid(Vec<ConfigError>),

    #[error("a galaxy already exists: {detail}")]
    ConflictExists { status: u16, detail: String },

    #[error("temporary server failure: {detail}")]
    Transient { status: Option<u16>, detail: String },

    #[error("request rejected ({status}): {detail}")]
    ValidationRejected { status: u16, detail: String },

    #[error("server unavailable: {detail}")]
    ServiceUnavailable { status: Option<u16>, detail: String },

    #[error("could not decode response: {0}")]
    Decode(String),

    #[error(transparent)]
    Flow(#[from] TransitionError),
}

fn join_errors(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl ClientError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }

    /// Reads may be answered from cache or demo data after this error.
    pub fn allows_fallback(&self) -> bool {
        matches!(
            self,
            Self::Transient { .. } | Self::ServiceUnavailable { .. }
        )
    }

    /// The classified failure to feed into the regeneration flow.
    pub fn to_failure(&self) -> Failure {
        let (kind, status, detail) = match self {
            Self::ConflictExists { status, detail } => {
                (FailureKind::ConflictExists, Some(*status), detail.clone())
            }
            Self::Transient { status, detail } => {
                (FailureKind::TransientFailure, *status, detail.clone())
            }
            Self::ValidationRejected { status, detail } => {
                (FailureKind::ValidationRejected, Some(*status), detail.clone())
            }
            Self::ServiceUnavailable { status, detail } => {
                (FailureKind::ServiceUnavailable, *status, detail.clone())
            }
            Self::Decode(detail) => (FailureKind::TransientFailure, None, detail.clone()),
            Self::ConfigurationInvalid(_) | Self::Flow(_) => {
                (FailureKind::ValidationRejected, None, self.to_string())
            }
        };
        Failure {
            kind,
            status,
            detail,
        }
    }
}

impl From<Failure> for ClientError {
    fn from(failure: Failure) -> Self {
        let Failure {
            kind,
            status,
            detail,
        } = failure;
        match kind {
            FailureKind::ConflictExists => Self::ConflictExists {
                status: status.unwrap_or(409),
                detail,
            },
            FailureKind::TransientFailure => Self::Transient { status, detail },
            FailureKind::ValidationRejected => Self::ValidationRejected {
                status: status.unwrap_or(400),
                detail,
            },
            FailureKind::ServiceUnavailable => Self::ServiceUnavailable { status, detail },
        }
    }
}

impl From<Vec<ConfigError>> for ClientError {
    fn from(errors: Vec<ConfigError>) -> Self {
        Self::ConfigurationInvalid(errors)
    }
}

use thiserror::Error;

use super::{DeviceId, StatusCode};

/// Failures surfaced by the device registry accessors.
///
/// Both variants keep the raw status code of the failed runtime call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("{context}: {reason} (status {status})")]
    DeviceQuery {
        status: StatusCode,
        context: String,
        reason: String,
    },

    #[error("{context}: {reason} (status {status})")]
    DeviceSet {
        status: StatusCode,
        context: String,
        attempted: DeviceId,
        reason: String,
    },
}

impl Error {
    /// Raw status code reported by the runtime.
    pub fn status(&self) -> StatusCode {
        match self {
            Error::DeviceQuery { status, .. } | Error::DeviceSet { status, .. } => *status,
        }
    }

    /// Device the failed switch tried to select, if this was a switch.
    pub fn attempted_device(&self) -> Option<DeviceId> {
        match self {
            Error::DeviceQuery { .. } => None,
            Error::DeviceSet { attempted, .. } => Some(*attempted),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_error_message() {
        let err = Error::DeviceSet {
            status: StatusCode::INVALID_DEVICE,
            context: "failure setting device to 7".into(),
            attempted: 7,
            reason: "invalid device ordinal".into(),
        };
        assert_eq!(
            err.to_string(),
            "failure setting device to 7: invalid device ordinal (status 101)"
        );
        assert_eq!(err.status(), StatusCode(101));
        assert_eq!(err.attempted_device(), Some(7));
    }

    #[test]
    fn test_query_error_has_no_attempted_device() {
        let err = Error::DeviceQuery {
            status: StatusCode(3),
            context: "failure obtaining current device index".into(),
            reason: "unknown error".into(),
        };
        assert_eq!(err.attempted_device(), None);
        assert!(err.to_string().starts_with("failure obtaining current device index"));
    }
}

use std::io;

use thiserror::Error;

/// OS error code for a generic device failure. USB instruments report it
/// after the host resumed from sleep with the handle still open.
#[cfg(windows)]
const GENERIC_FAILURE: i32 = windows_sys::Win32::Foundation::ERROR_GEN_FAILURE as i32;
#[cfg(not(windows))]
const GENERIC_FAILURE: i32 = 5;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("device not found: {path}")]
    DeviceNotFound { path: String },
    #[error("failed to open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("{operation} timed out after {timeout_ms} ms")]
    Timeout {
        operation: &'static str,
        timeout_ms: u64,
    },
    #[error("short write: {written} of {expected} bytes")]
    ShortWrite { expected: usize, written: usize },
    #[error(
        "device fault during {operation}: {source}; this commonly follows a host sleep/resume, \
         reconnect the instrument"
    )]
    DeviceFault {
        operation: &'static str,
        #[source]
        source: io::Error,
    },
    #[error("I/O error during {operation}: {source}")]
    Io {
        operation: &'static str,
        #[source]
        source: io::Error,
    },
    #[error("transport session is closed")]
    Closed,
}

impl TransportError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, TransportError::Timeout { .. })
    }

    /// The session cannot be used for further operations.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            TransportError::DeviceFault { .. } | TransportError::Io { .. } | TransportError::Closed
        )
    }

    pub(crate) fn from_io(operation: &'static str, source: io::Error) -> Self {
        if source.raw_os_error() == Some(GENERIC_FAILURE) {
            TransportError::DeviceFault { operation, source }
        } else {
            TransportError::Io { operation, source }
        }
    }

    pub(crate) fn from_open(path: &str, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            TransportError::DeviceNotFound {
                path: path.to_string(),
            }
        } else {
            TransportError::Open {
                path: path.to_string(),
                source,
            }
        }
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Crate-wide error type.
//!
//! Endpoint grammar failures keep their own [`EndpointError`] so callers on the
//! setup path can match on `InvalidFormat` vs `HostUnresolvable` directly; the
//! crate-level [`Error`] wraps it for APIs that mix parsing with I/O or
//! configuration.
//!
//! Backpressure is never reported through this type: a producer that cannot
//! advance waits, see [`crate::status::backpressure`].

use crate::transport::EndpointError;

/// Errors returned by `hpub` APIs.
///
/// # Example
///
/// ```
/// use hpub::{Error, SocketEndpoint};
/// use hpub::transport::EndpointError;
///
/// match SocketEndpoint::parse("192.168.1.20::123") {
///     Err(EndpointError::InvalidFormat { reason, .. }) => println!("bad endpoint: {}", reason),
///     Err(e) => println!("other error: {}", e),
///     Ok(ep) => println!("endpoint {}", ep),
/// }
///
/// let err: Error = SocketEndpoint::parse("10.0.0.1").unwrap_err().into();
/// assert!(matches!(err, Error::Endpoint(_)));
/// ```
#[derive(Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration value rejected (bad env value, zero interval, empty consumer set...).
    Config(String),

    // ========================================================================
    // Transport Errors
    // ========================================================================
    /// Endpoint specification could not be turned into an address.
    Endpoint(EndpointError),
    /// I/O error with underlying cause.
    IoError(std::io::Error),

    // ========================================================================
    // Runtime Errors
    // ========================================================================
    /// Invalid state for the requested operation.
    InvalidState(String),
    /// Rate reporter callback failed and the loop was halted.
    ReporterFailed(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
            Error::Endpoint(e) => write!(f, "Endpoint error: {}", e),
            Error::IoError(e) => write!(f, "I/O error: {}", e),
            Error::InvalidState(msg) => write!(f, "Invalid state: {}", msg),
            Error::ReporterFailed(msg) => write!(f, "Rate reporter failed: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Endpoint(e) => Some(e),
            Error::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<EndpointError> for Error {
    fn from(e: EndpointError) -> Self {
        Error::Endpoint(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::IoError(e)
    }
}

/// Convenient alias for API results using the public `Error` type.
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_display_config() {
        let e = Error::Config("interval must be non-zero".into());
        assert_eq!(
            e.to_string(),
            "Configuration error: interval must be non-zero"
        );
    }

    #[test]
    fn test_io_error_source() {
        let e: Error = std::io::Error::new(std::io::ErrorKind::Other, "boom").into();
        assert!(matches!(e, Error::IoError(_)));
        assert!(e.source().is_some());
    }

    #[test]
    fn test_endpoint_error_wraps() {
        let inner = EndpointError::InvalidFormat {
            spec: "x".into(),
            reason: "missing port".into(),
        };
        let e: Error = inner.into();
        assert!(e.to_string().contains("missing port"));
        assert!(e.source().is_some());
    }
}

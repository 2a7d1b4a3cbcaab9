//! Result helper extensions for HTTP handlers.

use std::fmt::Display;

use salvo::prelude::StatusError;
use tracing::{debug, error};

/// Map errors onto HTTP errors, logging at a level matching whose fault it is.
pub(crate) trait ResultExt<T> {
    /// A client mistake: 400 with `brief`, and the cause echoed as detail.
    fn or_400(self, brief: &str) -> Result<T, StatusError>;

    /// A server fault: logged, and reported as a bare 500.
    fn or_500(self, context: &str) -> Result<T, StatusError>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Display,
{
    fn or_400(self, brief: &str) -> Result<T, StatusError> {
        self.map_err(|error| {
            debug!("{brief}: {error}");

            StatusError::bad_request()
                .brief(brief)
                .detail(error.to_string())
        })
    }

    fn or_500(self, context: &str) -> Result<T, StatusError> {
        self.map_err(|error| {
            error!("{context}: {error}");

            StatusError::internal_server_error()
        })
    }
}

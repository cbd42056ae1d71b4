//! Classify curl errors into failure kinds.

use crate::error::{FailureKind, TransportFailure};

/// Classify a curl error.
pub fn classify_curl_error(e: &curl::Error) -> FailureKind {
    if e.is_operation_timedout() {
        return FailureKind::Timeout;
    }
    if e.is_ssl_connect_error() || e.is_peer_failed_verification() || e.is_ssl_certproblem() {
        return FailureKind::Tls;
    }
    if e.is_couldnt_connect()
        || e.is_couldnt_resolve_host()
        || e.is_couldnt_resolve_proxy()
        || e.is_read_error()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_got_nothing()
    {
        return FailureKind::Connection;
    }
    FailureKind::Other
}

/// Native failure record for a transfer that ended with `e`.
pub(super) fn failure(e: &curl::Error) -> TransportFailure {
    TransportFailure {
        code: e.code() as i32,
        message: e.to_string(),
        kind: classify_curl_error(e),
    }
}

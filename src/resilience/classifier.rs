//! Error classification.
//!
//! Maps the final failure of a call to the error the caller sees and to the
//! side effects the client must apply. Pure: nothing here touches shared state.
//!
//! | Failure                              | Error                | Effects                     |
//! |--------------------------------------|----------------------|-----------------------------|
//! | 503                                  | `ServiceUnavailable` | count, database down        |
//! | 502 / 504                            | `ServerUnavailable`  | count                       |
//! | timed out / connection aborted       | `Timeout`            | count                       |
//! | other transport failure              | `Network`            | count, offline              |
//! | 401                                  | `Unauthorized`       | end session (never counted) |
//! | any other error status               | `Status`             | none                        |

use crate::http::{ApiError, ApiResponse, TransportError, TransportErrorKind};
use crate::resilience::retries::Failure;

/// State changes implied by a classified failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Effects {
    /// Increment `consecutive_failures`.
    pub count_failure: bool,
    /// Set `db_connected = false`.
    pub mark_db_down: bool,
    /// Set `is_online = false`.
    pub mark_offline: bool,
    /// Clear credentials and redirect to login.
    pub end_session: bool,
}

/// Outcome of classifying a failure.
#[derive(Debug)]
pub struct Classification {
    pub error: ApiError,
    pub effects: Effects,
}

/// Classify the final failure of a call.
pub fn classify(failure: Failure) -> Classification {
    match failure {
        Failure::Transport(e) => classify_transport(e),
        Failure::Response(r) => classify_response(r),
    }
}

fn classify_transport(error: TransportError) -> Classification {
    let counted = Effects {
        count_failure: true,
        ..Effects::default()
    };

    match error.kind {
        TransportErrorKind::TimedOut | TransportErrorKind::ConnectionAborted => Classification {
            error: ApiError::Timeout,
            effects: counted,
        },
        _ => Classification {
            error: ApiError::Network(error),
            effects: Effects {
                mark_offline: true,
                ..counted
            },
        },
    }
}

fn classify_response(response: ApiResponse) -> Classification {
    let counted = Effects {
        count_failure: true,
        ..Effects::default()
    };

    match response.status {
        401 => Classification {
            error: ApiError::Unauthorized,
            effects: Effects {
                end_session: true,
                ..Effects::default()
            },
        },
        503 => Classification {
            error: ApiError::ServiceUnavailable,
            effects: Effects {
                mark_db_down: true,
                ..counted
            },
        },
        status @ (502 | 504) => Classification {
            error: ApiError::ServerUnavailable { status },
            effects: counted,
        },
        // The backend answered: the +1 for the failure and the -1 for the
        // answer cancel out, so the count is left as it was.
        status => {
            let message = response
                .server_message()
                .unwrap_or_else(|| format!("Request failed with status {}", status));
            Classification {
                error: ApiError::Status {
                    status,
                    message,
                    body: response.text(),
                },
                effects: Effects::default(),
            }
        }
    }
}

//! Side effects requested by the wizard state machines.
//!
//! The selector and composer never perform I/O. Each transition returns a list
//! of [`Effect`]s; the caller (normally [`crate::WizardSession`]) performs
//! them and feeds the results back, tagged with the [`RequestToken`] the
//! effect carried.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use area_types::{Act, ActKind, ActSchema, AppletCreateRequest, RemoteId, Service, ServiceDetail};

use crate::composer::ComposerMode;

/// Front-end route shown after a successful submission.
pub const MY_APPLETS_PATH: &str = "/my_applets";

static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

/// Identifies one outstanding fetch.
///
/// Tokens increase monotonically for the whole process, so a result can never
/// be mistaken for the answer to a later request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn next() -> Self {
        Self(NEXT_TOKEN.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A read the selector needs answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchRequest {
    Services,
    Service(RemoteId),
    Connection(RemoteId),
    Acts { service_id: RemoteId, kind: ActKind },
    Schema { act_id: RemoteId, kind: ActKind },
}

impl FetchRequest {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Services => "list_services",
            Self::Service(_) => "get_service",
            Self::Connection(_) => "is_connected",
            Self::Acts { .. } => "list_acts",
            Self::Schema { .. } => "get_act_schema",
        }
    }
}

/// The successful answer to a [`FetchRequest`].
#[derive(Debug, Clone, PartialEq)]
pub enum FetchResult {
    Services(Vec<Service>),
    Service(ServiceDetail),
    Connection(bool),
    Acts(Vec<Act>),
    Schema(ActSchema),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Fetch { token: RequestToken, request: FetchRequest },
    /// Create or update the applet; answer with `AppletComposer::submission_finished`.
    Submit { mode: ComposerMode, request: AppletCreateRequest },
    /// Leave the wizard for another page (OAuth connect). Ends the session.
    Redirect(String),
    /// Normal exit after submission. Ends the session.
    Navigate(String),
}

impl Effect {
    pub(crate) fn fetch(request: FetchRequest) -> (RequestToken, Self) {
        let token = RequestToken::next();
        (token, Self::Fetch { token, request })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_strictly_increasing() {
        let first = RequestToken::next();
        let second = RequestToken::next();
        assert!(second > first);
        assert_ne!(first.to_string(), second.to_string());
    }
}

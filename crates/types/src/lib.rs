//! Shared type definitions for the Area applet wizard.
//!
//! These types mirror the JSON documents exchanged with the Area backend
//! (services, acts, config schemas, applets) plus the in-memory shapes the
//! wizard assembles before submission. Wire compatibility matters: every
//! type that crosses the HTTP boundary serializes to the exact field names
//! the backend expects.

pub mod act;
pub mod applet;
pub mod config;
pub mod detail;
pub mod service;

pub use act::{Act, ActKind, ActSchema, ParseActKindError};
pub use applet::{ActionBinding, AppletActEntry, AppletCreateRequest, AppletReceipt, AppletSummary, ExistingApplet, ReactionBinding, UserShortInfo};
pub use config::{CheckEntry, ConfigFieldDescriptor, ConfigFieldKind, ConfigFieldResponse, ConfigValue};
pub use detail::{ActDetail, LocalId};
pub use service::{Service, ServiceDetail};

/// Identifier assigned by the backend to services, acts, and applets.
pub type RemoteId = i64;

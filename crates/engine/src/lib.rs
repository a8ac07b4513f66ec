//! # Area Engine
//!
//! The applet composition wizard. An applet pairs one trigger ("action") with
//! one or more reactions, each configured through a form generated from the
//! act's config schema.
//!
//! ## Architecture
//!
//! - **`form`**: config field interpreters and the per-act form aggregating them
//! - **`selector`**: service, OAuth gate, act, and config steps for one slot
//! - **`composer`**: the applet draft and the wizard state around it
//! - **`effect`**: fetches and submissions the state machines ask for
//! - **`session`**: async driver performing effects through an [`AreaGateway`]
//! - **`plan`**: scripted compositions loaded from YAML or JSON
//!
//! The state machines are synchronous and never perform I/O; they return
//! [`Effect`]s which [`WizardSession`] carries out.
//!
//! ## Usage
//!
//! ```rust
//! use area_engine::{AppletComposer, ComposerState, Effect, WizardEvent};
//!
//! let mut composer = AppletComposer::new();
//! let effects = composer.apply(WizardEvent::OpenAction)?;
//! assert!(matches!(composer.state(), ComposerState::ChoosingAction(_)));
//! assert!(matches!(effects.as_slice(), [Effect::Fetch { .. }]));
//! # Ok::<(), area_engine::WizardError>(())
//! ```

pub mod composer;
pub mod effect;
pub mod error;
pub mod form;
pub mod gateway;
pub mod plan;
pub mod selector;
pub mod session;

pub use composer::{AppletComposer, AppletDraft, ComposerMode, ComposerState, Slot, WizardEvent, next_available_id};
pub use effect::{Effect, FetchRequest, FetchResult, MY_APPLETS_PATH, RequestToken};
pub use error::WizardError;
pub use form::{ConfigForm, FieldInput, FieldInterpreter, FieldWidget, config_responses_valid};
pub use gateway::{AreaGateway, GatewayCall, InMemoryGateway};
pub use plan::{ActPlan, CompositionPlan, PlanValue, apply_plan, parse_plan_file};
pub use selector::{ActSelector, BackOutcome, LoadState, SelectorPhase};
pub use session::{SessionExit, WizardSession};

//! Act selector: pick a service, pass its OAuth gate, pick an act, and fill
//! in its config.
//!
//! ```text
//! ChoosingService -> CheckingAccess -> ListingActs -> FillingConfig -> ActDetail
//! ```
//!
//! Back walks one phase towards `ChoosingService` and cancels from there.
//! Each phase waits for at most one fetch; any result carrying another
//! [`RequestToken`] is dropped.

use area_api::ApiError;
use area_types::{Act, ActDetail, ActKind, LocalId, RemoteId, Service, ServiceDetail};
use tracing::{debug, info, warn};

use crate::effect::{Effect, FetchRequest, FetchResult, RequestToken};
use crate::error::WizardError;
use crate::form::{ConfigForm, FieldInput};

#[derive(Debug, Clone, PartialEq)]
pub enum SelectorPhase {
    ChoosingService,
    CheckingAccess { service: Service },
    ListingActs { service: Service },
    FillingConfig { service: Service, act: Act },
}

impl SelectorPhase {
    pub fn label(&self) -> &'static str {
        match self {
            Self::ChoosingService => "choosing a service",
            Self::CheckingAccess { .. } => "checking service access",
            Self::ListingActs { .. } => "listing acts",
            Self::FillingConfig { .. } => "filling config",
        }
    }

    pub fn service(&self) -> Option<&Service> {
        match self {
            Self::ChoosingService => None,
            Self::CheckingAccess { service } | Self::ListingActs { service } | Self::FillingConfig { service, .. } => Some(service),
        }
    }
}

/// Status of the fetch backing the current phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Ready,
    Failed(String),
}

/// What [`ActSelector::back`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum BackOutcome {
    Moved(Vec<Effect>),
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct ActSelector {
    kind: ActKind,
    slot_id: LocalId,
    prior: Option<ActDetail>,
    phase: SelectorPhase,
    status: LoadState,
    pending: Option<RequestToken>,
    services: Vec<Service>,
    filter: String,
    access: Option<ServiceDetail>,
    acts: Vec<Act>,
    form: ConfigForm,
}

impl ActSelector {
    /// Open a selector for the slot `slot_id`.
    ///
    /// `prior` is the detail currently held by the slot, if any; choosing the
    /// same act again pre-fills the form from it.
    pub fn open(kind: ActKind, slot_id: LocalId, prior: Option<ActDetail>) -> (Self, Vec<Effect>) {
        let mut selector = Self {
            kind,
            slot_id,
            prior,
            phase: SelectorPhase::ChoosingService,
            status: LoadState::Loading,
            pending: None,
            services: Vec::new(),
            filter: String::new(),
            access: None,
            acts: Vec::new(),
            form: ConfigForm::pending(),
        };
        let effects = selector.request(FetchRequest::Services);
        (selector, effects)
    }

    pub fn kind(&self) -> ActKind {
        self.kind
    }

    pub fn slot_id(&self) -> LocalId {
        self.slot_id
    }

    pub fn phase(&self) -> &SelectorPhase {
        &self.phase
    }

    pub fn status(&self) -> &LoadState {
        &self.status
    }

    pub fn pending_token(&self) -> Option<RequestToken> {
        self.pending
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn set_filter(&mut self, query: impl Into<String>) {
        self.filter = query.into();
    }

    /// Services matching the current filter.
    pub fn visible_services(&self) -> Vec<&Service> {
        self.services.iter().filter(|service| service.matches_query(&self.filter)).collect()
    }

    pub fn acts(&self) -> &[Act] {
        &self.acts
    }

    /// Placeholder text shown when the chosen service offers no acts of this kind.
    pub fn empty_message(&self) -> Option<String> {
        let listing = matches!(self.phase, SelectorPhase::ListingActs { .. });
        (listing && self.status == LoadState::Ready && self.acts.is_empty()).then(|| format!("No {} available", self.kind))
    }

    pub fn form(&self) -> &ConfigForm {
        &self.form
    }

    pub fn choose_service(&mut self, service_id: RemoteId) -> Result<Vec<Effect>, WizardError> {
        if self.phase != SelectorPhase::ChoosingService || self.status != LoadState::Ready {
            return Err(WizardError::invalid(self.phase.label(), "choose a service"));
        }
        let service = self
            .services
            .iter()
            .find(|service| service.id == service_id)
            .cloned()
            .ok_or_else(|| WizardError::invalid(self.phase.label(), "choose an unknown service"))?;

        debug!(service = %service.name, kind = %self.kind, "service chosen");
        self.phase = SelectorPhase::CheckingAccess { service };
        self.access = None;
        Ok(self.request(FetchRequest::Service(service_id)))
    }

    pub fn choose_act(&mut self, act_id: RemoteId) -> Result<Vec<Effect>, WizardError> {
        let SelectorPhase::ListingActs { service } = &self.phase else {
            return Err(WizardError::invalid(self.phase.label(), "choose an act"));
        };
        let act = self
            .acts
            .iter()
            .find(|act| act.id == act_id)
            .cloned()
            .ok_or_else(|| WizardError::invalid("listing acts", "choose an unknown act"))?;

        debug!(act = %act.name, "act chosen");
        self.phase = SelectorPhase::FillingConfig {
            service: service.clone(),
            act,
        };
        self.form = ConfigForm::pending();
        Ok(self.request(FetchRequest::Schema { act_id, kind: self.kind }))
    }

    /// Forward a change to the config form. Returns whether it was accepted.
    pub fn edit_field(&mut self, name: &str, input: FieldInput) -> Result<bool, WizardError> {
        if !matches!(self.phase, SelectorPhase::FillingConfig { .. }) || !self.form.is_loaded() {
            return Err(WizardError::invalid(self.phase.label(), "edit a config field"));
        }
        Ok(self.form.update(name, input))
    }

    pub fn can_confirm(&self) -> bool {
        matches!(self.phase, SelectorPhase::FillingConfig { .. }) && self.form.is_valid()
    }

    /// Package the configured act for the caller's slot.
    pub fn confirm(&self) -> Result<ActDetail, WizardError> {
        match &self.phase {
            SelectorPhase::FillingConfig { act, .. } if self.form.is_valid() => {
                Ok(ActDetail::new(self.slot_id, act.clone(), self.form.responses().to_vec()))
            }
            phase => Err(WizardError::invalid(phase.label(), "confirm")),
        }
    }

    pub fn back(&mut self) -> BackOutcome {
        let previous = std::mem::replace(&mut self.phase, SelectorPhase::ChoosingService);
        match previous {
            SelectorPhase::ChoosingService => {
                self.pending = None;
                BackOutcome::Cancelled
            }
            SelectorPhase::CheckingAccess { .. } | SelectorPhase::ListingActs { .. } => {
                self.access = None;
                self.acts.clear();
                BackOutcome::Moved(self.request(FetchRequest::Services))
            }
            SelectorPhase::FillingConfig { service, .. } => {
                let service_id = service.id;
                self.phase = SelectorPhase::ListingActs { service };
                self.form = ConfigForm::pending();
                BackOutcome::Moved(self.request(FetchRequest::Acts { service_id, kind: self.kind }))
            }
        }
    }

    /// Apply the outcome of the fetch tagged `token`.
    ///
    /// Results for anything but the outstanding request are discarded. A
    /// failed fetch leaves the phase in place with [`LoadState::Failed`].
    pub fn receive(&mut self, token: RequestToken, result: Result<FetchResult, ApiError>) -> Result<Vec<Effect>, WizardError> {
        if self.pending != Some(token) {
            warn!(%token, phase = self.phase.label(), "discarding stale response");
            return Ok(Vec::new());
        }
        self.pending = None;

        let result = match result {
            Ok(result) => result,
            Err(error) => {
                warn!(%token, phase = self.phase.label(), error = %error, "fetch failed");
                self.status = LoadState::Failed(error.to_string());
                return Ok(Vec::new());
            }
        };

        let checking_access = matches!(self.phase, SelectorPhase::CheckingAccess { .. });
        match result {
            FetchResult::Services(services) if self.phase == SelectorPhase::ChoosingService => {
                info!(count = services.len(), "services loaded");
                self.services = services;
                self.status = LoadState::Ready;
                Ok(Vec::new())
            }
            FetchResult::Service(detail) if checking_access => {
                let service_id = detail.id;
                let oauth_required = detail.oauth_required;
                self.access = Some(detail);
                if oauth_required {
                    return Ok(self.request(FetchRequest::Connection(service_id)));
                }
                Ok(self.enter_listing())
            }
            FetchResult::Connection(true) if checking_access => Ok(self.enter_listing()),
            FetchResult::Connection(false) if checking_access => {
                let path = self.connect_path();
                info!(%path, "service not connected; redirecting");
                self.status = LoadState::Ready;
                Ok(vec![Effect::Redirect(path)])
            }
            FetchResult::Acts(acts) if matches!(self.phase, SelectorPhase::ListingActs { .. }) => {
                info!(count = acts.len(), kind = %self.kind, "acts loaded");
                self.acts = acts;
                self.status = LoadState::Ready;
                Ok(Vec::new())
            }
            FetchResult::Schema(schema) => {
                let SelectorPhase::FillingConfig { act, .. } = &self.phase else {
                    return Err(WizardError::invalid(self.phase.label(), "apply a mismatched response"));
                };
                let act_id = act.id;
                let prior = self.prior.as_ref().filter(|prior| prior.act.id == act_id);
                self.form = match prior {
                    Some(prior) => ConfigForm::seeded_with(schema.config_schema, &prior.config),
                    None => ConfigForm::seeded(schema.config_schema),
                };
                self.status = LoadState::Ready;
                Ok(Vec::new())
            }
            _ => Err(WizardError::invalid(self.phase.label(), "apply a mismatched response")),
        }
    }

    fn connect_path(&self) -> String {
        match (&self.access, self.phase.service()) {
            (Some(detail), _) => detail.connect_path(),
            (None, Some(service)) => format!("/services/{}", service.name),
            (None, None) => "/services".to_string(),
        }
    }

    fn enter_listing(&mut self) -> Vec<Effect> {
        let previous = std::mem::replace(&mut self.phase, SelectorPhase::ChoosingService);
        let SelectorPhase::CheckingAccess { service } = previous else {
            self.phase = previous;
            return Vec::new();
        };
        let service_id = service.id;
        self.phase = SelectorPhase::ListingActs { service };
        self.acts.clear();
        self.request(FetchRequest::Acts { service_id, kind: self.kind })
    }

    fn request(&mut self, request: FetchRequest) -> Vec<Effect> {
        let (token, effect) = Effect::fetch(request);
        debug!(%token, request = effect_label(&effect), "fetch requested");
        self.pending = Some(token);
        self.status = LoadState::Loading;
        vec![effect]
    }
}

fn effect_label(effect: &Effect) -> &'static str {
    match effect {
        Effect::Fetch { request, .. } => request.label(),
        _ => "other",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use area_types::{ActSchema, ConfigFieldDescriptor, ConfigFieldResponse};

    fn service(id: i64, name: &str) -> Service {
        Service {
            id,
            name: name.into(),
            image_url: String::new(),
            category: "Chat".into(),
            color: "#5865F2".into(),
        }
    }

    fn detail(id: i64, name: &str, oauth_required: bool) -> ServiceDetail {
        ServiceDetail {
            id,
            name: name.into(),
            description: String::new(),
            image_url: String::new(),
            category: "Chat".into(),
            color: String::new(),
            oauth_required,
        }
    }

    fn act(id: i64, name: &str) -> Act {
        Act {
            id,
            name: name.into(),
            description: String::new(),
        }
    }

    fn token_of(effects: &[Effect]) -> RequestToken {
        match effects {
            [Effect::Fetch { token, .. }] => *token,
            other => panic!("expected a single fetch, got {other:?}"),
        }
    }

    fn request_of(effects: &[Effect]) -> FetchRequest {
        match effects {
            [Effect::Fetch { request, .. }] => request.clone(),
            other => panic!("expected a single fetch, got {other:?}"),
        }
    }

    fn listing_discord() -> ActSelector {
        let (mut selector, effects) = ActSelector::open(ActKind::Reactions, 1, None);
        selector
            .receive(token_of(&effects), Ok(FetchResult::Services(vec![service(4, "Discord")])))
            .unwrap();
        let effects = selector.choose_service(4).unwrap();
        let effects = selector
            .receive(token_of(&effects), Ok(FetchResult::Service(detail(4, "Discord", false))))
            .unwrap();
        assert_eq!(request_of(&effects), FetchRequest::Acts {
            service_id: 4,
            kind: ActKind::Reactions
        });
        selector
            .receive(token_of(&effects), Ok(FetchResult::Acts(vec![act(7, "send_message")])))
            .unwrap();
        selector
    }

    #[test]
    fn opening_requests_services_and_filter_narrows_them() {
        let (mut selector, effects) = ActSelector::open(ActKind::Actions, 0, None);
        assert_eq!(request_of(&effects), FetchRequest::Services);
        assert_eq!(selector.status(), &LoadState::Loading);

        selector
            .receive(
                token_of(&effects),
                Ok(FetchResult::Services(vec![service(1, "GitHub"), service(4, "Discord")])),
            )
            .unwrap();
        selector.set_filter("git");
        let visible: Vec<_> = selector.visible_services().iter().map(|service| service.id).collect();
        assert_eq!(visible, vec![1]);
    }

    #[test]
    fn oauth_gate_redirects_without_listing_acts() {
        let (mut selector, effects) = ActSelector::open(ActKind::Actions, 0, None);
        selector
            .receive(token_of(&effects), Ok(FetchResult::Services(vec![service(1, "GitHub")])))
            .unwrap();
        let effects = selector.choose_service(1).unwrap();
        let effects = selector
            .receive(token_of(&effects), Ok(FetchResult::Service(detail(1, "GitHub", true))))
            .unwrap();
        assert_eq!(request_of(&effects), FetchRequest::Connection(1));

        let effects = selector.receive(token_of(&effects), Ok(FetchResult::Connection(false))).unwrap();
        assert_eq!(effects, vec![Effect::Redirect("/services/GitHub".into())]);
        assert!(selector.choose_act(1).is_err());
    }

    #[test]
    fn empty_act_list_shows_placeholder() {
        let (mut selector, effects) = ActSelector::open(ActKind::Reactions, 1, None);
        selector
            .receive(token_of(&effects), Ok(FetchResult::Services(vec![service(4, "Discord")])))
            .unwrap();
        let effects = selector.choose_service(4).unwrap();
        let effects = selector
            .receive(token_of(&effects), Ok(FetchResult::Service(detail(4, "Discord", false))))
            .unwrap();
        selector.receive(token_of(&effects), Ok(FetchResult::Acts(Vec::new()))).unwrap();
        assert_eq!(selector.empty_message().as_deref(), Some("No reactions available"));
    }

    #[test]
    fn stale_response_after_back_is_discarded() {
        let mut selector = listing_discord();
        let schema_effects = selector.choose_act(7).unwrap();
        let stale = token_of(&schema_effects);

        let BackOutcome::Moved(effects) = selector.back() else {
            panic!("back from config should not cancel");
        };
        assert!(matches!(selector.phase(), SelectorPhase::ListingActs { .. }));

        let schema = ActSchema {
            id: 7,
            name: "send_message".into(),
            description: String::new(),
            config_schema: vec![ConfigFieldDescriptor::input("message")],
            service: None,
        };
        assert!(selector.receive(stale, Ok(FetchResult::Schema(schema))).unwrap().is_empty());
        assert!(!selector.form().is_loaded());
        assert_eq!(selector.pending_token(), Some(token_of(&effects)));
    }

    #[test]
    fn fetch_failure_is_a_load_state_and_back_still_works() {
        let (mut selector, effects) = ActSelector::open(ActKind::Actions, 0, None);
        let error = ApiError::Status {
            status: 502,
            body: "bad gateway".into(),
        };
        selector.receive(token_of(&effects), Err(error)).unwrap();
        assert!(matches!(selector.status(), LoadState::Failed(message) if message.contains("502")));
        assert_eq!(selector.back(), BackOutcome::Cancelled);
    }

    #[test]
    fn confirm_requires_valid_form_and_uses_slot_id() {
        let mut selector = listing_discord();
        let effects = selector.choose_act(7).unwrap();
        let schema = ActSchema {
            id: 7,
            name: "send_message".into(),
            description: String::new(),
            config_schema: vec![ConfigFieldDescriptor::input("message")],
            service: None,
        };
        selector.receive(token_of(&effects), Ok(FetchResult::Schema(schema))).unwrap();

        assert!(!selector.can_confirm());
        assert!(selector.confirm().is_err());
        assert!(selector.edit_field("message", FieldInput::Text("Hello".into())).unwrap());
        let detail = selector.confirm().unwrap();
        assert_eq!(detail.id, 1);
        assert_eq!(detail.act.name, "send_message");
        assert_eq!(detail.config, vec![ConfigFieldResponse::input("message", "Hello")]);
    }

    #[test]
    fn reselecting_the_prior_act_prefills_config() {
        let prior = ActDetail::new(2, act(7, "send_message"), vec![ConfigFieldResponse::input("message", "Old text")]);
        let (mut selector, effects) = ActSelector::open(ActKind::Reactions, 2, Some(prior));
        selector
            .receive(token_of(&effects), Ok(FetchResult::Services(vec![service(4, "Discord")])))
            .unwrap();
        let effects = selector.choose_service(4).unwrap();
        let effects = selector
            .receive(token_of(&effects), Ok(FetchResult::Service(detail(4, "Discord", false))))
            .unwrap();
        selector
            .receive(token_of(&effects), Ok(FetchResult::Acts(vec![act(7, "send_message")])))
            .unwrap();
        let effects = selector.choose_act(7).unwrap();
        let schema = ActSchema {
            id: 7,
            name: "send_message".into(),
            description: String::new(),
            config_schema: vec![ConfigFieldDescriptor::input("message")],
            service: None,
        };
        selector.receive(token_of(&effects), Ok(FetchResult::Schema(schema))).unwrap();
        assert_eq!(selector.confirm().unwrap().config[0], ConfigFieldResponse::input("message", "Old text"));
    }

    #[test]
    fn choosing_before_services_load_is_rejected() {
        let (mut selector, _) = ActSelector::open(ActKind::Actions, 0, None);
        assert!(matches!(
            selector.choose_service(1),
            Err(WizardError::InvalidTransition { .. })
        ));
    }
}

//! Applet composer: the draft being built and the wizard state around it.
//!
//! ```text
//! Composing -> ChoosingAction   -> Composing
//! Composing -> ChoosingReaction -> Composing
//! Composing -> Reviewing -> submit -> /my_applets
//! Reviewing -> Composing
//! ```
//!
//! All transitions are synchronous. Anything that needs the backend is
//! returned as an [`Effect`].

use area_api::ApiError;
use area_types::{
    Act, ActDetail, ActKind, ActionBinding, AppletCreateRequest, AppletReceipt, ExistingApplet, LocalId, ReactionBinding, RemoteId,
};
use tracing::{info, warn};

use crate::effect::{Effect, FetchResult, MY_APPLETS_PATH, RequestToken};
use crate::error::WizardError;
use crate::form::FieldInput;
use crate::selector::{ActSelector, BackOutcome};

/// Local id reserved for the trigger slot.
pub const ACTION_SLOT_ID: LocalId = 0;
/// First local id handed to reactions.
pub const FIRST_REACTION_ID: LocalId = 1;

/// Whether finishing creates a new applet or updates an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposerMode {
    Create,
    Edit { applet_id: RemoteId },
}

/// The applet under construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppletDraft {
    pub action: Option<ActDetail>,
    /// `None` until the first reaction is added; never `Some` of an empty list.
    pub reactions: Option<Vec<ActDetail>>,
    pub title: String,
    pub description: String,
}

impl AppletDraft {
    /// Draft equivalent of an applet read from the backend.
    ///
    /// The trigger takes local id 0 and reactions are numbered from 1 in
    /// server order.
    pub fn from_existing(applet: &ExistingApplet) -> Self {
        let action = ActDetail::new(
            ACTION_SLOT_ID,
            Act {
                id: applet.action.id,
                name: applet.action.name.clone(),
                description: applet.action.description.clone(),
            },
            applet.action.config.clone(),
        );
        let reactions: Vec<ActDetail> = applet
            .reactions
            .iter()
            .zip(FIRST_REACTION_ID..)
            .map(|(entry, id)| {
                ActDetail::new(
                    id,
                    Act {
                        id: entry.id,
                        name: entry.name.clone(),
                        description: entry.description.clone(),
                    },
                    entry.config.clone(),
                )
            })
            .collect();

        Self {
            action: Some(action),
            reactions: (!reactions.is_empty()).then_some(reactions),
            title: applet.area_info.name.clone(),
            description: applet.area_info.description.clone(),
        }
    }

    pub fn select_action(&mut self, detail: ActDetail) {
        self.action = Some(detail);
    }

    pub fn delete_action(&mut self) {
        self.action = None;
    }

    /// Replace the reaction with the same local id in place, or append it.
    pub fn upsert_reaction(&mut self, detail: ActDetail) {
        let reactions = self.reactions.get_or_insert_with(Vec::new);
        match reactions.iter_mut().find(|existing| existing.id == detail.id) {
            Some(existing) => *existing = detail,
            None => reactions.push(detail),
        }
    }

    /// Remove the reaction with local id `id`. Removing the last one resets
    /// the list to `None`.
    pub fn delete_reaction(&mut self, id: LocalId) {
        if let Some(reactions) = self.reactions.as_mut() {
            reactions.retain(|reaction| reaction.id != id);
            if reactions.is_empty() {
                self.reactions = None;
            }
        }
    }

    pub fn reaction(&self, id: LocalId) -> Option<&ActDetail> {
        self.reactions.as_deref()?.iter().find(|reaction| reaction.id == id)
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// `"if {action}, then {first reaction}"`, once both exist.
    pub fn default_title(&self) -> Option<String> {
        let action = self.action.as_ref()?;
        let first = self.reactions.as_deref()?.first()?;
        Some(format!("if {}, then {}", action.act.name, first.act.name))
    }

    pub fn can_finish(&self) -> bool {
        self.action.is_some() && self.reactions.as_ref().is_some_and(|reactions| !reactions.is_empty()) && !self.title.is_empty()
    }

    /// Backend request for this draft, or `None` while it cannot be finished.
    pub fn build_request(&self) -> Option<AppletCreateRequest> {
        if !self.can_finish() {
            return None;
        }
        let action = self.action.as_ref()?;
        let reactions = self.reactions.as_deref()?;
        Some(AppletCreateRequest {
            name: self.title.clone(),
            description: self.description.clone(),
            action: ActionBinding {
                action_id: action.act.id,
                config: action.config.clone(),
            },
            reactions: reactions
                .iter()
                .map(|reaction| ReactionBinding {
                    reaction_id: reaction.act.id,
                    config: reaction.config.clone(),
                })
                .collect(),
        })
    }
}

/// Smallest id `>= start` not used by any reaction.
pub fn next_available_id(reactions: &[ActDetail], start: LocalId) -> LocalId {
    let mut candidate = start;
    while reactions.iter().any(|reaction| reaction.id == candidate) {
        candidate += 1;
    }
    candidate
}

#[derive(Debug, Clone)]
pub enum ComposerState {
    Composing,
    ChoosingAction(ActSelector),
    ChoosingReaction(ActSelector),
    Reviewing,
}

impl ComposerState {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Composing => "composing",
            Self::ChoosingAction(_) => "choosing the action",
            Self::ChoosingReaction(_) => "choosing a reaction",
            Self::Reviewing => "reviewing",
        }
    }
}

/// Rendering of one slot on the composing screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Slot<'a> {
    Empty { enabled: bool },
    Filled(&'a ActDetail),
}

/// Everything a user can do in the wizard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardEvent {
    OpenAction,
    AddReaction,
    EditReaction(LocalId),
    DeleteAction,
    DeleteReaction(LocalId),
    FilterServices(String),
    ChooseService(RemoteId),
    ChooseAct(RemoteId),
    EditField { name: String, input: FieldInput },
    Confirm,
    Back,
    Review,
    SetTitle(String),
    SetDescription(String),
    Finish,
}

impl WizardEvent {
    pub fn label(&self) -> &'static str {
        match self {
            Self::OpenAction => "open the action slot",
            Self::AddReaction => "add a reaction",
            Self::EditReaction(_) => "edit a reaction",
            Self::DeleteAction => "delete the action",
            Self::DeleteReaction(_) => "delete a reaction",
            Self::FilterServices(_) => "filter services",
            Self::ChooseService(_) => "choose a service",
            Self::ChooseAct(_) => "choose an act",
            Self::EditField { .. } => "edit a config field",
            Self::Confirm => "confirm",
            Self::Back => "go back",
            Self::Review => "review",
            Self::SetTitle(_) => "set the title",
            Self::SetDescription(_) => "set the description",
            Self::Finish => "finish",
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppletComposer {
    mode: ComposerMode,
    draft: AppletDraft,
    state: ComposerState,
    title_edited: bool,
    submitting: bool,
    submission_error: Option<String>,
}

impl Default for AppletComposer {
    fn default() -> Self {
        Self::new()
    }
}

impl AppletComposer {
    pub fn new() -> Self {
        Self {
            mode: ComposerMode::Create,
            draft: AppletDraft::default(),
            state: ComposerState::Composing,
            title_edited: false,
            submitting: false,
            submission_error: None,
        }
    }

    /// Composer editing `applet`. Its saved name counts as a user title.
    pub fn editing(applet: &ExistingApplet) -> Self {
        Self {
            mode: ComposerMode::Edit {
                applet_id: applet.area_info.id,
            },
            draft: AppletDraft::from_existing(applet),
            title_edited: true,
            ..Self::new()
        }
    }

    pub fn mode(&self) -> ComposerMode {
        self.mode
    }

    pub fn draft(&self) -> &AppletDraft {
        &self.draft
    }

    pub fn state(&self) -> &ComposerState {
        &self.state
    }

    pub fn selector(&self) -> Option<&ActSelector> {
        match &self.state {
            ComposerState::ChoosingAction(selector) | ComposerState::ChoosingReaction(selector) => Some(selector),
            _ => None,
        }
    }

    fn selector_mut(&mut self) -> Option<&mut ActSelector> {
        match &mut self.state {
            ComposerState::ChoosingAction(selector) | ComposerState::ChoosingReaction(selector) => Some(selector),
            _ => None,
        }
    }

    pub fn submission_error(&self) -> Option<&str> {
        self.submission_error.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn action_slot(&self) -> Slot<'_> {
        match &self.draft.action {
            Some(detail) => Slot::Filled(detail),
            None => Slot::Empty { enabled: true },
        }
    }

    /// One slot per reaction, or a single placeholder while there are none.
    /// The placeholder stays disabled until an action is chosen.
    pub fn reaction_slots(&self) -> Vec<Slot<'_>> {
        match self.draft.reactions.as_deref() {
            Some(reactions) => reactions.iter().map(Slot::Filled).collect(),
            None => vec![Slot::Empty {
                enabled: self.draft.action.is_some(),
            }],
        }
    }

    /// Whether the "add another reaction" control is shown.
    pub fn can_add_another_reaction(&self) -> bool {
        self.draft.action.is_some() && self.draft.reactions.as_ref().is_some_and(|reactions| !reactions.is_empty())
    }

    pub fn can_finish(&self) -> bool {
        matches!(self.state, ComposerState::Reviewing) && !self.submitting && self.draft.can_finish()
    }

    /// Apply one user event.
    pub fn apply(&mut self, event: WizardEvent) -> Result<Vec<Effect>, WizardError> {
        let label = event.label();
        match event {
            WizardEvent::OpenAction => self.open_action(),
            WizardEvent::AddReaction => self.add_reaction(),
            WizardEvent::EditReaction(id) => self.edit_reaction(id),
            WizardEvent::DeleteAction => {
                self.require_composing(label)?;
                self.draft.delete_action();
                Ok(Vec::new())
            }
            WizardEvent::DeleteReaction(id) => {
                self.require_composing(label)?;
                self.draft.delete_reaction(id);
                Ok(Vec::new())
            }
            WizardEvent::FilterServices(query) => {
                self.active_selector(label)?.set_filter(query);
                Ok(Vec::new())
            }
            WizardEvent::ChooseService(service_id) => self.active_selector(label)?.choose_service(service_id),
            WizardEvent::ChooseAct(act_id) => self.active_selector(label)?.choose_act(act_id),
            WizardEvent::EditField { name, input } => {
                self.active_selector(label)?.edit_field(&name, input)?;
                Ok(Vec::new())
            }
            WizardEvent::Confirm => self.confirm(),
            WizardEvent::Back => self.back(),
            WizardEvent::Review => self.review(),
            WizardEvent::SetTitle(title) => {
                self.require_editable_text(label)?;
                self.draft.set_title(title);
                self.title_edited = true;
                Ok(Vec::new())
            }
            WizardEvent::SetDescription(description) => {
                self.require_editable_text(label)?;
                self.draft.set_description(description);
                Ok(Vec::new())
            }
            WizardEvent::Finish => self.finish(),
        }
    }

    /// Route a fetch result to the open selector.
    ///
    /// Results arriving after the selector closed are dropped.
    pub fn receive(&mut self, token: RequestToken, result: Result<FetchResult, ApiError>) -> Result<Vec<Effect>, WizardError> {
        match self.selector_mut() {
            Some(selector) => selector.receive(token, result),
            None => {
                warn!(%token, state = self.state.label(), "discarding response for a closed selector");
                Ok(Vec::new())
            }
        }
    }

    /// Record the outcome of the submission requested by [`WizardEvent::Finish`].
    ///
    /// On failure the draft is kept and the composer stays in review.
    pub fn submission_finished(&mut self, result: Result<AppletReceipt, ApiError>) -> Result<Vec<Effect>, WizardError> {
        if !self.submitting {
            return Err(WizardError::invalid(self.state.label(), "record a submission result"));
        }
        self.submitting = false;
        match result {
            Ok(receipt) => {
                info!(area_id = ?receipt.area_id, mode = ?self.mode, "applet saved");
                self.submission_error = None;
                Ok(vec![Effect::Navigate(MY_APPLETS_PATH.to_string())])
            }
            Err(error) => {
                warn!(error = %error, "applet submission failed");
                let message = error.to_string();
                self.submission_error = Some(message.clone());
                Err(WizardError::Submission(message))
            }
        }
    }

    fn open_action(&mut self) -> Result<Vec<Effect>, WizardError> {
        self.require_composing("open the action slot")?;
        let (selector, effects) = ActSelector::open(ActKind::Actions, ACTION_SLOT_ID, self.draft.action.clone());
        self.state = ComposerState::ChoosingAction(selector);
        Ok(effects)
    }

    fn add_reaction(&mut self) -> Result<Vec<Effect>, WizardError> {
        self.require_composing("add a reaction")?;
        if self.draft.action.is_none() {
            return Err(WizardError::invalid("composing without an action", "add a reaction"));
        }
        let id = next_available_id(self.draft.reactions.as_deref().unwrap_or_default(), FIRST_REACTION_ID);
        let (selector, effects) = ActSelector::open(ActKind::Reactions, id, None);
        self.state = ComposerState::ChoosingReaction(selector);
        Ok(effects)
    }

    fn edit_reaction(&mut self, id: LocalId) -> Result<Vec<Effect>, WizardError> {
        self.require_composing("edit a reaction")?;
        let prior = self
            .draft
            .reaction(id)
            .cloned()
            .ok_or_else(|| WizardError::invalid("composing", "edit a missing reaction"))?;
        let (selector, effects) = ActSelector::open(ActKind::Reactions, id, Some(prior));
        self.state = ComposerState::ChoosingReaction(selector);
        Ok(effects)
    }

    fn confirm(&mut self) -> Result<Vec<Effect>, WizardError> {
        let detail = match self.selector() {
            Some(selector) => selector.confirm()?,
            None => return Err(WizardError::invalid(self.state.label(), "confirm")),
        };
        match std::mem::replace(&mut self.state, ComposerState::Composing) {
            ComposerState::ChoosingAction(_) => self.draft.select_action(detail),
            _ => self.draft.upsert_reaction(detail),
        }
        Ok(Vec::new())
    }

    fn back(&mut self) -> Result<Vec<Effect>, WizardError> {
        match &mut self.state {
            ComposerState::ChoosingAction(selector) | ComposerState::ChoosingReaction(selector) => match selector.back() {
                BackOutcome::Moved(effects) => Ok(effects),
                BackOutcome::Cancelled => {
                    self.state = ComposerState::Composing;
                    Ok(Vec::new())
                }
            },
            ComposerState::Reviewing if !self.submitting => {
                self.state = ComposerState::Composing;
                Ok(Vec::new())
            }
            state => Err(WizardError::invalid(state.label(), "go back")),
        }
    }

    fn review(&mut self) -> Result<Vec<Effect>, WizardError> {
        self.require_composing("review")?;
        if !self.title_edited {
            if let Some(title) = self.draft.default_title() {
                self.draft.title = title;
            }
        }
        self.state = ComposerState::Reviewing;
        Ok(Vec::new())
    }

    fn finish(&mut self) -> Result<Vec<Effect>, WizardError> {
        if !self.can_finish() {
            return Err(WizardError::invalid(self.state.label(), "finish"));
        }
        let request = self
            .draft
            .build_request()
            .ok_or_else(|| WizardError::invalid(self.state.label(), "finish"))?;
        self.submitting = true;
        Ok(vec![Effect::Submit { mode: self.mode, request }])
    }

    fn require_composing(&self, event: &'static str) -> Result<(), WizardError> {
        match self.state {
            ComposerState::Composing => Ok(()),
            ref state => Err(WizardError::invalid(state.label(), event)),
        }
    }

    fn require_editable_text(&self, event: &'static str) -> Result<(), WizardError> {
        match self.state {
            ComposerState::Composing | ComposerState::Reviewing if !self.submitting => Ok(()),
            ref state => Err(WizardError::invalid(state.label(), event)),
        }
    }

    fn active_selector(&mut self, event: &'static str) -> Result<&mut ActSelector, WizardError> {
        let state = self.state.label();
        self.selector_mut().ok_or_else(|| WizardError::invalid(state, event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use area_types::{AppletActEntry, AppletSummary, ConfigFieldResponse, Service, UserShortInfo};

    fn detail(id: LocalId, act_id: RemoteId, name: &str) -> ActDetail {
        ActDetail::new(
            id,
            Act {
                id: act_id,
                name: name.into(),
                description: String::new(),
            },
            Vec::new(),
        )
    }

    fn ready_draft() -> AppletDraft {
        let mut draft = AppletDraft::default();
        draft.select_action(detail(0, 1, "new_issue"));
        draft.upsert_reaction(detail(1, 7, "send_message"));
        draft
    }

    #[test]
    fn next_id_scans_upward_from_start() {
        assert_eq!(next_available_id(&[detail(1, 7, "a"), detail(2, 8, "b")], 1), 3);
        assert_eq!(next_available_id(&[detail(2, 7, "a")], 1), 1);
        assert_eq!(next_available_id(&[], 1), 1);
    }

    #[test]
    fn upsert_is_idempotent_and_replaces_in_place() {
        let mut once = ready_draft();
        once.upsert_reaction(detail(2, 9, "post_tweet"));
        let mut twice = once.clone();
        twice.upsert_reaction(detail(2, 9, "post_tweet"));
        assert_eq!(once, twice);

        twice.upsert_reaction(detail(1, 10, "send_mail"));
        let names: Vec<_> = twice.reactions.unwrap().iter().map(|reaction| reaction.act.name.clone()).collect();
        assert_eq!(names, vec!["send_mail", "post_tweet"]);
    }

    #[test]
    fn deleting_the_last_reaction_collapses_to_none() {
        let mut draft = ready_draft();
        draft.delete_reaction(1);
        assert_eq!(draft.reactions, None);
        draft.delete_reaction(1);
        assert_eq!(draft.reactions, None);
    }

    #[test]
    fn finish_is_gated_on_action_reactions_and_title() {
        let mut draft = ready_draft();
        assert!(!draft.can_finish());
        draft.set_title("Ping me");
        assert!(draft.can_finish());

        let mut no_action = draft.clone();
        no_action.delete_action();
        assert!(!no_action.can_finish());
        assert!(no_action.build_request().is_none());

        let mut no_reactions = draft.clone();
        no_reactions.delete_reaction(1);
        assert!(!no_reactions.can_finish());
    }

    #[test]
    fn review_synthesizes_title_until_user_edits_it() {
        let mut composer = AppletComposer::new();
        composer.draft = ready_draft();
        composer.apply(WizardEvent::Review).unwrap();
        assert_eq!(composer.draft().title, "if new_issue, then send_message");

        composer.apply(WizardEvent::SetTitle(String::new())).unwrap();
        assert!(!composer.can_finish());
        assert!(matches!(
            composer.apply(WizardEvent::Finish),
            Err(WizardError::InvalidTransition { .. })
        ));

        composer.apply(WizardEvent::Back).unwrap();
        composer.apply(WizardEvent::Review).unwrap();
        assert_eq!(composer.draft().title, "");
    }

    #[test]
    fn reaction_placeholder_is_disabled_without_action() {
        let mut composer = AppletComposer::new();
        assert_eq!(composer.reaction_slots(), vec![Slot::Empty { enabled: false }]);
        assert!(composer.apply(WizardEvent::AddReaction).is_err());
        assert!(matches!(composer.state(), ComposerState::Composing));

        composer.draft.select_action(detail(0, 1, "new_issue"));
        assert_eq!(composer.reaction_slots(), vec![Slot::Empty { enabled: true }]);
        assert!(!composer.can_add_another_reaction());
    }

    #[test]
    fn add_reaction_opens_selector_with_next_free_id() {
        let mut composer = AppletComposer::new();
        composer.draft = ready_draft();
        composer.draft.upsert_reaction(detail(3, 8, "post"));
        let effects = composer.apply(WizardEvent::AddReaction).unwrap();
        assert_eq!(effects.len(), 1);
        assert_eq!(composer.selector().map(ActSelector::slot_id), Some(2));
        assert_eq!(composer.selector().map(ActSelector::kind), Some(ActKind::Reactions));

        composer.apply(WizardEvent::Back).unwrap();
        assert!(matches!(composer.state(), ComposerState::Composing));
    }

    #[test]
    fn illegal_events_leave_state_untouched() {
        let mut composer = AppletComposer::new();
        assert!(matches!(
            composer.apply(WizardEvent::Confirm),
            Err(WizardError::InvalidTransition { state: "composing", .. })
        ));
        assert!(composer.apply(WizardEvent::Back).is_err());
        assert!(composer.apply(WizardEvent::ChooseService(1)).is_err());
        assert!(composer.apply(WizardEvent::EditReaction(4)).is_err());
        assert_eq!(composer.draft(), &AppletDraft::default());
    }

    #[test]
    fn submission_failure_keeps_draft_and_allows_retry() {
        let mut composer = AppletComposer::new();
        composer.draft = ready_draft();
        composer.apply(WizardEvent::Review).unwrap();
        let effects = composer.apply(WizardEvent::Finish).unwrap();
        assert!(matches!(effects.as_slice(), [Effect::Submit { mode: ComposerMode::Create, .. }]));
        assert!(composer.apply(WizardEvent::Finish).is_err());

        let error = composer
            .submission_finished(Err(ApiError::Status {
                status: 400,
                body: "Bad request".into(),
            }))
            .unwrap_err();
        assert!(matches!(error, WizardError::Submission(_)));
        assert!(composer.submission_error().is_some_and(|message| message.contains("Bad request")));
        assert!(matches!(composer.state(), ComposerState::Reviewing));
        assert_eq!(composer.draft().reactions.as_ref().map(Vec::len), Some(1));

        composer.apply(WizardEvent::Finish).unwrap();
        let effects = composer.submission_finished(Ok(AppletReceipt::default())).unwrap();
        assert_eq!(effects, vec![Effect::Navigate("/my_applets".into())]);
        assert_eq!(composer.submission_error(), None);
    }

    #[test]
    fn editing_seeds_draft_from_existing_applet() {
        let service = Service {
            id: 2,
            name: "Date and time".into(),
            image_url: String::new(),
            category: "Utility".into(),
            color: String::new(),
        };
        let entry = |id: RemoteId, name: &str| AppletActEntry {
            id,
            name: name.into(),
            description: String::new(),
            service: service.clone(),
            config: vec![ConfigFieldResponse::input("message", name)],
        };
        let applet = ExistingApplet {
            area_info: AppletSummary {
                id: 12,
                name: "Morning ping".into(),
                description: "daily".into(),
                user: UserShortInfo { id: 1, name: "ada".into() },
                enable: true,
                created_at: chrono::NaiveDate::from_ymd_opt(2025, 3, 1)
                    .and_then(|date| date.and_hms_opt(10, 0, 0))
                    .unwrap(),
                color: String::new(),
            },
            action: entry(3, "every_day"),
            reactions: vec![entry(7, "send_message"), entry(9, "post")],
        };

        let mut composer = AppletComposer::editing(&applet);
        assert_eq!(composer.mode(), ComposerMode::Edit { applet_id: 12 });
        let draft = composer.draft();
        assert_eq!(draft.action.as_ref().map(|action| action.id), Some(0));
        let ids: Vec<_> = draft.reactions.as_deref().unwrap().iter().map(|reaction| reaction.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(draft.description, "daily");

        composer.apply(WizardEvent::Review).unwrap();
        assert_eq!(composer.draft().title, "Morning ping");
        let effects = composer.apply(WizardEvent::Finish).unwrap();
        assert!(matches!(effects.as_slice(), [Effect::Submit { mode: ComposerMode::Edit { applet_id: 12 }, .. }]));
    }
}

//! Async driver running composer effects against an [`AreaGateway`].

use std::collections::VecDeque;

use area_api::ApiError;
use area_types::{AppletReceipt, RemoteId};
use tracing::{debug, info};

use crate::composer::{AppletComposer, ComposerMode, WizardEvent};
use crate::effect::{Effect, FetchRequest, FetchResult};
use crate::error::WizardError;
use crate::gateway::AreaGateway;

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionExit {
    /// The user must connect a service first.
    Redirected(String),
    /// The applet was saved.
    Navigated(String),
}

impl SessionExit {
    pub fn path(&self) -> &str {
        match self {
            Self::Redirected(path) | Self::Navigated(path) => path,
        }
    }
}

/// One run of the wizard.
///
/// Each dispatched event is applied to the composer and every effect it
/// produces is carried out before `dispatch` returns, in order, on the
/// caller's task.
pub struct WizardSession<G> {
    gateway: G,
    composer: AppletComposer,
    exit: Option<SessionExit>,
    receipt: Option<AppletReceipt>,
}

impl<G: AreaGateway> WizardSession<G> {
    pub fn new(gateway: G) -> Self {
        Self::with_composer(gateway, AppletComposer::new())
    }

    /// Start an edit session seeded from the stored applet `applet_id`.
    pub async fn edit(gateway: G, applet_id: RemoteId) -> Result<Self, WizardError> {
        let applet = gateway.get_applet(applet_id).await?;
        info!(applet_id, reactions = applet.reactions.len(), "editing applet");
        Ok(Self::with_composer(gateway, AppletComposer::editing(&applet)))
    }

    fn with_composer(gateway: G, composer: AppletComposer) -> Self {
        Self {
            gateway,
            composer,
            exit: None,
            receipt: None,
        }
    }

    pub fn composer(&self) -> &AppletComposer {
        &self.composer
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn exit(&self) -> Option<&SessionExit> {
        self.exit.as_ref()
    }

    /// Receipt of the last successful submission.
    pub fn receipt(&self) -> Option<&AppletReceipt> {
        self.receipt.as_ref()
    }

    pub async fn dispatch(&mut self, event: WizardEvent) -> Result<(), WizardError> {
        if self.exit.is_some() {
            return Err(WizardError::invalid("finished", event.label()));
        }
        let effects = self.composer.apply(event)?;
        self.run(effects).await
    }

    async fn run(&mut self, effects: Vec<Effect>) -> Result<(), WizardError> {
        let mut queue = VecDeque::from(effects);
        while let Some(effect) = queue.pop_front() {
            match effect {
                Effect::Fetch { token, request } => {
                    debug!(%token, request = request.label(), "running fetch");
                    let result = self.fetch(request).await;
                    queue.extend(self.composer.receive(token, result)?);
                }
                Effect::Submit { mode, request } => {
                    let result = match mode {
                        ComposerMode::Create => self.gateway.create_applet(&request).await,
                        ComposerMode::Edit { applet_id } => self.gateway.update_applet(applet_id, &request).await,
                    };
                    if let Ok(receipt) = &result {
                        self.receipt = Some(receipt.clone());
                    }
                    queue.extend(self.composer.submission_finished(result)?);
                }
                Effect::Redirect(path) => {
                    info!(%path, "leaving wizard");
                    self.exit = Some(SessionExit::Redirected(path));
                    break;
                }
                Effect::Navigate(path) => {
                    self.exit = Some(SessionExit::Navigated(path));
                    break;
                }
            }
        }
        Ok(())
    }

    async fn fetch(&self, request: FetchRequest) -> Result<FetchResult, ApiError> {
        match request {
            FetchRequest::Services => self.gateway.list_services().await.map(FetchResult::Services),
            FetchRequest::Service(service_id) => self.gateway.get_service(service_id).await.map(FetchResult::Service),
            FetchRequest::Connection(service_id) => self.gateway.is_connected(service_id).await.map(FetchResult::Connection),
            FetchRequest::Acts { service_id, kind } => self.gateway.list_acts(service_id, kind).await.map(FetchResult::Acts),
            FetchRequest::Schema { act_id, kind } => self.gateway.get_act_schema(act_id, kind).await.map(FetchResult::Schema),
        }
    }
}

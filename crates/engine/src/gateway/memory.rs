use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, PoisonError};

use area_api::ApiError;
use area_types::{Act, ActKind, ActSchema, AppletCreateRequest, AppletReceipt, ExistingApplet, RemoteId, Service, ServiceDetail};
use async_trait::async_trait;

use super::AreaGateway;

/// One recorded gateway invocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GatewayCall {
    ListServices,
    GetService(RemoteId),
    IsConnected(RemoteId),
    ListActs(RemoteId, ActKind),
    GetActSchema(RemoteId, ActKind),
    CreateApplet,
    UpdateApplet(RemoteId),
    GetApplet(RemoteId),
}

/// Fixture-backed [`AreaGateway`] that records every call.
///
/// Lookups without a fixture answer HTTP 404; calls registered with
/// [`InMemoryGateway::failing`] answer HTTP 500.
#[derive(Debug, Default)]
pub struct InMemoryGateway {
    services: Vec<ServiceDetail>,
    connected: HashSet<RemoteId>,
    acts: HashMap<(RemoteId, ActKind), Vec<Act>>,
    schemas: HashMap<(RemoteId, ActKind), ActSchema>,
    applets: HashMap<RemoteId, ExistingApplet>,
    failures: HashSet<GatewayCall>,
    calls: Mutex<Vec<GatewayCall>>,
    submissions: Mutex<Vec<AppletCreateRequest>>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_service(mut self, service: ServiceDetail) -> Self {
        self.services.push(service);
        self
    }

    /// Mark an OAuth service as linked for the current user.
    pub fn connected(mut self, service_id: RemoteId) -> Self {
        self.connected.insert(service_id);
        self
    }

    pub fn with_acts(mut self, service_id: RemoteId, kind: ActKind, acts: Vec<Act>) -> Self {
        self.acts.insert((service_id, kind), acts);
        self
    }

    pub fn with_schema(mut self, kind: ActKind, schema: ActSchema) -> Self {
        self.schemas.insert((schema.id, kind), schema);
        self
    }

    pub fn with_applet(mut self, applet: ExistingApplet) -> Self {
        self.applets.insert(applet.area_info.id, applet);
        self
    }

    pub fn failing(mut self, call: GatewayCall) -> Self {
        self.failures.insert(call);
        self
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Requests received by create and update, in order.
    pub fn submissions(&self) -> Vec<AppletCreateRequest> {
        self.submissions.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn record(&self, call: GatewayCall) -> Result<(), ApiError> {
        let failing = self.failures.contains(&call);
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).push(call);
        if failing {
            return Err(ApiError::Status {
                status: 500,
                body: "injected failure".into(),
            });
        }
        Ok(())
    }

    fn submit(&self, request: &AppletCreateRequest) {
        self.submissions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());
    }
}

fn not_found(what: &str) -> ApiError {
    ApiError::Status {
        status: 404,
        body: format!("{what} not found"),
    }
}

#[async_trait]
impl AreaGateway for InMemoryGateway {
    async fn list_services(&self) -> Result<Vec<Service>, ApiError> {
        self.record(GatewayCall::ListServices)?;
        Ok(self.services.iter().map(ServiceDetail::summary).collect())
    }

    async fn get_service(&self, service_id: RemoteId) -> Result<ServiceDetail, ApiError> {
        self.record(GatewayCall::GetService(service_id))?;
        self.services
            .iter()
            .find(|service| service.id == service_id)
            .cloned()
            .ok_or_else(|| not_found("service"))
    }

    async fn is_connected(&self, service_id: RemoteId) -> Result<bool, ApiError> {
        self.record(GatewayCall::IsConnected(service_id))?;
        Ok(self.connected.contains(&service_id))
    }

    async fn list_acts(&self, service_id: RemoteId, kind: ActKind) -> Result<Vec<Act>, ApiError> {
        self.record(GatewayCall::ListActs(service_id, kind))?;
        Ok(self.acts.get(&(service_id, kind)).cloned().unwrap_or_default())
    }

    async fn get_act_schema(&self, act_id: RemoteId, kind: ActKind) -> Result<ActSchema, ApiError> {
        self.record(GatewayCall::GetActSchema(act_id, kind))?;
        self.schemas.get(&(act_id, kind)).cloned().ok_or_else(|| not_found(kind.as_str()))
    }

    async fn create_applet(&self, request: &AppletCreateRequest) -> Result<AppletReceipt, ApiError> {
        self.record(GatewayCall::CreateApplet)?;
        self.submit(request);
        let area_id = RemoteId::try_from(self.submissions().len()).unwrap_or(RemoteId::MAX);
        Ok(AppletReceipt {
            message: Some("Area created".into()),
            area_id: Some(area_id),
            user_id: Some(1),
        })
    }

    async fn update_applet(&self, applet_id: RemoteId, request: &AppletCreateRequest) -> Result<AppletReceipt, ApiError> {
        self.record(GatewayCall::UpdateApplet(applet_id))?;
        if !self.applets.contains_key(&applet_id) {
            return Err(not_found("area"));
        }
        self.submit(request);
        Ok(AppletReceipt {
            message: Some("Area updated".into()),
            area_id: Some(applet_id),
            user_id: Some(1),
        })
    }

    async fn get_applet(&self, applet_id: RemoteId) -> Result<ExistingApplet, ApiError> {
        self.record(GatewayCall::GetApplet(applet_id))?;
        self.applets.get(&applet_id).cloned().ok_or_else(|| not_found("area"))
    }
}

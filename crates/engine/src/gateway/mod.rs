//! Backend capabilities the wizard depends on.
//!
//! - `http`: [`AreaGateway`] over the REST client
//! - `memory`: fixture-backed gateway for tests and offline runs

mod http;
mod memory;

use area_api::ApiError;
use area_types::{Act, ActKind, ActSchema, AppletCreateRequest, AppletReceipt, ExistingApplet, RemoteId, Service, ServiceDetail};
use async_trait::async_trait;

pub use memory::{GatewayCall, InMemoryGateway};

/// Everything the wizard asks of the backend.
#[async_trait]
pub trait AreaGateway: Send + Sync {
    async fn list_services(&self) -> Result<Vec<Service>, ApiError>;
    async fn get_service(&self, service_id: RemoteId) -> Result<ServiceDetail, ApiError>;
    /// Whether the signed-in user has linked the service.
    async fn is_connected(&self, service_id: RemoteId) -> Result<bool, ApiError>;
    async fn list_acts(&self, service_id: RemoteId, kind: ActKind) -> Result<Vec<Act>, ApiError>;
    async fn get_act_schema(&self, act_id: RemoteId, kind: ActKind) -> Result<ActSchema, ApiError>;
    async fn create_applet(&self, request: &AppletCreateRequest) -> Result<AppletReceipt, ApiError>;
    async fn update_applet(&self, applet_id: RemoteId, request: &AppletCreateRequest) -> Result<AppletReceipt, ApiError>;
    async fn get_applet(&self, applet_id: RemoteId) -> Result<ExistingApplet, ApiError>;
}

use area_api::{ApiError, AreaClient};
use area_types::{Act, ActKind, ActSchema, AppletCreateRequest, AppletReceipt, ExistingApplet, RemoteId, Service, ServiceDetail};
use async_trait::async_trait;

use super::AreaGateway;

#[async_trait]
impl AreaGateway for AreaClient {
    async fn list_services(&self) -> Result<Vec<Service>, ApiError> {
        AreaClient::list_services(self).await
    }

    async fn get_service(&self, service_id: RemoteId) -> Result<ServiceDetail, ApiError> {
        AreaClient::get_service(self, service_id).await
    }

    async fn is_connected(&self, service_id: RemoteId) -> Result<bool, ApiError> {
        AreaClient::is_connected(self, service_id).await
    }

    async fn list_acts(&self, service_id: RemoteId, kind: ActKind) -> Result<Vec<Act>, ApiError> {
        AreaClient::list_acts(self, service_id, kind).await
    }

    async fn get_act_schema(&self, act_id: RemoteId, kind: ActKind) -> Result<ActSchema, ApiError> {
        AreaClient::get_act_schema(self, act_id, kind).await
    }

    async fn create_applet(&self, request: &AppletCreateRequest) -> Result<AppletReceipt, ApiError> {
        AreaClient::create_applet(self, request).await
    }

    async fn update_applet(&self, applet_id: RemoteId, request: &AppletCreateRequest) -> Result<AppletReceipt, ApiError> {
        AreaClient::update_applet(self, applet_id, request).await
    }

    async fn get_applet(&self, applet_id: RemoteId) -> Result<ExistingApplet, ApiError> {
        AreaClient::get_applet(self, applet_id).await
    }
}

//! Applet documents: existing applets read from the backend and the
//! create/update request the wizard submits.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::{ConfigFieldResponse, RemoteId, Service};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserShortInfo {
    pub id: RemoteId,
    pub name: String,
}

/// Applet header (`area_info`) as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppletSummary {
    pub id: RemoteId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub user: UserShortInfo,
    #[serde(default)]
    pub enable: bool,
    pub created_at: NaiveDateTime,
    #[serde(default)]
    pub color: String,
}

/// One act of an existing applet, with the config it was saved with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppletActEntry {
    pub id: RemoteId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub service: Service,
    #[serde(default)]
    pub config: Vec<ConfigFieldResponse>,
}

/// Private applet detail from `GET /areas/{id}`; seeds the wizard in edit mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExistingApplet {
    pub area_info: AppletSummary,
    pub action: AppletActEntry,
    pub reactions: Vec<AppletActEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionBinding {
    pub action_id: RemoteId,
    pub config: Vec<ConfigFieldResponse>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionBinding {
    pub reaction_id: RemoteId,
    pub config: Vec<ConfigFieldResponse>,
}

/// Body of `POST /users/areas/me` and `PATCH /users/areas/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppletCreateRequest {
    pub name: String,
    pub description: String,
    pub action: ActionBinding,
    pub reactions: Vec<ReactionBinding>,
}

/// Acknowledgement returned by create and update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppletReceipt {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub area_id: Option<RemoteId>,
    #[serde(default)]
    pub user_id: Option<RemoteId>,
}

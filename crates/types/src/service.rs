//! Third-party service descriptions.

use serde::{Deserialize, Serialize};

use crate::RemoteId;

/// A third-party integration as returned by `GET /services/list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub id: RemoteId,
    pub name: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub color: String,
}

impl Service {
    /// Case-insensitive match of `query` against the service name or category.
    ///
    /// An empty (or whitespace only) query matches every service.
    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&query) || self.category.to_lowercase().contains(&query)
    }
}

/// Full service record from `GET /services/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDetail {
    pub id: RemoteId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub color: String,
    /// Whether the user must link the service through OAuth before its acts can be configured.
    #[serde(default)]
    pub oauth_required: bool,
}

impl ServiceDetail {
    /// Front-end path of the page where the user connects this service.
    pub fn connect_path(&self) -> String {
        format!("/services/{}", self.name)
    }

    /// The list-view projection of this record.
    pub fn summary(&self) -> Service {
        Service {
            id: self.id,
            name: self.name.clone(),
            image_url: self.image_url.clone(),
            category: self.category.clone(),
            color: self.color.clone(),
        }
    }
}

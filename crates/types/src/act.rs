//! Actions and reactions offered by services.

use std::{error::Error, fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize};

use crate::{ConfigFieldDescriptor, RemoteId, Service};

/// Which side of an applet an act belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActKind {
    /// Trigger acts (`/services/{id}/actions`, `/actions/{id}`).
    Actions,
    /// Effect acts (`/services/{id}/reactions`, `/reactions/{id}`).
    Reactions,
}

impl ActKind {
    /// Path segment used by the backend routes.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Actions => "actions",
            Self::Reactions => "reactions",
        }
    }
}

impl fmt::Display for ActKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActKind {
    type Err = ParseActKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "actions" | "action" => Ok(Self::Actions),
            "reactions" | "reaction" => Ok(Self::Reactions),
            _ => Err(ParseActKindError),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseActKindError;

impl fmt::Display for ParseActKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid act kind; expected 'actions' or 'reactions'")
    }
}

impl Error for ParseActKindError {}

/// Short act record as listed under a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Act {
    pub id: RemoteId,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Full act record including the configuration schema.
///
/// The act list endpoint does not carry the schema, so this is fetched separately
/// once the user picks an act.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActSchema {
    pub id: RemoteId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Ordered configurable fields. A `null` schema is read as "no fields".
    #[serde(default, deserialize_with = "null_as_empty")]
    pub config_schema: Vec<ConfigFieldDescriptor>,
    #[serde(default)]
    pub service: Option<Service>,
}

impl ActSchema {
    /// The short act record for this schema.
    pub fn act(&self) -> Act {
        Act {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<ConfigFieldDescriptor>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<ConfigFieldDescriptor>>::deserialize(deserializer)?.unwrap_or_default())
}

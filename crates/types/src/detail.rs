use serde::{Deserialize, Serialize};

use crate::{Act, ConfigFieldResponse};

/// Locally assigned sequence number distinguishing the acts of one draft.
///
/// Not a server identifier; it only lets the composer target a slot for edit or delete.
pub type LocalId = u32;

/// A fully configured trigger or reaction pending inclusion in an applet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActDetail {
    pub id: LocalId,
    pub act: Act,
    pub config: Vec<ConfigFieldResponse>,
}

impl ActDetail {
    pub fn new(id: LocalId, act: Act, config: Vec<ConfigFieldResponse>) -> Self {
        Self { id, act, config }
    }
}

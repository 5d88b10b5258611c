//! Player and project identity providers
//!
//! Identity is read on every call, so a provider backed by a sign-in flow can
//! refresh its token between calls without rebuilding the service.

use crate::config::CloudSaveConfig;

/// Signed-in player
pub trait PlayerIdentity: Send + Sync {
    /// Current player id
    fn player_id(&self) -> Option<String>;

    /// Current bearer token
    fn access_token(&self) -> Option<String>;
}

/// Cloud project the game is linked to
pub trait ProjectIdentity: Send + Sync {
    /// Cloud project id
    fn cloud_project_id(&self) -> Option<String>;
}

/// Fixed identity values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticIdentity {
    /// Cloud project id
    pub project_id: Option<String>,
    /// Player id
    pub player_id: Option<String>,
    /// Bearer token
    pub access_token: Option<String>,
}

impl StaticIdentity {
    /// Identity with every value set
    pub fn new(
        project_id: impl Into<String>,
        player_id: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            project_id: Some(project_id.into()),
            player_id: Some(player_id.into()),
            access_token: Some(access_token.into()),
        }
    }
}

impl From<&CloudSaveConfig> for StaticIdentity {
    fn from(config: &CloudSaveConfig) -> Self {
        Self {
            project_id: config.project_id.clone(),
            player_id: config.player_id.clone(),
            access_token: config.access_token.clone(),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}

impl PlayerIdentity for StaticIdentity {
    fn player_id(&self) -> Option<String> {
        non_empty(&self.player_id)
    }

    fn access_token(&self) -> Option<String> {
        non_empty(&self.access_token)
    }
}

impl ProjectIdentity for StaticIdentity {
    fn cloud_project_id(&self) -> Option<String> {
        non_empty(&self.project_id)
    }
}

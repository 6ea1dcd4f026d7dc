//! SendBroadcastHandler - Command handler for messaging tourists.

use crate::application::resource_refresher::ResourceRefresher;
use crate::domain::dashboard::{Broadcast, BroadcastDraft, ResourceKind};

use super::CommandError;

#[derive(Debug, Clone)]
pub struct SendBroadcastCommand {
    pub draft: BroadcastDraft,
}

#[derive(Clone)]
pub struct SendBroadcastHandler {
    refresher: ResourceRefresher,
}

impl SendBroadcastHandler {
    pub fn new(refresher: ResourceRefresher) -> Self {
        Self { refresher }
    }

    pub async fn handle(&self, cmd: SendBroadcastCommand) -> Result<Broadcast, CommandError> {
        cmd.draft.validate()?;

        let broadcast = self
            .refresher
            .api()
            .send_broadcast(&cmd.draft)
            .await?
            .into_result()?;
        tracing::info!(
            broadcast_id = %broadcast.id,
            priority = ?broadcast.priority,
            recipients = broadcast.recipients,
            "broadcast sent"
        );

        self.refresher
            .refresh_selective(&[ResourceKind::BroadcastHistory, ResourceKind::DashboardStats])
            .await;

        Ok(broadcast)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryDashboardApi;
    use crate::application::SharedDashboard;
    use crate::domain::dashboard::{BroadcastPriority, DashboardState};
    use std::sync::Arc;
    use tokio::sync::RwLock;

    fn setup() -> (SendBroadcastHandler, InMemoryDashboardApi, SharedDashboard) {
        let api = InMemoryDashboardApi::new();
        let dashboard: SharedDashboard = Arc::new(RwLock::new(DashboardState::default()));
        let refresher = ResourceRefresher::new(Arc::new(api.clone()), dashboard.clone());
        (SendBroadcastHandler::new(refresher), api, dashboard)
    }

    #[tokio::test]
    async fn broadcast_appears_in_history() {
        let (handler, _api, dashboard) = setup();

        handler
            .handle(SendBroadcastCommand {
                draft: BroadcastDraft {
                    message: "Storm warning: leave the beach".into(),
                    priority: BroadcastPriority::Emergency,
                    target_zone: None,
                },
            })
            .await
            .unwrap();

        let state = dashboard.read().await;
        assert_eq!(state.broadcast_history().data().len(), 1);
        assert_eq!(state.stats().data().broadcasts_sent, 1);
    }

    #[tokio::test]
    async fn empty_message_is_rejected_locally() {
        let (handler, api, _) = setup();

        let err = handler
            .handle(SendBroadcastCommand {
                draft: BroadcastDraft {
                    message: String::new(),
                    priority: BroadcastPriority::Normal,
                    target_zone: None,
                },
            })
            .await
            .unwrap_err();

        assert!(matches!(err, CommandError::Validation(_)));
        assert!(api.writes().is_empty());
    }
}

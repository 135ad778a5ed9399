use tokio::sync::RwLock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub access_token: String,
    pub employee_id: i32,
}

/// The caller's identity for a [`super::SwapClient`]. Tokens are issued and
/// refreshed elsewhere; this only holds the current one.
#[derive(Debug, Default)]
pub struct Session {
    state: RwLock<Option<SessionState>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn login(&self, access_token: impl Into<String>, employee_id: i32) {
        let mut state = self.state.write().await;
        *state = Some(SessionState {
            access_token: access_token.into(),
            employee_id,
        });
        tracing::debug!(employee_id, "Session started");
    }

    pub async fn logout(&self) {
        if let Some(previous) = self.state.write().await.take() {
            tracing::debug!(employee_id = previous.employee_id, "Session ended");
        }
    }

    pub async fn current(&self) -> Option<SessionState> {
        self.state.read().await.clone()
    }

    pub async fn is_active(&self) -> bool {
        self.state.read().await.is_some()
    }
}

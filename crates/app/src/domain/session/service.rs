//! Session service.

use async_trait::async_trait;
use mockall::automock;
use tracing::debug;

use crate::{
    domain::session::models::UserSession,
    http::{BackendClient, BackendError, Endpoint},
};

#[derive(Debug, Clone)]
pub struct HttpSessionService {
    client: BackendClient,
}

impl HttpSessionService {
    #[must_use]
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SessionService for HttpSessionService {
    async fn current_user(&self) -> Result<Option<UserSession>, BackendError> {
        let response = match self.client.get(Endpoint::UserDetails).await {
            Ok(response) => response,
            Err(BackendError::Status { status, .. }) if status.is_client_error() => {
                debug!(%status, "no active session");

                return Ok(None);
            }
            Err(error) => return Err(error),
        };

        if !response.success {
            return Ok(None);
        }

        Ok(response.data)
    }
}

#[automock]
#[async_trait]
pub trait SessionService: Send + Sync {
    /// Resolve the user behind the ambient credential, `None` for guests.
    async fn current_user(&self) -> Result<Option<UserSession>, BackendError>;
}

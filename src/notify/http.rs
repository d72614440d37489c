use async_trait::async_trait;
use tracing::{error, instrument};

use super::{Email, Notifier};
use crate::error::NotifyError;
use crate::hosted::{check_status, HostedApi};

/// Sends mail through the hosted `Core/SendEmail` integration.
#[derive(Clone)]
pub struct HttpNotifier {
    api: HostedApi,
}

impl HttpNotifier {
    pub fn new(api: HostedApi) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    #[instrument(skip(self, email), fields(to = %email.to))]
    async fn send_email(&self, email: Email) -> Result<(), NotifyError> {
        if !email.to.contains('@') {
            return Err(NotifyError::InvalidRecipient(email.to));
        }

        let url = self
            .api
            .endpoint(&["integration-endpoints", "Core", "SendEmail"]);
        let response = self.api.post(url).json(&email).send().await?;

        check_status(response).await.map_err(|(status, body)| {
            error!("SendEmail rejected with {}", status);
            NotifyError::Rejected { status, body }
        })?;
        Ok(())
    }
}

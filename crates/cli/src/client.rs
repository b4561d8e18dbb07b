use api_types::{
    ErrorBody, Message,
    event::{EventNew, EventView},
    payment::{PaymentNew, PaymentView, QuickPay},
};
use reqwest::{Method, Url};
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

use crate::error::{AppError, Result};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("rejected: {0}")]
    Validation(String),
    #[error("server error: {0}")]
    Server(String),
    #[error("server unreachable: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ClientError {
    fn from_status(status: u16, body: String) -> Self {
        match status {
            404 => Self::NotFound(body),
            400 | 422 => Self::Validation(body),
            _ => Self::Server(body),
        }
    }
}

/// HTTP client for the WhoPaid API.
#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    http: reqwest::Client,
}

impl Client {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|err| AppError::Usage(format!("invalid base_url: {err}")))?;
        Ok(Self {
            base_url,
            http: reqwest::Client::new(),
        })
    }

    async fn send<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> std::result::Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let endpoint = self
            .base_url
            .join(path)
            .map_err(|err| ClientError::Server(format!("invalid base_url: {err}")))?;

        let mut request = self.http.request(method, endpoint);
        if let Some(body) = body {
            request = request.json(body);
        }
        let res = request.send().await?;

        if res.status().is_success() {
            return Ok(res.json::<T>().await?);
        }

        let status = res.status();
        let body = res
            .json::<ErrorBody>()
            .await
            .map(|err| err.error)
            .unwrap_or_else(|_| "unknown error".to_string());
        Err(ClientError::from_status(status.as_u16(), body))
    }

    pub async fn events(&self) -> std::result::Result<Vec<EventView>, ClientError> {
        self.send::<(), _>(Method::GET, "events", None).await
    }

    pub async fn event(&self, event_id: &str) -> std::result::Result<EventView, ClientError> {
        self.send::<(), _>(Method::GET, &format!("events/{event_id}"), None)
            .await
    }

    pub async fn create_event(
        &self,
        payload: &EventNew,
    ) -> std::result::Result<EventView, ClientError> {
        self.send(Method::POST, "events", Some(payload)).await
    }

    pub async fn update_event(
        &self,
        event_id: &str,
        payload: &EventNew,
    ) -> std::result::Result<EventView, ClientError> {
        self.send(Method::PUT, &format!("events/{event_id}"), Some(payload))
            .await
    }

    pub async fn delete_event(&self, event_id: &str) -> std::result::Result<Message, ClientError> {
        self.send::<(), _>(Method::DELETE, &format!("events/{event_id}"), None)
            .await
    }

    pub async fn pay(&self, payload: &PaymentNew) -> std::result::Result<PaymentView, ClientError> {
        self.send(Method::POST, "payments", Some(payload)).await
    }

    pub async fn quick_pay(
        &self,
        payload: &QuickPay,
    ) -> std::result::Result<PaymentView, ClientError> {
        self.send(Method::POST, "payments/quick", Some(payload))
            .await
    }

    pub async fn delete_payment(
        &self,
        payment_id: &str,
    ) -> std::result::Result<Message, ClientError> {
        self.send::<(), _>(Method::DELETE, &format!("payments/{payment_id}"), None)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert!(matches!(
            ClientError::from_status(404, "x".to_string()),
            ClientError::NotFound(_)
        ));
        assert!(matches!(
            ClientError::from_status(400, "x".to_string()),
            ClientError::Validation(_)
        ));
        assert!(matches!(
            ClientError::from_status(500, "x".to_string()),
            ClientError::Server(_)
        ));
    }

    #[test]
    fn rejects_invalid_base_url() {
        assert!(matches!(Client::new("not a url"), Err(AppError::Usage(_))));
    }
}

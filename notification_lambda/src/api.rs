use redact::Secret;
use reqwest::{
    Url,
    header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue},
};
use serde_json::Value;
use thiserror::Error;
use types::VideoRecord;

use crate::payload::{DeliveryTarget, Owner};

const USER_ID_HEADER: &str = "x-epype-user-id";
const ORGANIZATION_ID_HEADER: &str = "x-epype-organization-id";

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// What the API made of a notification.
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    Accepted,
    /// The API answered but did not report success; holds the response body.
    Rejected(Value),
}

impl Delivery {
    /// The API signals acceptance with `"success": 1` in the response body;
    /// `1.0` counts as the same number.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn from_response_body(body: Value) -> Self {
        if body.get("success").and_then(Value::as_f64) == Some(1.0) {
            Self::Accepted
        } else {
            Self::Rejected(body)
        }
    }
}

/// The external API that is told about finished videos.
pub trait NotificationApi {
    fn notify(
        &self,
        target: &DeliveryTarget,
        payload: &VideoRecord,
    ) -> impl Future<Output = Result<Delivery, TransportError>> + Send;
}

#[derive(Debug, Clone)]
pub struct HttpNotificationApi {
    client: reqwest::Client,
    base_url: Url,
    authorization: Secret<String>,
}

impl HttpNotificationApi {
    #[must_use]
    pub const fn new(
        client: reqwest::Client,
        base_url: Url,
        authorization: Secret<String>,
    ) -> Self {
        Self {
            client,
            base_url,
            authorization,
        }
    }

    /// `{base}/aws/videos/{videoId}`, with the first label of the base host
    /// swapped for the target's subdomain when it has one.
    pub fn endpoint(
        &self,
        target: &DeliveryTarget,
    ) -> Result<Url, TransportError> {
        let mut base = self.base_url.clone();

        if let Some(subdomain) = &target.subdomain {
            let host = base.host_str().ok_or_else(|| {
                TransportError::InvalidEndpoint(format!(
                    "{} has no host",
                    self.base_url
                ))
            })?;
            let host = match host.split_once('.') {
                Some((_, rest)) => format!("{subdomain}.{rest}"),
                None => subdomain.clone(),
            };
            base.set_host(Some(&host)).map_err(|e| {
                TransportError::InvalidEndpoint(format!("{host}: {e}"))
            })?;
        }

        let mut endpoint = base.to_string();
        if !endpoint.ends_with('/') {
            endpoint.push('/');
        }
        endpoint.push_str("aws/videos/");
        endpoint.push_str(&target.video_id);

        Url::parse(&endpoint).map_err(|e| {
            TransportError::InvalidEndpoint(format!("{endpoint}: {e}"))
        })
    }

    pub fn headers(
        &self,
        target: &DeliveryTarget,
    ) -> Result<HeaderMap, TransportError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );

        let mut authorization =
            HeaderValue::from_str(self.authorization.expose_secret())?;
        authorization.set_sensitive(true);
        headers.insert(AUTHORIZATION, authorization);

        let owner_header = match target.owner() {
            Owner::User => Some(USER_ID_HEADER),
            Owner::Organization => Some(ORGANIZATION_ID_HEADER),
            Owner::Unknown => None,
        };
        if let Some(name) = owner_header {
            headers.insert(
                HeaderName::from_static(name),
                HeaderValue::from_str(&target.user_id)?,
            );
        }

        Ok(headers)
    }
}

impl NotificationApi for HttpNotificationApi {
    async fn notify(
        &self,
        target: &DeliveryTarget,
        payload: &VideoRecord,
    ) -> Result<Delivery, TransportError> {
        let endpoint = self.endpoint(target)?;
        let headers = self.headers(target)?;

        tracing::info!(
            "CALL API: {} :: {}",
            endpoint,
            serde_json::to_string(payload).unwrap_or_default()
        );

        let response = self
            .client
            .post(endpoint)
            .headers(headers)
            .json(payload)
            .send()
            .await?
            .error_for_status()?;

        let text = response.text().await?;
        let body = serde_json::from_str(&text).unwrap_or(Value::String(text));

        Ok(Delivery::from_response_body(body))
    }
}

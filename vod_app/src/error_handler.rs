//! Forwarding of invocation failures to the workflow's error-handler lambda.

use aws_sdk_lambda::{Client as LambdaClient, primitives::Blob};
use serde::Serialize;
use serde_json::Value;

/// Somewhere to send invocation-level failures before they are returned to
/// the runtime. Reporting never fails the caller; problems are only logged.
pub trait ErrorSink {
    fn report(
        &self,
        event: &Value,
        error: &str,
    ) -> impl Future<Output = ()> + Send;
}

/// Payload delivered to the error-handler lambda.
#[derive(Debug, Serialize)]
pub struct ErrorReport<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function: Option<&'a str>,
    pub error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guid: Option<&'a str>,
    pub event: &'a Value,
}

impl<'a> ErrorReport<'a> {
    #[must_use]
    pub fn new(
        function: Option<&'a str>,
        event: &'a Value,
        error: &'a str,
    ) -> Self {
        Self {
            function,
            error,
            guid: event.get("guid").and_then(Value::as_str),
            event,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LambdaErrorSink {
    client: LambdaClient,
    error_handler: String,
    function_name: Option<String>,
}

impl LambdaErrorSink {
    /// `error_handler` is the name or ARN of the lambda to invoke and
    /// `function_name` the name of the reporting lambda, if known.
    #[must_use]
    pub fn new(
        aws_config: &aws_config::SdkConfig,
        error_handler: String,
        function_name: Option<String>,
    ) -> Self {
        Self {
            client: LambdaClient::new(aws_config),
            error_handler,
            function_name,
        }
    }
}

impl ErrorSink for LambdaErrorSink {
    async fn report(&self, event: &Value, error: &str) {
        let report =
            ErrorReport::new(self.function_name.as_deref(), event, error);

        let payload = match serde_json::to_vec(&report) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!("failed to serialize error report: {:?}", e);
                return;
            }
        };

        if let Err(e) = self
            .client
            .invoke()
            .function_name(&self.error_handler)
            .payload(Blob::new(payload))
            .send()
            .await
        {
            tracing::error!(
                "failed to report error to {}: {:?}",
                self.error_handler,
                e
            );
        }
    }
}

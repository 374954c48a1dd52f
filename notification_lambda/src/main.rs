use aws_sdk_sqs::Client as SqsClient;
use lambda_runtime::{Error, LambdaEvent, run, service_fn};
use redact::Secret;
use reqwest::Url;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use vod_app::{ContextProvider, error_handler::LambdaErrorSink};

mod api;
mod notifier;
mod payload;
mod queue;

use api::HttpNotificationApi;
use queue::SqsAcknowledger;

#[derive(Debug, Clone, Deserialize)]
struct Config {
    #[serde(deserialize_with = "deserialize_url")]
    api_url: Url,
    api_authorization: Secret<String>,
    sqs_queue: String,
    error_handler: String,
    #[serde(default)]
    aws_lambda_function_name: Option<String>,
}

fn deserialize_url<'de, D>(deserializer: D) -> Result<Url, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    Url::parse(&value).map_err(serde::de::Error::custom)
}

#[derive(Debug, Clone)]
struct AppContext {
    api: HttpNotificationApi,
    queue: SqsAcknowledger,
    errors: LambdaErrorSink,
}

impl ContextProvider<Config> for AppContext {
    async fn new(config: Config, aws_config: aws_config::SdkConfig) -> Self {
        Self {
            api: HttpNotificationApi::new(
                reqwest::Client::new(),
                config.api_url,
                config.api_authorization,
            ),
            queue: SqsAcknowledger::new(
                SqsClient::new(&aws_config),
                config.sqs_queue,
            ),
            errors: LambdaErrorSink::new(
                &aws_config,
                config.error_handler,
                config.aws_lambda_function_name,
            ),
        }
    }
}

async fn function_handler(
    context: &AppContext,
    event: LambdaEvent<Value>,
) -> Result<Value, Error> {
    let event = notifier::handle(
        &context.api,
        &context.queue,
        &context.errors,
        event.payload,
    )
    .await?;

    Ok(event)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let context = vod_app::create_app_context::<AppContext, Config>().await?;

    run(service_fn(|event| async {
        function_handler(&context, event).await
    }))
    .await
}

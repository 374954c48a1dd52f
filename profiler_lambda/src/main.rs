use aws_sdk_dynamodb::Client as DynamoDbClient;
use lambda_runtime::{Error, LambdaEvent, run, service_fn};
use serde::Deserialize;
use types::VideoRecord;
use vod_app::{ContextProvider, error_handler::LambdaErrorSink};

mod media_info;
mod profile;
mod resolver;
mod store;

use store::DynamoDbMetadataStore;

#[derive(Debug, Clone, Deserialize)]
struct Config {
    dynamodb_table: String,
    error_handler: String,
    #[serde(default)]
    aws_lambda_function_name: Option<String>,
}

#[derive(Debug, Clone)]
struct AppContext {
    store: DynamoDbMetadataStore,
    errors: LambdaErrorSink,
}

impl ContextProvider<Config> for AppContext {
    async fn new(config: Config, aws_config: aws_config::SdkConfig) -> Self {
        Self {
            store: DynamoDbMetadataStore::new(
                DynamoDbClient::new(&aws_config),
                config.dynamodb_table,
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
    event: LambdaEvent<VideoRecord>,
) -> Result<VideoRecord, Error> {
    let record =
        resolver::handle(&context.store, &context.errors, event.payload)
            .await?;

    Ok(record)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let context = vod_app::create_app_context::<AppContext, Config>().await?;

    run(service_fn(|event| async {
        function_handler(&context, event).await
    }))
    .await
}

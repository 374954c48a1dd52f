use aws_config::{
    AppName, BehaviorVersion, SdkConfig, meta::region::RegionProviderChain,
};
use figment::{Figment, providers::Env};
use serde::Deserialize;

pub mod error_handler;

pub trait ContextProvider<Config> {
    fn new(
        config: Config,
        aws_config: aws_config::SdkConfig,
    ) -> impl Future<Output = Self>;
}

/// Settings every lambda reads regardless of its own `Config`.
#[derive(Debug, Default, Deserialize)]
struct SdkSettings {
    #[serde(default)]
    solution_identifier: Option<String>,
}

/// Initialize the application context with configuration from environment variables.
/// The configuration is extracted using figment.
/// The AWS configuration is loaded using the default provider chain, tagged
/// with `SOLUTION_IDENTIFIER` as the SDK app name when it is set.
///
/// # Arguments
/// None
///
/// # Returns
/// The application context with the configuration and AWS configuration as
/// specified by the trait.
///
/// # Errors
/// If the configuration cannot be extracted from the environment variables
/// or if the AWS configuration cannot be loaded.
///
pub async fn create_app_context<'a, A, Config: serde::Deserialize<'a>>()
-> Result<A, figment::Error>
where
    A: ContextProvider<Config>,
{
    // https://docs.aws.amazon.com/lambda/latest/dg/rust-logging.html
    tracing_subscriber::fmt()
        .json()
        // allow log level to be overridden by RUST_LOG env var
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        // this needs to be set to remove duplicated information in the log.
        .with_current_span(false)
        // this needs to be set to false, otherwise ANSI color codes will
        // show up in a confusing manner in CloudWatch logs.
        .with_ansi(false)
        // disabling time is handy because CloudWatch will add the ingestion time.
        .without_time()
        // remove the name of the function from every log entry
        .with_target(false)
        .init();

    let figment = Figment::new().merge(Env::raw());

    let config: Config = figment.extract()?;
    let settings: SdkSettings = figment.extract()?;

    let aws_config = load_aws_config(settings.solution_identifier).await;

    let context = A::new(config, aws_config).await;

    Ok(context)
}

async fn load_aws_config(solution_identifier: Option<String>) -> SdkConfig {
    let region_provider =
        RegionProviderChain::default_provider().or_else("us-east-1");
    let mut loader =
        aws_config::defaults(BehaviorVersion::latest()).region(region_provider);

    if let Some(app_name) = solution_identifier.and_then(app_name) {
        loader = loader.app_name(app_name);
    }

    loader.load().await
}

fn app_name(identifier: String) -> Option<AppName> {
    match AppName::new(identifier) {
        Ok(app_name) => Some(app_name),
        Err(e) => {
            tracing::warn!("ignoring solution identifier: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sdk_settings_from_env() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("SOLUTION_IDENTIFIER", "AwsSolution-SO0021");

            let settings: SdkSettings =
                Figment::new().merge(Env::raw()).extract()?;

            assert_eq!(
                settings.solution_identifier.as_deref(),
                Some("AwsSolution-SO0021")
            );
            Ok(())
        });
    }

    #[test]
    fn test_sdk_settings_optional() {
        figment::Jail::expect_with(|_jail| {
            let settings: SdkSettings =
                Figment::new().merge(Env::raw()).extract()?;

            assert!(settings.solution_identifier.is_none());
            Ok(())
        });
    }

    #[test]
    fn test_app_name() {
        assert!(app_name("AwsSolution-SO0021".to_string()).is_some());
        assert!(app_name("not a valid name".to_string()).is_none());
    }
}

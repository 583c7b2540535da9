use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use log::info;
use meeting_summarizer::credentials::{issue_frontend_credentials, BrokerConfig, StsRoleAssumer};
use meeting_summarizer::{aws, logging, HttpResponse};
use serde_json::Value;

async fn handler(
    _event: LambdaEvent<Value>,
    sts: &StsRoleAssumer,
    config: &BrokerConfig,
) -> Result<HttpResponse, Error> {
    Ok(issue_frontend_credentials(sts, config).await)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    logging::init();

    let config = BrokerConfig::from_env();
    let sdk_config = aws::load_sdk_config(config.region.as_deref()).await;
    let sts = StsRoleAssumer::new(&sdk_config);

    info!("Credential broker ready");
    run(service_fn(|event| handler(event, &sts, &config))).await
}

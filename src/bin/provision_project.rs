use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use log::debug;
use meeting_summarizer::config::{self, EnvKey};
use meeting_summarizer::project::{
    handle_lifecycle_event, DataAutomationCatalog, LifecycleRequest, LifecycleResponse,
};
use meeting_summarizer::{aws, logging};

async fn handler(
    event: LambdaEvent<LifecycleRequest>,
    env_region: Option<&str>,
) -> Result<LifecycleResponse, Error> {
    debug!("Received event: {:?}", event.payload);
    let response = handle_lifecycle_event(event.payload, env_region, |region| async move {
        let sdk_config = aws::load_sdk_config(Some(region.as_str())).await;
        DataAutomationCatalog::new(&sdk_config)
    })
    .await;
    Ok(response)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    logging::init();

    // The client is built per event: the region can come from the resource properties.
    let env_region = config::get(EnvKey::Region);
    run(service_fn(|event| handler(event, env_region.as_deref()))).await
}

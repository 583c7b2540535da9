use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use log::info;
use meeting_summarizer::automation_job::{
    start_analysis_job, AutomationJobConfig, DataAutomationRuntime, StartJobEvent,
};
use meeting_summarizer::{aws, logging, HttpResponse};

async fn handler(
    event: LambdaEvent<StartJobEvent>,
    runtime: &DataAutomationRuntime,
    config: &AutomationJobConfig,
) -> Result<HttpResponse, Error> {
    info!("Received event: {:?}", event.payload);
    Ok(start_analysis_job(runtime, config, event.payload).await)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    logging::init();

    let config = AutomationJobConfig::from_env();
    let sdk_config = aws::load_sdk_config(config.region.as_deref()).await;
    let runtime = DataAutomationRuntime::new(&sdk_config);

    run(service_fn(|event| handler(event, &runtime, &config))).await
}

use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use log::debug;
use meeting_summarizer::transcription::{handle_notification, TranscribeService, TranscriptionConfig};
use meeting_summarizer::{aws, logging, HttpResponse};
use serde_json::Value;

async fn handler(
    event: LambdaEvent<Value>,
    transcribe: &TranscribeService,
    config: &TranscriptionConfig,
) -> Result<HttpResponse, Error> {
    debug!("Received event: {}", event.payload);
    Ok(handle_notification(transcribe, config, event.payload).await)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    logging::init();

    let config = TranscriptionConfig::from_env();
    let sdk_config = aws::load_sdk_config(config.region.as_deref()).await;
    let transcribe = TranscribeService::new(&sdk_config);

    run(service_fn(|event| handler(event, &transcribe, &config))).await
}

use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use log::info;
use meeting_summarizer::s3_querier::S3Querier;
use meeting_summarizer::summary::{generate_summary, BedrockSummarizer, SummaryConfig, SummaryEvent};
use meeting_summarizer::{aws, logging, HttpResponse};

struct Clients {
    store: S3Querier,
    model: BedrockSummarizer,
}

async fn handler(
    event: LambdaEvent<SummaryEvent>,
    clients: &Clients,
    config: &SummaryConfig,
) -> Result<HttpResponse, Error> {
    info!("Received event: {:?}", event.payload);
    Ok(generate_summary(&clients.store, &clients.model, config, event.payload).await)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    logging::init();

    let config = SummaryConfig::from_env();
    let sdk_config = aws::load_sdk_config(config.region.as_deref()).await;
    let clients = Clients {
        store: S3Querier::new(&sdk_config, config.s3_endpoint.as_deref()),
        model: BedrockSummarizer::new(&sdk_config, &config.model_id),
    };

    info!("Summaries will be generated with {}", config.model_id);
    run(service_fn(|event| handler(event, &clients, &config))).await
}

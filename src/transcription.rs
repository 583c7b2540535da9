//! Starts an Amazon Transcribe batch job for every media object uploaded to the bucket.

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_lambda_events::event::s3::S3Event;
use aws_sdk_transcribe::types::Media;
use log::{debug, error, info};
use serde_json::{json, Value};

use crate::config::{self, EnvKey};
use crate::error::{Error, Result};
use crate::response::HttpResponse;
use crate::utilities::{base_filename, decode_object_key, sanitize_job_name};

pub const DEFAULT_OUTPUT_FOLDER: &str = "transcription_results";

#[derive(Debug, Clone)]
pub struct TranscriptionConfig {
    pub region: Option<String>,
    /// Folder inside the source bucket that receives transcripts, without surrounding slashes.
    pub output_folder: String,
}

impl TranscriptionConfig {
    pub fn new(region: Option<String>, output_folder: &str) -> Self {
        TranscriptionConfig {
            region,
            output_folder: output_folder.trim_matches('/').to_string(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(
            config::get(EnvKey::Region),
            &config::get_or(EnvKey::OutputFolder, DEFAULT_OUTPUT_FOLDER),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptionJobRequest {
    pub job_name: String,
    pub media_uri: String,
    pub output_bucket: String,
    pub output_key: String,
}

#[async_trait]
pub trait TranscriptionService: Send + Sync {
    /// Submits the job with automatic language identification.
    async fn start_job(&self, request: &TranscriptionJobRequest) -> Result<()>;
}

pub struct TranscribeService {
    client: aws_sdk_transcribe::Client,
}

impl TranscribeService {
    pub fn new(sdk_config: &SdkConfig) -> Self {
        TranscribeService {
            client: aws_sdk_transcribe::Client::new(sdk_config),
        }
    }
}

#[async_trait]
impl TranscriptionService for TranscribeService {
    async fn start_job(&self, request: &TranscriptionJobRequest) -> Result<()> {
        let output = self
            .client
            .start_transcription_job()
            .transcription_job_name(&request.job_name)
            .identify_language(true)
            .media(Media::builder().media_file_uri(&request.media_uri).build())
            .output_bucket_name(&request.output_bucket)
            .output_key(&request.output_key)
            .send()
            .await
            .map_err(|err| Error::from_sdk("StartTranscriptionJob", err))?;

        let status = output
            .transcription_job()
            .and_then(|job| job.transcription_job_status());
        debug!("Transcription job {} status: {:?}", request.job_name, status);
        Ok(())
    }
}

/// Builds the job for an object key exactly as it arrives in the notification.
pub fn job_request(
    config: &TranscriptionConfig,
    bucket: &str,
    raw_key: &str,
) -> Result<TranscriptionJobRequest> {
    let key = decode_object_key(raw_key)?;
    let base = base_filename(&key);

    Ok(TranscriptionJobRequest {
        job_name: sanitize_job_name(base),
        media_uri: format!("s3://{}/{}", bucket, key),
        output_bucket: bucket.to_string(),
        output_key: format!("{}/{}.json", config.output_folder, base),
    })
}

/// Bucket and raw key of the first record in the notification.
fn uploaded_object(event: &S3Event) -> Option<(&str, &str)> {
    let record = event.records.first()?;
    let bucket = record.s3.bucket.name.as_deref().filter(|b| !b.is_empty())?;
    let key = record.s3.object.key.as_deref().filter(|k| !k.is_empty())?;
    Some((bucket, key))
}

fn parsing_error() -> HttpResponse {
    HttpResponse::json(400, &json!({ "message": "Event parsing error" }))
}

/// Entry point for raw invocation payloads. Anything that is not an S3
/// notification gets the same 400 as a notification without an object.
pub async fn handle_notification<T: TranscriptionService>(
    service: &T,
    config: &TranscriptionConfig,
    payload: Value,
) -> HttpResponse {
    match serde_json::from_value::<S3Event>(payload) {
        Ok(event) => start_transcription(service, config, event).await,
        Err(err) => {
            error!("Error parsing event: {}", err);
            parsing_error()
        }
    }
}

pub async fn start_transcription<T: TranscriptionService>(
    service: &T,
    config: &TranscriptionConfig,
    event: S3Event,
) -> HttpResponse {
    let Some((bucket, raw_key)) = uploaded_object(&event) else {
        error!("Error parsing event: no bucket/key in {} record(s)", event.records.len());
        return parsing_error();
    };

    let started = match job_request(config, bucket, raw_key) {
        Ok(request) => {
            info!(
                "Starting transcription job {} for {}",
                request.job_name, request.media_uri
            );
            service.start_job(&request).await.map(|_| request)
        }
        Err(err) => Err(err),
    };

    match started {
        Ok(request) => {
            info!("Transcription job {} started successfully", request.job_name);
            HttpResponse::ok(&json!({
                "message": "Transcription job started successfully",
                "jobName": request.job_name,
            }))
        }
        Err(err) => {
            error!("Error starting transcription job: {}", err);
            HttpResponse::json(500, &json!({ "message": "Error starting transcription job" }))
        }
    }
}

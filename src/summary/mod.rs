//! Meeting summary generation from a finished data automation job.
//!
//! The handler finds the job's `result.json`, flattens it into
//! [`VideoInsights`], turns that into a prompt and asks the model for minutes
//! in a fixed six-section format.

pub mod insights;
pub mod model;
pub mod prompt;

use anyhow::Context;
use async_trait::async_trait;
use bytes::Bytes;
use log::{debug, error, info};
use regex::Regex;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::automation_job::invocation_job_id;
use crate::config::{self, EnvKey};
use crate::error::{Error, Result};
use crate::response::HttpResponse;

pub use insights::VideoInsights;
pub use model::{BedrockSummarizer, SummaryModel, DEFAULT_MODEL_ID};

const RESULT_SUFFIX: &str = "0/standard_output/0/result.json";

/// Read access to the bucket holding analysis results.
#[async_trait]
pub trait ResultStore: Send + Sync {
    async fn list_keys(&self, bucket: &str, prefix: &str) -> Result<Vec<String>>;

    async fn read_object(&self, bucket: &str, key: &str) -> Result<Bytes>;
}

#[derive(Debug, Clone, Default)]
pub struct SummaryConfig {
    pub region: Option<String>,
    pub bucket_name: Option<String>,
    pub results_prefix: Option<String>,
    /// Used when the event names no file.
    pub default_filename: Option<String>,
    pub model_id: String,
    /// Endpoint override for S3-compatible stores.
    pub s3_endpoint: Option<String>,
}

impl SummaryConfig {
    pub fn from_env() -> Self {
        SummaryConfig {
            region: config::get(EnvKey::Region),
            bucket_name: config::get(EnvKey::BucketName),
            results_prefix: config::get(EnvKey::DataAutomationResultPrefix),
            default_filename: config::get(EnvKey::S3Filename),
            model_id: config::get_or(EnvKey::ModelId, DEFAULT_MODEL_ID),
            s3_endpoint: config::get(EnvKey::S3Endpoint),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SummaryEvent {
    #[serde(default)]
    pub s3_filename: Option<String>,
    #[serde(default)]
    pub invocation_arn: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryOutcome {
    pub output_uri: String,
    pub result_key: String,
    pub retrieved_bytes: usize,
    pub summary: String,
}

/// Where a job's results live for one input file.
struct ResultLocation<'a> {
    bucket: &'a str,
    /// `{results_prefix}{filename}`, the folder the job wrote into.
    folder: String,
}

impl<'a> ResultLocation<'a> {
    fn new(config: &'a SummaryConfig, event: &SummaryEvent) -> Result<Self> {
        let bucket = config
            .bucket_name
            .as_deref()
            .ok_or_else(|| missing_setting(EnvKey::BucketName))?;
        let prefix = config
            .results_prefix
            .as_deref()
            .ok_or_else(|| missing_setting(EnvKey::DataAutomationResultPrefix))?;
        let filename = event
            .s3_filename
            .as_deref()
            .or(config.default_filename.as_deref())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| {
                Error::MissingParameter(
                    "s3_filename must be provided in the event or environment".to_owned(),
                )
            })?;

        Ok(ResultLocation {
            bucket,
            folder: format!("{prefix}{filename}"),
        })
    }

    fn output_uri(&self) -> String {
        format!("s3://{}/{}/", self.bucket, self.folder)
    }

    fn result_key(&self, job_id: &str) -> String {
        format!("{}/{}/{}", self.folder, job_id, RESULT_SUFFIX)
    }
}

fn missing_setting(key: EnvKey) -> Error {
    Error::Config(format!("{} is not configured", key.as_str()))
}

/// Finds the first `result.json` written under `folder` by any job.
pub fn match_result_key<'k>(folder: &str, keys: &'k [String]) -> Result<Option<(&'k str, &'k str)>> {
    let pattern = Regex::new(&format!(
        r"^{}/+([^/]+)/0/standard_output/0/result\.json$",
        regex::escape(folder)
    ))
    .context("invalid result key pattern")?;

    Ok(keys.iter().find_map(|key| {
        let job_id = pattern.captures(key)?.get(1)?.as_str();
        Some((key.as_str(), job_id))
    }))
}

/// Resolves the key of the result document, from the invocation ARN when given,
/// otherwise by listing the job folder.
async fn resolve_result_key<S: ResultStore>(
    store: &S,
    location: &ResultLocation<'_>,
    invocation_arn: Option<&str>,
) -> Result<String> {
    if let Some(arn) = invocation_arn.filter(|arn| !arn.is_empty()) {
        let job_id = invocation_job_id(arn);
        info!("Job id {} taken from invocation ARN", job_id);
        return Ok(location.result_key(job_id));
    }

    info!("Listing objects with prefix: {}", location.folder);
    let keys = store.list_keys(location.bucket, &location.folder).await?;
    debug!("Found {} key(s) under {}", keys.len(), location.folder);

    match match_result_key(&location.folder, &keys)? {
        Some((key, job_id)) => {
            info!("Job id {} found in listing", job_id);
            Ok(key.to_owned())
        }
        None => Err(Error::NotFound(format!(
            "No matching object found under prefix: {}",
            location.folder
        ))),
    }
}

fn parse_document(raw: &[u8]) -> Result<Value> {
    let text = std::str::from_utf8(raw).context("result document is not UTF-8")?;
    let document = serde_json::from_str::<Value>(text).context("result document is not valid JSON")?;
    Ok(document)
}

/// Reads the job result for the event's file and produces the meeting summary.
pub async fn summarize<S: ResultStore, M: SummaryModel>(
    store: &S,
    model: &M,
    config: &SummaryConfig,
    event: &SummaryEvent,
) -> Result<SummaryOutcome> {
    let location = ResultLocation::new(config, event)?;
    let result_key = resolve_result_key(store, &location, event.invocation_arn.as_deref()).await?;

    info!("Retrieving {} from bucket {}", result_key, location.bucket);
    let raw = store.read_object(location.bucket, &result_key).await?;
    let document = parse_document(&raw)?;

    let insights = VideoInsights::from_document(&document);
    info!("Video summary: {}", insights.video_summary);
    info!("Scene summaries: {:?}", insights.scene_summaries);
    info!("Frame visual texts: {:?}", insights.scene_frame_texts);
    info!("People in call: {:?}", insights.speakers);
    debug!("Overall transcript: {}", insights.full_transcript);
    debug!("Scene transcripts: {:?}", insights.scene_transcripts);

    let user_message = prompt::user_message(&insights);
    debug!("User message: {}", user_message);
    let summary = model.converse(prompt::SYSTEM_PROMPT, &user_message).await?;
    info!("Generated summary of {} words", summary.split_whitespace().count());

    Ok(SummaryOutcome {
        output_uri: location.output_uri(),
        result_key,
        retrieved_bytes: raw.len(),
        summary,
    })
}

pub async fn generate_summary<S: ResultStore, M: SummaryModel>(
    store: &S,
    model: &M,
    config: &SummaryConfig,
    event: SummaryEvent,
) -> HttpResponse {
    match summarize(store, model, config, &event).await {
        Ok(outcome) => HttpResponse::ok(&json!({
            "message": "Result processed successfully",
            "output_uri": outcome.output_uri,
            "result_key": outcome.result_key,
            "retrieved_bytes": outcome.retrieved_bytes,
            "summary": outcome.summary,
        })),
        Err(err @ (Error::NotFound(_) | Error::MissingParameter(_))) => {
            error!("{}", err);
            HttpResponse::error(err.status_code(), err.to_string())
        }
        Err(err) => {
            error!("Error processing result: {}", err);
            HttpResponse::error(500, format!("Error processing result: {err}"))
        }
    }
}

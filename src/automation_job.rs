//! Submits asynchronous Bedrock Data Automation analysis jobs for stored meeting videos.

use anyhow::Context;
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_bedrockdataautomationruntime::types::{
    DataAutomationConfiguration, DataAutomationStage, EventBridgeConfiguration,
    InputConfiguration, NotificationConfiguration, OutputConfiguration,
};
use log::{error, info, warn};
use serde::Deserialize;
use serde_json::json;

use crate::config::{self, EnvKey};
use crate::error::{Error, Result};
use crate::response::HttpResponse;

pub const DEFAULT_VIDEOS_PREFIX: &str = "meeting_videos/";
pub const DEFAULT_RESULTS_PREFIX: &str = "data_automation_result/";

const MISSING_PARAMETERS: &str = "Missing required parameter(s): BUCKET_NAME (from environment) and S3_FILENAME (from event) must be provided.";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StartJobEvent {
    #[serde(rename = "S3_FILENAME", default)]
    pub s3_filename: Option<String>,
}

impl StartJobEvent {
    fn filename(&self) -> Option<&str> {
        self.s3_filename.as_deref().filter(|name| !name.is_empty())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Stage {
    #[default]
    Live,
    Development,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Live => "LIVE",
            Stage::Development => "DEVELOPMENT",
        }
    }

    /// Anything other than `DEVELOPMENT` runs against the live stage.
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("development") {
            Stage::Development
        } else {
            Stage::Live
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AutomationJobConfig {
    pub region: Option<String>,
    pub bucket_name: Option<String>,
    pub videos_prefix: String,
    pub results_prefix: String,
    pub project_arn: Option<String>,
    pub profile_arn: Option<String>,
    pub stage: Stage,
}

impl AutomationJobConfig {
    pub fn from_env() -> Self {
        let stage = config::get(EnvKey::Stage).map(|s| Stage::parse(&s));
        if stage.is_none() {
            info!("No stage configured, using {}", Stage::Live.as_str());
        }

        AutomationJobConfig {
            region: config::get(EnvKey::Region),
            bucket_name: config::get(EnvKey::BucketName),
            videos_prefix: config::get_or(EnvKey::MeetingVideosPrefix, DEFAULT_VIDEOS_PREFIX),
            results_prefix: config::get_or(EnvKey::DataAutomationResultPrefix, DEFAULT_RESULTS_PREFIX),
            project_arn: config::get(EnvKey::ProjectArn),
            profile_arn: config::get(EnvKey::ProfileArn),
            stage: stage.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisJobRequest {
    pub input_uri: String,
    pub output_uri: String,
    pub project_arn: String,
    pub profile_arn: String,
    pub stage: Stage,
    pub notify_event_bridge: bool,
}

#[async_trait]
pub trait AutomationRuntime: Send + Sync {
    /// Starts the job and returns its invocation ARN.
    async fn invoke_async(&self, request: &AnalysisJobRequest) -> Result<String>;
}

pub struct DataAutomationRuntime {
    client: aws_sdk_bedrockdataautomationruntime::Client,
}

impl DataAutomationRuntime {
    pub fn new(sdk_config: &SdkConfig) -> Self {
        DataAutomationRuntime {
            client: aws_sdk_bedrockdataautomationruntime::Client::new(sdk_config),
        }
    }
}

#[async_trait]
impl AutomationRuntime for DataAutomationRuntime {
    async fn invoke_async(&self, request: &AnalysisJobRequest) -> Result<String> {
        let input = InputConfiguration::builder()
            .s3_uri(&request.input_uri)
            .build()
            .context("invalid input configuration")?;
        let output = OutputConfiguration::builder()
            .s3_uri(&request.output_uri)
            .build()
            .context("invalid output configuration")?;
        let automation = DataAutomationConfiguration::builder()
            .data_automation_project_arn(&request.project_arn)
            .stage(DataAutomationStage::from(request.stage.as_str()))
            .build()
            .context("invalid data automation configuration")?;
        let event_bridge = EventBridgeConfiguration::builder()
            .event_bridge_enabled(request.notify_event_bridge)
            .build()
            .context("invalid EventBridge configuration")?;
        let notification = NotificationConfiguration::builder()
            .event_bridge_configuration(event_bridge)
            .build();

        let response = self
            .client
            .invoke_data_automation_async()
            .input_configuration(input)
            .output_configuration(output)
            .data_automation_configuration(automation)
            .notification_configuration(notification)
            .data_automation_profile_arn(&request.profile_arn)
            .send()
            .await
            .map_err(|err| Error::from_sdk("InvokeDataAutomationAsync", err))?;

        Ok(response.invocation_arn().to_owned())
    }
}

/// The job id is the last path segment of an invocation ARN.
pub fn invocation_job_id(invocation_arn: &str) -> &str {
    invocation_arn.rsplit('/').next().unwrap_or(invocation_arn)
}

/// Standard cross-region profile for the account and region that own `project_arn`.
pub fn default_profile_arn(project_arn: &str) -> Option<String> {
    let parts: Vec<&str> = project_arn.splitn(6, ':').collect();
    let [_, partition, _, region, account, _] = parts.as_slice() else {
        return None;
    };
    if region.is_empty() || account.is_empty() {
        return None;
    }

    let geography = match region.split('-').next() {
        Some("eu") => "eu",
        Some("ap") => "apac",
        _ => "us",
    };
    Some(format!(
        "arn:{partition}:bedrock:{region}:{account}:data-automation-profile/{geography}.data-automation-v1"
    ))
}

/// Derives input and output locations for `filename` and fills in the project settings.
pub fn build_request(
    config: &AutomationJobConfig,
    bucket: &str,
    filename: &str,
) -> Result<AnalysisJobRequest> {
    let project_arn = config.project_arn.clone().ok_or_else(|| {
        Error::Config(format!("{} is not configured", EnvKey::ProjectArn.as_str()))
    })?;
    let profile_arn = match &config.profile_arn {
        Some(arn) => arn.clone(),
        None => default_profile_arn(&project_arn).ok_or_else(|| {
            Error::Config(format!(
                "{} is not configured and cannot be derived from {}",
                EnvKey::ProfileArn.as_str(),
                project_arn
            ))
        })?,
    };

    Ok(AnalysisJobRequest {
        input_uri: format!("s3://{}/{}{}", bucket, config.videos_prefix, filename),
        output_uri: format!("s3://{}/{}{}", bucket, config.results_prefix, filename),
        project_arn,
        profile_arn,
        stage: config.stage,
        notify_event_bridge: true,
    })
}

pub async fn start_analysis_job<R: AutomationRuntime>(
    runtime: &R,
    config: &AutomationJobConfig,
    event: StartJobEvent,
) -> HttpResponse {
    let bucket = config.bucket_name.as_deref().filter(|b| !b.is_empty());
    let (Some(bucket), Some(filename)) = (bucket, event.filename()) else {
        warn!("{}", MISSING_PARAMETERS);
        return HttpResponse::json(400, &json!({ "message": MISSING_PARAMETERS }));
    };

    let submitted = match build_request(config, bucket, filename) {
        Ok(request) => {
            info!("Starting analysis of {} into {}", request.input_uri, request.output_uri);
            runtime.invoke_async(&request).await
        }
        Err(err) => Err(err),
    };

    match submitted {
        Ok(invocation_arn) => {
            let job_id = invocation_job_id(&invocation_arn);
            info!("Started Bedrock Data Automation job successfully. Job ID: {}", job_id);
            HttpResponse::ok(&json!({
                "message": "Bedrock data automation job started successfully",
                "jobId": job_id,
                "invocationArn": invocation_arn,
            }))
        }
        Err(err @ Error::Service { .. }) => {
            error!("Service error while starting Bedrock Data Automation job: {}", err);
            HttpResponse::json(
                500,
                &json!({
                    "message": "Failed to start Bedrock Data Automation job",
                    "error": err.message(),
                }),
            )
        }
        Err(err) => {
            error!("Unexpected error while starting Bedrock Data Automation job: {}", err);
            HttpResponse::json(
                500,
                &json!({ "message": "Unexpected error occurred", "error": err.message() }),
            )
        }
    }
}

//! Environment-driven configuration.
//!
//! Every function is configured by its Lambda environment. Blank values are
//! treated the same as unset ones.

use std::env;

pub enum EnvKey {
    Region,
    FrontendRoleArn,
    BucketName,
    MeetingVideosPrefix,
    DataAutomationResultPrefix,
    ProjectArn,
    ProfileArn,
    Stage,
    OutputFolder,
    S3Filename,
    ModelId,
    S3Endpoint,
}

impl EnvKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvKey::Region => "REGION",
            EnvKey::FrontendRoleArn => "FRONTEND_ROLE_ARN",
            EnvKey::BucketName => "BUCKET_NAME",
            EnvKey::MeetingVideosPrefix => "MEETING_VIDEOS_PREFIX",
            EnvKey::DataAutomationResultPrefix => "DATA_AUTOMATION_RESULT_PREFIX",
            EnvKey::ProjectArn => "BDA_PROJECT_ARN",
            EnvKey::ProfileArn => "DATA_AUTOMATION_PROFILE_ARN",
            EnvKey::Stage => "DATA_AUTOMATION_STAGE",
            EnvKey::OutputFolder => "OUTPUT_FOLDER",
            EnvKey::S3Filename => "S3_FILENAME",
            EnvKey::ModelId => "MODEL_ID",
            EnvKey::S3Endpoint => "S3_ENDPOINT",
        }
    }
}

pub fn get(key: EnvKey) -> Option<String> {
    env::var(key.as_str())
        .ok()
        .filter(|value| !value.trim().is_empty())
}

pub fn get_or(key: EnvKey, default: &str) -> String {
    get(key).unwrap_or_else(|| default.to_string())
}

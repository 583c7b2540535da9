//! Deployment-time provisioning of the Bedrock Data Automation project.
//!
//! Invoked by a CloudFormation custom resource. Create and Update make sure the
//! project exists and report its ARN as the physical resource id. Delete removes
//! it if it is there and always succeeds, so a stack teardown never gets stuck
//! on it.

use std::collections::HashMap;
use std::future::Future;

use anyhow::Context;
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_bedrockdataautomation::types::{
    DataAutomationProjectStage, StandardOutputConfiguration, State, VideoBoundingBox,
    VideoExtractionCategory, VideoExtractionCategoryType, VideoStandardExtraction,
    VideoStandardGenerativeField, VideoStandardGenerativeFieldType,
    VideoStandardOutputConfiguration,
};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::{Error, Result};

/// The fixed configuration of a data automation project.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectBlueprint {
    pub name: &'static str,
    pub description: &'static str,
    pub stage: DataAutomationProjectStage,
    pub extraction_categories: &'static [VideoExtractionCategoryType],
    pub bounding_box: State,
    pub generative_fields: &'static [VideoStandardGenerativeFieldType],
}

pub const MEETING_PROJECT: ProjectBlueprint = ProjectBlueprint {
    name: "MeetingSummarizer",
    description: "Project created at deployment time for meeting summarization",
    stage: DataAutomationProjectStage::Live,
    extraction_categories: &[
        VideoExtractionCategoryType::TextDetection,
        VideoExtractionCategoryType::Transcript,
    ],
    bounding_box: State::Enabled,
    generative_fields: &[
        VideoStandardGenerativeFieldType::VideoSummary,
        VideoStandardGenerativeFieldType::SceneSummary,
    ],
};

impl ProjectBlueprint {
    fn standard_output(&self) -> anyhow::Result<StandardOutputConfiguration> {
        let category = VideoExtractionCategory::builder()
            .state(State::Enabled)
            .set_types(Some(self.extraction_categories.to_vec()))
            .build()
            .context("invalid extraction category")?;

        let bounding_box = VideoBoundingBox::builder()
            .state(self.bounding_box.clone())
            .build()
            .context("invalid bounding box configuration")?;

        let extraction = VideoStandardExtraction::builder()
            .category(category)
            .bounding_box(bounding_box)
            .build();

        let generative = VideoStandardGenerativeField::builder()
            .state(State::Enabled)
            .set_types(Some(self.generative_fields.to_vec()))
            .build()
            .context("invalid generative field")?;

        let video = VideoStandardOutputConfiguration::builder()
            .extraction(extraction)
            .generative_field(generative)
            .build();

        Ok(StandardOutputConfiguration::builder().video(video).build())
    }
}

#[async_trait]
pub trait ProjectCatalog: Send + Sync {
    /// ARN of the project called `name`, if one exists.
    async fn find_project(&self, name: &str) -> Result<Option<String>>;

    /// Creates the project and returns its ARN.
    async fn create_project(&self, blueprint: &ProjectBlueprint) -> Result<String>;

    async fn delete_project(&self, project_arn: &str) -> Result<()>;
}

pub struct DataAutomationCatalog {
    client: aws_sdk_bedrockdataautomation::Client,
}

impl DataAutomationCatalog {
    pub fn new(sdk_config: &SdkConfig) -> Self {
        DataAutomationCatalog {
            client: aws_sdk_bedrockdataautomation::Client::new(sdk_config),
        }
    }
}

#[async_trait]
impl ProjectCatalog for DataAutomationCatalog {
    async fn find_project(&self, name: &str) -> Result<Option<String>> {
        let mut next_token: Option<String> = None;
        loop {
            let page = self
                .client
                .list_data_automation_projects()
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|err| Error::from_sdk("ListDataAutomationProjects", err))?;

            if let Some(project) = page
                .projects()
                .iter()
                .find(|project| project.project_name() == Some(name))
            {
                return Ok(Some(project.project_arn().to_owned()));
            }

            match page.next_token() {
                Some(token) => next_token = Some(token.to_owned()),
                None => return Ok(None),
            }
        }
    }

    async fn create_project(&self, blueprint: &ProjectBlueprint) -> Result<String> {
        let output = self
            .client
            .create_data_automation_project()
            .project_name(blueprint.name)
            .project_description(blueprint.description)
            .project_stage(blueprint.stage.clone())
            .standard_output_configuration(blueprint.standard_output()?)
            .send()
            .await
            .map_err(|err| Error::from_sdk("CreateDataAutomationProject", err))?;

        Ok(output.project_arn().to_owned())
    }

    async fn delete_project(&self, project_arn: &str) -> Result<()> {
        self.client
            .delete_data_automation_project()
            .project_arn(project_arn)
            .send()
            .await
            .map_err(|err| Error::from_sdk("DeleteDataAutomationProject", err))?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum RequestKind {
    #[default]
    Create,
    Update,
    Delete,
}

/// The parts of a CloudFormation custom resource request this function reads.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LifecycleRequest {
    #[serde(default)]
    pub request_type: RequestKind,
    #[serde(default)]
    pub physical_resource_id: Option<String>,
    #[serde(default)]
    pub resource_properties: Option<HashMap<String, Value>>,
}

impl LifecycleRequest {
    /// The id CloudFormation already tracks, or the project name before one exists.
    pub fn prior_physical_id(&self) -> String {
        match self.physical_resource_id.as_deref() {
            Some(id) if !id.is_empty() && id != "none" => id.to_owned(),
            _ => MEETING_PROJECT.name.to_owned(),
        }
    }

    pub fn region(&self) -> Option<&str> {
        self.resource_properties
            .as_ref()?
            .get("REGION")?
            .as_str()
            .filter(|region| !region.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecycleStatus {
    Success,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LifecycleResponse {
    pub status: LifecycleStatus,
    pub physical_resource_id: String,
    pub data: Map<String, Value>,
}

impl LifecycleResponse {
    fn success(physical_resource_id: String, data: Map<String, Value>) -> Self {
        LifecycleResponse {
            status: LifecycleStatus::Success,
            physical_resource_id,
            data,
        }
    }

    fn failed(physical_resource_id: String, err: &Error) -> Self {
        let mut data = Map::new();
        data.insert("Error".to_owned(), json!(err.to_string()));
        LifecycleResponse {
            status: LifecycleStatus::Failed,
            physical_resource_id,
            data,
        }
    }
}

/// Returns the ARN of `blueprint`'s project, creating it if it does not exist yet.
pub async fn ensure_project<C: ProjectCatalog>(
    catalog: &C,
    blueprint: &ProjectBlueprint,
) -> Result<String> {
    if let Some(arn) = catalog.find_project(blueprint.name).await? {
        info!("Project already exists with ARN: {}", arn);
        return Ok(arn);
    }

    info!("Project {} not found, creating it", blueprint.name);
    let arn = catalog.create_project(blueprint).await?;
    info!("Created data automation project with ARN: {}", arn);
    Ok(arn)
}

/// Deletes `blueprint`'s project if present. Absence is not an error.
pub async fn remove_project<C: ProjectCatalog>(
    catalog: &C,
    blueprint: &ProjectBlueprint,
) -> Result<()> {
    let Some(arn) = catalog.find_project(blueprint.name).await? else {
        info!("Project {} not found during delete, nothing to do", blueprint.name);
        return Ok(());
    };

    info!("Deleting data automation project {}", arn);
    match catalog.delete_project(&arn).await {
        Err(err) if err.is_not_found() => {
            info!("Project {} disappeared before delete", arn);
            Ok(())
        }
        other => other,
    }
}

/// Runs one lifecycle request. `connect` builds the catalog for the resolved region.
pub async fn handle_lifecycle_event<C, F, Fut>(
    request: LifecycleRequest,
    env_region: Option<&str>,
    connect: F,
) -> LifecycleResponse
where
    C: ProjectCatalog,
    F: FnOnce(String) -> Fut,
    Fut: Future<Output = C>,
{
    info!("Received {:?} request", request.request_type);
    let prior_id = request.prior_physical_id();
    let region = request.region().or(env_region).map(str::to_owned);

    match request.request_type {
        RequestKind::Delete => {
            match region {
                Some(region) => {
                    let catalog = connect(region).await;
                    if let Err(err) = remove_project(&catalog, &MEETING_PROJECT).await {
                        error!("Failed to delete project {}: {}", MEETING_PROJECT.name, err);
                    }
                }
                None => warn!("No region provided, leaving project {} in place", MEETING_PROJECT.name),
            }
            LifecycleResponse::success(prior_id, Map::new())
        }
        RequestKind::Create | RequestKind::Update => match provision(region, connect).await {
            Ok(arn) => {
                let mut data = Map::new();
                data.insert("ProjectArn".to_owned(), json!(arn));
                LifecycleResponse::success(arn, data)
            }
            Err(err) => {
                error!("Error while creating/updating the project: {}", err);
                LifecycleResponse::failed(prior_id, &err)
            }
        },
    }
}

async fn provision<C, F, Fut>(region: Option<String>, connect: F) -> Result<String>
where
    C: ProjectCatalog,
    F: FnOnce(String) -> Fut,
    Fut: Future<Output = C>,
{
    let region = region
        .ok_or_else(|| Error::Config("region not provided in event or environment".to_owned()))?;
    let catalog = connect(region).await;
    ensure_project(&catalog, &MEETING_PROJECT).await
}

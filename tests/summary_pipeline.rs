use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use meeting_summarizer::summary::{
    generate_summary, prompt, ResultStore, SummaryConfig, SummaryEvent, SummaryModel,
};
use meeting_summarizer::{Error, Result};
use serde_json::json;

const BUCKET: &str = "meeting-data";
const RESULT_KEY: &str =
    "data_automation_result/standup.mp4/3f2a9c/0/standard_output/0/result.json";
const MINUTES: &str = "**DATE/TIME/LOCATION**\n- Monday 10:00, Room 4";

#[derive(Default)]
struct FakeBucket {
    objects: HashMap<String, Bytes>,
    reads: Mutex<Vec<String>>,
    listings: Mutex<Vec<String>>,
}

impl FakeBucket {
    fn with(objects: &[(&str, Bytes)]) -> Self {
        FakeBucket {
            objects: objects
                .iter()
                .map(|(key, body)| (key.to_string(), body.clone()))
                .collect(),
            ..Default::default()
        }
    }
}

#[async_trait]
impl ResultStore for FakeBucket {
    async fn list_keys(&self, bucket: &str, prefix: &str) -> Result<Vec<String>> {
        assert_eq!(bucket, BUCKET);
        self.listings.lock().unwrap().push(prefix.to_owned());
        let mut keys: Vec<String> = self
            .objects
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect();
        keys.sort();
        Ok(keys)
    }

    async fn read_object(&self, bucket: &str, key: &str) -> Result<Bytes> {
        assert_eq!(bucket, BUCKET);
        self.reads.lock().unwrap().push(key.to_owned());
        self.objects.get(key).cloned().ok_or_else(|| Error::Service {
            operation: "GetObject",
            code: Some("NoSuchKey".to_owned()),
            message: "The specified key does not exist.".to_owned(),
        })
    }
}

#[derive(Default)]
struct FakeModel {
    prompts: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl SummaryModel for FakeModel {
    async fn converse(&self, system_prompt: &str, user_message: &str) -> Result<String> {
        self.prompts
            .lock()
            .unwrap()
            .push((system_prompt.to_owned(), user_message.to_owned()));
        Ok(MINUTES.to_owned())
    }
}

fn result_document() -> Bytes {
    Bytes::from(
        json!({
            "video": { "summary": "Team standup about the Q1 plan." },
            "scenes": [
                {
                    "summary": "Goals are reviewed.",
                    "frames": [{ "text_words": [{ "text": "Q1" }, { "text": "Plan" }] }],
                    "audio_segments": [{ "speaker": { "speaker_label": "spk_0" } }]
                },
                {
                    "summary": "Roadmap is discussed.",
                    "frames": [{ "text_words": [{ "text": "Roadmap" }] }]
                }
            ]
        })
        .to_string(),
    )
}

fn config() -> SummaryConfig {
    SummaryConfig {
        bucket_name: Some(BUCKET.to_owned()),
        results_prefix: Some("data_automation_result/".to_owned()),
        model_id: "us.amazon.nova-pro-v1:0".to_owned(),
        ..Default::default()
    }
}

fn event(filename: Option<&str>, invocation_arn: Option<&str>) -> SummaryEvent {
    SummaryEvent {
        s3_filename: filename.map(str::to_owned),
        invocation_arn: invocation_arn.map(str::to_owned),
    }
}

#[tokio::test]
async fn discovers_the_result_and_summarizes_it() {
    let document = result_document();
    let bucket = FakeBucket::with(&[
        ("data_automation_result/standup.mp4/job_metadata.json", Bytes::from_static(b"{}")),
        (RESULT_KEY, document.clone()),
    ]);
    let model = FakeModel::default();

    let response = generate_summary(&bucket, &model, &config(), event(Some("standup.mp4"), None)).await;

    assert_eq!(response.status_code, 200);
    let body = response.payload();
    assert_eq!(body["message"], "Result processed successfully");
    assert_eq!(body["result_key"], RESULT_KEY);
    assert_eq!(
        body["output_uri"],
        "s3://meeting-data/data_automation_result/standup.mp4/"
    );
    assert_eq!(body["retrieved_bytes"], document.len());
    assert_eq!(body["summary"], MINUTES);

    assert_eq!(
        bucket.listings.lock().unwrap().as_slice(),
        ["data_automation_result/standup.mp4"]
    );

    let prompts = model.prompts.lock().unwrap();
    let (system, user) = &prompts[0];
    assert_eq!(system, prompt::SYSTEM_PROMPT);
    assert!(user.contains("Team standup about the Q1 plan."));
    assert!(user.contains("- Goals are reviewed.\n- Roadmap is discussed."));
    assert!(user.contains("- Q1 Plan\n- Roadmap"));
    assert!(!user.contains("spk_0"));
}

#[tokio::test]
async fn invocation_arn_skips_the_listing() {
    let bucket = FakeBucket::with(&[(RESULT_KEY, result_document())]);
    let model = FakeModel::default();

    let response = generate_summary(
        &bucket,
        &model,
        &config(),
        event(
            Some("standup.mp4"),
            Some("arn:aws:bedrock:us-east-1:123456789012:data-automation-invocation/3f2a9c"),
        ),
    )
    .await;

    assert_eq!(response.status_code, 200);
    assert!(bucket.listings.lock().unwrap().is_empty());
    assert_eq!(bucket.reads.lock().unwrap().as_slice(), [RESULT_KEY]);
}

#[tokio::test]
async fn missing_result_is_not_found() {
    let bucket = FakeBucket::with(&[(
        "data_automation_result/standup.mp4/job_metadata.json",
        Bytes::from_static(b"{}"),
    )]);
    let model = FakeModel::default();

    let response = generate_summary(&bucket, &model, &config(), event(Some("standup.mp4"), None)).await;

    assert_eq!(response.status_code, 404);
    assert_eq!(
        response.payload()["error"],
        "No matching object found under prefix: data_automation_result/standup.mp4"
    );
    assert!(model.prompts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn filename_falls_back_to_configuration() {
    let bucket = FakeBucket::with(&[(RESULT_KEY, result_document())]);
    let model = FakeModel::default();
    let config = SummaryConfig {
        default_filename: Some("standup.mp4".to_owned()),
        ..config()
    };

    let response = generate_summary(&bucket, &model, &config, event(None, None)).await;

    assert_eq!(response.status_code, 200);
}

#[tokio::test]
async fn missing_filename_is_a_client_error() {
    let bucket = FakeBucket::default();
    let model = FakeModel::default();

    let response = generate_summary(&bucket, &model, &config(), event(None, None)).await;

    assert_eq!(response.status_code, 400);
    assert!(bucket.listings.lock().unwrap().is_empty());
}

#[tokio::test]
async fn unreadable_results_are_reported() {
    let bucket = FakeBucket::with(&[(RESULT_KEY, Bytes::from_static(b"not json"))]);
    let model = FakeModel::default();

    let response = generate_summary(&bucket, &model, &config(), event(Some("standup.mp4"), None)).await;

    assert_eq!(response.status_code, 500);
    let error = response.payload()["error"].as_str().unwrap().to_owned();
    assert!(error.starts_with("Error processing result: "), "{error}");
}

#[tokio::test]
async fn stale_invocation_reports_the_storage_error() {
    let bucket = FakeBucket::default();
    let model = FakeModel::default();

    let response = generate_summary(
        &bucket,
        &model,
        &config(),
        event(Some("standup.mp4"), Some("arn:aws:bedrock:us-east-1:123456789012:data-automation-invocation/gone")),
    )
    .await;

    assert_eq!(response.status_code, 500);
    assert_eq!(
        response.payload()["error"],
        "Error processing result: GetObject failed: The specified key does not exist."
    );
}

#[tokio::test]
async fn unconfigured_bucket_is_a_server_error() {
    let bucket = FakeBucket::default();
    let model = FakeModel::default();
    let config = SummaryConfig {
        bucket_name: None,
        ..config()
    };

    let response = generate_summary(&bucket, &model, &config, event(Some("standup.mp4"), None)).await;

    assert_eq!(response.status_code, 500);
    assert_eq!(
        response.payload()["error"],
        "Error processing result: BUCKET_NAME is not configured"
    );
}

//! Flattens a Bedrock Data Automation video result document.
//!
//! Every field is optional in practice; anything absent or of an unexpected
//! type reads as empty.

use std::collections::BTreeSet;

use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoInsights {
    pub video_summary: String,
    pub scene_summaries: Vec<String>,
    pub full_transcript: String,
    pub scene_transcripts: Vec<String>,
    /// On-screen text per scene, words first and then lines, space-joined.
    pub scene_frame_texts: Vec<String>,
    /// Distinct speakers across all scenes, sorted.
    pub speakers: BTreeSet<String>,
}

impl VideoInsights {
    pub fn from_document(document: &Value) -> Self {
        let mut insights = VideoInsights {
            video_summary: text_at(document, "/video/summary").to_owned(),
            full_transcript: text_at(document, "/video/transcript/representation/text").to_owned(),
            ..Default::default()
        };

        for scene in items(document, "scenes") {
            insights
                .scene_summaries
                .push(text_at(scene, "/summary").to_owned());
            insights
                .scene_transcripts
                .push(text_at(scene, "/transcript/representation/text").to_owned());
            insights.scene_frame_texts.push(frame_text(scene));
            insights.speakers.extend(
                items(scene, "audio_segments")
                    .iter()
                    .filter_map(speaker)
                    .map(str::to_owned),
            );
        }

        insights
    }
}

fn text_at<'a>(value: &'a Value, pointer: &str) -> &'a str {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .unwrap_or_default()
}

fn items<'a>(value: &'a Value, key: &str) -> &'a [Value] {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn frame_text(scene: &Value) -> String {
    items(scene, "frames")
        .iter()
        .flat_map(|frame| items(frame, "text_words").iter().chain(items(frame, "text_lines")))
        .map(|token| text_at(token, "/text").trim())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Display name when set, otherwise the diarization label.
fn speaker(segment: &Value) -> Option<&str> {
    [
        text_at(segment, "/speaker/speaker_name"),
        text_at(segment, "/speaker/speaker_label"),
    ]
    .into_iter()
    .find(|name| !name.is_empty())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn extracts_every_field() {
        let document = json!({
            "video": {
                "summary": "Quarterly planning sync.",
                "transcript": { "representation": { "text": "Welcome everyone." } }
            },
            "scenes": [
                {
                    "summary": "Intro to Q1 goals.",
                    "transcript": { "representation": { "text": "Let's start." } },
                    "frames": [
                        { "text_words": [{ "text": "Q1" }, { "text": " Plan " }] }
                    ],
                    "audio_segments": [
                        { "speaker": { "speaker_name": "Alex", "speaker_label": "spk_0" } }
                    ]
                },
                {
                    "summary": "Roadmap review.",
                    "frames": [
                        { "text_lines": [{ "text": "Roadmap" }] }
                    ]
                }
            ]
        });

        let insights = VideoInsights::from_document(&document);

        assert_eq!(insights.video_summary, "Quarterly planning sync.");
        assert_eq!(insights.full_transcript, "Welcome everyone.");
        assert_eq!(insights.scene_summaries, ["Intro to Q1 goals.", "Roadmap review."]);
        assert_eq!(insights.scene_transcripts, ["Let's start.", ""]);
        assert_eq!(insights.scene_frame_texts, ["Q1 Plan", "Roadmap"]);
        assert_eq!(insights.speakers.into_iter().collect::<Vec<_>>(), ["Alex"]);
    }

    #[test]
    fn words_come_before_lines_within_a_frame() {
        let document = json!({
            "scenes": [{
                "frames": [
                    {
                        "text_lines": [{ "text": "Agenda for today" }],
                        "text_words": [{ "text": "Agenda" }, { "text": "" }]
                    },
                    { "text_words": [{ "text": "Budget" }] }
                ]
            }]
        });

        let insights = VideoInsights::from_document(&document);
        assert_eq!(insights.scene_frame_texts, ["Agenda Agenda for today Budget"]);
    }

    #[test]
    fn speaker_label_fills_in_and_duplicates_collapse() {
        let document = json!({
            "scenes": [
                {
                    "audio_segments": [
                        { "speaker": { "speaker_label": "spk_1" } },
                        { "speaker": { "speaker_name": "", "speaker_label": "spk_1" } },
                        { "speaker": { "speaker_name": "Dana" } },
                        { "speaker": {} },
                        {}
                    ]
                },
                { "audio_segments": [{ "speaker": { "speaker_name": "Dana" } }] }
            ]
        });

        let insights = VideoInsights::from_document(&document);
        assert_eq!(
            insights.speakers.into_iter().collect::<Vec<_>>(),
            ["Dana", "spk_1"]
        );
    }

    #[test]
    fn absent_or_mistyped_fields_read_as_empty() {
        assert_eq!(VideoInsights::from_document(&json!({})), VideoInsights::default());

        let insights = VideoInsights::from_document(&json!({
            "video": { "summary": null, "transcript": "not an object" },
            "scenes": [{ "summary": 7, "frames": "none" }]
        }));
        assert_eq!(insights.video_summary, "");
        assert_eq!(insights.full_transcript, "");
        assert_eq!(insights.scene_summaries, [""]);
        assert_eq!(insights.scene_frame_texts, [""]);
        assert!(insights.speakers.is_empty());
    }
}

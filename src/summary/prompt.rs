//! Prompt text for the meeting summary.

use super::insights::VideoInsights;

/// Fixed instruction pinning the model to the six-section minutes template.
pub const SYSTEM_PROMPT: &str = "\
You are a meeting summarization assistant.
Given the video analysis details provided, produce a concise and structured meeting summary.
Your output must exactly adhere to the format below, without any additional commentary or deviations.

--------------------------------------------------
**DATE/TIME/LOCATION**
- [Insert date/time/location]

**INVITEES**
- [Insert invitee 1]
- [Insert invitee 2]
- [Insert invitee 3]
- [Additional invitees...]

**AGENDA**
- [Insert agenda item 1]
- [Insert agenda item 2]
- [Insert agenda item 3]
- [Additional agenda items...]

**ACTION ITEMS**
- [Insert action item 1]
- [Insert action item 2]
- [Insert action item 3]
- [Additional action items...]

**DECISIONS**
- [Insert decision 1]
- [Insert decision 2]
- [Insert decision 3]
- [Additional decisions...]

**MEETING NOTES**
- [Insert key points, technical requirements, and follow-up items]
--------------------------------------------------

Please generate your meeting summary exactly in the above format.

Guidelines:
- Populate each section with factual details from the video analysis.
- Insert the exact date, time, and location in the DATE/TIME/LOCATION section where indicated and can most probably be indicated by frame text and summary, think about what we are presenting today and what the future steps are so you can calculate that with agenda.
- Adhere strictly to the structure.
- Ensure that no additional commentary or deviations from the specified format are included in your final output.";

fn bullets(entries: &[String]) -> String {
    entries
        .iter()
        .filter(|entry| !entry.is_empty())
        .map(|entry| format!("- {entry}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The user turn: video summary, scene summaries and frame text.
///
/// Speakers and transcripts stay out of the message even though they are extracted.
pub fn user_message(insights: &VideoInsights) -> String {
    format!(
        "I have extracted the following information from the video analysis:\n\n\
         1) **Video Summary**:\n{}\n\n\
         2) **Scene Summaries**:\n{}\n\n\
         3) **Frame Visual Text** (extracted from frames):\n{}\n\n\
         Please use this information to inform your meeting summary output.",
        insights.video_summary,
        bullets(&insights.scene_summaries),
        bullets(&insights.scene_frame_texts),
    )
}

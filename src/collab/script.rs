use crate::config::model::{Emotion, Speaker, VideoConfig};
use crate::foundation::error::{StoryError, StoryResult};
use std::collections::BTreeMap;

/// Script-writing collaborator (an LLM behind some transport).
pub trait ScriptGenerator {
    /// Complete `prompt` under `system` instructions and return the raw response text.
    fn generate(&self, system: &str, prompt: &str) -> StoryResult<String>;
}

const VISUAL_TYPES: &str = "\
- \"talking-head\": speaker with subtitles (default, use most)
- \"split-screen\": speaker beside a keyword card (use with highlightText for key terms)
- \"text-overlay\": big centered text, small speaker (use for emphasis)
- \"character-only\": speaker centered and large (use for intro and outro)";

/// Instructions describing the scene-list JSON the generator must answer with.
pub fn system_prompt(speakers: &BTreeMap<String, Speaker>) -> String {
    let cast = speakers
        .iter()
        .map(|(id, s)| {
            let poses: Vec<&str> = s.poses.keys().map(String::as_str).collect();
            format!("- \"{id}\" ({}): poses [{}]", s.name, poses.join(", "))
        })
        .collect::<Vec<_>>()
        .join("\n");
    let emotions = Emotion::ALL
        .iter()
        .map(|e| e.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "You write short-form explainer video scripts (30 to 90 seconds) as dialogue between \
         the characters below.\n\n\
         Characters:\n{cast}\n\n\
         Emotions (unknown poses fall back to neutral): {emotions}\n\n\
         Visual types:\n{VISUAL_TYPES}\n\n\
         Rules: write 3 to 7 scenes, one speaker and one thought per scene, 15 to 30 words of \
         dialogue each, alternate speakers, open excited or waving and close celebrating.\n\n\
         Respond with only JSON of the form \
         {{\"title\": \"...\", \"scenes\": [{{\"speakerId\": \"...\", \"dialogueText\": \"...\", \
         \"emotionTag\": \"...\", \"visualType\": \"...\", \"highlightText\": \"...\"}}], \
         \"style\": {{...}}, \"watermark\": {{...}}}}"
    )
}

/// Remove markdown code fences around a JSON payload.
pub fn strip_fences(text: &str) -> &str {
    let mut s = text.trim();
    if let Some(rest) = s.strip_prefix("```") {
        s = rest.strip_prefix("json").unwrap_or(rest);
        s = s.strip_suffix("```").unwrap_or(s);
    }
    s.trim()
}

/// Turn a generator response into a complete document using the shared speaker table.
///
/// Any speaker table in the response is replaced. The result is validated before it is returned.
pub fn parse_script_response(
    text: &str,
    speakers: &BTreeMap<String, Speaker>,
) -> StoryResult<VideoConfig> {
    let mut doc: serde_json::Value = serde_json::from_str(strip_fences(text))
        .map_err(|e| StoryError::serde(format!("script response is not JSON: {e}")))?;
    let obj = doc
        .as_object_mut()
        .ok_or_else(|| StoryError::serde("script response is not a JSON object"))?;
    obj.remove("characters");
    let table = serde_json::to_value(speakers)
        .map_err(|e| StoryError::serde(format!("serialize speaker table: {e}")))?;
    obj.insert("speakers".to_owned(), table);

    let cfg = VideoConfig::from_json_value(doc)?;
    cfg.validate()?;
    Ok(cfg)
}

/// Ask `generator` for a script about `prompt` and parse it into a document.
#[tracing::instrument(skip(generator, speakers))]
pub fn generate_config(
    generator: &dyn ScriptGenerator,
    prompt: &str,
    speakers: &BTreeMap<String, Speaker>,
) -> StoryResult<VideoConfig> {
    let raw = generator.generate(&system_prompt(speakers), prompt)?;
    let cfg = parse_script_response(&raw, speakers)?;
    tracing::info!(title = %cfg.title, scenes = cfg.scenes.len(), "script generated");
    Ok(cfg)
}

#[cfg(test)]
#[path = "../../tests/unit/collab/script.rs"]
mod tests;

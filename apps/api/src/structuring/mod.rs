//! Résumé Structuring Engine: extracted text in, `StructuredResume` out.
//!
//! Flow: build one prompt (field table + format instructions + verbatim text) →
//!       one completion call → envelope parse → per-field defaulting.
//!
//! There is no retry, no repair loop and no caching. A failed call or an
//! unparseable reply is returned to the caller, which decides whether to keep
//! the CV without structured data.

pub mod model;
pub mod personal_info;
pub mod prompts;
pub mod schema;

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use crate::llm_client::{strip_json_fences, CompletionService, LlmError};
use prompts::{STRUCTURE_PROMPT_TEMPLATE, STRUCTURE_SYSTEM};

pub use model::StructuredResume;

#[derive(Debug, Error)]
pub enum StructuringError {
    #[error("Document contains no extractable text")]
    EmptyDocument,

    #[error("Model call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("Model reply is not a JSON object: {0}")]
    Envelope(String),
}

/// Builds the single structuring prompt for `cv_text`.
pub fn build_prompt(cv_text: &str) -> String {
    STRUCTURE_PROMPT_TEMPLATE
        .replace("{format_instructions}", &schema::format_instructions())
        .replace("{cv_content}", cv_text)
}

/// Parses the raw model reply into a résumé.
///
/// Only the envelope is fatal: the reply must contain one JSON object. Inside
/// it, each field is coerced or defaulted independently.
pub fn parse_reply(reply: &str) -> Result<StructuredResume, StructuringError> {
    let body = strip_json_fences(reply);

    let value: Value = serde_json::from_str(body).or_else(|first_err| {
        // tolerate prose around the object
        match (body.find('{'), body.rfind('}')) {
            (Some(start), Some(end)) if start < end => serde_json::from_str(&body[start..=end])
                .map_err(|e| StructuringError::Envelope(e.to_string())),
            _ => Err(StructuringError::Envelope(first_err.to_string())),
        }
    })?;

    match value {
        Value::Object(object) => Ok(StructuredResume::from_model_object(&object)),
        other => Err(StructuringError::Envelope(format!(
            "expected an object, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[derive(Clone)]
pub struct ResumeStructurer {
    llm: Arc<dyn CompletionService>,
}

impl ResumeStructurer {
    pub fn new(llm: Arc<dyn CompletionService>) -> Self {
        Self { llm }
    }

    /// Structures one document's text with exactly one model call.
    pub async fn structure(&self, cv_text: &str) -> Result<StructuredResume, StructuringError> {
        if cv_text.trim().is_empty() {
            return Err(StructuringError::EmptyDocument);
        }

        let prompt = build_prompt(cv_text);
        debug!("Structuring prompt built: {} chars", prompt.len());

        let reply = self.llm.complete(&prompt, STRUCTURE_SYSTEM).await?;
        let resume = parse_reply(&reply)?;

        info!(
            "Structured resume: {} jobs, {} education entries, {} skills",
            resume.work_experience.len(),
            resume.education.len(),
            resume.skills.len()
        );
        Ok(resume)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Completion backend that replays a fixed reply and records prompts.
    pub(crate) struct ScriptedCompletion {
        reply: Result<String, fn() -> LlmError>,
        pub prompts: Mutex<Vec<String>>,
    }

    impl ScriptedCompletion {
        pub(crate) fn replying(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn failing(error: fn() -> LlmError) -> Self {
            Self {
                reply: Err(error),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl CompletionService for ScriptedCompletion {
        async fn complete(&self, prompt: &str, _system: &str) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(make) => Err(make()),
            }
        }
    }

    const FENCED_REPLY: &str = "```json\n{\n\
        \"personal_info\": \"Jane Doe, jane@x.com, +1 555 1234, Singapore\",\n\
        \"summary\": \"Backend engineer\",\n\
        \"work_experience\": [{\"company\": \"Acme\", \"position\": \"SWE\", \"dates\": \"2021-2024\", \"responsibilities\": [\"APIs\"]}],\n\
        \"skills\": [\"Rust\"]\n}\n```";

    #[test]
    fn test_prompt_embeds_fields_instructions_and_text_verbatim() {
        let text = "Jane Doe\n  Staff Engineer {literal braces}";
        let prompt = build_prompt(text);
        for field in schema::RESUME_FIELDS {
            assert!(prompt.contains(field.description));
        }
        assert!(prompt.contains("```json"));
        assert!(prompt.ends_with(&format!("{text}\n")));
        assert!(!prompt.contains("{format_instructions}"));
    }

    #[test]
    fn test_parse_reply_fills_missing_fields() {
        let resume = parse_reply(FENCED_REPLY).unwrap();
        assert_eq!(resume.personal_info.name, "Jane Doe");
        assert_eq!(resume.personal_info.phone, "+1 555 1234");
        assert_eq!(resume.work_experience[0].company, "Acme");
        assert!(resume.education.is_empty());
        assert!(resume.certifications.is_empty());
    }

    #[test]
    fn test_parse_reply_tolerates_surrounding_prose() {
        let resume = parse_reply("Here you go: {\"summary\": \"ok\"} Hope it helps.").unwrap();
        assert_eq!(resume.summary, "ok");
    }

    #[test]
    fn test_parse_reply_rejects_non_json() {
        let err = parse_reply("I could not read this CV.").unwrap_err();
        assert!(matches!(err, StructuringError::Envelope(_)));
    }

    #[test]
    fn test_parse_reply_rejects_non_object_envelope() {
        let err = parse_reply("[1, 2, 3]").unwrap_err();
        assert!(matches!(err, StructuringError::Envelope(ref msg) if msg.contains("an array")));
    }

    #[tokio::test]
    async fn test_structure_makes_exactly_one_call() {
        let llm = Arc::new(ScriptedCompletion::replying(FENCED_REPLY));
        let structurer = ResumeStructurer::new(llm.clone());

        let resume = structurer.structure("Jane Doe CV text").await.unwrap();

        assert_eq!(llm.calls(), 1);
        assert_eq!(resume.summary, "Backend engineer");
        assert!(llm.prompts.lock().unwrap()[0].contains("Jane Doe CV text"));
    }

    #[tokio::test]
    async fn test_structure_does_not_retry_failed_calls() {
        let llm = Arc::new(ScriptedCompletion::failing(|| LlmError::Api {
            status: 429,
            message: "quota exceeded".to_string(),
        }));
        let structurer = ResumeStructurer::new(llm.clone());

        let err = structurer.structure("some text").await.unwrap_err();

        assert!(matches!(err, StructuringError::Llm(LlmError::Api { status: 429, .. })));
        assert_eq!(llm.calls(), 1);
    }

    #[tokio::test]
    async fn test_blank_text_skips_the_model() {
        let llm = Arc::new(ScriptedCompletion::replying("{}"));
        let structurer = ResumeStructurer::new(llm.clone());

        let err = structurer.structure("   \n").await.unwrap_err();

        assert!(matches!(err, StructuringError::EmptyDocument));
        assert_eq!(llm.calls(), 0);
    }
}

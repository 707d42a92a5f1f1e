//! [`Generator`] backed by a local Ollama server.
//!
//! Every task is sent to `/api/generate` in JSON mode with a prompt listing
//! its inputs and the fields expected back. The reply is parsed leniently:
//! missing fields read as empty and non-string values are stringified, since
//! the graph post-processes everything anyway.
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use hybridqa_core::traits::Generator;
use hybridqa_core::types::{Fields, GenerationTask};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    pub host: String,
    pub port: u16,
    pub chat_model: String,
    pub timeout_seconds: u64,
    pub max_retries: u32,
    pub temperature: Option<f32>,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost".to_string(),
            port: 11434,
            chat_model: "phi3.5:3.8b-mini-instruct-q4_K_M".to_string(),
            timeout_seconds: 60,
            max_retries: 3,
            temperature: Some(0.0),
        }
    }
}

pub struct OllamaGenerator {
    config: OllamaConfig,
    client: ureq::Agent,
}

impl OllamaGenerator {
    pub fn new(config: OllamaConfig) -> Self {
        let client = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build();
        Self { config, client }
    }

    fn endpoint(&self) -> String {
        format!("{}:{}/api/generate", self.config.host, self.config.port)
    }

    fn complete(&self, prompt: &str) -> Result<String> {
        let mut body = json!({
            "model": self.config.chat_model,
            "prompt": prompt,
            "format": "json",
            "stream": false,
        });
        if let Some(temperature) = self.config.temperature {
            body["options"] = json!({ "temperature": temperature });
        }

        let endpoint = self.endpoint();
        let attempts = self.config.max_retries.max(1);
        let mut last_error = None;
        for attempt in 1..=attempts {
            let sent = self
                .client
                .post(&endpoint)
                .set("Content-Type", "application/json")
                .send_json(&body);
            match sent {
                Ok(response) => {
                    let reply: Value = response.into_json().context("decoding Ollama reply")?;
                    return reply["response"]
                        .as_str()
                        .map(str::to_string)
                        .ok_or_else(|| anyhow!("Ollama reply has no `response` text: {reply}"));
                }
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "Ollama request failed");
                    last_error = Some(e);
                    if attempt < attempts {
                        std::thread::sleep(Duration::from_millis(250 * u64::from(attempt)));
                    }
                }
            }
        }
        match last_error {
            Some(e) => bail!("Ollama unreachable after {attempts} attempts: {e}"),
            None => bail!("Ollama request was never attempted"),
        }
    }
}

impl Generator for OllamaGenerator {
    fn generate(&self, task: &GenerationTask<'_>) -> Result<Fields> {
        let raw = self.complete(&build_prompt(task))?;
        Ok(parse_fields(task, &raw))
    }
}

fn instructions(task: &GenerationTask<'_>) -> &'static str {
    match task {
        GenerationTask::Route { .. } => {
            "Classify the question. Answer `rag` if it is answered by the documents alone, \
             `sql` if it needs only the database, `hybrid` if it needs both."
        }
        GenerationTask::Plan { .. } => {
            "Extract query constraints from the question and context: an explicit date range, \
             filters on real database columns, and the aggregation to compute. Campaign names, \
             calendar entries and other document titles are labels, never filters; turn them \
             into their date range instead."
        }
        GenerationTask::GenerateQuery { .. } => {
            "Write one SQLite SELECT statement answering the question using only the tables and \
             columns in db_schema. If previous_error is not empty, fix that error."
        }
        GenerationTask::Synthesize { .. } => {
            "Answer the question from the context. final_answer must match format_hint exactly; \
             explanation is at most two sentences."
        }
    }
}

pub fn build_prompt(task: &GenerationTask<'_>) -> String {
    let mut prompt = String::from(instructions(task));
    prompt.push_str("\n\n");
    for (name, value) in task.inputs() {
        prompt.push_str(&format!("{name}:\n{value}\n\n"));
    }
    let fields = task
        .output_fields()
        .iter()
        .map(|f| format!("\"{f}\""))
        .collect::<Vec<_>>()
        .join(", ");
    prompt.push_str(&format!("Respond with a JSON object with the keys {fields}."));
    prompt
}

/// Pull the task's output fields out of a model reply. Non-JSON replies
/// are assigned whole to the first field.
pub fn parse_fields(task: &GenerationTask<'_>, raw: &str) -> Fields {
    let mut fields = Fields::new();
    let names = task.output_fields();
    match serde_json::from_str::<Value>(raw.trim()) {
        Ok(Value::Object(map)) => {
            for name in names {
                match map.get(*name) {
                    Some(Value::String(s)) => fields.insert(name, s.clone()),
                    Some(Value::Null) | None => {}
                    Some(other) => fields.insert(name, other.to_string()),
                }
            }
        }
        _ => {
            if let Some(first) = names.first() {
                fields.insert(first, raw.trim());
            }
        }
    }
    fields
}

//! LLM integration for swim coaching reports
//!
//! This module handles communication with the Gemini API. The session record
//! and recent history are rendered into a prompt, and the model is asked for
//! JSON that matches a fixed response schema.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::env;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::models::{GeneratedReport, SwimSession};
use crate::simulator::average_pace;

/// ---------------------------------------------------------------------------
/// Configuration
/// ---------------------------------------------------------------------------

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

#[derive(Debug, Clone)]
pub struct GeminiConfig {
  pub api_key: String,
  pub model: String,
  pub api_base: Url,
}

impl GeminiConfig {
  /// Load from `GEMINI_API_KEY` (or `API_KEY`), `SWIMSMART_MODEL` and `SWIMSMART_API_BASE`
  pub fn from_env() -> Result<Self, LlmError> {
    let api_key = env::var("GEMINI_API_KEY")
      .or_else(|_| env::var("API_KEY"))
      .ok()
      .filter(|k| !k.trim().is_empty())
      .ok_or(LlmError::MissingApiKey)?;

    let model = env::var("SWIMSMART_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
    let api_base =
      env::var("SWIMSMART_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());

    Self::new(api_key, model, &api_base)
  }

  pub fn new(
    api_key: impl Into<String>,
    model: impl Into<String>,
    api_base: &str,
  ) -> Result<Self, LlmError> {
    // Url::join drops the last path segment unless the base ends in '/'
    let mut base = api_base.trim().to_string();
    if !base.ends_with('/') {
      base.push('/');
    }

    let api_base =
      Url::parse(&base).map_err(|e| LlmError::InvalidConfig(format!("{}: {}", base, e)))?;

    Ok(Self {
      api_key: api_key.into(),
      model: model.into(),
      api_base,
    })
  }

  pub fn endpoint(&self) -> Result<Url, LlmError> {
    self
      .api_base
      .join(&format!("v1beta/models/{}:generateContent", self.model))
      .map_err(|e| LlmError::InvalidConfig(e.to_string()))
  }
}

/// ---------------------------------------------------------------------------
/// Error Types
/// ---------------------------------------------------------------------------

#[derive(Error, Debug, Serialize)]
pub enum LlmError {
  #[error("API key not configured")]
  MissingApiKey,

  #[error("Invalid configuration: {0}")]
  InvalidConfig(String),

  #[error("Request failed: {0}")]
  Request(String),

  #[error("API error: {0}")]
  Api(String),

  #[error("Parse error: {0}")]
  Parse(String),

  #[error("Received an empty response from the model")]
  EmptyResponse,
}

/// ---------------------------------------------------------------------------
/// Gemini API Types
/// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
  system_instruction: Content,
  contents: Vec<Content>,
  generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  role: Option<String>,
  #[serde(default)]
  parts: Vec<Part>,
}

impl Content {
  fn text(role: Option<&str>, text: &str) -> Self {
    Self {
      role: role.map(String::from),
      parts: vec![Part {
        text: Some(text.to_string()),
      }],
    }
  }
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
  response_mime_type: String,
  response_schema: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
  #[serde(default)]
  candidates: Vec<Candidate>,
  usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
  content: Option<Content>,
  #[allow(dead_code)]
  finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
  #[serde(default)]
  prompt_token_count: u32,
  #[serde(default)]
  candidates_token_count: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
  pub input_tokens: u32,
  pub output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
  error: GeminiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
  message: String,
}

/// ---------------------------------------------------------------------------
/// Report Schema & Prompt
/// ---------------------------------------------------------------------------

fn titled_item(title_field: &str, title_desc: &str, desc: &str) -> Value {
  json!({
    "type": "OBJECT",
    "properties": {
      title_field: { "type": "STRING", "description": title_desc },
      "description": { "type": "STRING", "description": desc }
    },
    "required": [title_field, "description"]
  })
}

fn metric(value_desc: &str, analysis_desc: &str) -> Value {
  json!({
    "type": "OBJECT",
    "properties": {
      "value": { "type": "STRING", "description": value_desc },
      "analysis": { "type": "STRING", "description": analysis_desc }
    },
    "required": ["value", "analysis"]
  })
}

/// Response schema the model must fill; mirrors `GeneratedReport`
pub fn report_schema() -> Value {
  json!({
    "type": "OBJECT",
    "properties": {
      "greeting": {
        "type": "STRING",
        "description": "A friendly, very brief opening greeting to the swimmer."
      },
      "summary": {
        "type": "STRING",
        "description": "One sentence summarizing the session, compared with previous sessions when available."
      },
      "metricsAnalysis": {
        "type": "OBJECT",
        "properties": {
          "pace": metric(
            "Overall average pace, e.g. '2:00/100m'.",
            "Brief analysis of overall pace against past sessions, noting faster or slower strokes."
          ),
          "strokeRate": metric(
            "Average stroke rate, e.g. '55 spm'.",
            "Brief analysis of stroke rate against past sessions."
          ),
          "heartRate": metric(
            "Average heart rate, e.g. '140 bpm'.",
            "Brief analysis of heart rate zone and effort."
          )
        },
        "required": ["pace", "strokeRate", "heartRate"]
      },
      "identifiedWeaknesses": {
        "type": "ARRAY",
        "description": "One or two key weaknesses drawn from the data and the swimmer's notes.",
        "items": titled_item(
          "weakness",
          "Short title (3-4 words), e.g. 'Pacing Drop-off'.",
          "One sentence explaining the weakness and the evidence for it."
        )
      },
      "improvementTips": {
        "type": "ARRAY",
        "items": titled_item(
          "tip",
          "Short title (3-4 words) for an actionable tip, possibly stroke-specific.",
          "One sentence describing the tip."
        )
      },
      "recommendedDrills": {
        "type": "ARRAY",
        "items": titled_item(
          "drill",
          "Name of a drill, targeting a specific stroke if needed.",
          "One sentence on the drill and why it helps."
        )
      },
      "closingMotivation": {
        "type": "STRING",
        "description": "A short, punchy motivational close that acknowledges progress."
      }
    },
    "required": [
      "greeting", "summary", "metricsAnalysis",
      "identifiedWeaknesses", "improvementTips", "recommendedDrills", "closingMotivation"
    ]
  })
}

/// Render the current session and prior sessions (newest first) into the user prompt
pub fn build_report_prompt(current: &SwimSession, history: &[SwimSession]) -> String {
  let metrics = &current.metrics;

  let breakdown = metrics
    .segments
    .iter()
    .map(|s| format!("- {}: {} min {} sec", s.stroke, s.duration / 60, s.duration % 60))
    .collect::<Vec<_>>()
    .join("\n");

  let notes = current
    .notes
    .as_deref()
    .map(|n| format!("\n**Swimmer's Notes (How they felt):**\n\"{}\"\n", n))
    .unwrap_or_default();

  let history_section = if history.is_empty() {
    "This is the swimmer's first recorded session.".to_string()
  } else {
    let lines = history
      .iter()
      .map(|h| {
        let pace = average_pace(&h.metrics)
          .map(|p| format!(" ({} avg)", p))
          .unwrap_or_default();
        format!(
          "- {}: {}m in {}{}",
          h.date.format("%Y-%m-%d"),
          h.metrics.distance_meters,
          h.metrics.total_time,
          pace
        )
      })
      .collect::<Vec<_>>()
      .join("\n");
    format!("**Previous Session Data (for comparison):**\n{}", lines)
  };

  format!(
    r#"A swimmer has just completed a session. Write a detailed, encouraging and PERSONALIZED performance report. Pay close attention to the strokes swum and to the swimmer's own notes, and compare with previous sessions when they are available.
**IMPORTANT: All text must be very concise, suitable for a small watch screen.**

**Current Swimmer's Data:**
- **Date:** {date}
- **Total Distance:** {distance} meters
- **Total Time:** {time}
- **Average Heart Rate:** {hr} bpm
- **Average Stroke Rate:** {sr} strokes per minute

**Session Breakdown by Stroke:**
{breakdown}
{notes}
{history_section}

**Instructions:**
1. **Overall Pace:** Work out the average pace per 100m for the whole session.
2. **Detailed Analysis:** Analyze pace, stroke rate and heart rate. Use the swimmer's notes for context (e.g. tiredness alongside a pace drop) and compare against previous sessions.
3. **Stroke-Specific Comments:** Where possible, infer differences between the strokes swum.
4. **Identify Weaknesses:** Name 1-2 primary weaknesses from this session, i.e. what went wrong.
5. **Actionable Tips:** Give 2 specific tips that address those weaknesses, i.e. how to fix them.
6. **Recommend Drills:** Suggest 2 drills that target those weaknesses.
7. **Be Encouraging:** Keep a positive, supportive tone.
8. **Fill the JSON:** Populate every field of the response schema."#,
    date = current.date.format("%Y-%m-%d"),
    distance = metrics.distance_meters,
    time = metrics.total_time,
    hr = metrics.avg_heart_rate_bpm,
    sr = metrics.avg_stroke_rate_spm,
    breakdown = breakdown,
    notes = notes,
    history_section = history_section,
  )
}

/// ---------------------------------------------------------------------------
/// Report Generation Seam
/// ---------------------------------------------------------------------------

/// Anything that can turn a session (plus history) into a coaching report
#[async_trait]
pub trait ReportGenerator: Send + Sync {
  fn model_name(&self) -> &str;

  async fn generate(
    &self,
    current: &SwimSession,
    history: &[SwimSession],
  ) -> Result<(GeneratedReport, Usage), LlmError>;
}

/// ---------------------------------------------------------------------------
/// Gemini Client
/// ---------------------------------------------------------------------------

pub struct GeminiClient {
  client: Client,
  config: GeminiConfig,
}

impl GeminiClient {
  pub fn new(config: GeminiConfig) -> Self {
    Self {
      client: Client::new(),
      config,
    }
  }

  /// Create a new Gemini client, loading configuration from the environment
  pub fn from_env() -> Result<Self, LlmError> {
    Ok(Self::new(GeminiConfig::from_env()?))
  }

  /// Call Gemini with a system instruction, one user message and a JSON response schema
  pub async fn complete(
    &self,
    system_prompt: &str,
    user_message: &str,
    response_schema: Value,
  ) -> Result<(String, Usage), LlmError> {
    let request = GenerateContentRequest {
      system_instruction: Content::text(None, system_prompt),
      contents: vec![Content::text(Some("user"), user_message)],
      generation_config: GenerationConfig {
        response_mime_type: "application/json".to_string(),
        response_schema,
      },
    };

    let endpoint = self.config.endpoint()?;
    debug!(model = %self.config.model, %endpoint, "sending generateContent request");

    let response = self
      .client
      .post(endpoint)
      .header("x-goog-api-key", &self.config.api_key)
      .header("content-type", "application/json")
      .json(&request)
      .send()
      .await
      .map_err(|e| LlmError::Request(e.to_string()))?;

    let status = response.status();
    let body = response
      .text()
      .await
      .map_err(|e| LlmError::Request(e.to_string()))?;

    if !status.is_success() {
      warn!(%status, "Gemini request failed");
      if let Ok(error_resp) = serde_json::from_str::<GeminiErrorResponse>(&body) {
        return Err(LlmError::Api(error_resp.error.message));
      }
      return Err(LlmError::Api(format!("HTTP {}: {}", status, body)));
    }

    let gemini_response: GenerateContentResponse =
      serde_json::from_str(&body).map_err(|e| LlmError::Parse(e.to_string()))?;

    let usage = gemini_response
      .usage_metadata
      .map(|u| Usage {
        input_tokens: u.prompt_token_count,
        output_tokens: u.candidates_token_count,
      })
      .unwrap_or_default();

    // First text part of the first candidate
    let text = gemini_response
      .candidates
      .into_iter()
      .filter_map(|c| c.content)
      .flat_map(|c| c.parts)
      .find_map(|p| p.text)
      .filter(|t| !t.trim().is_empty())
      .ok_or(LlmError::EmptyResponse)?;

    Ok((text, usage))
  }

  /// Generate a structured coaching report for `current`, compared against `history`
  pub async fn generate_swim_report(
    &self,
    current: &SwimSession,
    history: &[SwimSession],
  ) -> Result<(GeneratedReport, Usage), LlmError> {
    let system_prompt = include_str!("prompts/coach_system.txt");
    let user_message = build_report_prompt(current, history);

    let (response_text, usage) = self
      .complete(system_prompt, &user_message, report_schema())
      .await?;

    let json_str = extract_json(&response_text)?;

    let report: GeneratedReport = serde_json::from_str(&json_str)
      .map_err(|e| LlmError::Parse(format!("{}: {}", e, json_str)))?;

    Ok((report, usage))
  }
}

#[async_trait]
impl ReportGenerator for GeminiClient {
  fn model_name(&self) -> &str {
    &self.config.model
  }

  async fn generate(
    &self,
    current: &SwimSession,
    history: &[SwimSession],
  ) -> Result<(GeneratedReport, Usage), LlmError> {
    self.generate_swim_report(current, history).await
  }
}

/// Extract JSON from the model's response (handles markdown code blocks)
fn extract_json(text: &str) -> Result<String, LlmError> {
  if text.trim().starts_with('{') {
    return Ok(text.trim().to_string());
  }

  if let Some(start) = text.find("```json") {
    let start = start + 7;
    if let Some(end) = text[start..].find("```") {
      return Ok(text[start..start + end].trim().to_string());
    }
  }

  if let Some(start) = text.find("```") {
    let start = start + 3;
    // Skip language identifier if present
    let content_start = text[start..]
      .find('\n')
      .map(|i| start + i + 1)
      .unwrap_or(start);
    if let Some(end) = text[content_start..].find("```") {
      return Ok(text[content_start..content_start + end].trim().to_string());
    }
  }

  // Last resort: first { to last }
  if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
    if start < end {
      return Ok(text[start..=end].to_string());
    }
  }

  Err(LlmError::Parse("Could not extract JSON from response".to_string()))
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

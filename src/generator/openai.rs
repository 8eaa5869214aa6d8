use std::time::Duration;

use serde_json::{Value, json};

use crate::config::Config;
use crate::generator::{GenerateError, GeneratedQuestion, QuestionGenerator};
use crate::store::schema::{OPTION_LETTERS, QuestionType};

/// Source text beyond this many characters is not sent to the model.
pub const MAX_SOURCE_CHARS: usize = 12_000;

const MAX_OPTIONS: usize = 4;

const SYSTEM_PROMPT: &str = "You are an assistant that writes quiz questions from study material. \
Respond with a single JSON object of the form {\"questions\": [...]}. Each question has the keys \
\"question\", \"type\", \"options\", \"correct_answer\" and \"explanation\". \"type\" is one of \
\"multiple_choice\", \"true_false\" or \"short_answer\". Multiple choice questions have exactly four \
options and their correct_answer is the letter A, B, C or D. True/false questions have an empty \
options list and a correct_answer of \"true\" or \"false\". Short answer questions have an empty \
options list and a brief correct_answer. Only ask about facts stated in the material.";

pub struct OpenAiGenerator {
    api_key: Option<String>,
    model: String,
    base_url: String,
    timeout: Duration,
}

impl OpenAiGenerator {
    pub fn new(api_key: Option<String>, model: &str, base_url: &str, timeout: Duration) -> Self {
        Self {
            api_key,
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    pub fn from_config(config: &Config, api_key: Option<String>) -> Self {
        Self::new(
            api_key,
            &config.openai_model,
            &config.openai_base_url,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn build_request(&self, text: &str, count: usize, types: &[QuestionType]) -> Value {
        json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": user_prompt(text, count, types) },
            ],
            "response_format": { "type": "json_object" },
            "temperature": 0.7,
        })
    }

    #[cfg(feature = "network")]
    fn send(&self, api_key: &str, payload: &Value) -> Result<Value, GenerateError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| GenerateError::Http(e.to_string()))?;
        let response = client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(payload)
            .send()
            .map_err(|e| GenerateError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(GenerateError::Api {
                status: status.as_u16(),
                body,
            });
        }
        response
            .json()
            .map_err(|e| GenerateError::InvalidResponse(e.to_string()))
    }

    #[cfg(not(feature = "network"))]
    fn send(&self, _api_key: &str, _payload: &Value) -> Result<Value, GenerateError> {
        let _ = self.timeout;
        Err(GenerateError::Http("network support disabled".to_string()))
    }
}

impl QuestionGenerator for OpenAiGenerator {
    fn generate(
        &self,
        text: &str,
        count: usize,
        types: &[QuestionType],
    ) -> Result<Vec<GeneratedQuestion>, GenerateError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(GenerateError::MissingApiKey);
        };

        let payload = self.build_request(text, count, types);
        tracing::info!(model = %self.model, count, ?types, "requesting questions");
        let body = self.send(api_key, &payload)?;
        let raw = message_content(&body)?;

        let questions = sanitize_questions(&raw, count);
        if questions.is_empty() {
            return Err(GenerateError::NoQuestions);
        }
        tracing::info!(requested = count, received = questions.len(), "questions generated");
        Ok(questions)
    }

    fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }
}

fn user_prompt(text: &str, count: usize, types: &[QuestionType]) -> String {
    let kinds: Vec<&str> = types.iter().map(|t| t.as_str()).collect();
    let source: String = text.chars().take(MAX_SOURCE_CHARS).collect();
    format!(
        "Generate {count} questions using only these types: {}.\n\nMaterial:\n{source}",
        kinds.join(", ")
    )
}

/// Pulls `choices[0].message.content` out of a chat-completions body and
/// parses it as JSON.
pub fn message_content(body: &Value) -> Result<Value, GenerateError> {
    let content = body
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(Value::as_str)
        .ok_or_else(|| GenerateError::InvalidResponse("missing message content".to_string()))?;
    serde_json::from_str(strip_code_fence(content))
        .map_err(|e| GenerateError::InvalidResponse(e.to_string()))
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    match trimmed.strip_prefix("```") {
        Some(rest) => {
            let rest = rest.strip_prefix("json").unwrap_or(rest);
            rest.strip_suffix("```").unwrap_or(rest).trim()
        }
        None => trimmed,
    }
}

/// Keeps the well-formed entries of a model reply, in order, up to `count`.
pub fn sanitize_questions(raw: &Value, count: usize) -> Vec<GeneratedQuestion> {
    let entries = raw
        .get("questions")
        .and_then(Value::as_array)
        .or_else(|| raw.as_array());
    let Some(entries) = entries else {
        return Vec::new();
    };

    let mut questions: Vec<GeneratedQuestion> = entries.iter().filter_map(coerce_question).collect();
    let dropped = entries.len() - questions.len();
    if dropped > 0 {
        tracing::warn!(dropped, "discarded malformed generated questions");
    }
    questions.truncate(count);
    questions
}

fn coerce_question(val: &Value) -> Option<GeneratedQuestion> {
    let question = val
        .get("question")
        .or_else(|| val.get("question_text"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|q| !q.is_empty())?
        .to_string();
    let kind = val.get("type").and_then(Value::as_str).and_then(parse_kind)?;
    let explanation = val
        .get("explanation")
        .and_then(Value::as_str)
        .map(|e| e.trim().to_string())
        .unwrap_or_default();
    let answer = val.get("correct_answer").or_else(|| val.get("answer"))?;

    let (options, correct_answer) = match kind {
        QuestionType::MultipleChoice => {
            let options: Vec<String> = val
                .get("options")
                .and_then(Value::as_array)?
                .iter()
                .filter_map(Value::as_str)
                .enumerate()
                .map(|(i, opt)| strip_option_label(opt, i))
                .filter(|opt| !opt.is_empty())
                .take(MAX_OPTIONS)
                .collect();
            if options.len() < 2 {
                return None;
            }
            let letter = choice_letter(answer, &options)?;
            (options, letter)
        }
        QuestionType::TrueFalse => (Vec::new(), bool_answer(answer)?),
        QuestionType::ShortAnswer => {
            let answer = answer.as_str().map(str::trim).filter(|a| !a.is_empty())?;
            (Vec::new(), answer.to_string())
        }
    };

    Some(GeneratedQuestion {
        question,
        kind,
        options,
        correct_answer,
        explanation,
    })
}

fn parse_kind(raw: &str) -> Option<QuestionType> {
    let normalised: String = raw
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if matches!(c, '-' | ' ' | '/') { '_' } else { c })
        .collect();
    normalised.parse().ok()
}

/// Drops a leading "A) " / "b. " label matching the option's position.
fn strip_option_label(option: &str, index: usize) -> String {
    let trimmed = option.trim();
    let Some(letter) = OPTION_LETTERS.get(index) else {
        return trimmed.to_string();
    };
    let mut chars = trimmed.chars();
    let labelled = chars
        .next()
        .is_some_and(|c| c.to_string().eq_ignore_ascii_case(letter))
        && matches!(chars.next(), Some(')' | '.' | ':'));
    if labelled {
        trimmed[2..].trim().to_string()
    } else {
        trimmed.to_string()
    }
}

fn choice_letter(answer: &Value, options: &[String]) -> Option<String> {
    let index = match answer {
        Value::Number(n) => n.as_u64().map(|n| n as usize)?,
        Value::String(s) => {
            let s = s.trim();
            let letter_index = |c: char| {
                OPTION_LETTERS
                    .iter()
                    .position(|l| l.eq_ignore_ascii_case(&c.to_string()))
            };
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii_alphabetic() => letter_index(c)?,
                (Some(c), Some(')' | '.' | ':')) if c.is_ascii_alphabetic() => letter_index(c)?,
                _ => match s.parse::<usize>() {
                    Ok(n) => n,
                    Err(_) => options.iter().position(|o| o.eq_ignore_ascii_case(s))?,
                },
            }
        }
        _ => return None,
    };
    if index < options.len() {
        Some(OPTION_LETTERS[index].to_string())
    } else {
        None
    }
}

fn bool_answer(answer: &Value) -> Option<String> {
    match answer {
        Value::Bool(b) => Some(b.to_string()),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "t" => Some("true".to_string()),
            "false" | "f" => Some("false".to_string()),
            _ => None,
        },
        _ => None,
    }
}

//! Request shaping for the project-key endpoints.
//!
//! Optional fields are only written to the body when set; passthrough `extra`
//! fields are merged after named fields and never overwrite them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::client::ApiError;

/// Open-ended passthrough fields.
pub type Extra = Map<String, Value>;

/// Model id that lets the server pick a model.
pub const AUTO_MODEL: &str = "auto";

pub const DEFAULT_IMAGE_SIZE: &str = "1024x1024";
pub const DEFAULT_WIDGET_TOKEN_TTL_SECS: u32 = 600;

/// Role of the message sender.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// A single chat message.
///
/// `content` is usually a string but may be any JSON the server accepts,
/// such as an array of multimodal parts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<Value>) -> Self {
        Self {
            role,
            content: content.into(),
            name: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content.into())
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content.into())
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content.into())
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Chat completion request.
///
/// # Example
/// ```rust
/// use waygpt::{ChatCompletionRequest, Message};
///
/// let request = ChatCompletionRequest::new(vec![Message::user("Hello!")])
///     .with_use_case("support_chat")
///     .with_temperature(0.7)
///     .with_extra("top_p", 0.9);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ChatCompletionRequest {
    /// Model id; `"auto"` when unset
    pub model: Option<String>,
    pub messages: Vec<Message>,
    /// Use-case key, e.g. `"support_chat"`
    pub use_case: Option<String>,
    /// Legacy alias for `use_case`
    pub use_case_id: Option<String>,
    /// Sent only when finite
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    pub extra: Extra,
}

impl ChatCompletionRequest {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            ..Self::default()
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    pub fn with_use_case(mut self, use_case: impl Into<String>) -> Self {
        self.use_case = Some(use_case.into());
        self
    }

    #[deprecated(note = "use `with_use_case` with the use-case key")]
    pub fn with_use_case_id(mut self, use_case_id: impl Into<String>) -> Self {
        self.use_case_id = Some(use_case_id.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Add a passthrough field. Named fields win on collision.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Use case to send: `use_case`, then `use_case_id`, then an `extra`
    /// `use_case` string. Trimmed; blank values are ignored.
    pub fn resolved_use_case(&self) -> Option<String> {
        [
            self.use_case.as_deref(),
            self.use_case_id.as_deref(),
            self.extra.get("use_case").and_then(Value::as_str),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|uc| !uc.is_empty())
        .map(str::to_string)
    }

    pub(crate) fn into_body(self, stream: bool) -> Value {
        let mut body = Map::new();
        let use_case = self.resolved_use_case();

        body.insert(
            "model".into(),
            Value::String(self.model.unwrap_or_else(|| AUTO_MODEL.to_string())),
        );
        body.insert("messages".into(), json_value(&self.messages));
        if let Some(use_case) = use_case {
            body.insert("use_case".into(), Value::String(use_case));
        }
        if let Some(temperature) = self.temperature.filter(|t| t.is_finite()) {
            body.insert("temperature".into(), Value::from(temperature));
        }
        if let Some(max_tokens) = self.max_tokens {
            body.insert("max_tokens".into(), Value::from(max_tokens));
        }
        if stream {
            body.insert("stream".into(), Value::Bool(true));
        }

        merge_extra(&mut body, self.extra);
        Value::Object(body)
    }
}

/// Image generation request.
#[derive(Debug, Clone)]
pub struct ImageGenerationRequest {
    pub prompt: String,
    pub model: Option<String>,
    /// Defaults to `"1024x1024"`
    pub size: Option<String>,
    /// Defaults to 1
    pub n: Option<u32>,
    pub extra: Extra,
}

impl ImageGenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: None,
            size: None,
            n: None,
            extra: Extra::new(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    pub fn with_n(mut self, n: u32) -> Self {
        self.n = Some(n);
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub(crate) fn into_body(self) -> Result<Value, ApiError> {
        let mut body = Map::new();
        body.insert("prompt".into(), Value::String(require_prompt(self.prompt)?));
        body.insert(
            "size".into(),
            Value::String(self.size.unwrap_or_else(|| DEFAULT_IMAGE_SIZE.to_string())),
        );
        body.insert("n".into(), Value::from(self.n.unwrap_or(1)));
        if let Some(model) = self.model.filter(|m| !m.is_empty()) {
            body.insert("model".into(), Value::String(model));
        }

        merge_extra(&mut body, self.extra);
        Ok(Value::Object(body))
    }
}

/// Video generation request. The response carries a media job id.
#[derive(Debug, Clone)]
pub struct VideoGenerationRequest {
    pub prompt: String,
    pub model: Option<String>,
    /// Duration in seconds; omitted when unset or zero
    pub duration: Option<u32>,
    pub extra: Extra,
}

impl VideoGenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: None,
            duration: None,
            extra: Extra::new(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_duration(mut self, seconds: u32) -> Self {
        self.duration = Some(seconds);
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub(crate) fn into_body(self) -> Result<Value, ApiError> {
        let mut body = Map::new();
        body.insert("prompt".into(), Value::String(require_prompt(self.prompt)?));
        if let Some(model) = self.model.filter(|m| !m.is_empty()) {
            body.insert("model".into(), Value::String(model));
        }
        if let Some(duration) = self.duration.filter(|d| *d > 0) {
            body.insert("duration".into(), Value::from(duration));
        }

        merge_extra(&mut body, self.extra);
        Ok(Value::Object(body))
    }
}

/// Browser widget token request.
#[derive(Debug, Clone, Serialize)]
pub struct WidgetTokenRequest {
    pub ttl_seconds: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_domain: Option<String>,
}

impl Default for WidgetTokenRequest {
    fn default() -> Self {
        Self {
            ttl_seconds: DEFAULT_WIDGET_TOKEN_TTL_SECS,
            site_domain: None,
        }
    }
}

impl WidgetTokenRequest {
    pub fn with_ttl_seconds(mut self, ttl_seconds: u32) -> Self {
        self.ttl_seconds = ttl_seconds;
        self
    }

    pub fn with_site_domain(mut self, site_domain: impl Into<String>) -> Self {
        self.site_domain = Some(site_domain.into()).filter(|d: &String| !d.is_empty());
        self
    }
}

fn merge_extra(body: &mut Map<String, Value>, extra: Extra) {
    for (key, value) in extra {
        body.entry(key).or_insert(value);
    }
}

fn require_prompt(prompt: String) -> Result<String, ApiError> {
    if prompt.trim().is_empty() {
        return Err(ApiError::invalid_request("prompt is required"));
    }
    Ok(prompt)
}

fn json_value<T: Serialize>(value: &T) -> Value {
    // Messages hold only strings and JSON values, so this cannot fail.
    serde_json::to_value(value).unwrap_or(Value::Null)
}

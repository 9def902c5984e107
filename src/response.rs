use crate::ClassifyError;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// How the body of a successful `/classify` response is turned into a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    /// `{"lang": "<label>"}`
    #[default]
    Json,
    /// The whole body is the label.
    Text,
    /// `application/json` content types are read as [`ResponseFormat::Json`],
    /// anything else as [`ResponseFormat::Text`].
    Auto,
}

impl ResponseFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseFormat::Json => "json",
            ResponseFormat::Text => "text",
            ResponseFormat::Auto => "auto",
        }
    }

    /// Resolves `Auto` against the response's declared content type.
    pub fn resolve(self, content_type: Option<&str>) -> ResponseFormat {
        match self {
            ResponseFormat::Auto => {
                let is_json = content_type
                    .and_then(|value| value.split(';').next())
                    .map(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
                    .unwrap_or(false);
                if is_json {
                    ResponseFormat::Json
                } else {
                    ResponseFormat::Text
                }
            }
            other => other,
        }
    }

    pub fn parse(self, response: &RawResponse) -> Result<ClassificationResult, ClassifyError> {
        match self.resolve(response.content_type.as_deref()) {
            ResponseFormat::Json => ClassificationResult::from_json(&response.body),
            _ => ClassificationResult::from_text(&response.body),
        }
    }
}

impl fmt::Display for ResponseFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResponseFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ResponseFormat::Json),
            "text" | "plain" => Ok(ResponseFormat::Text),
            "auto" => Ok(ResponseFormat::Auto),
            other => Err(format!(
                "unknown response format {other:?} (expected json, text or auto)"
            )),
        }
    }
}

/// A finished HTTP exchange as seen by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: None,
            body: body.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    pub label: String,
    pub payload: Option<Value>,
}

impl ClassificationResult {
    fn from_json(body: &str) -> Result<Self, ClassifyError> {
        let payload: Value = serde_json::from_str(body)
            .map_err(|err| ClassifyError::malformed(format!("invalid JSON: {err}")))?;
        let label = payload
            .get("lang")
            .and_then(Value::as_str)
            .ok_or_else(|| ClassifyError::malformed("missing string field `lang`"))?
            .to_string();
        Ok(Self {
            label,
            payload: Some(payload),
        })
    }

    fn from_text(body: &str) -> Result<Self, ClassifyError> {
        if body.is_empty() {
            return Err(ClassifyError::malformed("empty body"));
        }
        Ok(Self {
            label: body.to_string(),
            payload: None,
        })
    }
}

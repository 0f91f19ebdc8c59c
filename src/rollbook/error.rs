use crate::model::Field;
use serde_json::Value;
use thiserror::Error;

pub const UNKNOWN_ERROR_CODE: &str = "UNKNOWN_ERROR";
pub const VALIDATION_ERROR_CODE: &str = "VALIDATION_ERROR";
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred";

#[derive(Error, Debug)]
pub enum RollbookError {
    #[error("{0}")]
    Api(#[from] ApiError),

    #[error("{}: {message}", .field.label())]
    Validation { field: Field, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RollbookError {
    /// The message to put in front of a user.
    ///
    /// Server rejections and validation failures carry a message meant for people.
    /// Everything else falls back to `fallback` so transport details never leak into the UI.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            RollbookError::Api(api) => api.message.clone(),
            RollbookError::Validation { message, .. } => message.clone(),
            _ => fallback.to_string(),
        }
    }

    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            RollbookError::Api(api) => Some(api),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, RollbookError>;

/// The one error shape the UI sees for any non-2xx response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ApiError {
    pub message: String,
    pub code: String,
    pub field: Option<String>,
    pub status: u16,
}

impl ApiError {
    pub fn new(status: u16, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            field: None,
            status,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Normalizes an error response body.
    ///
    /// Accepted shapes:
    /// - nested: `{"detail": {"detail": "...", "code": "...", "field": "..."}}`
    /// - flat: `{"detail": "...", "code": "...", "field": "..."}`, where a missing
    ///   `code` means `VALIDATION_ERROR`
    /// - request validation: `{"detail": [{"loc": ["body", "email"], "msg": "..."}]}`
    ///
    /// Anything else, including a body that is not JSON, becomes `UNKNOWN_ERROR`.
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        let unknown = || Self::new(status, UNKNOWN_ERROR_CODE, UNEXPECTED_ERROR_MESSAGE);

        let Ok(json) = serde_json::from_slice::<Value>(body) else {
            return unknown();
        };

        match json.get("detail") {
            Some(Value::Object(inner)) => {
                let message = inner
                    .get("detail")
                    .and_then(Value::as_str)
                    .unwrap_or(UNEXPECTED_ERROR_MESSAGE);
                let code = inner
                    .get("code")
                    .and_then(Value::as_str)
                    .unwrap_or(UNKNOWN_ERROR_CODE);
                Self {
                    message: message.to_string(),
                    code: code.to_string(),
                    field: string_field(inner.get("field")),
                    status,
                }
            }
            Some(Value::String(detail)) => {
                let code = json
                    .get("code")
                    .and_then(Value::as_str)
                    .unwrap_or(VALIDATION_ERROR_CODE);
                Self {
                    message: detail.clone(),
                    code: code.to_string(),
                    field: string_field(json.get("field")),
                    status,
                }
            }
            Some(Value::Array(entries)) => match entries.first() {
                Some(first) => {
                    let message = first
                        .get("msg")
                        .and_then(Value::as_str)
                        .unwrap_or(UNEXPECTED_ERROR_MESSAGE);
                    let field = first
                        .get("loc")
                        .and_then(Value::as_array)
                        .and_then(|loc| loc.last())
                        .and_then(|segment| match segment {
                            Value::String(s) => Some(s.clone()),
                            Value::Number(n) => Some(n.to_string()),
                            _ => None,
                        });
                    Self {
                        message: message.to_string(),
                        code: VALIDATION_ERROR_CODE.to_string(),
                        field,
                        status,
                    }
                }
                None => unknown(),
            },
            _ => unknown(),
        }
    }

    /// The form field this error points at, when it names one.
    pub fn form_field(&self) -> Option<Field> {
        self.field.as_deref().and_then(Field::from_wire)
    }
}

fn string_field(value: Option<&Value>) -> Option<String> {
    value.and_then(Value::as_str).map(str::to_string)
}

//! # Outcome Envelope
//!
//! The notification a remote context broadcasts once its unit of work has
//! settled. On the wire it is a plain JSON object:
//!
//! ```text
//! { "token": "<correlation token>", "content": <value>?, "error": { ... }? }
//! ```
//!
//! Decoding turns it into a tagged [`RemoteOutcome`] so callers branch on a
//! variant instead of on field presence.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Wire field carrying the correlation token.
pub const TOKEN_FIELD: &str = "token";
/// Wire field carrying the resolved value.
pub const CONTENT_FIELD: &str = "content";
/// Wire field carrying the captured error record.
pub const ERROR_FIELD: &str = "error";

/// Plain record of an error thrown inside a remote context.
///
/// Only text crosses the context boundary, so this is a copy of the thrown
/// value's fields, not the value itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RemoteError {
    /// The error message.
    pub message: String,
    /// Legacy message arguments, when the engine provides them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Value>,
    /// Legacy error type tag, when the engine provides it.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Constructor name (`TypeError`, `Error`, ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Stack trace text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl RemoteError {
    /// Error record carrying only a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    /// Attach a constructor name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Attach stack text.
    #[must_use]
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    /// Lenient decode of whatever the remote context put in `error`.
    ///
    /// Objects are read field by field; any other value becomes the message.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(_) => serde_json::from_value(value.clone())
                .unwrap_or_else(|_| Self::new(value.to_string())),
            Value::String(s) => Self::new(s.clone()),
            other => Self::new(other.to_string()),
        }
    }
}

/// Result of a remote unit of work.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteOutcome {
    /// Resolved normally. `None` when the work returned nothing.
    Success(Option<Value>),
    /// Threw or rejected.
    Failure(RemoteError),
}

impl RemoteOutcome {
    /// Whether the remote work failed.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }
}

/// A decoded notification for one invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct OutcomeEnvelope {
    /// Correlation token of the invocation that produced it.
    pub token: String,
    /// What the unit of work did.
    pub outcome: RemoteOutcome,
}

impl OutcomeEnvelope {
    /// Successful envelope.
    pub fn success(token: impl Into<String>, content: Option<Value>) -> Self {
        Self {
            token: token.into(),
            outcome: RemoteOutcome::Success(content),
        }
    }

    /// Failed envelope.
    pub fn failure(token: impl Into<String>, error: RemoteError) -> Self {
        Self {
            token: token.into(),
            outcome: RemoteOutcome::Failure(error),
        }
    }

    /// Read the token of a raw notification without decoding the rest.
    ///
    /// Returns `None` for anything that is not shaped like an envelope.
    pub fn peek_token(value: &Value) -> Option<&str> {
        value.as_object()?.get(TOKEN_FIELD)?.as_str()
    }

    /// Decode a raw notification.
    ///
    /// Unrelated broadcast traffic is expected on the same channel, so a
    /// value that is not an envelope yields `None` rather than an error.
    /// A present, non-null `error` wins over `content`.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let token = obj.get(TOKEN_FIELD)?.as_str()?.to_owned();

        let outcome = match obj.get(ERROR_FIELD) {
            Some(error) if !error.is_null() => RemoteOutcome::Failure(RemoteError::from_value(error)),
            _ => RemoteOutcome::Success(obj.get(CONTENT_FIELD).filter(|c| !c.is_null()).cloned()),
        };

        Some(Self { token, outcome })
    }

    /// Encode to the wire shape.
    pub fn to_value(&self) -> Value {
        let mut obj = Map::new();
        obj.insert(TOKEN_FIELD.to_owned(), Value::String(self.token.clone()));
        match &self.outcome {
            RemoteOutcome::Success(Some(content)) => {
                obj.insert(CONTENT_FIELD.to_owned(), content.clone());
            }
            RemoteOutcome::Success(None) => {}
            RemoteOutcome::Failure(error) => {
                let error = serde_json::to_value(error)
                    .unwrap_or_else(|_| Value::String(error.message.clone()));
                obj.insert(ERROR_FIELD.to_owned(), error);
            }
        }
        Value::Object(obj)
    }
}

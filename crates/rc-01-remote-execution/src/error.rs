//! Error types for the Remote Execution subsystem
//!
//! Four kinds reach the caller: setup errors (raised before or during
//! injection, never through the broadcast channel), remote errors (thrown by
//! the unit of work and carried back in its envelope), timeouts, and a closed
//! channel.

use shared_types::{ExecutionTarget, HostError};
use thiserror::Error;

/// Remote execution errors
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// Code loaded from a file cannot be wrapped to report its outcome.
    #[error("File-based payload {file:?} is not supported: its outcome cannot be reported back")]
    FileBasedPayload { file: String },

    /// The unit of work is not a function, function source, or details with `code`.
    #[error("Invalid payload shape: {reason}")]
    InvalidPayloadShape { reason: String },

    /// An argument could not be encoded as a literal.
    #[error("Argument {index} could not be encoded: {reason}")]
    ArgumentEncoding { index: usize, reason: String },

    /// The host refused or failed the injection itself.
    #[error("Injection into {target} failed: {source}")]
    InjectionFailed {
        target: ExecutionTarget,
        #[source]
        source: HostError,
    },

    /// The unit of work threw inside the remote context.
    #[error("{}", describe_remote(.name, .message, .stack))]
    Remote {
        name: Option<String>,
        message: String,
        stack: Option<String>,
    },

    /// No matching notification arrived within the bound.
    #[error("Remote execution timed out after {elapsed_ms} ms")]
    TimedOut { elapsed_ms: u64 },

    /// The bus shut down while the invocation was pending.
    #[error("Broadcast channel closed before a result arrived")]
    ChannelClosed,

    /// The resolved value did not match the requested type.
    #[error("Could not decode remote result: {reason}")]
    ResultDecoding { reason: String },
}

impl ExecutionError {
    /// Whether this failure happened before the work could run remotely.
    pub fn is_setup_error(&self) -> bool {
        matches!(
            self,
            Self::FileBasedPayload { .. }
                | Self::InvalidPayloadShape { .. }
                | Self::ArgumentEncoding { .. }
                | Self::InjectionFailed { .. }
        )
    }

    /// Whether the bound elapsed without a result.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::TimedOut { .. })
    }

    pub(crate) fn invalid_shape(reason: impl Into<String>) -> Self {
        Self::InvalidPayloadShape {
            reason: reason.into(),
        }
    }
}

fn describe_remote(name: &Option<String>, message: &str, stack: &Option<String>) -> String {
    let mut text = match name {
        Some(name) => format!("Remote execution failed: {}: {}", name, message),
        None => format!("Remote execution failed: {}", message),
    };
    if let Some(stack) = stack.as_deref().filter(|s| !s.is_empty()) {
        text.push('\n');
        text.push_str(stack);
    }
    text
}

/// Result type for remote execution
pub type ExecutionResult<T> = Result<T, ExecutionError>;

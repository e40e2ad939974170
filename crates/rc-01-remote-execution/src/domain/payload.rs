//! Payload templating for the Invocation Wrapper.
//!
//! Rendering is a pure function of the work, the token and the already
//! encoded arguments, so it is tested without any host.
//!
//! ## Encoding contract
//!
//! - The token and every argument are emitted as JSON literals.
//! - U+2028 and U+2029 are escaped, so each literal is also valid script
//!   source.
//! - The token is declared on one marker line, `const __rcToken = "<token>";`,
//!   which [`embedded_token`] reads back.
//!
//! ## Shape of the generated code
//!
//! ```text
//! (async () => {
//!   const __rcToken = "…";
//!   const __rcEnvelope = { token: __rcToken };
//!   try {
//!     __rcEnvelope.content = await (
//! <work>
//!     )(<args>);
//!   } catch (__rcErr) {
//!     try {
//!       __rcEnvelope.error = { message, arguments, type, name, stack };
//!     } catch (_) {
//!       __rcEnvelope.error = { message: "remote error could not be read" };
//!     }
//!   } finally {
//!     <broadcast>(__rcEnvelope);
//!   }
//! })();
//! ```
//!
//! The broadcast runs from `finally`, so success, failure and an empty
//! return all emit exactly one envelope. Once the outer `catch` is entered
//! `error` is always set, even when reading the thrown value throws again.
//! The work sits on its own lines so a trailing `//` comment cannot swallow
//! the call.

use crate::domain::correlation::CorrelationToken;
use crate::domain::work::{RunAt, UnitOfWork};
use crate::error::{ExecutionError, ExecutionResult};
use serde::Serialize;

/// Host function that sends a one-way message from inside a remote context.
pub const DEFAULT_BROADCAST_FUNCTION: &str = "chrome.runtime.sendMessage";

const TOKEN_MARKER: &str = "const __rcToken = ";

/// Message reported when the thrown value cannot be copied into the envelope.
pub const UNREADABLE_ERROR_MESSAGE: &str = "remote error could not be read";

/// Argument already encoded as literal text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedArg(String);

impl EncodedArg {
    /// Encode `value` as a script-safe JSON literal.
    ///
    /// `index` is only used to name the argument in the error.
    pub fn encode<T: Serialize + ?Sized>(index: usize, value: &T) -> ExecutionResult<Self> {
        serde_json::to_string(value)
            .map(|json| Self(script_safe(json)))
            .map_err(|e| ExecutionError::ArgumentEncoding {
                index,
                reason: e.to_string(),
            })
    }

    /// The literal text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Code ready for the injection primitive, plus its injection options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectionPayload {
    /// Self-contained script text.
    pub code: String,
    /// Inject into every frame.
    pub all_frames: bool,
    /// Load phase to run at.
    pub run_at: Option<RunAt>,
}

/// Renders wrapped payloads for a given host broadcast function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadTemplate {
    broadcast_function: String,
}

impl PayloadTemplate {
    /// Template that reports through `broadcast_function`.
    pub fn new(broadcast_function: impl Into<String>) -> Self {
        Self {
            broadcast_function: broadcast_function.into(),
        }
    }

    /// The broadcast function this template calls.
    pub fn broadcast_function(&self) -> &str {
        &self.broadcast_function
    }

    /// Render the payload for `work`, correlated by `token`.
    pub fn render(
        &self,
        work: &UnitOfWork,
        token: &CorrelationToken,
        args: &[EncodedArg],
    ) -> ExecutionResult<InjectionPayload> {
        let source = work.function_source()?;
        let token_literal = EncodedArg::encode(0, token.as_str())?;
        let args = args
            .iter()
            .map(EncodedArg::as_str)
            .collect::<Vec<_>>()
            .join(", ");

        let code = format!(
            concat!(
                "(async () => {{\n",
                "  {marker}{token};\n",
                "  const __rcEnvelope = {{ token: __rcToken }};\n",
                "  try {{\n",
                "    __rcEnvelope.content = await (\n{source}\n    )({args});\n",
                "  }} catch (__rcErr) {{\n",
                "    try {{\n",
                "      const __rcE = (__rcErr !== null && typeof __rcErr === \"object\") ? __rcErr : {{ message: String(__rcErr) }};\n",
                "      __rcEnvelope.error = {{\n",
                "        message: String(__rcE.message),\n",
                "        arguments: __rcE.arguments,\n",
                "        type: __rcE.type,\n",
                "        name: __rcE.name,\n",
                "        stack: __rcE.stack,\n",
                "      }};\n",
                "    }} catch (_) {{\n",
                "      __rcEnvelope.error = {{ message: \"{unreadable}\" }};\n",
                "    }}\n",
                "  }} finally {{\n",
                "    {broadcast}(__rcEnvelope);\n",
                "  }}\n",
                "}})();\n",
            ),
            marker = TOKEN_MARKER,
            token = token_literal.as_str(),
            source = source,
            args = args,
            broadcast = self.broadcast_function,
            unreadable = UNREADABLE_ERROR_MESSAGE,
        );

        Ok(InjectionPayload {
            code,
            all_frames: work.all_frames(),
            run_at: work.run_at(),
        })
    }
}

impl Default for PayloadTemplate {
    fn default() -> Self {
        Self::new(DEFAULT_BROADCAST_FUNCTION)
    }
}

/// Render with the default broadcast function.
pub fn build_payload(
    work: &UnitOfWork,
    token: &CorrelationToken,
    args: &[EncodedArg],
) -> ExecutionResult<InjectionPayload> {
    PayloadTemplate::default().render(work, token, args)
}

/// Recover the correlation token declared by a rendered payload.
pub fn embedded_token(code: &str) -> Option<String> {
    code.lines().find_map(|line| {
        let literal = line.trim().strip_prefix(TOKEN_MARKER)?.strip_suffix(';')?;
        serde_json::from_str::<String>(literal).ok()
    })
}

fn script_safe(json: String) -> String {
    if json.contains(['\u{2028}', '\u{2029}']) {
        json.replace('\u{2028}', "\\u2028").replace('\u{2029}', "\\u2029")
    } else {
        json
    }
}

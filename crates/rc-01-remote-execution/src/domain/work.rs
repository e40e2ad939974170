//! Units of work that can be sent to a remote context.
//!
//! Three shapes are accepted: a structured function definition, raw function
//! source, or injection details carrying `code`. Details carrying `file` are
//! refused because file-loaded code cannot be wrapped.

use crate::error::{ExecutionError, ExecutionResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// When the host should run injected code relative to document load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunAt {
    DocumentStart,
    DocumentEnd,
    DocumentIdle,
}

/// Injection details in the host's configuration-object form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct ScriptDetails {
    /// Function source to run.
    pub code: Option<String>,
    /// Script file to load instead of inline code. Always rejected.
    pub file: Option<String>,
    /// Inject into every frame of the target.
    pub all_frames: bool,
    /// Load phase to run at.
    pub run_at: Option<RunAt>,
}

impl ScriptDetails {
    /// Details that run `code`.
    pub fn code(code: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            ..Self::default()
        }
    }
}

/// A function definition assembled from parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFunction {
    name: Option<String>,
    params: Vec<String>,
    body: String,
}

impl RemoteFunction {
    /// Anonymous function with the given body.
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            name: None,
            params: Vec::new(),
            body: body.into(),
        }
    }

    /// Give the function a name (shows up in remote stack traces).
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Declare a parameter.
    #[must_use]
    pub fn param(mut self, param: impl Into<String>) -> Self {
        self.params.push(param.into());
        self
    }

    /// Render as an async function expression.
    pub fn render(&self) -> ExecutionResult<String> {
        if let Some(name) = &self.name {
            ensure_identifier(name, "function name")?;
        }
        for param in &self.params {
            ensure_identifier(param, "parameter")?;
        }
        if self.body.trim().is_empty() {
            return Err(ExecutionError::invalid_shape("function body is empty"));
        }

        Ok(format!(
            "async function {}({}) {{\n{}\n}}",
            self.name.as_deref().unwrap_or(""),
            self.params.join(", "),
            self.body
        ))
    }
}

fn ensure_identifier(ident: &str, what: &str) -> ExecutionResult<()> {
    let mut chars = ident.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$');
    let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');

    if valid_start && valid_rest {
        Ok(())
    } else {
        Err(ExecutionError::invalid_shape(format!(
            "{} {:?} is not a valid identifier",
            what, ident
        )))
    }
}

/// What to run remotely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitOfWork {
    /// A structured function definition.
    Function(RemoteFunction),
    /// Source text of a function expression.
    Source(String),
    /// Host injection details; `code` holds function source.
    Details(ScriptDetails),
}

impl UnitOfWork {
    /// Function source text to wrap, validating the shape.
    pub fn function_source(&self) -> ExecutionResult<String> {
        match self {
            Self::Function(function) => function.render(),
            Self::Source(source) => non_empty_source(source),
            Self::Details(details) => {
                if let Some(file) = &details.file {
                    return Err(ExecutionError::FileBasedPayload { file: file.clone() });
                }
                match &details.code {
                    Some(code) => non_empty_source(code),
                    None => Err(ExecutionError::invalid_shape(
                        "injection details carry neither code nor file",
                    )),
                }
            }
        }
    }

    /// Whether the payload should be injected into every frame.
    pub fn all_frames(&self) -> bool {
        matches!(self, Self::Details(details) if details.all_frames)
    }

    /// Requested load phase, if any.
    pub fn run_at(&self) -> Option<RunAt> {
        match self {
            Self::Details(details) => details.run_at,
            _ => None,
        }
    }
}

/// Trimmed source with at most one trailing `;` removed, since the text is
/// wrapped as an expression.
fn non_empty_source(source: &str) -> ExecutionResult<String> {
    let trimmed = source.trim();
    let trimmed = trimmed.strip_suffix(';').unwrap_or(trimmed).trim_end();
    if trimmed.is_empty() {
        Err(ExecutionError::invalid_shape("function source is empty"))
    } else {
        Ok(trimmed.to_owned())
    }
}

impl From<RemoteFunction> for UnitOfWork {
    fn from(function: RemoteFunction) -> Self {
        Self::Function(function)
    }
}

impl From<ScriptDetails> for UnitOfWork {
    fn from(details: ScriptDetails) -> Self {
        Self::Details(details)
    }
}

impl From<&str> for UnitOfWork {
    fn from(source: &str) -> Self {
        Self::Source(source.to_owned())
    }
}

impl From<String> for UnitOfWork {
    fn from(source: String) -> Self {
        Self::Source(source)
    }
}

/// Accept a dynamically shaped unit of work.
///
/// A string is function source; an object is injection details. An object
/// naming a `file` is refused outright, anything else without `code` is an
/// invalid shape.
impl TryFrom<Value> for UnitOfWork {
    type Error = ExecutionError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(source) => Ok(Self::Source(source)),
            Value::Object(ref obj) => {
                if let Some(file) = obj.get("file").filter(|f| !f.is_null()) {
                    let file = file
                        .as_str()
                        .map_or_else(|| file.to_string(), str::to_owned);
                    return Err(ExecutionError::FileBasedPayload { file });
                }
                if !obj.get("code").is_some_and(Value::is_string) {
                    return Err(ExecutionError::invalid_shape(
                        "object payload must carry a string `code` field",
                    ));
                }
                serde_json::from_value::<ScriptDetails>(value)
                    .map(Self::Details)
                    .map_err(|e| ExecutionError::invalid_shape(e.to_string()))
            }
            other => Err(ExecutionError::invalid_shape(format!(
                "expected function source or details object, got {}",
                json_kind(&other)
            ))),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

//! Domain types for Remote Execution.
//!
//! Pure parts only: the token, the accepted work shapes and payload
//! templating. Nothing here touches the bus or the host.

pub mod correlation;
pub mod payload;
pub mod work;

pub use correlation::CorrelationToken;
pub use payload::{
    build_payload, embedded_token, EncodedArg, InjectionPayload, PayloadTemplate,
    DEFAULT_BROADCAST_FUNCTION,
};
pub use work::{RemoteFunction, RunAt, ScriptDetails, UnitOfWork};

//! Structured log helpers.
//!
//! Every line carries a `component` field naming the part of the bridge that
//! wrote it, so JSON output can be filtered per component.

/// Helper to create structured log entries with consistent formatting.
#[macro_export]
macro_rules! log_event {
    // Info level with component
    (info, $component:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::info!(
            component = $component,
            $($($field)*,)?
            $msg
        )
    };

    // Warn level with component
    (warn, $component:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::warn!(
            component = $component,
            $($($field)*,)?
            $msg
        )
    };

    // Error level with component
    (error, $component:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::error!(
            component = $component,
            $($($field)*,)?
            $msg
        )
    };

    // Debug level with component
    (debug, $component:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::debug!(
            component = $component,
            $($($field)*,)?
            $msg
        )
    };
}

/// Log an event about one execution target.
#[macro_export]
macro_rules! log_target_event {
    ($level:ident, $component:expr, $msg:expr, $target:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            component = $component,
            target_id = %$target,
            $($($field)*,)?
            $msg
        )
    };
}

/// Log an event about one hosted resource.
#[macro_export]
macro_rules! log_resource_event {
    ($level:ident, $component:expr, $msg:expr, $resource:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            component = $component,
            resource = %$resource,
            $($($field)*,)?
            $msg
        )
    };
}

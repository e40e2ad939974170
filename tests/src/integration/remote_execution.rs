//! # Remote Execution Flows
//!
//! `execute_remote` end to end: payload rendering, injection into the
//! simulated host, the envelope coming back over the shared bus, and the
//! race against the timeout.

#[cfg(test)]
mod tests {
    use super::super::{runtime, runtime_with};
    use async_trait::async_trait;
    use bridge_runtime::{BridgeConfig, ScriptPlan};
    use rc_01_remote_execution::{
        embedded_token, runtime_message_filter, ExecutionConfig, ExecutionError, InjectionPayload,
        RemoteCall, RemoteExecutionApi, RemoteExecutionService, RemoteFunction, ScriptDetails,
        ScriptInjector,
    };
    use serde_json::json;
    use shared_bus::{EventFilter, EventPublisher, HostEvent, InMemoryEventBus};
    use shared_types::{ExecutionTarget, HostResult, OutcomeEnvelope, RemoteError};
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::task::JoinSet;
    use tokio::time::{timeout, Instant};

    const TAB: ExecutionTarget = ExecutionTarget(1);
    const OTHER_TAB: ExecutionTarget = ExecutionTarget(2);

    /// Count envelopes tagged `token` seen by `observer` so far.
    fn envelopes_for(observer: &mut shared_bus::Subscription, token: &str) -> usize {
        let mut count = 0;
        while let Ok(Some(event)) = observer.try_recv() {
            if let HostEvent::RuntimeMessage { payload, .. } = event {
                if OutcomeEnvelope::peek_token(&payload) == Some(token) {
                    count += 1;
                }
            }
        }
        count
    }

    // =============================================================================
    // RESOLVE / THROW
    // =============================================================================

    #[tokio::test]
    async fn test_resolves_with_value_and_one_notification() {
        let runtime = runtime();
        runtime
            .host()
            .on_target(TAB, ScriptPlan::resolve(json!({ "title": "Example Domain" })));
        let mut observer = runtime.bus().subscribe(EventFilter::all());

        let call = RemoteCall::new(RemoteFunction::new("return { title: document.title };"));
        let value = runtime.execute_remote(TAB, call).await.unwrap();

        assert_eq!(value, json!({ "title": "Example Domain" }));

        let injected = runtime.host().injected();
        assert_eq!(injected.len(), 1);
        let token = embedded_token(&injected[0].payload.code).unwrap();
        assert_eq!(envelopes_for(&mut observer, &token), 1);
    }

    #[tokio::test]
    async fn test_undefined_result_is_null() {
        let runtime = runtime();
        runtime.host().on_target(TAB, ScriptPlan::resolve_undefined());

        let value = runtime
            .execute_remote(TAB, RemoteCall::new("() => { console.log('side effect'); }"))
            .await
            .unwrap();
        assert_eq!(value, serde_json::Value::Null);
    }

    #[tokio::test]
    async fn test_throw_rejects_with_original_message() {
        let runtime = runtime();
        runtime.host().on_target(
            TAB,
            ScriptPlan::throw(
                RemoteError::new("Cannot read properties of null (reading 'click')")
                    .with_name("TypeError")
                    .with_stack("TypeError: Cannot read properties of null\n    at <anonymous>:4:9"),
            ),
        );

        let err = runtime
            .execute_remote(TAB, RemoteCall::new("() => document.querySelector('#x').click()"))
            .await
            .unwrap_err();

        assert!(matches!(err, ExecutionError::Remote { .. }));
        let text = err.to_string();
        assert!(text.contains("Cannot read properties of null (reading 'click')"));
        assert!(text.contains("at <anonymous>:4:9"));
        assert!(!err.is_setup_error());
    }

    #[tokio::test]
    async fn test_arguments_reach_payload_as_literals() {
        let runtime = runtime();
        runtime.host().on_target(TAB, ScriptPlan::resolve(json!(3)));

        let call = RemoteCall::new("(sel, opts) => document.querySelectorAll(sel).length")
            .arg("a[href^=\"http\"]")
            .unwrap()
            .arg(&json!({ "visible": true }))
            .unwrap();
        let count: usize = runtime.execute_remote_as(TAB, call).await.unwrap();

        assert_eq!(count, 3);
        let code = &runtime.host().injected()[0].payload.code;
        assert!(code.contains(r#"("a[href^=\"http\"]", {"visible":true})"#));
    }

    // =============================================================================
    // LISTENER CLEANUP
    // =============================================================================

    #[tokio::test]
    async fn test_listener_deregistered_after_settling() {
        let runtime = runtime();
        runtime.host().on_target(TAB, ScriptPlan::resolve(json!("once")));

        let value = runtime
            .execute_remote(TAB, RemoteCall::new("() => 'once'"))
            .await
            .unwrap();
        assert_eq!(value, json!("once"));
        assert_eq!(runtime.bus().active_subscriptions(&runtime_message_filter()), 0);
        assert_eq!(runtime.bus().subscriber_count(), 0);

        // A late duplicate for the same token finds nobody listening
        let token = embedded_token(&runtime.host().injected()[0].payload.code).unwrap();
        let receivers = runtime
            .bus()
            .publish(HostEvent::RuntimeMessage {
                sender: Some(TAB),
                payload: OutcomeEnvelope::success(token, Some(json!("again"))).to_value(),
            })
            .await;
        assert_eq!(receivers, 0);
        assert_eq!(runtime.execution().stats().in_flight(), 0);
    }

    #[tokio::test]
    async fn test_injection_failure_is_immediate_and_clean() {
        let runtime = runtime();
        runtime
            .host()
            .on_target(TAB, ScriptPlan::reject_injection("Frame with ID 0 was removed"));

        let err = runtime
            .execute_remote(TAB, RemoteCall::new("() => 1"))
            .await
            .unwrap_err();
        assert!(matches!(err, ExecutionError::InjectionFailed { target: TAB, .. }));
        assert!(err.is_setup_error());
        assert_eq!(runtime.bus().subscriber_count(), 0);

        let err = runtime
            .execute_remote(OTHER_TAB, RemoteCall::new("() => 1"))
            .await
            .unwrap_err();
        assert!(matches!(err, ExecutionError::InjectionFailed { target: OTHER_TAB, .. }));
    }

    // =============================================================================
    // TIMEOUTS
    // =============================================================================

    #[tokio::test(start_paused = true)]
    async fn test_silent_work_times_out_after_bound() {
        let runtime = runtime();
        runtime.host().on_target(TAB, ScriptPlan::silent());

        let started = Instant::now();
        let err = runtime
            .execute_remote(
                TAB,
                RemoteCall::new("() => new Promise(() => {})").timeout(Duration::from_millis(500)),
            )
            .await
            .unwrap_err();
        let elapsed = started.elapsed();

        assert!(matches!(err, ExecutionError::TimedOut { elapsed_ms: 500 }));
        assert!(err.to_string().contains("500 ms"));
        assert!(elapsed >= Duration::from_millis(500));
        assert!(elapsed < Duration::from_millis(550));
        assert_eq!(runtime.bus().subscriber_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_timeout_uses_default() {
        let config = BridgeConfig {
            execution: ExecutionConfig {
                default_timeout_ms: 2_000,
                ..ExecutionConfig::default()
            },
            ..BridgeConfig::default()
        };
        let runtime = runtime_with(config);
        runtime.host().on_target(TAB, ScriptPlan::silent());

        let started = Instant::now();
        let err = runtime
            .execute_remote(TAB, RemoteCall::new("() => 1").timeout(Duration::ZERO))
            .await
            .unwrap_err();

        assert!(matches!(err, ExecutionError::TimedOut { elapsed_ms: 2_000 }));
        assert!(started.elapsed() >= Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_result_beats_longer_timeout() {
        let runtime = runtime();
        runtime.host().on_target(
            TAB,
            ScriptPlan::resolve(json!("slow")).after(Duration::from_millis(900)),
        );

        let value = runtime
            .execute_remote(TAB, RemoteCall::new("() => 'slow'").timeout(Duration::from_secs(1)))
            .await
            .unwrap();
        assert_eq!(value, json!("slow"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_result_after_timeout_is_ignored() {
        let runtime = runtime();
        runtime.host().on_target(
            TAB,
            ScriptPlan::resolve(json!("late")).after(Duration::from_secs(3)),
        );

        let err = runtime
            .execute_remote(TAB, RemoteCall::new("() => 'late'").timeout(Duration::from_secs(1)))
            .await
            .unwrap_err();
        assert!(err.is_timeout());

        // Let the late envelope go out; nobody is left to receive it
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(runtime.bus().subscriber_count(), 0);
        assert_eq!(
            runtime.execution().stats().total_timeouts.load(Ordering::Relaxed),
            1
        );
    }

    // =============================================================================
    // PAYLOAD SHAPES
    // =============================================================================

    #[tokio::test]
    async fn test_file_payload_rejected_without_injection() {
        let runtime = runtime();
        runtime.host().on_target(TAB, ScriptPlan::resolve(json!(1)));

        let err = runtime
            .execute_remote(
                TAB,
                RemoteCall::new(ScriptDetails {
                    file: Some("x.js".into()),
                    ..ScriptDetails::default()
                }),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ExecutionError::FileBasedPayload { ref file } if file == "x.js"));

        // The dynamic form is refused before a call even exists
        let err = RemoteCall::from_value(json!({ "file": "x.js" })).unwrap_err();
        assert!(matches!(err, ExecutionError::FileBasedPayload { .. }));

        assert_eq!(runtime.host().injection_count(), 0);
        assert_eq!(runtime.bus().subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_details_with_code_accepted() {
        let runtime = runtime();
        runtime.host().on_target(TAB, ScriptPlan::resolve(json!("ok")));

        let call = RemoteCall::from_value(json!({ "code": "() => 'ok'", "allFrames": true })).unwrap();
        let value = runtime.execute_remote(TAB, call).await.unwrap();

        assert_eq!(value, json!("ok"));
        assert!(runtime.host().injected()[0].payload.all_frames);
    }

    #[tokio::test]
    async fn test_other_shapes_rejected() {
        for shape in [json!(17), json!(null), json!({ "allFrames": true })] {
            let err = RemoteCall::from_value(shape).unwrap_err();
            assert!(matches!(err, ExecutionError::InvalidPayloadShape { .. }));
        }
    }

    // =============================================================================
    // CONCURRENCY
    // =============================================================================

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_calls_do_not_cross_talk() {
        let runtime = runtime();
        // The first call reports last, so the envelopes interleave
        runtime.host().on_target(
            TAB,
            ScriptPlan::resolve(json!("from tab 1")).after(Duration::from_millis(300)),
        );
        runtime.host().on_target(
            OTHER_TAB,
            ScriptPlan::resolve(json!("from tab 2")).after(Duration::from_millis(100)),
        );

        let (first, second) = tokio::join!(
            runtime.execute_remote(TAB, RemoteCall::new("() => 1")),
            runtime.execute_remote(OTHER_TAB, RemoteCall::new("() => 2")),
        );

        assert_eq!(first.unwrap(), json!("from tab 1"));
        assert_eq!(second.unwrap(), json!("from tab 2"));

        let tokens: Vec<_> = runtime
            .host()
            .injected()
            .iter()
            .filter_map(|record| embedded_token(&record.payload.code))
            .collect();
        assert_eq!(tokens.len(), 2);
        assert_ne!(tokens[0], tokens[1]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_many_calls_same_target() {
        let runtime = Arc::new(runtime());
        runtime.host().on_target(
            TAB,
            ScriptPlan::resolve(json!("same")).after(Duration::from_millis(10)),
        );

        let mut calls = JoinSet::new();
        for _ in 0..16 {
            let runtime = runtime.clone();
            calls.spawn(async move {
                runtime
                    .execute_remote(TAB, RemoteCall::new("() => 'same'"))
                    .await
            });
        }
        while let Some(joined) = calls.join_next().await {
            assert_eq!(joined.unwrap().unwrap(), json!("same"));
        }

        let stats = runtime.execution().stats();
        assert_eq!(stats.total_succeeded.load(Ordering::Relaxed), 16);
        assert_eq!(stats.in_flight(), 0);
        assert_eq!(runtime.bus().subscriber_count(), 0);
    }

    // =============================================================================
    // ORDERING
    // =============================================================================

    /// Reports the outcome before its injection call even returns.
    struct EagerHost {
        bus: Arc<InMemoryEventBus>,
    }

    #[async_trait]
    impl ScriptInjector for EagerHost {
        async fn inject(&self, target: ExecutionTarget, payload: &InjectionPayload) -> HostResult<()> {
            if let Some(token) = embedded_token(&payload.code) {
                self.bus
                    .publish(HostEvent::RuntimeMessage {
                        sender: Some(target),
                        payload: OutcomeEnvelope::success(token, Some(json!("eager"))).to_value(),
                    })
                    .await;
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_listener_registered_before_injection() {
        let bus = Arc::new(InMemoryEventBus::new());
        let service = RemoteExecutionService::new(
            ExecutionConfig::default(),
            bus.clone(),
            Arc::new(EagerHost { bus: bus.clone() }),
        );

        let value = timeout(
            Duration::from_secs(1),
            service.execute_remote(TAB, RemoteCall::new("() => 'eager'")),
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(value, json!("eager"));
    }
}

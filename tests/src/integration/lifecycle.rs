//! # Lifecycle Wait Flows
//!
//! `create_and_wait` and `reload_and_wait` against the simulated host,
//! which replays planned lifecycle steps on the shared bus.

#[cfg(test)]
mod tests {
    use super::super::{init_test_logging, runtime};
    use bridge_runtime::LifecyclePlan;
    use rc_02_lifecycle_wait::LifecycleError;
    use shared_types::{
        CreateProperties, HostError, ReloadProperties, ResourceId, ResourceInfo, ResourceStatus,
    };
    use std::sync::atomic::Ordering;
    use std::time::Duration;
    use tokio::time::Instant;

    fn existing(id: u64) -> ResourceInfo {
        let mut info = ResourceInfo::new(ResourceId(id)).with_status(ResourceStatus::Complete);
        info.url = Some(format!("https://example.org/{id}"));
        info
    }

    // =============================================================================
    // CREATE AND WAIT
    // =============================================================================

    #[tokio::test(start_paused = true)]
    async fn test_create_and_wait_completes() {
        init_test_logging();
        let runtime = runtime();
        runtime.host().plan_next_create(
            LifecyclePlan::new()
                .progress(Duration::ZERO, ResourceStatus::Loading)
                .progress(Duration::from_millis(150), ResourceStatus::Loading)
                .progress(Duration::from_millis(150), ResourceStatus::Complete),
        );

        let started = Instant::now();
        let loaded = runtime
            .create_and_wait(CreateProperties::with_url("https://example.org"), None)
            .await
            .unwrap();

        assert_eq!(loaded.id, ResourceId(1));
        assert_eq!(loaded.status, ResourceStatus::Complete);
        assert_eq!(loaded.resource.status, ResourceStatus::Complete);
        assert_eq!(loaded.resource.url.as_deref(), Some("https://example.org"));
        assert!(started.elapsed() >= Duration::from_millis(300));
        assert_eq!(runtime.bus().subscriber_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_destroyed_rejects_before_timeout() {
        let runtime = runtime();
        runtime
            .host()
            .plan_next_create(LifecyclePlan::new().remove(Duration::from_millis(200)));

        let started = Instant::now();
        let err = runtime
            .create_and_wait(CreateProperties::default(), Some(Duration::from_secs(30)))
            .await
            .unwrap_err();

        assert!(matches!(err, LifecycleError::Removed { id: ResourceId(1) }));
        assert!(err.to_string().contains("removed"));
        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(runtime.host().resource(ResourceId(1)).is_none());
        assert_eq!(runtime.bus().subscriber_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_never_loads_times_out() {
        let runtime = runtime();
        runtime.host().plan_next_create(
            LifecyclePlan::new().progress(Duration::ZERO, ResourceStatus::Loading),
        );

        let started = Instant::now();
        let err = runtime
            .create_and_wait(CreateProperties::default(), Some(Duration::from_millis(750)))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            LifecycleError::TimedOut {
                id: ResourceId(1),
                elapsed_ms: 750
            }
        ));
        assert!(started.elapsed() >= Duration::from_millis(750));
        assert!(started.elapsed() < Duration::from_millis(800));
        assert_eq!(runtime.lifecycle().stats().total_timeouts.load(Ordering::Relaxed), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_refused_starts_no_wait() {
        let runtime = runtime();
        runtime.host().refuse_creates("too many windows");

        let err = runtime
            .create_and_wait(CreateProperties::default(), None)
            .await
            .unwrap_err();

        assert!(err.is_setup_error());
        assert!(matches!(
            err,
            LifecycleError::CreateFailed {
                source: HostError::Rejected { ref reason, .. }
            } if reason == "too many windows"
        ));
        assert_eq!(runtime.bus().subscriber_count(), 0);
        assert_eq!(runtime.lifecycle().stats().in_flight(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_creates_settle_independently() {
        let runtime = runtime();
        runtime
            .host()
            .plan_next_create(LifecyclePlan::loads_after(Duration::from_millis(400)));
        runtime
            .host()
            .plan_next_create(LifecyclePlan::new().remove(Duration::from_millis(100)));

        let (first, second) = tokio::join!(
            runtime.create_and_wait(CreateProperties::with_url("https://a.example"), None),
            runtime.create_and_wait(CreateProperties::with_url("https://b.example"), None),
        );

        let first = first.unwrap();
        assert_eq!(first.id, ResourceId(1));
        assert_eq!(first.resource.url.as_deref(), Some("https://a.example"));
        assert!(matches!(
            second.unwrap_err(),
            LifecycleError::Removed { id: ResourceId(2) }
        ));
    }

    // =============================================================================
    // RELOAD AND WAIT
    // =============================================================================

    #[tokio::test(start_paused = true)]
    async fn test_reload_and_wait_completes() {
        let runtime = runtime();
        runtime.host().add_resource(existing(7));
        runtime
            .host()
            .plan_reload(ResourceId(7), LifecyclePlan::loads_after(Duration::from_millis(250)));

        let loaded = runtime
            .reload_and_wait(
                ResourceId(7),
                Some(ReloadProperties { bypass_cache: true }),
                None,
            )
            .await
            .unwrap();

        assert_eq!(loaded.id, ResourceId(7));
        assert_eq!(loaded.status, ResourceStatus::Complete);
        assert_eq!(loaded.resource.url.as_deref(), Some("https://example.org/7"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reload_superseded_names_replacement() {
        let runtime = runtime();
        runtime.host().add_resource(existing(7));
        runtime.host().plan_reload(
            ResourceId(7),
            LifecyclePlan::new()
                .progress(Duration::ZERO, ResourceStatus::Loading)
                .replace(Duration::from_millis(50), ResourceId(9))
                .progress(Duration::from_millis(50), ResourceStatus::Complete),
        );

        let err = runtime
            .reload_and_wait(ResourceId(7), None, Some(Duration::from_secs(5)))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            LifecycleError::Replaced {
                id: ResourceId(7),
                replacement: ResourceId(9)
            }
        ));
        assert!(err.to_string().contains("replaced"));
        assert!(runtime.host().resource(ResourceId(9)).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reload_ignores_other_resources() {
        let runtime = runtime();
        runtime.host().add_resource(existing(3));
        runtime.host().plan_reload(
            ResourceId(3),
            LifecyclePlan::new().progress(Duration::ZERO, ResourceStatus::Loading),
        );
        // Another resource finishing must not settle the reload
        runtime
            .host()
            .plan_next_create(LifecyclePlan::loads_after(Duration::from_millis(20)));

        let (reloaded, created) = tokio::join!(
            runtime.reload_and_wait(ResourceId(3), None, Some(Duration::from_millis(500))),
            runtime.create_and_wait(CreateProperties::default(), None),
        );

        assert_eq!(created.unwrap().id, ResourceId(4));
        assert!(matches!(
            reloaded.unwrap_err(),
            LifecycleError::TimedOut {
                id: ResourceId(3),
                ..
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reload_unknown_resource_fails_fast() {
        let runtime = runtime();

        let err = runtime
            .reload_and_wait(ResourceId(42), None, None)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            LifecycleError::ReloadFailed {
                id: ResourceId(42),
                source: HostError::UnknownResource(ResourceId(42))
            }
        ));
        assert_eq!(err.resource_id(), Some(ResourceId(42)));
        assert_eq!(runtime.bus().subscriber_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_timeout_uses_default() {
        let runtime = runtime();
        runtime
            .host()
            .set_default_plan(LifecyclePlan::new().progress(Duration::ZERO, ResourceStatus::Loading));

        let started = Instant::now();
        let err = runtime
            .create_and_wait(CreateProperties::default(), Some(Duration::ZERO))
            .await
            .unwrap_err();

        let bound = runtime.config().lifecycle.default_timeout_ms;
        assert!(matches!(err, LifecycleError::TimedOut { elapsed_ms, .. } if elapsed_ms == bound));
        assert!(started.elapsed() >= Duration::from_millis(bound));
    }
}

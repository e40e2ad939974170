//! # Simulated Host
//!
//! In-process stand-in for the host environment. Implements both outbound
//! ports against the shared bus:
//!
//! - **Script injection**: each target has a [`ScriptPlan`] saying how the
//!   injected work "behaves". The correlation token is read back out of the
//!   payload and the matching envelope is broadcast after the plan's delay.
//! - **Resources**: creations and reloads replay a [`LifecyclePlan`] of
//!   delayed progression, removal or replacement events.
//!
//! Emission is scheduled with `tokio::spawn` and `tokio::time::sleep`, so it
//! behaves the same under paused test time.

use async_trait::async_trait;
use bridge_telemetry::{log_resource_event, log_target_event};
use parking_lot::Mutex;
use rc_01_remote_execution::{embedded_token, InjectionPayload, ScriptInjector};
use rc_02_lifecycle_wait::ResourceHost;
use shared_bus::{EventPublisher, HostEvent, InMemoryEventBus};
use shared_types::{
    CreateProperties, ExecutionTarget, HostError, HostResult, OutcomeEnvelope, ReloadProperties,
    RemoteError, ResourceId, ResourceInfo, ResourceStatus,
};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

const COMPONENT: &str = "simulated-host";

/// What the injected work does once it runs.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptBehaviour {
    /// Resolve with a value.
    Resolve(serde_json::Value),
    /// Resolve without returning anything.
    ResolveUndefined,
    /// Throw.
    Throw(RemoteError),
    /// Never report back.
    Silent,
    /// The injection primitive itself refuses.
    RejectInjection(String),
}

/// Behaviour of one target plus the delay before it reports.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptPlan {
    pub behaviour: ScriptBehaviour,
    pub delay: Duration,
}

impl ScriptPlan {
    pub fn resolve(value: serde_json::Value) -> Self {
        Self::immediate(ScriptBehaviour::Resolve(value))
    }

    pub fn resolve_undefined() -> Self {
        Self::immediate(ScriptBehaviour::ResolveUndefined)
    }

    pub fn throw(error: RemoteError) -> Self {
        Self::immediate(ScriptBehaviour::Throw(error))
    }

    pub fn silent() -> Self {
        Self::immediate(ScriptBehaviour::Silent)
    }

    pub fn reject_injection(reason: impl Into<String>) -> Self {
        Self::immediate(ScriptBehaviour::RejectInjection(reason.into()))
    }

    /// Report after `delay` instead of right away.
    #[must_use]
    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn immediate(behaviour: ScriptBehaviour) -> Self {
        Self {
            behaviour,
            delay: Duration::ZERO,
        }
    }

    fn envelope(&self, token: &str) -> Option<OutcomeEnvelope> {
        match &self.behaviour {
            ScriptBehaviour::Resolve(value) => {
                Some(OutcomeEnvelope::success(token, Some(value.clone())))
            }
            ScriptBehaviour::ResolveUndefined => Some(OutcomeEnvelope::success(token, None)),
            ScriptBehaviour::Throw(error) => Some(OutcomeEnvelope::failure(token, error.clone())),
            ScriptBehaviour::Silent | ScriptBehaviour::RejectInjection(_) => None,
        }
    }
}

/// One step of a resource's simulated lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleStep {
    /// Report a new status marker.
    Progress(ResourceStatus),
    /// Destroy the resource.
    Remove,
    /// Supersede the resource with `replacement`.
    Replace { replacement: ResourceId },
}

/// Delayed steps replayed after a creation or reload is accepted.
///
/// Each delay counts from the previous step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LifecyclePlan {
    steps: Vec<(Duration, LifecycleStep)>,
}

impl LifecyclePlan {
    /// A plan with no steps; the resource never finishes loading.
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `loading`, then `complete` after `delay`.
    pub fn loads_after(delay: Duration) -> Self {
        Self::new()
            .progress(Duration::ZERO, ResourceStatus::Loading)
            .progress(delay, ResourceStatus::Complete)
    }

    #[must_use]
    pub fn progress(mut self, after: Duration, status: ResourceStatus) -> Self {
        self.steps.push((after, LifecycleStep::Progress(status)));
        self
    }

    #[must_use]
    pub fn remove(mut self, after: Duration) -> Self {
        self.steps.push((after, LifecycleStep::Remove));
        self
    }

    #[must_use]
    pub fn replace(mut self, after: Duration, replacement: ResourceId) -> Self {
        self.steps
            .push((after, LifecycleStep::Replace { replacement }));
        self
    }

    pub fn steps(&self) -> &[(Duration, LifecycleStep)] {
        &self.steps
    }
}

/// A payload the host accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectionRecord {
    pub target: ExecutionTarget,
    pub payload: InjectionPayload,
}

struct HostState {
    scripts: HashMap<ExecutionTarget, ScriptPlan>,
    create_plans: VecDeque<LifecyclePlan>,
    reload_plans: HashMap<ResourceId, LifecyclePlan>,
    default_plan: LifecyclePlan,
    resources: HashMap<ResourceId, ResourceInfo>,
    next_resource: u64,
    refuse_creates: Option<String>,
    injected: Vec<InjectionRecord>,
}

/// Simulated host environment.
pub struct SimulatedHost {
    bus: Arc<InMemoryEventBus>,
    state: Arc<Mutex<HostState>>,
}

impl SimulatedHost {
    /// Host publishing on `bus`. Resources load in 10 ms unless planned otherwise.
    pub fn new(bus: Arc<InMemoryEventBus>) -> Self {
        let state = HostState {
            scripts: HashMap::new(),
            create_plans: VecDeque::new(),
            reload_plans: HashMap::new(),
            default_plan: LifecyclePlan::loads_after(Duration::from_millis(10)),
            resources: HashMap::new(),
            next_resource: 1,
            refuse_creates: None,
            injected: Vec::new(),
        };
        Self {
            bus,
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// The bus this host publishes on.
    pub fn bus(&self) -> &Arc<InMemoryEventBus> {
        &self.bus
    }

    /// Make `target` exist with the given behaviour.
    pub fn on_target(&self, target: ExecutionTarget, plan: ScriptPlan) {
        self.state.lock().scripts.insert(target, plan);
    }

    /// Plan for the next creation. Plans queue up in order.
    pub fn plan_next_create(&self, plan: LifecyclePlan) {
        self.state.lock().create_plans.push_back(plan);
    }

    /// Plan for the next reload of `id`.
    pub fn plan_reload(&self, id: ResourceId, plan: LifecyclePlan) {
        self.state.lock().reload_plans.insert(id, plan);
    }

    /// Plan used when nothing more specific is queued.
    pub fn set_default_plan(&self, plan: LifecyclePlan) {
        self.state.lock().default_plan = plan;
    }

    /// Refuse every creation from now on.
    pub fn refuse_creates(&self, reason: impl Into<String>) {
        self.state.lock().refuse_creates = Some(reason.into());
    }

    /// Seed an existing resource (e.g. to reload it).
    pub fn add_resource(&self, info: ResourceInfo) {
        let mut state = self.state.lock();
        state.next_resource = state.next_resource.max(info.id.0 + 1);
        state.resources.insert(info.id, info);
    }

    /// Current snapshot of `id`, if it still exists.
    pub fn resource(&self, id: ResourceId) -> Option<ResourceInfo> {
        self.state.lock().resources.get(&id).cloned()
    }

    /// Every accepted injection, in order.
    pub fn injected(&self) -> Vec<InjectionRecord> {
        self.state.lock().injected.clone()
    }

    /// Number of accepted injections.
    pub fn injection_count(&self) -> usize {
        self.state.lock().injected.len()
    }

    fn play(&self, id: ResourceId, plan: LifecyclePlan) {
        let bus = self.bus.clone();
        let state = self.state.clone();
        tokio::spawn(async move {
            let mut current = id;
            for (delay, step) in plan.steps {
                tokio::time::sleep(delay).await;
                let Some(event) = apply_step(&state, current, step) else {
                    log_resource_event!(debug, COMPONENT, "Plan stopped, resource is gone", current);
                    return;
                };
                if let LifecycleStep::Replace { replacement } = step {
                    current = replacement;
                }
                bus.publish(event).await;
            }
        });
    }
}

fn apply_step(
    state: &Mutex<HostState>,
    id: ResourceId,
    step: LifecycleStep,
) -> Option<HostEvent> {
    let mut state = state.lock();
    match step {
        LifecycleStep::Progress(status) => {
            let resource = state.resources.get_mut(&id)?;
            resource.status = status;
            Some(HostEvent::ResourceUpdated {
                id,
                status,
                resource: resource.clone(),
            })
        }
        LifecycleStep::Remove => {
            state.resources.remove(&id)?;
            Some(HostEvent::ResourceRemoved { id })
        }
        LifecycleStep::Replace { replacement } => {
            let mut resource = state.resources.remove(&id)?;
            resource.id = replacement;
            state.resources.insert(replacement, resource);
            Some(HostEvent::ResourceReplaced {
                added_id: replacement,
                removed_id: id,
            })
        }
    }
}

#[async_trait]
impl ScriptInjector for SimulatedHost {
    async fn inject(&self, target: ExecutionTarget, payload: &InjectionPayload) -> HostResult<()> {
        let plan = {
            let mut state = self.state.lock();
            let plan = state
                .scripts
                .get(&target)
                .cloned()
                .ok_or(HostError::InvalidTarget(target))?;
            if let ScriptBehaviour::RejectInjection(reason) = &plan.behaviour {
                log_target_event!(debug, COMPONENT, "Injection refused", target, reason = %reason);
                return Err(HostError::rejected("inject", reason.clone()));
            }
            state.injected.push(InjectionRecord {
                target,
                payload: payload.clone(),
            });
            plan
        };

        let Some(envelope) = embedded_token(&payload.code).and_then(|token| plan.envelope(&token))
        else {
            log_target_event!(debug, COMPONENT, "Injected, no report scheduled", target);
            return Ok(());
        };

        let bus = self.bus.clone();
        tokio::spawn(async move {
            tokio::time::sleep(plan.delay).await;
            bus.publish(HostEvent::RuntimeMessage {
                sender: Some(target),
                payload: envelope.to_value(),
            })
            .await;
        });
        log_target_event!(debug, COMPONENT, "Injected, report scheduled", target);
        Ok(())
    }
}

#[async_trait]
impl ResourceHost for SimulatedHost {
    async fn create_resource(&self, props: CreateProperties) -> HostResult<ResourceInfo> {
        let (info, plan) = {
            let mut state = self.state.lock();
            if let Some(reason) = &state.refuse_creates {
                return Err(HostError::rejected("create", reason.clone()));
            }
            let id = ResourceId(state.next_resource);
            state.next_resource += 1;

            let mut info = ResourceInfo::new(id);
            info.url = props.url;
            state.resources.insert(id, info.clone());

            let plan = state
                .create_plans
                .pop_front()
                .unwrap_or_else(|| state.default_plan.clone());
            (info, plan)
        };

        log_resource_event!(debug, COMPONENT, "Resource created", info.id, active = props.active);
        self.play(info.id, plan);
        Ok(info)
    }

    async fn reload_resource(&self, id: ResourceId, props: ReloadProperties) -> HostResult<()> {
        let plan = {
            let mut state = self.state.lock();
            let resource = state
                .resources
                .get_mut(&id)
                .ok_or(HostError::UnknownResource(id))?;
            resource.status = ResourceStatus::Loading;
            state
                .reload_plans
                .remove(&id)
                .unwrap_or_else(|| state.default_plan.clone())
        };

        log_resource_event!(debug, COMPONENT, "Resource reloading", id, bypass_cache = props.bypass_cache);
        self.play(id, plan);
        Ok(())
    }
}

//! Host adapters implementing the subsystems' outbound ports.

pub mod simulated_host;

pub use simulated_host::{
    InjectionRecord, LifecyclePlan, LifecycleStep, ScriptBehaviour, ScriptPlan, SimulatedHost,
};

//! 组件生命周期注册表
//!
//! - [`registry`] - 顶层协调者 [`ComponentRegistry`]
//! - [`dependency`] - 依赖解析缓存与依赖者边表
//! - [`pending`] - 初始化 / 卸载的重入保护
//! - [`teardown`] - 批量卸载句柄与异常策略

pub mod dependency;
pub mod pending;
#[allow(clippy::module_inception)]
pub mod registry;
pub mod teardown;

pub use dependency::DependencyTracker;
pub use pending::PendingStates;
pub use registry::{ComponentRegistry, ComponentState};
pub use teardown::{
    AbortOnFailure, LogAndContinue, TeardownDecision, TeardownHandle, TeardownPolicy,
};

//! 批量卸载句柄与异常策略
//!
//! [`initialize_all`](super::ComponentRegistry::initialize_all) 返回的
//! [`TeardownHandle`] 是触发整体卸载的唯一途径：句柄在
//! [`run`](TeardownHandle::run) 时被消耗，天然保证每次批量初始化
//! 只能对应一次批量卸载，任何单个组件都无法单方面拆掉整个组件集。

use tracing::warn;

use crate::registry::ComponentRegistry;
use crate::utils::{RegistryError, Result};

/// 卸载失败后的处理决定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeardownDecision {
    /// 记录后继续卸载剩余组件
    Continue,
    /// 提前中止本次批量卸载
    Abort,
}

/// 批量卸载的异常策略
///
/// 批量卸载中单个组件失败时，由策略决定是继续还是中止。
/// 中止时错误会原样返回给调用方，不会被吞掉。
pub trait TeardownPolicy {
    /// 处理一次组件卸载失败
    fn on_failure(&mut self, error: &RegistryError) -> TeardownDecision;
}

impl<F> TeardownPolicy for F
where
    F: FnMut(&RegistryError) -> TeardownDecision,
{
    fn on_failure(&mut self, error: &RegistryError) -> TeardownDecision {
        self(error)
    }
}

/// 默认策略：记录警告日志并继续
///
/// 尽可能让每个组件都有机会释放资源，即使个别组件行为异常。
#[derive(Debug, Default)]
pub struct LogAndContinue;

impl TeardownPolicy for LogAndContinue {
    fn on_failure(&mut self, error: &RegistryError) -> TeardownDecision {
        warn!(error = %error, "组件卸载失败，继续卸载剩余组件");
        TeardownDecision::Continue
    }
}

/// 严格策略：遇到首个失败即中止
#[derive(Debug, Default)]
pub struct AbortOnFailure;

impl TeardownPolicy for AbortOnFailure {
    fn on_failure(&mut self, error: &RegistryError) -> TeardownDecision {
        warn!(error = %error, "组件卸载失败，中止本次批量卸载");
        TeardownDecision::Abort
    }
}

/// 批量卸载句柄
///
/// 与发放它的注册表实例（注册表编号）和那次批量初始化（纪元计数）
/// 双重绑定，拿到其他注册表上使用会被拒绝。
/// `run` 按值消耗句柄，因此同一个句柄不可能被调用两次。
#[must_use = "批量初始化产生的组件只能通过此句柄卸载"]
#[derive(Debug)]
pub struct TeardownHandle {
    registry_id: u64,
    epoch: u64,
}

impl TeardownHandle {
    pub(crate) fn new(registry_id: u64, epoch: u64) -> Self {
        Self { registry_id, epoch }
    }

    /// 以默认策略（[`LogAndContinue`]）执行批量卸载
    pub fn run<P: 'static>(self, registry: &mut ComponentRegistry<P>) -> Result<()> {
        self.run_with(registry, &mut LogAndContinue)
    }

    /// 以指定策略执行批量卸载
    pub fn run_with<P: 'static>(
        self,
        registry: &mut ComponentRegistry<P>,
        policy: &mut dyn TeardownPolicy,
    ) -> Result<()> {
        registry.deinitialize_all(self.registry_id, self.epoch, policy)
    }
}

//! 组件依赖追踪
//!
//! 维护两类信息：每个组件类型解析后的依赖列表（只读缓存），
//! 以及反向的依赖者边表。依赖者边只记录组件标识，不持有任何实例，
//! 仅用于在卸载时判断阻塞者。
//!
//! # 示例
//!
//! ```rust
//! use chips_components::registry::DependencyTracker;
//! use chips_components::ComponentId;
//!
//! struct Config;
//! struct Commands;
//!
//! let config = ComponentId::of::<Config>();
//! let commands = ComponentId::of::<Commands>();
//!
//! let mut tracker = DependencyTracker::new();
//! tracker.resolve(commands, || vec![config]);
//! tracker.register_dependent(config, commands);
//!
//! assert_eq!(tracker.dependents_of(config), &[commands]);
//! ```

use std::collections::HashMap;

use crate::component::ComponentId;

/// 依赖追踪器
///
/// 解析后的依赖列表在注册表的整个生命周期内缓存，声明永远只被读取一次。
/// 依赖者边表在解析依赖时增量建立，在依赖者卸载时移除。
#[derive(Debug, Default)]
pub struct DependencyTracker {
    /// 解析缓存：组件 -> 其声明的依赖列表（按声明顺序）
    resolved: HashMap<ComponentId, Vec<ComponentId>>,
    /// 反向边：组件 -> 依赖它的组件列表
    dependents: HashMap<ComponentId, Vec<ComponentId>>,
}

impl DependencyTracker {
    /// 创建空的依赖追踪器
    pub fn new() -> Self {
        Self::default()
    }

    /// 解析组件的依赖列表
    ///
    /// 首次调用时读取声明并缓存，后续调用直接返回缓存值，
    /// `declare` 不会被再次执行。
    pub fn resolve(
        &mut self,
        component: ComponentId,
        declare: impl FnOnce() -> Vec<ComponentId>,
    ) -> &[ComponentId] {
        self.resolved.entry(component).or_insert_with(declare)
    }

    /// 已缓存的依赖列表，未解析过时返回 `None`
    pub fn resolved(&self, component: ComponentId) -> Option<&[ComponentId]> {
        self.resolved.get(&component).map(|deps| deps.as_slice())
    }

    /// 记录 `dependent` 依赖于 `dependency`
    ///
    /// 幂等：同一条边记录多次不会产生额外效果。
    pub fn register_dependent(&mut self, dependency: ComponentId, dependent: ComponentId) {
        let dependents = self.dependents.entry(dependency).or_default();
        if !dependents.contains(&dependent) {
            dependents.push(dependent);
        }
    }

    /// 移除 `dependent` 对 `dependency` 的依赖边
    ///
    /// 边不存在时不做任何事；某个组件的依赖者清空后，
    /// 它在边表中的条目整体移除。
    pub fn unregister_dependent(&mut self, dependency: ComponentId, dependent: ComponentId) {
        if let Some(dependents) = self.dependents.get_mut(&dependency) {
            dependents.retain(|entry| *entry != dependent);
            if dependents.is_empty() {
                self.dependents.remove(&dependency);
            }
        }
    }

    /// 依赖 `component` 的组件列表
    ///
    /// 只读操作，不会作为副作用修改边表；
    /// 失效条目的清理发生在 [`unregister_dependent`](Self::unregister_dependent)
    /// 等写路径上。
    pub fn dependents_of(&self, component: ComponentId) -> &[ComponentId] {
        self.dependents
            .get(&component)
            .map(|dependents| dependents.as_slice())
            .unwrap_or(&[])
    }
}

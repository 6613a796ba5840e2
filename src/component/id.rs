//! 组件标识类型
//!
//! 定义组件种类标识 [`ComponentId`] 和实例句柄 [`InstanceHandle`]。
//! 注册表内部的所有索引（注册表、激活表、依赖边、待定状态）
//! 都以这两种非持有（non-owning）键为准，而不是对象引用。

use std::any::{type_name, TypeId};
use std::fmt;

/// 组件种类标识
///
/// 每种组件由其 Rust 类型唯一标识。内部保存 [`TypeId`] 用于比较与哈希，
/// 同时缓存类型名用于日志与错误信息。
///
/// # 示例
///
/// ```rust
/// use chips_components::ComponentId;
///
/// struct ConfigComponent;
///
/// let id = ComponentId::of::<ConfigComponent>();
/// assert_eq!(id, ComponentId::of::<ConfigComponent>());
/// assert!(id.name().contains("ConfigComponent"));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct ComponentId {
    type_id: TypeId,
    name: &'static str,
}

impl ComponentId {
    /// 获取类型 `C` 的组件标识
    pub fn of<C: 'static>() -> Self {
        Self {
            type_id: TypeId::of::<C>(),
            name: type_name::<C>(),
        }
    }

    /// 组件类型的完整名称（用于诊断信息）
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for ComponentId {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for ComponentId {}

impl std::hash::Hash for ComponentId {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// 组件实例句柄
///
/// 每次构造组件实例时由注册表分配的单调递增版本号。
/// 用于"比较后移除"（compare-and-remove）以及以实例为键的待定卸载状态。
/// 句柄本身不持有实例，失效的句柄在使用时与激活表对比即可发现。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct InstanceHandle(u64);

impl InstanceHandle {
    pub(crate) fn new(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for InstanceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

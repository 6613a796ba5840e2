//! 生命周期待定状态追踪
//!
//! 记录"正在初始化的组件类型"与"正在卸载的组件实例"两组独立标志，
//! 作为重入保护：对同一类型重入初始化、或对同一实例重入卸载，
//! 会被转换为确定性的循环依赖错误，而不是无限递归。

use std::collections::HashSet;

use crate::component::{ComponentId, InstanceHandle};

/// 待定状态追踪器
///
/// 以组件标识和实例句柄为键，两者都是非持有的 `Copy` 键，
/// 因此追踪器不会延长任何类型或实例的生命周期。
/// 每个注册表实例持有自己的一份，互不共享。
#[derive(Debug, Default)]
pub struct PendingStates {
    /// 正在初始化的组件类型
    init: HashSet<ComponentId>,
    /// 正在卸载的组件实例
    deinit: HashSet<InstanceHandle>,
}

impl PendingStates {
    /// 创建空的追踪器
    pub fn new() -> Self {
        Self::default()
    }

    /// 组件类型是否正在初始化
    pub fn is_init(&self, component: ComponentId) -> bool {
        self.init.contains(&component)
    }

    /// 设置组件类型的待定初始化标志
    pub fn set_init(&mut self, component: ComponentId, pending: bool) {
        if pending {
            self.init.insert(component);
        } else {
            self.init.remove(&component);
        }
    }

    /// 组件实例是否正在卸载
    pub fn is_deinit(&self, instance: InstanceHandle) -> bool {
        self.deinit.contains(&instance)
    }

    /// 设置组件实例的待定卸载标志
    pub fn set_deinit(&mut self, instance: InstanceHandle, pending: bool) {
        if pending {
            self.deinit.insert(instance);
        } else {
            self.deinit.remove(&instance);
        }
    }
}

//! 宿主事件系统接口
//!
//! 注册表不实现事件分发，只和宿主的事件系统约定两个操作：
//! 组件激活时订阅、卸载时退订。除此之外事件系统对注册表完全不透明。

use crate::component::ComponentId;

/// 宿主事件系统
///
/// 以组件标识作为非持有的订阅键：注册表是组件实例的唯一持有者，
/// 宿主在分发事件时再凭标识向注册表解析实例。声明了
/// [`subscribes_events`](crate::ComponentSpec::subscribes_events)
/// 的组件在激活时自动调用 [`subscribe`](EventBus::subscribe)，
/// 卸载时自动调用 [`unsubscribe_all`](EventBus::unsubscribe_all)。
pub trait EventBus {
    /// 为组件注册事件订阅
    fn subscribe(&self, component: ComponentId);

    /// 移除组件的全部事件订阅
    fn unsubscribe_all(&self, component: ComponentId);
}

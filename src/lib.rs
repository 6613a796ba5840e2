//! # Chips Components - 薯片组件注册表
//!
//! 薯片组件注册表为单个宿主应用实例管理一组独立开发的组件，
//! 提供以下核心功能：
//!
//! - **组件注册**: 按类型登记组件，保持注册顺序，重复注册幂等
//! - **依赖解析**: 声明式依赖，解析一次后缓存，循环依赖转换为确定性错误
//! - **有序初始化**: 深度优先激活依赖，再构造组件并注入共享宿主上下文
//! - **安全卸载**: 依赖者追踪保证卸载顺序，批量卸载支持可插拔异常策略
//! - **原地重载**: 可重载组件按"依赖先于依赖者"的后序刷新
//! - **事件接线**: 订阅宿主事件的组件在激活 / 卸载时自动注册与退订
//!
//! ## 快速开始
//!
//! ```rust
//! use chips_components::{Component, ComponentRegistry, ComponentSpec, ComponentType};
//! use std::any::Any;
//! use std::sync::Arc;
//!
//! /// 宿主应用上下文
//! struct Host;
//!
//! struct Config;
//!
//! impl Component<Host> for Config {
//!     fn as_any(&self) -> &dyn Any {
//!         self
//!     }
//!
//!     fn as_any_mut(&mut self) -> &mut dyn Any {
//!         self
//!     }
//! }
//!
//! impl ComponentType<Host> for Config {
//!     fn spec() -> ComponentSpec<Host> {
//!         ComponentSpec::of::<Config>().plain_factory(|| Ok(Box::new(Config)))
//!     }
//! }
//!
//! struct Commands;
//!
//! impl Component<Host> for Commands {
//!     fn as_any(&self) -> &dyn Any {
//!         self
//!     }
//!
//!     fn as_any_mut(&mut self) -> &mut dyn Any {
//!         self
//!     }
//! }
//!
//! impl ComponentType<Host> for Commands {
//!     fn spec() -> ComponentSpec<Host> {
//!         ComponentSpec::of::<Commands>()
//!             .depends_on::<Config>()
//!             .plain_factory(|| Ok(Box::new(Commands)))
//!     }
//! }
//!
//! fn main() -> chips_components::Result<()> {
//!     let mut registry = ComponentRegistry::new();
//!     registry.register::<Commands>()?;
//!
//!     // Config 未显式注册，依赖解析会自动注册并率先激活它
//!     let teardown = registry.initialize_all(Arc::new(Host))?;
//!     assert!(registry.is_active::<Config>());
//!     assert!(registry.is_active::<Commands>());
//!
//!     // 句柄是整体卸载的唯一入口，按值消耗，只能调用一次
//!     teardown.run(&mut registry)?;
//!     assert!(!registry.is_active::<Commands>());
//!     Ok(())
//! }
//! ```
//!
//! ## 模块结构
//!
//! - `component` - 组件标识、生命周期接口与静态声明
//! - `registry` - 注册表本体、依赖追踪、重入保护与卸载句柄
//! - `events` - 宿主事件系统的接口边界
//! - `utils` - 错误类型
//!
//! ## 并发模型
//!
//! 所有注册表操作都在宿主的单一控制线程上同步执行，互不并发，
//! 注册表自身的数据结构不加锁。待定状态追踪器是唯一的重入保护，
//! 它把依赖环转换为确定性错误而不是无限递归。

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod component;
pub mod events;
pub mod registry;
pub mod utils;

// 重导出常用类型，方便使用
pub use component::{
    Component, ComponentError, ComponentId, ComponentSpec, ComponentType, ContextFactory,
    DependencyDecl, InstanceHandle, PlainFactory,
};
pub use events::EventBus;
pub use registry::{
    AbortOnFailure, ComponentRegistry, ComponentState, LogAndContinue, TeardownDecision,
    TeardownHandle, TeardownPolicy,
};
pub use utils::{RegistryError, Result};

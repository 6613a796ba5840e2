//! 组件模型
//!
//! 定义组件的身份、生命周期接口与静态声明：
//!
//! - [`id`] - 组件标识与实例句柄
//! - [`traits`] - [`Component`] 生命周期接口与 [`ComponentType`] 声明接口
//! - [`spec`] - [`ComponentSpec`] 静态声明及其构建器

pub mod id;
pub mod spec;
pub mod traits;

pub use id::{ComponentId, InstanceHandle};
pub use spec::{ComponentSpec, ContextFactory, DependencyDecl, PlainFactory};
pub use traits::{Component, ComponentError, ComponentType};

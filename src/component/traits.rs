//! 组件生命周期接口
//!
//! 定义组件必须实现的 [`Component`] trait 以及按类型声明元信息的
//! [`ComponentType`] trait。所有生命周期钩子都有空默认实现，
//! 组件只需要覆盖自己关心的阶段。

use std::any::Any;
use std::sync::Arc;

use super::spec::ComponentSpec;

/// 组件钩子返回的错误类型
///
/// 钩子失败的具体原因由组件自行定义，注册表会将其包装为
/// [`RegistryError`](crate::RegistryError) 并附带组件类型名。
pub type ComponentError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// 宿主应用的组件
///
/// `P` 是宿主上下文类型，整个注册表绑定唯一一个共享上下文实例，
/// 并在构造后注入每个组件（[`attach`](Component::attach)）。
///
/// 生命周期钩子均为可选能力：
///
/// - [`attach`](Component::attach) - 上下文注入，构造完成后立即调用
/// - [`init`](Component::init) - 自定义初始化，失败会回滚该组件
/// - [`unload`](Component::unload) - 自定义清理，在卸载时调用
/// - [`reload`](Component::reload) - 原地刷新，仅当
///   [`ComponentSpec::reloadable`](super::spec::ComponentSpec::reloadable)
///   声明后才会被调度
///
/// 是否参与重载与事件订阅由 [`ComponentSpec`] 上的声明决定，
/// 而不是由类型是否覆盖某个方法决定。
pub trait Component<P>: Any {
    /// 注入共享宿主上下文
    ///
    /// 无论组件通过哪条构造路径创建，都会在构造完成后收到一次上下文。
    /// 不需要上下文的组件保留默认实现即可。
    fn attach(&mut self, context: Arc<P>) {
        let _ = context;
    }

    /// 初始化钩子
    ///
    /// 在依赖全部激活、实例构造并注入上下文之后调用。
    /// 返回错误会使该组件回滚为"已注册但未激活"状态。
    fn init(&mut self) -> Result<(), ComponentError> {
        Ok(())
    }

    /// 卸载钩子
    ///
    /// 在组件被卸载、事件退订之前调用。返回错误不会让组件凭空消失：
    /// 实例仍保留在激活表中，由卸载策略决定后续处理。
    fn unload(&mut self) -> Result<(), ComponentError> {
        Ok(())
    }

    /// 重载钩子
    ///
    /// 仅当组件声明了可重载能力时，才会在重载遍历中被调用。
    fn reload(&mut self) {}

    /// 以 [`Any`] 形式借用自身（用于类型化查找）
    fn as_any(&self) -> &dyn Any;

    /// 以 [`Any`] 形式可变借用自身
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// 可按类型注册的组件
///
/// 提供该类型的静态声明（依赖、构造路径、能力标记），
/// 使 [`ComponentRegistry::register`](crate::ComponentRegistry::register)
/// 能以 `registry.register::<C>()` 的形式工作，并让依赖方仅凭类型
/// 就能自动注册未显式注册的被依赖组件。
///
/// # 示例
///
/// ```rust
/// use chips_components::{Component, ComponentSpec, ComponentType};
/// use std::any::Any;
///
/// struct Host;
///
/// struct Cache;
///
/// impl Component<Host> for Cache {
///     fn as_any(&self) -> &dyn Any {
///         self
///     }
///
///     fn as_any_mut(&mut self) -> &mut dyn Any {
///         self
///     }
/// }
///
/// impl ComponentType<Host> for Cache {
///     fn spec() -> ComponentSpec<Host> {
///         ComponentSpec::of::<Cache>().plain_factory(|| Ok(Box::new(Cache)))
///     }
/// }
/// ```
pub trait ComponentType<P>: Component<P> + Sized {
    /// 该组件类型的静态声明
    ///
    /// 声明只会被读取一次：依赖列表在首次解析后由注册表缓存，
    /// 在注册表的整个生命周期内不再重新读取。
    fn spec() -> ComponentSpec<P>;
}

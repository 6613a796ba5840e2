//! 组件声明
//!
//! [`ComponentSpec`] 是组件类型的静态声明：依赖以显式声明的形式
//! 给出，构造路径以工厂函数的形式给出，可重载 / 事件订阅能力以
//! 标记的形式给出。

use std::sync::Arc;

use super::id::ComponentId;
use super::traits::{Component, ComponentError, ComponentType};

/// 接受宿主上下文的构造路径
pub type ContextFactory<P> = fn(Arc<P>) -> Result<Box<dyn Component<P>>, ComponentError>;

/// 无参数的构造路径
pub type PlainFactory<P> = fn() -> Result<Box<dyn Component<P>>, ComponentError>;

/// 依赖声明
///
/// 除了被依赖组件的标识，还携带其声明的提供函数。
/// 依赖一个未注册的组件时，注册表凭提供函数即可自动注册它。
pub struct DependencyDecl<P> {
    pub(crate) id: ComponentId,
    pub(crate) provider: fn() -> ComponentSpec<P>,
}

impl<P> Clone for DependencyDecl<P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P> Copy for DependencyDecl<P> {}

/// 组件类型的静态声明
///
/// 通过构建器风格的方法组装：
///
/// ```rust
/// use chips_components::{Component, ComponentSpec, ComponentType};
/// use std::any::Any;
/// use std::sync::Arc;
///
/// struct Host;
///
/// struct Config;
///
/// impl Component<Host> for Config {
///     fn as_any(&self) -> &dyn Any {
///         self
///     }
///
///     fn as_any_mut(&mut self) -> &mut dyn Any {
///         self
///     }
/// }
///
/// impl ComponentType<Host> for Config {
///     fn spec() -> ComponentSpec<Host> {
///         ComponentSpec::of::<Config>().plain_factory(|| Ok(Box::new(Config)))
///     }
/// }
///
/// struct Commands {
///     context: Option<Arc<Host>>,
/// }
///
/// impl Component<Host> for Commands {
///     fn attach(&mut self, context: Arc<Host>) {
///         self.context = Some(context);
///     }
///
///     fn as_any(&self) -> &dyn Any {
///         self
///     }
///
///     fn as_any_mut(&mut self) -> &mut dyn Any {
///         self
///     }
/// }
///
/// impl ComponentType<Host> for Commands {
///     fn spec() -> ComponentSpec<Host> {
///         ComponentSpec::of::<Commands>()
///             .depends_on::<Config>()
///             .context_factory(|_context| Ok(Box::new(Commands { context: None })))
///             .reloadable()
///     }
/// }
/// ```
pub struct ComponentSpec<P> {
    pub(crate) id: ComponentId,
    pub(crate) dependencies: Vec<DependencyDecl<P>>,
    pub(crate) context_factory: Option<ContextFactory<P>>,
    pub(crate) plain_factory: Option<PlainFactory<P>>,
    pub(crate) reloadable: bool,
    pub(crate) subscriber: bool,
}

impl<P: 'static> ComponentSpec<P> {
    /// 为类型 `C` 创建空声明
    ///
    /// 新声明没有依赖、没有构造路径、不参与重载与事件订阅。
    /// 至少要提供一条构造路径，否则初始化时会以
    /// [`NoConstructor`](crate::RegistryError::NoConstructor) 失败。
    pub fn of<C: Component<P>>() -> Self {
        Self {
            id: ComponentId::of::<C>(),
            dependencies: Vec::new(),
            context_factory: None,
            plain_factory: None,
            reloadable: false,
            subscriber: false,
        }
    }

    /// 声明对组件 `D` 的依赖
    ///
    /// 依赖按声明顺序解析；同一依赖声明多次不会产生额外效果。
    pub fn depends_on<D: ComponentType<P>>(mut self) -> Self {
        self.dependencies.push(DependencyDecl {
            id: ComponentId::of::<D>(),
            provider: D::spec,
        });
        self
    }

    /// 设置接受宿主上下文的构造路径
    ///
    /// 两条路径都存在时优先使用本路径。
    pub fn context_factory(mut self, factory: ContextFactory<P>) -> Self {
        self.context_factory = Some(factory);
        self
    }

    /// 设置无参数的构造路径
    pub fn plain_factory(mut self, factory: PlainFactory<P>) -> Self {
        self.plain_factory = Some(factory);
        self
    }

    /// 声明组件可重载
    ///
    /// 实例激活后会进入重载候选列表，参与
    /// [`reload_all`](crate::ComponentRegistry::reload_all) 遍历。
    pub fn reloadable(mut self) -> Self {
        self.reloadable = true;
        self
    }

    /// 声明组件订阅宿主事件
    ///
    /// 实例激活时自动向事件系统注册，卸载时自动退订。
    pub fn subscribes_events(mut self) -> Self {
        self.subscriber = true;
        self
    }

    /// 组件标识
    pub fn id(&self) -> ComponentId {
        self.id
    }

    /// 声明的依赖标识，按声明顺序
    pub fn dependency_ids(&self) -> Vec<ComponentId> {
        self.dependencies.iter().map(|decl| decl.id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::Any;

    struct Host;

    struct Storage;

    impl Component<Host> for Storage {
        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    impl ComponentType<Host> for Storage {
        fn spec() -> ComponentSpec<Host> {
            ComponentSpec::of::<Storage>().plain_factory(|| Ok(Box::new(Storage)))
        }
    }

    struct Indexer;

    impl Component<Host> for Indexer {
        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[test]
    fn test_empty_spec() {
        let spec = ComponentSpec::<Host>::of::<Indexer>();
        assert_eq!(spec.id(), ComponentId::of::<Indexer>());
        assert!(spec.dependency_ids().is_empty());
        assert!(spec.context_factory.is_none());
        assert!(spec.plain_factory.is_none());
        assert!(!spec.reloadable);
        assert!(!spec.subscriber);
    }

    #[test]
    fn test_builder_records_declarations() {
        let spec = ComponentSpec::<Host>::of::<Indexer>()
            .depends_on::<Storage>()
            .context_factory(|_context| Ok(Box::new(Indexer)))
            .reloadable()
            .subscribes_events();

        assert_eq!(spec.dependency_ids(), vec![ComponentId::of::<Storage>()]);
        assert!(spec.context_factory.is_some());
        assert!(spec.reloadable);
        assert!(spec.subscriber);
    }

    #[test]
    fn test_dependency_decl_carries_provider() {
        let spec = ComponentSpec::<Host>::of::<Indexer>().depends_on::<Storage>();
        let decl = spec.dependencies[0];

        let provided = (decl.provider)();
        assert_eq!(provided.id(), ComponentId::of::<Storage>());
        assert!(provided.plain_factory.is_some());
    }
}

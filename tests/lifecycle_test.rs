//! 注册与初始化协议集成测试
//!
//! 覆盖依赖顺序激活、自动注册、循环依赖检测与构造失败回滚。

use chips_components::{
    Component, ComponentRegistry, ComponentSpec, ComponentType, RegistryError,
};
use std::any::Any;
use std::sync::{Arc, Mutex};

/// 测试用宿主上下文，记录组件生命周期事件的先后顺序
#[derive(Debug)]
struct Host {
    log: Mutex<Vec<String>>,
}

impl Host {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            log: Mutex::new(Vec::new()),
        })
    }

    fn record(&self, entry: &str) {
        self.log.lock().unwrap().push(entry.to_string());
    }

    fn entries(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    fn position(&self, entry: &str) -> Option<usize> {
        self.entries().iter().position(|e| e == entry)
    }
}

struct Config {
    context: Option<Arc<Host>>,
}

impl Component<Host> for Config {
    fn attach(&mut self, context: Arc<Host>) {
        self.context = Some(context);
    }

    fn init(&mut self) -> Result<(), chips_components::ComponentError> {
        self.context.as_ref().unwrap().record("config.init");
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl ComponentType<Host> for Config {
    fn spec() -> ComponentSpec<Host> {
        ComponentSpec::of::<Config>().plain_factory(|| Ok(Box::new(Config { context: None })))
    }
}

#[derive(Debug)]
struct Commands {
    context: Arc<Host>,
    dispatched: u32,
}

impl Component<Host> for Commands {
    fn init(&mut self) -> Result<(), chips_components::ComponentError> {
        self.context.record("commands.init");
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl ComponentType<Host> for Commands {
    fn spec() -> ComponentSpec<Host> {
        ComponentSpec::of::<Commands>()
            .depends_on::<Config>()
            .context_factory(|context| {
                Ok(Box::new(Commands {
                    context,
                    dispatched: 0,
                }))
            })
    }
}

struct CycleA;

impl Component<Host> for CycleA {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl ComponentType<Host> for CycleA {
    fn spec() -> ComponentSpec<Host> {
        ComponentSpec::of::<CycleA>()
            .depends_on::<CycleB>()
            .plain_factory(|| Ok(Box::new(CycleA)))
    }
}

struct CycleB;

impl Component<Host> for CycleB {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl ComponentType<Host> for CycleB {
    fn spec() -> ComponentSpec<Host> {
        ComponentSpec::of::<CycleB>()
            .depends_on::<CycleA>()
            .plain_factory(|| Ok(Box::new(CycleB)))
    }
}

/// 构造路径直接失败的组件
struct FaultyBuild;

impl Component<Host> for FaultyBuild {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl ComponentType<Host> for FaultyBuild {
    fn spec() -> ComponentSpec<Host> {
        ComponentSpec::of::<FaultyBuild>().plain_factory(|| Err("配置文件损坏".into()))
    }
}

/// 初始化钩子失败的组件
struct FaultyInit;

impl Component<Host> for FaultyInit {
    fn init(&mut self) -> Result<(), chips_components::ComponentError> {
        Err("握手超时".into())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl ComponentType<Host> for FaultyInit {
    fn spec() -> ComponentSpec<Host> {
        ComponentSpec::of::<FaultyInit>().plain_factory(|| Ok(Box::new(FaultyInit)))
    }
}

#[test]
fn test_dependency_activates_before_dependent() {
    let host = Host::new();
    let mut registry = ComponentRegistry::new();
    registry.register::<Config>().unwrap();
    registry.register::<Commands>().unwrap();

    let teardown = registry.initialize_all(Arc::clone(&host)).unwrap();

    assert!(registry.is_active::<Config>());
    assert!(registry.is_active::<Commands>());
    assert!(host.position("config.init").unwrap() < host.position("commands.init").unwrap());

    teardown.run(&mut registry).unwrap();
}

#[test]
fn test_dependent_only_registration_pulls_dependency() {
    let host = Host::new();
    let mut registry = ComponentRegistry::new();
    registry.register::<Commands>().unwrap();

    let teardown = registry.initialize_all(Arc::clone(&host)).unwrap();

    assert!(registry.is_registered::<Config>());
    assert!(registry.is_active::<Config>());
    assert!(host.position("config.init").unwrap() < host.position("commands.init").unwrap());

    teardown.run(&mut registry).unwrap();
}

#[test]
fn test_circular_dependency_is_config_error() {
    let host = Host::new();
    let mut registry = ComponentRegistry::new();
    registry.register::<CycleA>().unwrap();

    let err = registry.initialize_all(host).unwrap_err();

    assert!(matches!(err, RegistryError::PendingInitialization(_)));
    assert!(!registry.is_active::<CycleA>());
    assert!(!registry.is_active::<CycleB>());
}

#[test]
fn test_failed_construction_names_component_and_keeps_earlier_actives() {
    let host = Host::new();
    let mut registry = ComponentRegistry::new();
    registry.register::<Config>().unwrap();
    registry.register::<FaultyBuild>().unwrap();

    let err = registry.initialize_all(host).unwrap_err();

    match err {
        RegistryError::ConstructionFailed { component, .. } => {
            assert!(component.contains("FaultyBuild"));
        }
        other => panic!("预期构造失败错误，实际为 {other:?}"),
    }

    // 注册顺序更早且与失败组件无依赖关系的组件保持激活
    assert!(registry.is_active::<Config>());
    assert!(!registry.is_active::<FaultyBuild>());
    assert!(registry.is_registered::<FaultyBuild>());
}

#[test]
fn test_failed_init_hook_rolls_back() {
    let host = Host::new();
    let mut registry = ComponentRegistry::new();
    registry.register::<FaultyInit>().unwrap();

    let err = registry.initialize_all(host).unwrap_err();

    assert!(matches!(err, RegistryError::ConstructionFailed { .. }));
    assert!(!registry.is_active::<FaultyInit>());
    assert!(registry.is_registered::<FaultyInit>());
}

#[test]
fn test_failed_dependency_fails_dependent() {
    struct NeedsFaulty;

    impl Component<Host> for NeedsFaulty {
        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    impl ComponentType<Host> for NeedsFaulty {
        fn spec() -> ComponentSpec<Host> {
            ComponentSpec::of::<NeedsFaulty>()
                .depends_on::<FaultyBuild>()
                .plain_factory(|| Ok(Box::new(NeedsFaulty)))
        }
    }

    let host = Host::new();
    let mut registry = ComponentRegistry::new();
    registry.register::<NeedsFaulty>().unwrap();

    let err = registry.initialize_all(host).unwrap_err();

    // 依赖失败会使依赖者一并失败，不存在部分满足的依赖图
    assert!(matches!(err, RegistryError::ConstructionFailed { .. }));
    assert!(!registry.is_active::<NeedsFaulty>());
    assert!(!registry.is_active::<FaultyBuild>());
}

#[test]
fn test_get_active_typed_access() {
    let host = Host::new();
    let mut registry = ComponentRegistry::new();
    registry.register::<Commands>().unwrap();

    let teardown = registry.initialize_all(host).unwrap();

    {
        let commands = registry.get_active_mut::<Commands>().unwrap();
        commands.dispatched += 1;
    }
    let commands = registry.get_active::<Commands>().unwrap();
    assert_eq!(commands.dispatched, 1);

    teardown.run(&mut registry).unwrap();

    let err = registry.get_active::<Commands>().unwrap_err();
    assert!(matches!(err, RegistryError::NotActive(_)));
}

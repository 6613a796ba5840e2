//! 组件注册表
//!
//! 注册表负责组件的整个生命周期：注册、依赖解析、按依赖顺序初始化、
//! 宿主上下文注入、事件订阅接线，以及按批次的安全卸载与原地重载。
//!
//! 所有操作都在宿主应用的单一控制线程上同步完成，深度优先、
//! 不挂起、不加锁；重入由待定状态追踪器转换为确定性的循环依赖错误。

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::component::{
    Component, ComponentId, ComponentSpec, ComponentType, InstanceHandle,
};
use crate::events::EventBus;
use crate::registry::dependency::DependencyTracker;
use crate::registry::pending::PendingStates;
use crate::registry::teardown::{TeardownDecision, TeardownHandle, TeardownPolicy};
use crate::utils::{RegistryError, Result};

/// 组件的生命周期状态
///
/// 状态机：未注册 → 已注册 → 待定初始化 → 激活 → 待定卸载 → 移除。
/// 构造失败的组件回滚为"已注册"而不是"激活"。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentState {
    /// 注册表不认识该组件
    Unregistered,
    /// 已登记但当前没有激活实例
    Registered,
    /// 正在初始化
    PendingInit,
    /// 实例存活，已完成初始化
    Active,
    /// 正在卸载
    PendingDeinit,
}

/// 注册表实例编号序列，用于把卸载句柄绑定到发放它的注册表
static REGISTRY_SEQ: AtomicU64 = AtomicU64::new(1);

/// 激活表条目：实例及其构造时分配的句柄
struct ActiveEntry<P> {
    instance: Box<dyn Component<P>>,
    handle: InstanceHandle,
}

/// 组件注册表
///
/// 为单个宿主应用实例管理一组独立开发的组件。激活表是每个实例的
/// 唯一持有者；依赖边、重载候选与待定状态只记录非持有的标识和句柄。
///
/// # 示例
///
/// ```rust
/// use chips_components::{Component, ComponentRegistry, ComponentSpec, ComponentType};
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
/// # fn main() -> chips_components::Result<()> {
/// let mut registry = ComponentRegistry::new();
/// registry.register::<Config>()?;
///
/// let teardown = registry.initialize_all(Arc::new(Host))?;
/// assert!(registry.is_active::<Config>());
///
/// teardown.run(&mut registry)?;
/// assert!(!registry.is_active::<Config>());
/// # Ok(())
/// # }
/// ```
pub struct ComponentRegistry<P> {
    /// 已注册组件的声明
    specs: HashMap<ComponentId, ComponentSpec<P>>,
    /// 注册顺序（注册集合本体）
    order: Vec<ComponentId>,
    /// 激活表：组件 -> 存活实例，"组件是否存活"的唯一事实来源
    active: HashMap<ComponentId, ActiveEntry<P>>,
    /// 依赖解析缓存与依赖者边表
    dependencies: DependencyTracker,
    /// 重入保护
    pending: PendingStates,
    /// 重载候选：声明了可重载能力的激活实例
    reload_candidates: Vec<(ComponentId, InstanceHandle)>,
    /// 当前绑定的宿主上下文
    context: Option<Arc<P>>,
    /// 宿主事件系统（可选）
    event_bus: Option<Arc<dyn EventBus>>,
    /// 实例句柄计数器
    instance_counter: u64,
    /// 本注册表实例的编号，烙进发放的卸载句柄
    registry_id: u64,
    /// 批量初始化纪元，用于校验卸载句柄
    epoch: u64,
}

impl<P: 'static> Default for ComponentRegistry<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: 'static> ComponentRegistry<P> {
    /// 创建空的组件注册表
    pub fn new() -> Self {
        Self {
            specs: HashMap::new(),
            order: Vec::new(),
            active: HashMap::new(),
            dependencies: DependencyTracker::new(),
            pending: PendingStates::new(),
            reload_candidates: Vec::new(),
            context: None,
            event_bus: None,
            instance_counter: 0,
            registry_id: REGISTRY_SEQ.fetch_add(1, Ordering::Relaxed),
            epoch: 0,
        }
    }

    /// 设置宿主事件系统
    ///
    /// 声明了事件订阅能力的组件会在激活 / 卸载时自动接线。
    pub fn set_event_bus(&mut self, bus: Arc<dyn EventBus>) {
        self.event_bus = Some(bus);
    }

    // ==================== 注册 ====================

    /// 注册组件类型
    ///
    /// 幂等：重复注册同一类型等价于注册一次。
    /// 若注册表已绑定宿主上下文，注册会立即触发初始化，
    /// 因此启动之后的晚注册同样会被激活。
    pub fn register<C: ComponentType<P>>(&mut self) -> Result<()> {
        self.register_spec(C::spec())
    }

    /// 以显式声明注册组件
    pub fn register_spec(&mut self, spec: ComponentSpec<P>) -> Result<()> {
        let id = spec.id();
        if self.specs.contains_key(&id) {
            return Ok(());
        }

        debug!(component = %id, "注册组件");
        self.specs.insert(id, spec);
        self.order.push(id);

        if self.context.is_some() {
            self.initialize(id)?;
        }

        Ok(())
    }

    /// 注销组件类型
    ///
    /// 存在激活实例时先卸载（失败会原样返回，状态保持不变），
    /// 再从激活表与注册集合中移除。
    pub fn unregister<C: ComponentType<P>>(&mut self) -> Result<()> {
        self.unregister_id(ComponentId::of::<C>())
    }

    /// 以标识注销组件类型
    pub fn unregister_id(&mut self, id: ComponentId) -> Result<()> {
        if let Some(handle) = self.active.get(&id).map(|entry| entry.handle) {
            self.deinitialize(id, None)?;
            self.remove_active_if(id, handle);
        }

        if self.specs.remove(&id).is_some() {
            self.order.retain(|entry| *entry != id);
            debug!(component = %id, "注销组件");
        }

        Ok(())
    }

    /// 组件类型是否已注册
    pub fn is_registered<C: Component<P>>(&self) -> bool {
        self.is_registered_id(ComponentId::of::<C>())
    }

    /// 以标识查询是否已注册
    pub fn is_registered_id(&self, id: ComponentId) -> bool {
        self.specs.contains_key(&id)
    }

    // ==================== 查询 ====================

    /// 组件是否存在激活实例
    pub fn is_active<C: Component<P>>(&self) -> bool {
        self.is_active_id(ComponentId::of::<C>())
    }

    /// 以标识查询是否激活
    pub fn is_active_id(&self, id: ComponentId) -> bool {
        self.active.contains_key(&id)
    }

    /// 是否已绑定宿主上下文
    pub fn is_bound(&self) -> bool {
        self.context.is_some()
    }

    /// 借用激活实例
    ///
    /// 组件未激活时返回 [`NotActive`](RegistryError::NotActive)。
    pub fn get_active<C: Component<P>>(&self) -> Result<&C> {
        let id = ComponentId::of::<C>();
        self.active
            .get(&id)
            .and_then(|entry| entry.instance.as_any().downcast_ref::<C>())
            .ok_or(RegistryError::NotActive(id.name()))
    }

    /// 可变借用激活实例
    pub fn get_active_mut<C: Component<P>>(&mut self) -> Result<&mut C> {
        let id = ComponentId::of::<C>();
        self.active
            .get_mut(&id)
            .and_then(|entry| entry.instance.as_any_mut().downcast_mut::<C>())
            .ok_or(RegistryError::NotActive(id.name()))
    }

    /// 组件当前所处的生命周期状态
    pub fn state(&self, id: ComponentId) -> ComponentState {
        if let Some(entry) = self.active.get(&id) {
            if self.pending.is_deinit(entry.handle) {
                ComponentState::PendingDeinit
            } else {
                ComponentState::Active
            }
        } else if self.pending.is_init(id) {
            ComponentState::PendingInit
        } else if self.specs.contains_key(&id) {
            ComponentState::Registered
        } else {
            ComponentState::Unregistered
        }
    }

    /// 已注册的组件标识，按注册顺序
    pub fn registered_components(&self) -> Vec<ComponentId> {
        self.order.clone()
    }

    /// 当前激活的组件标识，按注册顺序
    pub fn active_components(&self) -> Vec<ComponentId> {
        self.order
            .iter()
            .filter(|id| self.active.contains_key(id))
            .copied()
            .collect()
    }

    // ==================== 初始化 ====================

    /// 绑定宿主上下文并初始化全部已注册组件
    ///
    /// 按注册顺序初始化所有尚未激活的组件（已被更早条目的依赖解析
    /// 拉起的组件会被跳过），完成后执行一次重载遍历，使相互依赖的
    /// 组件至少观察到一次完整接线的对端集合。
    ///
    /// 返回的 [`TeardownHandle`] 是触发整体卸载的唯一途径。
    pub fn initialize_all(&mut self, context: Arc<P>) -> Result<TeardownHandle> {
        if self.context.is_some() {
            return Err(RegistryError::AlreadyBound);
        }

        info!(registered = self.order.len(), "绑定宿主上下文，开始批量初始化");
        self.context = Some(context);
        self.epoch += 1;

        let queue = self.order.clone();
        for id in queue {
            if self.active.contains_key(&id) {
                continue;
            }
            self.initialize(id)?;
        }

        self.reload_all();

        Ok(TeardownHandle::new(self.registry_id, self.epoch))
    }

    /// 初始化单个组件
    ///
    /// 待定初始化标志在所有退出路径上都会被清除，
    /// 依赖初始化失败不会留下卡死的标志。
    fn initialize(&mut self, id: ComponentId) -> Result<()> {
        if self.active.contains_key(&id) {
            return Err(RegistryError::AlreadyActive(id.name()));
        }
        if self.pending.is_init(id) {
            return Err(RegistryError::PendingInitialization(id.name()));
        }

        self.pending.set_init(id, true);
        let result = self.initialize_inner(id);
        self.pending.set_init(id, false);

        if let Err(ref err) = result {
            warn!(component = %id, error = %err, "组件初始化失败，回滚为未激活");
        }
        result
    }

    fn initialize_inner(&mut self, id: ComponentId) -> Result<()> {
        let decls = self
            .specs
            .get(&id)
            .ok_or(RegistryError::NotRegistered(id.name()))?
            .dependencies
            .clone();

        // 依赖声明只读取这一次，之后走缓存
        self.dependencies
            .resolve(id, || decls.iter().map(|decl| decl.id).collect());

        for decl in decls {
            self.dependencies.register_dependent(decl.id, id);

            if !self.specs.contains_key(&decl.id) {
                // 被依赖但未显式注册的组件凭声明提供函数自动注册
                self.register_spec((decl.provider)())?;
            }
            if !self.active.contains_key(&decl.id) {
                self.initialize(decl.id)?;
            }
        }

        let (context_factory, plain_factory, reloadable, subscriber) = {
            let spec = self
                .specs
                .get(&id)
                .ok_or(RegistryError::NotRegistered(id.name()))?;
            (
                spec.context_factory,
                spec.plain_factory,
                spec.reloadable,
                spec.subscriber,
            )
        };

        let context = self.context.clone().ok_or(RegistryError::NotBound)?;

        // 优先使用接受上下文的构造路径，其次退回无参构造路径
        let constructed = if let Some(factory) = context_factory {
            factory(Arc::clone(&context))
        } else if let Some(factory) = plain_factory {
            factory()
        } else {
            return Err(RegistryError::NoConstructor(id.name()));
        };

        let mut instance = constructed.map_err(|source| RegistryError::ConstructionFailed {
            component: id.name(),
            source,
        })?;

        // 上下文注入独立于构造路径，无参构造的组件同样会收到上下文
        instance.attach(Arc::clone(&context));

        instance
            .init()
            .map_err(|source| RegistryError::ConstructionFailed {
                component: id.name(),
                source,
            })?;

        self.instance_counter += 1;
        let handle = InstanceHandle::new(self.instance_counter);

        if reloadable {
            self.reload_candidates.push((id, handle));
        }
        if subscriber {
            if let Some(bus) = &self.event_bus {
                bus.subscribe(id);
            }
        }

        self.active.insert(id, ActiveEntry { instance, handle });
        info!(component = %id, instance = %handle, "组件初始化完成");

        Ok(())
    }

    // ==================== 卸载 ====================

    /// 执行批量卸载（仅由 [`TeardownHandle`] 调用）
    pub(crate) fn deinitialize_all(
        &mut self,
        registry_id: u64,
        epoch: u64,
        policy: &mut dyn TeardownPolicy,
    ) -> Result<()> {
        if self.context.is_none() {
            return Err(RegistryError::NotBound);
        }
        if registry_id != self.registry_id || epoch != self.epoch {
            return Err(RegistryError::StaleTeardownHandle);
        }

        info!(active = self.active.len(), "开始批量卸载");

        // 以注册顺序的逆序为批次快照，依赖者通常先于依赖被处理
        let batch: Vec<(ComponentId, InstanceHandle)> = self
            .order
            .iter()
            .rev()
            .filter_map(|id| self.active.get(id).map(|entry| (*id, entry.handle)))
            .collect();
        let members: HashSet<InstanceHandle> =
            batch.iter().map(|(_, handle)| *handle).collect();

        let mut outcome = Ok(());
        for (id, handle) in batch {
            let still_active = self
                .active
                .get(&id)
                .map_or(false, |entry| entry.handle == handle);
            if !still_active {
                // 已随某个依赖者在本批次中被卸载
                continue;
            }

            match self.deinitialize(id, Some(&members)) {
                Ok(()) => self.remove_active_if(id, handle),
                Err(err) => match policy.on_failure(&err) {
                    TeardownDecision::Continue => continue,
                    TeardownDecision::Abort => {
                        outcome = Err(err);
                        break;
                    }
                },
            }
        }

        // 无论正常结束还是中止，都解除绑定，允许之后重新批量初始化
        self.context = None;
        info!("批量卸载结束，解除宿主上下文绑定");
        outcome
    }

    /// 卸载单个组件
    ///
    /// `batch` 为本次卸载操作已承诺的实例集合；单独卸载（`None`）
    /// 在存在激活依赖者时总是失败。待定卸载标志在所有退出路径上
    /// 都会被清除。
    fn deinitialize(
        &mut self,
        id: ComponentId,
        batch: Option<&HashSet<InstanceHandle>>,
    ) -> Result<()> {
        let Some(handle) = self.active.get(&id).map(|entry| entry.handle) else {
            return Ok(());
        };

        if self.pending.is_deinit(handle) {
            return Err(RegistryError::PendingDeinitialization(id.name()));
        }

        self.pending.set_deinit(handle, true);
        let result = self.deinitialize_inner(id, batch);
        self.pending.set_deinit(handle, false);

        if let Err(ref err) = result {
            warn!(component = %id, error = %err, "组件卸载失败");
        }
        result
    }

    fn deinitialize_inner(
        &mut self,
        id: ComponentId,
        batch: Option<&HashSet<InstanceHandle>>,
    ) -> Result<()> {
        self.deinitialize_dependents(id, batch)?;

        if let Some(entry) = self.active.get_mut(&id) {
            entry
                .instance
                .unload()
                .map_err(|source| RegistryError::UnloadFailed {
                    component: id.name(),
                    source,
                })?;
        }

        let subscriber = self.specs.get(&id).map_or(false, |spec| spec.subscriber);
        if subscriber {
            if let Some(bus) = &self.event_bus {
                bus.unsubscribe_all(id);
            }
        }

        // 依赖者边恰好在依赖者卸载时移除：解除本组件指向各依赖的边
        if let Some(deps) = self.dependencies.resolved(id).map(|deps| deps.to_vec()) {
            for dependency in deps {
                self.dependencies.unregister_dependent(dependency, id);
            }
        }

        debug!(component = %id, "组件卸载完成");
        Ok(())
    }

    /// 先检查后行动：确认所有激活依赖者都在批次内，再逐个递归卸载
    fn deinitialize_dependents(
        &mut self,
        id: ComponentId,
        batch: Option<&HashSet<InstanceHandle>>,
    ) -> Result<()> {
        let dependents = self.dependencies.dependents_of(id).to_vec();
        if dependents.is_empty() {
            return Ok(());
        }

        // 只有仍然激活且未在卸载途中的依赖者才构成阻塞
        let mut blockers: Vec<(ComponentId, InstanceHandle)> = Vec::new();
        for dependent in &dependents {
            if let Some(entry) = self.active.get(dependent) {
                if !self.pending.is_deinit(entry.handle) {
                    blockers.push((*dependent, entry.handle));
                }
            }
        }
        if blockers.is_empty() {
            return Ok(());
        }

        let Some(batch) = batch else {
            return Err(RegistryError::DependentsStillActive {
                component: id.name(),
                dependents: blockers.iter().map(|(blocker, _)| blocker.name()).collect(),
            });
        };

        // 承诺任何动作之前先确认整个"事务"是安全的
        for (blocker, handle) in &blockers {
            if !batch.contains(handle) {
                return Err(RegistryError::DependentOutsideBatch {
                    component: id.name(),
                    dependent: blocker.name(),
                });
            }
        }

        for (blocker, handle) in blockers {
            let live = self
                .active
                .get(&blocker)
                .map_or(false, |entry| entry.handle == handle && !self.pending.is_deinit(handle));
            if live {
                self.deinitialize(blocker, Some(batch))?;
                self.remove_active_if(blocker, handle);
            }
        }

        Ok(())
    }

    /// 比较后移除：仅当激活表仍指向这个句柄对应的实例时才移除
    fn remove_active_if(&mut self, id: ComponentId, handle: InstanceHandle) {
        if self
            .active
            .get(&id)
            .map_or(false, |entry| entry.handle == handle)
        {
            self.active.remove(&id);
        }
    }

    // ==================== 重载 ====================

    /// 重载全部可重载组件
    ///
    /// 对候选列表的快照逐个处理：先按后序递归重载其可重载的激活
    /// 依赖（依赖先于依赖者刷新），再重载候选自身；同一实例在一次
    /// 遍历中至多重载一次。句柄已失效的候选作为副作用从列表中移除。
    pub fn reload_all(&mut self) {
        debug!(candidates = self.reload_candidates.len(), "开始重载遍历");

        let snapshot = self.reload_candidates.clone();
        let mut reloaded: HashSet<InstanceHandle> = HashSet::new();

        for (id, handle) in snapshot {
            let live = self
                .active
                .get(&id)
                .map_or(false, |entry| entry.handle == handle);
            if !live {
                self.reload_candidates
                    .retain(|candidate| *candidate != (id, handle));
                continue;
            }

            self.reload_component(id, &mut reloaded);
        }
    }

    fn reload_component(&mut self, id: ComponentId, reloaded: &mut HashSet<InstanceHandle>) {
        let deps = self
            .dependencies
            .resolved(id)
            .map(|deps| deps.to_vec())
            .unwrap_or_default();

        for dependency in deps {
            let reloadable = self
                .specs
                .get(&dependency)
                .map_or(false, |spec| spec.reloadable);
            if !reloadable {
                continue;
            }
            let Some(handle) = self.active.get(&dependency).map(|entry| entry.handle) else {
                continue;
            };
            if reloaded.contains(&handle) {
                continue;
            }
            self.reload_component(dependency, reloaded);
        }

        if let Some(entry) = self.active.get_mut(&id) {
            if reloaded.insert(entry.handle) {
                debug!(component = %id, "重载组件");
                entry.instance.reload();
            }
        }
    }
}

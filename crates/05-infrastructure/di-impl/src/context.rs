//! 装配上下文
//!
//! 一次装配过程中唯一的可变状态：组件存储、参数、触发器监听器、
//! 后处理队列以及加载轨迹。

use crate::module::Module;
use crate::parameters::{ParameterValues, TriggerRegistry};
use crate::store::ComponentStore;
use di_abstractions::{
    identity_of, Capability, Erased, Hierarchy, Instance, Parameter, Processor, Resolvable,
    Retriever, Trigger,
};
use infrastructure_common::{ModuleError, ModuleResult, TypeKey};
use std::any::{Any, TypeId};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

type Handler<T> = Box<dyn FnOnce(T)>;
type Evaluate = Box<dyn FnOnce(&dyn Retriever, Box<dyn Any>) -> ModuleResult<()>>;

/// 一个 Resolvable 及其全部处理器
struct Binding {
    evaluate: Evaluate,
    // 实际类型为 `Vec<Handler<T>>`
    handlers: Box<dyn Any>,
}

/// 装配上下文
///
/// 作为参数注册槽位的值传给加载器，也传给后处理器。
pub struct BuildContext {
    store: ComponentStore,
    parameters: ParameterValues,
    triggers: TriggerRegistry,
    processables: Vec<(Processor, Erased)>,
    processed: HashSet<usize>,
    bindings: Vec<Binding>,
    bound: HashMap<(usize, TypeId), usize>,
    load_log: Vec<String>,
}

impl BuildContext {
    /// 以参数快照创建上下文
    pub fn new(parameters: ParameterValues) -> Self {
        Self {
            store: ComponentStore::new(),
            parameters,
            triggers: TriggerRegistry::new(),
            processables: Vec::new(),
            processed: HashSet::new(),
            bindings: Vec::new(),
            bound: HashMap::new(),
            load_log: Vec::new(),
        }
    }

    /// 组件存储
    pub fn store(&self) -> &ComponentStore {
        &self.store
    }

    /// 以实例自身的类型加入组件
    ///
    /// 后处理按静态类型 `T` 判断：以 `Arc<dyn Trait>` 加入的实例即使其实现类型
    /// 声明为可后处理也不会被校验，需要后处理时应以具体类型加入。
    pub fn add_component<T: Capability + ?Sized>(&mut self, value: Arc<T>) -> ModuleResult<Arc<T>> {
        self.add_component_as::<T, T>(value)
    }

    /// 以公开类型 `P` 加入组件，`P` 必须是 `T` 自身或其祖先
    ///
    /// 实例被索引到 `P` 的祖先闭包下。若 `T` 声明为可后处理，
    /// 同一实例只排队一次。
    pub fn add_component_as<P, T>(&mut self, value: Arc<T>) -> ModuleResult<Arc<T>>
    where
        P: Capability + ?Sized,
        T: Capability + ?Sized,
    {
        let own = Hierarchy::of::<T>();
        let public = TypeKey::of::<P>();
        let erased: Erased = Arc::new(Arc::clone(&value));
        let cast = own.cast(public, &erased).ok_or_else(|| {
            ModuleError::module(format!("{} 不是 {} 的祖先类型", public, own.root()))
        })?;

        let identity = identity_of(&value);
        if public == own.root() {
            self.store.index(&own, &cast, own.root(), identity)?;
        } else {
            self.store
                .index(&Hierarchy::of::<P>(), &cast, own.root(), identity)?;
        }
        debug!(
            capability = public.short_name(),
            implementation = own.root().short_name(),
            "加入组件"
        );

        if let Some(processor) = own.processor() {
            if self.processed.insert(identity) {
                self.processables.push((Arc::clone(processor), erased));
            }
        }
        Ok(value)
    }

    /// 读取参数值，未设置时返回 `None`
    pub fn get_value<T: Clone + 'static>(&self, parameter: &Parameter<T>) -> Option<T> {
        self.parameters.get(parameter)
    }

    /// 读取必需的参数值
    pub fn get_required_value<T: Clone + 'static>(&self, parameter: &Parameter<T>) -> ModuleResult<T> {
        self.get_value(parameter)
            .ok_or(ModuleError::MissingParameter {
                name: parameter.name(),
            })
    }

    /// 参数是否已设置
    pub fn is_value_set<T: 'static>(&self, parameter: &Parameter<T>) -> bool {
        self.parameters.contains(parameter)
    }

    /// 注册触发器监听器
    pub fn add_listener<T, F>(&mut self, trigger: &Trigger<T>, listener: F)
    where
        T: 'static,
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.triggers.add(trigger, listener);
    }

    /// 为 Resolvable 绑定处理器
    ///
    /// 同一个 Resolvable（按 `Arc` 标识）只求值一次，结果分发给全部处理器。
    pub fn add_bound_handler<T, R, F>(&mut self, resolvable: &Arc<R>, handler: F)
    where
        T: Clone + 'static,
        R: Resolvable<T> + ?Sized + 'static,
        F: FnOnce(T) + 'static,
    {
        let key = (identity_of(resolvable), TypeId::of::<T>());
        let index = match self.bound.get(&key) {
            Some(index) => *index,
            None => {
                let source = Arc::clone(resolvable);
                let evaluate: Evaluate = Box::new(move |components, handlers| {
                    let value: T = Resolvable::<T>::resolve(source.as_ref(), components)?;
                    let handlers = handlers
                        .downcast::<Vec<Handler<T>>>()
                        .map_err(|_| ModuleError::module("绑定处理器类型不匹配"))?;
                    for handler in *handlers {
                        handler(value.clone());
                    }
                    Ok(())
                });
                self.bindings.push(Binding {
                    evaluate,
                    handlers: Box::new(Vec::<Handler<T>>::new()),
                });
                self.bound.insert(key, self.bindings.len() - 1);
                self.bindings.len() - 1
            }
        };

        if let Some(handlers) = self.bindings[index]
            .handlers
            .downcast_mut::<Vec<Handler<T>>>()
        {
            handlers.push(Box::new(handler));
        }
    }

    /// 到目前为止的加载轨迹
    pub fn load_log(&self) -> &[String] {
        &self.load_log
    }

    pub(crate) fn push_load_log(&mut self, entry: &str) {
        self.load_log.push(entry.to_string());
    }

    /// 执行排队的后处理：先执行组件校验，再对 Resolvable 求值
    pub(crate) fn finish(&mut self) -> ModuleResult<()> {
        let processables = std::mem::take(&mut self.processables);
        debug!(count = processables.len(), "执行组件后处理");
        for (processor, value) in processables {
            processor(&value, &self.store).map_err(|err| {
                ModuleError::wrap_with(err, |cause| format!("组件后处理失败: {cause}"))
            })?;
        }

        let bindings = std::mem::take(&mut self.bindings);
        self.bound.clear();
        debug!(count = bindings.len(), "对绑定值求值");
        for binding in bindings {
            (binding.evaluate)(&self.store, binding.handlers)?;
        }
        Ok(())
    }

    pub(crate) fn into_module(self) -> Module {
        Module::new(self.store, self.triggers, self.load_log)
    }
}

impl Retriever for BuildContext {
    fn lookup(&self, capability: TypeKey) -> ModuleResult<&Instance> {
        self.store.lookup(capability)
    }

    fn contains(&self, capability: TypeKey) -> bool {
        self.store.contains(capability)
    }
}

//! 装配完成的模块

use crate::parameters::TriggerRegistry;
use crate::store::ComponentStore;
use di_abstractions::{Instance, Retriever, RetrieverExt, Trigger};
use infrastructure_common::{ModuleResult, TypeKey};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// 只读的组件模块
///
/// 组件读取可以并发进行。触发器是唯一的可变入口，监听器在调用线程上同步执行，
/// 并发设置同一触发器时需要调用方自行串行化。
pub struct Module {
    store: ComponentStore,
    triggers: TriggerRegistry,
    load_log: Vec<String>,
}

impl Module {
    pub(crate) fn new(store: ComponentStore, triggers: TriggerRegistry, load_log: Vec<String>) -> Self {
        Self {
            store,
            triggers,
            load_log,
        }
    }

    /// 获取能力类型 `T` 的唯一实例
    pub fn get_instance<T: ?Sized + 'static>(&self) -> ModuleResult<Arc<T>> {
        self.store.get::<T>()
    }

    /// 是否存在能力类型 `T` 的实例
    pub fn has_instance<T: ?Sized + 'static>(&self) -> bool {
        self.store.has::<T>()
    }

    /// 设置触发器的值，按注册顺序通知全部监听器
    pub fn set_parameter<T: 'static>(&self, trigger: &Trigger<T>, value: T) -> ModuleResult<&Self> {
        let notified = self.triggers.fire(trigger, &value)?;
        debug!(trigger = trigger.name(), listeners = notified, "触发器已设置");
        Ok(self)
    }

    /// 实际执行过的加载器，按完成顺序
    pub fn load_log(&self) -> &[String] {
        &self.load_log
    }
}

impl Retriever for Module {
    fn lookup(&self, capability: TypeKey) -> ModuleResult<&Instance> {
        self.store.lookup(capability)
    }

    fn contains(&self, capability: TypeKey) -> bool {
        self.store.contains(capability)
    }
}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Module")
            .field("capabilities", &self.store.len())
            .field("triggers", &self.triggers)
            .field("load_log", &self.load_log)
            .finish()
    }
}

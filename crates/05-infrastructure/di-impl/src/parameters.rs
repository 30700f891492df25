//! 参数值与触发器注册表

use di_abstractions::{Parameter, ParameterKey, Trigger};
use infrastructure_common::{ModuleError, ModuleResult};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// 一次装配使用的参数值
///
/// 构建器持有一份，每次装配复制一份快照。
#[derive(Clone, Default)]
pub struct ParameterValues {
    values: HashMap<ParameterKey, Arc<dyn Any + Send + Sync>>,
}

impl ParameterValues {
    /// 创建空参数表
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置参数值，覆盖已有值
    pub fn set<T: Send + Sync + 'static>(&mut self, parameter: &Parameter<T>, value: T) {
        self.values.insert(parameter.key(), Arc::new(value));
    }

    /// 清除参数值
    pub fn clear<T: 'static>(&mut self, parameter: &Parameter<T>) {
        self.values.remove(&parameter.key());
    }

    /// 读取参数值
    pub fn get<T: Clone + 'static>(&self, parameter: &Parameter<T>) -> Option<T> {
        self.values
            .get(&parameter.key())
            .and_then(|value| value.downcast_ref::<T>())
            .cloned()
    }

    /// 参数是否已设置
    pub fn contains<T: 'static>(&self, parameter: &Parameter<T>) -> bool {
        self.values.contains_key(&parameter.key())
    }

    /// 已设置的参数数量
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for ParameterValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(self.values.keys().map(|key| key.name))
            .finish()
    }
}

type Listener<T> = Box<dyn Fn(&T) + Send + Sync>;

/// 触发器监听器注册表
#[derive(Default)]
pub struct TriggerRegistry {
    // 每个元素都是 `Listener<T>`，T 由键中的值类型决定
    listeners: HashMap<ParameterKey, Vec<Box<dyn Any + Send + Sync>>>,
}

impl TriggerRegistry {
    /// 创建空注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加监听器
    pub fn add<T, F>(&mut self, trigger: &Trigger<T>, listener: F)
    where
        T: 'static,
        F: Fn(&T) + Send + Sync + 'static,
    {
        let listener: Listener<T> = Box::new(listener);
        self.listeners
            .entry(trigger.key())
            .or_default()
            .push(Box::new(listener));
    }

    /// 按注册顺序通知全部监听器，返回被调用的监听器数量
    ///
    /// 没有任何监听器时返回错误。
    pub fn fire<T: 'static>(&self, trigger: &Trigger<T>, value: &T) -> ModuleResult<usize> {
        let registered = self
            .listeners
            .get(&trigger.key())
            .filter(|registered| !registered.is_empty())
            .ok_or_else(|| {
                ModuleError::module(format!(
                    "触发器 '{}' 没有注册任何监听器",
                    trigger.name()
                ))
            })?;

        let mut notified = 0;
        for listener in registered {
            if let Some(listener) = listener.downcast_ref::<Listener<T>>() {
                listener(value);
                notified += 1;
            }
        }
        Ok(notified)
    }

    /// 某个触发器的监听器数量
    pub fn listener_count<T: 'static>(&self, trigger: &Trigger<T>) -> usize {
        self.listeners.get(&trigger.key()).map_or(0, Vec::len)
    }
}

impl fmt::Debug for TriggerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.listeners
                    .iter()
                    .map(|(key, registered)| (key.name, registered.len())),
            )
            .finish()
    }
}

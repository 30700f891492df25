//! 延迟求值的值与按实现分派的选择器
//!
//! [`Resolvable`] 在组件图完全装配后求值一次，结果分发给所有绑定的处理器。

use crate::retriever::{Retriever, RetrieverExt};
use infrastructure_common::{ModuleError, ModuleResult, TypeKey};
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;

/// 延迟求值 trait
pub trait Resolvable<T>: Send + Sync {
    /// 基于最终的组件存储计算值
    fn resolve(&self, components: &dyn Retriever) -> ModuleResult<T>;
}

impl<T, R: Resolvable<T> + ?Sized> Resolvable<T> for Arc<R> {
    fn resolve(&self, components: &dyn Retriever) -> ModuleResult<T> {
        (**self).resolve(components)
    }
}

/// 由单个已装配组件计算出的值
pub struct BoundValue<K: ?Sized, T, F> {
    func: F,
    _marker: PhantomData<fn(&K) -> T>,
}

impl<K, T, F> Resolvable<T> for BoundValue<K, T, F>
where
    K: ?Sized + 'static,
    F: Fn(Arc<K>) -> T + Send + Sync,
{
    fn resolve(&self, components: &dyn Retriever) -> ModuleResult<T> {
        let bounded = components.get::<K>()?;
        Ok((self.func)(bounded))
    }
}

/// 创建绑定到能力类型 `K` 的延迟值
pub fn bound_to<K, T, F>(func: F) -> BoundValue<K, T, F>
where
    K: ?Sized + 'static,
    F: Fn(Arc<K>) -> T + Send + Sync,
{
    BoundValue {
        func,
        _marker: PhantomData,
    }
}

/// 精确匹配的策略表
#[derive(Clone)]
pub struct Selector<K, V> {
    entries: HashMap<K, V>,
}

impl<K: Eq + Hash + fmt::Debug, V> Selector<K, V> {
    /// 创建空表
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// 添加一项，已存在的键被覆盖
    pub fn add(&mut self, key: K, value: V) -> &mut Self {
        self.entries.insert(key, value);
        self
    }

    /// 构建器风格的 [`Selector::add`]
    #[must_use]
    pub fn with(mut self, key: K, value: V) -> Self {
        self.entries.insert(key, value);
        self
    }

    /// 按键查找
    pub fn get(&self, key: &K) -> ModuleResult<&V> {
        self.entries
            .get(key)
            .ok_or_else(|| ModuleError::module(format!("选择器中不存在键: {key:?}")))
    }

    /// 是否存在该键
    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// 表项数量
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> Selector<TypeKey, V> {
    /// 以具体实现类型 `I` 为键添加一项
    #[must_use]
    pub fn with_implementation<I: ?Sized + 'static>(self, value: V) -> Self {
        self.with(TypeKey::of::<I>(), value)
    }
}

impl<K: Eq + Hash + fmt::Debug, V> Default for Selector<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug, V> fmt::Debug for Selector<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}

/// 按绑定能力的具体实现分派的值
///
/// 先读取能力类型 `bounded` 的唯一实例，再以它的实现类型在选择器中查找。
/// 实现本身不需要知道这张表的存在。
pub struct SelectableValue<T> {
    bounded: TypeKey,
    selector: Selector<TypeKey, T>,
}

impl<T> SelectableValue<T> {
    /// 以能力类型 `K` 为绑定类型创建
    pub fn new<K: ?Sized + 'static>(selector: Selector<TypeKey, T>) -> Self {
        Self {
            bounded: TypeKey::of::<K>(),
            selector,
        }
    }
}

impl<T: Clone + Send + Sync> Resolvable<T> for SelectableValue<T> {
    fn resolve(&self, components: &dyn Retriever) -> ModuleResult<T> {
        if !components.contains(self.bounded) {
            return Err(ModuleError::load(format!(
                "无法获取必需的绑定实例: {}",
                self.bounded
            )));
        }
        let implementation = components.lookup(self.bounded)?.implementation();
        self.selector.get(&implementation).cloned()
    }
}

impl<T> fmt::Debug for SelectableValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectableValue")
            .field("bounded", &self.bounded)
            .field("selector", &self.selector)
            .finish()
    }
}

//! 加载器描述
//!
//! 加载器由声明的提供类型、有序的输入槽位和执行函数组成。
//!
//! ```rust,ignore
//! let unit = LoaderUnit::builder("complex")
//!     .provides::<SimpleComplexEntity>()
//!     .requires_provider()
//!     .requires::<dyn Entity>()
//!     .build(|args| {
//!         let entity = args.component::<dyn Entity>(1)?;
//!         args.provider(0)?.provide(SimpleComplexEntity::new(entity))?;
//!         Ok(())
//!     });
//! ```

use crate::context::BuildContext;
use crate::provider::{ConstrainedProvider, ProviderHandle};
use di_abstractions::{Capability, Hierarchy, Instance};
use infrastructure_common::{ModuleError, ModuleResult, TypeKey};
use std::fmt;
use std::sync::Arc;

/// 加载器执行函数
pub type Routine = Arc<dyn Fn(&mut Arguments<'_>) -> anyhow::Result<()> + Send + Sync>;

/// 输入槽位
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// 组件依赖
    Component(TypeKey),
    /// 受约束的提供者
    Provider,
    /// 参数注册（装配上下文本身）
    Parameters,
}

/// 声明的提供类型
#[derive(Clone, Copy)]
pub struct DeclaredType {
    key: TypeKey,
    hierarchy: fn() -> Hierarchy,
}

impl DeclaredType {
    /// 声明类型 `T`
    pub fn of<T: Capability + ?Sized>() -> Self {
        Self {
            key: TypeKey::of::<T>(),
            hierarchy: Hierarchy::of::<T>,
        }
    }

    /// 类型标识
    pub fn key(&self) -> TypeKey {
        self.key
    }

    /// 计算祖先闭包
    pub fn hierarchy(&self) -> Hierarchy {
        (self.hierarchy)()
    }
}

impl fmt::Debug for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.key, f)
    }
}

/// 加载器描述
#[derive(Clone)]
pub struct LoaderUnit {
    name: String,
    declared: Vec<DeclaredType>,
    slots: Vec<Slot>,
    routine: Routine,
}

impl LoaderUnit {
    /// 开始构建加载器
    pub fn builder(name: impl Into<String>) -> LoaderUnitBuilder {
        LoaderUnitBuilder {
            name: name.into(),
            declared: Vec::new(),
            slots: Vec::new(),
        }
    }

    /// 加载器名称
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 声明的提供类型
    pub fn declared(&self) -> &[DeclaredType] {
        &self.declared
    }

    /// 输入槽位
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub(crate) fn routine(&self) -> &Routine {
        &self.routine
    }
}

impl fmt::Debug for LoaderUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoaderUnit")
            .field("name", &self.name)
            .field("declared", &self.declared)
            .field("slots", &self.slots)
            .finish_non_exhaustive()
    }
}

/// 加载器构建器
#[derive(Debug)]
pub struct LoaderUnitBuilder {
    name: String,
    declared: Vec<DeclaredType>,
    slots: Vec<Slot>,
}

impl LoaderUnitBuilder {
    /// 声明提供类型 `T`，重复声明被忽略
    #[must_use]
    pub fn provides<T: Capability + ?Sized>(mut self) -> Self {
        let declared = DeclaredType::of::<T>();
        if !self.declared.iter().any(|entry| entry.key == declared.key) {
            self.declared.push(declared);
        }
        self
    }

    /// 追加组件依赖槽位
    #[must_use]
    pub fn requires<T: ?Sized + 'static>(mut self) -> Self {
        self.slots.push(Slot::Component(TypeKey::of::<T>()));
        self
    }

    /// 追加受约束提供者槽位
    #[must_use]
    pub fn requires_provider(mut self) -> Self {
        self.slots.push(Slot::Provider);
        self
    }

    /// 追加参数注册槽位
    #[must_use]
    pub fn requires_parameters(mut self) -> Self {
        self.slots.push(Slot::Parameters);
        self
    }

    /// 以执行函数完成构建
    pub fn build<F>(self, routine: F) -> LoaderUnit
    where
        F: Fn(&mut Arguments<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        LoaderUnit {
            name: self.name,
            declared: self.declared,
            slots: self.slots,
            routine: Arc::new(routine),
        }
    }
}

/// 已绑定的槽位值
#[derive(Debug)]
pub(crate) enum Argument {
    Component(Instance),
    Provider,
    Parameters,
}

/// 按位置访问的加载器参数
pub struct Arguments<'a> {
    unit: &'a str,
    values: Vec<Argument>,
    provider: Option<ConstrainedProvider>,
    context: &'a mut BuildContext,
}

impl<'a> Arguments<'a> {
    pub(crate) fn new(
        unit: &'a str,
        values: Vec<Argument>,
        provider: Option<ConstrainedProvider>,
        context: &'a mut BuildContext,
    ) -> Self {
        Self {
            unit,
            values,
            provider,
            context,
        }
    }

    /// 参数数量
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// 是否没有参数
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn slot(&self, index: usize) -> ModuleResult<&Argument> {
        self.values.get(index).ok_or_else(|| {
            ModuleError::load(format!(
                "加载器 '{}' 没有第 {} 个参数",
                self.unit, index
            ))
        })
    }

    fn mismatch(&self, index: usize, expected: &str) -> ModuleError {
        ModuleError::load(format!(
            "加载器 '{}' 的第 {} 个参数不是{}",
            self.unit, index, expected
        ))
    }

    /// 读取组件参数
    pub fn component<T: ?Sized + 'static>(&self, index: usize) -> ModuleResult<Arc<T>> {
        match self.slot(index)? {
            Argument::Component(instance) => instance.downcast::<T>(),
            _ => Err(self.mismatch(index, "组件")),
        }
    }

    /// 获取提供者参数
    pub fn provider(&mut self, index: usize) -> ModuleResult<ProviderHandle<'_>> {
        let unit = self.unit;
        if !matches!(self.slot(index)?, Argument::Provider) {
            return Err(self.mismatch(index, "提供者"));
        }
        match self.provider.as_mut() {
            Some(provider) => Ok(ProviderHandle::new(provider, &mut *self.context)),
            None => Err(ModuleError::load(format!("加载器 '{unit}' 没有创建提供者"))),
        }
    }

    /// 获取参数注册（装配上下文）
    pub fn parameters(&mut self, index: usize) -> ModuleResult<&mut BuildContext> {
        if !matches!(self.slot(index)?, Argument::Parameters) {
            return Err(self.mismatch(index, "参数注册"));
        }
        Ok(&mut *self.context)
    }

    pub(crate) fn into_provider(self) -> Option<ConstrainedProvider> {
        self.provider
    }
}

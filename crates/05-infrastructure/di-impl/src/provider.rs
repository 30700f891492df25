//! 受约束的组件提供者

use crate::context::BuildContext;
use crate::loader::{DeclaredType, Slot};
use di_abstractions::Capability;
use infrastructure_common::{ModuleError, ModuleResult, TypeKey};
use std::collections::HashSet;
use std::sync::Arc;

/// 只允许提供加载器已声明类型的提供者
///
/// 已经作为组件槽位直接输入的声明类型不需要再次提供，也不允许再次提供。
#[derive(Debug)]
pub struct ConstrainedProvider {
    unit: String,
    to_provide: Vec<TypeKey>,
    provided: HashSet<TypeKey>,
    rejected: Option<TypeKey>,
}

impl ConstrainedProvider {
    pub(crate) fn new(unit: &str, declared: &[DeclaredType], slots: &[Slot]) -> Self {
        let inputs: HashSet<TypeKey> = slots
            .iter()
            .filter_map(|slot| match slot {
                Slot::Component(key) => Some(*key),
                _ => None,
            })
            .collect();
        let to_provide = declared
            .iter()
            .map(DeclaredType::key)
            .filter(|key| !inputs.contains(key))
            .collect();
        Self {
            unit: unit.to_string(),
            to_provide,
            provided: HashSet::new(),
            rejected: None,
        }
    }

    /// 需要提供的类型，按声明顺序
    pub fn to_provide(&self) -> &[TypeKey] {
        &self.to_provide
    }

    /// 记录第一次越权提供，加载器忽略该错误时仍会在校验时报告
    fn check(&mut self, capability: TypeKey) -> ModuleResult<()> {
        if self.to_provide.contains(&capability) {
            return Ok(());
        }
        self.rejected.get_or_insert(capability);
        Err(ModuleError::NonDeclaredProviding {
            capability,
            unit: self.unit.clone(),
        })
    }

    /// 检查没有越权提供，且所有声明类型都已提供
    pub(crate) fn validate(&self) -> ModuleResult<()> {
        if let Some(capability) = self.rejected {
            return Err(ModuleError::NonDeclaredProviding {
                capability,
                unit: self.unit.clone(),
            });
        }
        match self
            .to_provide
            .iter()
            .find(|key| !self.provided.contains(*key))
        {
            Some(missing) => Err(ModuleError::MissingProviding {
                capability: *missing,
                unit: self.unit.clone(),
            }),
            None => Ok(()),
        }
    }
}

/// 加载器执行期间可用的提供者句柄
pub struct ProviderHandle<'a> {
    provider: &'a mut ConstrainedProvider,
    context: &'a mut BuildContext,
}

impl<'a> ProviderHandle<'a> {
    pub(crate) fn new(provider: &'a mut ConstrainedProvider, context: &'a mut BuildContext) -> Self {
        Self { provider, context }
    }

    /// 需要提供的声明类型
    pub fn to_provide(&self) -> &[TypeKey] {
        self.provider.to_provide()
    }

    /// 以实例自身的类型提供组件
    pub fn provide<T: Capability>(&mut self, value: T) -> ModuleResult<Arc<T>> {
        self.provide_shared(Arc::new(value))
    }

    /// 以实例自身的类型提供共享组件
    ///
    /// 是否执行组件后处理由静态类型 `T` 的声明决定；以 `Arc<dyn Trait>`
    /// 提供的实例不会触发其实现类型上声明的后处理。
    pub fn provide_shared<T: Capability + ?Sized>(&mut self, value: Arc<T>) -> ModuleResult<Arc<T>> {
        self.provide_as::<T, T>(value)
    }

    /// 以声明的公开类型 `P` 提供组件
    ///
    /// 对同一实例多次调用可以把它提供为多个声明类型。
    pub fn provide_as<P, T>(&mut self, value: Arc<T>) -> ModuleResult<Arc<T>>
    where
        P: Capability + ?Sized,
        T: Capability + ?Sized,
    {
        let capability = TypeKey::of::<P>();
        self.provider.check(capability)?;
        let value = self.context.add_component_as::<P, T>(value)?;
        self.provider.provided.insert(capability);
        Ok(value)
    }

    /// 装配上下文
    pub fn context(&mut self) -> &mut BuildContext {
        &mut *self.context
    }
}

//! 组件读取接口

use crate::component::Instance;
use infrastructure_common::{ModuleResult, TypeKey};
use std::sync::Arc;

/// 组件读取器 trait
///
/// 读取遵循"恰好一个实例"约定：不存在时返回
/// [`ModuleError::MissingComponent`](infrastructure_common::ModuleError::MissingComponent)，
/// 存在多个时返回
/// [`ModuleError::AmbiguousImplementation`](infrastructure_common::ModuleError::AmbiguousImplementation)。
pub trait Retriever {
    /// 按能力类型查找唯一实例
    fn lookup(&self, capability: TypeKey) -> ModuleResult<&Instance>;

    /// 检查是否存在实例，不做歧义判断
    fn contains(&self, capability: TypeKey) -> bool;
}

/// 组件读取器的类型化扩展
pub trait RetrieverExt: Retriever {
    /// 获取唯一实例
    fn get<T: ?Sized + 'static>(&self) -> ModuleResult<Arc<T>> {
        self.lookup(TypeKey::of::<T>())?.downcast::<T>()
    }

    /// 检查是否存在实例
    fn has<T: ?Sized + 'static>(&self) -> bool {
        self.contains(TypeKey::of::<T>())
    }

    /// 获取能力类型解析到的具体实现类型
    fn implementation_of<T: ?Sized + 'static>(&self) -> ModuleResult<TypeKey> {
        Ok(self.lookup(TypeKey::of::<T>())?.implementation())
    }
}

impl<R: Retriever + ?Sized> RetrieverExt for R {}

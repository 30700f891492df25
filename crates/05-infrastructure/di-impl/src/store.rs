//! 组件存储

use di_abstractions::{Erased, Hierarchy, Instance, Retriever};
use infrastructure_common::{ModuleError, ModuleResult, TypeKey};
use std::collections::HashMap;
use tracing::trace;

/// 按能力类型索引的组件多重映射
///
/// 写入时不检查歧义，读取时遵循"恰好一个实例"约定。
#[derive(Debug, Default)]
pub struct ComponentStore {
    buckets: HashMap<TypeKey, Vec<Instance>>,
}

impl ComponentStore {
    /// 创建空存储
    pub fn new() -> Self {
        Self::default()
    }

    /// 把一个实例索引到层次中的每个类型下
    ///
    /// `value` 必须保存层次根类型的 `Arc`。同一实例在某个类型下只索引一次，
    /// 以多个声明类型提供同一实例时共同的祖先不会出现歧义。
    pub fn index(
        &mut self,
        hierarchy: &Hierarchy,
        value: &Erased,
        implementation: TypeKey,
        identity: usize,
    ) -> ModuleResult<()> {
        for (capability, caster) in hierarchy.entries() {
            let cast = caster(value).ok_or_else(|| {
                ModuleError::module(format!(
                    "无法把 {} 转换为 {}",
                    hierarchy.root(),
                    capability
                ))
            })?;
            let bucket = self.buckets.entry(capability).or_default();
            if bucket.iter().any(|instance| instance.identity() == identity) {
                continue;
            }
            trace!(
                capability = capability.short_name(),
                implementation = implementation.short_name(),
                "索引组件"
            );
            bucket.push(Instance::new(capability, implementation, identity, cast));
        }
        Ok(())
    }

    /// 某个能力类型下的实例数量
    pub fn count(&self, capability: TypeKey) -> usize {
        self.buckets.get(&capability).map_or(0, Vec::len)
    }

    /// 某个能力类型下的全部实例
    pub fn all(&self, capability: TypeKey) -> &[Instance] {
        self.buckets.get(&capability).map(Vec::as_slice).unwrap_or(&[])
    }

    /// 已索引的能力类型数量
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

impl Retriever for ComponentStore {
    fn lookup(&self, capability: TypeKey) -> ModuleResult<&Instance> {
        match self.all(capability) {
            [] => Err(ModuleError::MissingComponent { capability }),
            [single] => Ok(single),
            [first, second, ..] => Err(ModuleError::AmbiguousImplementation {
                capability,
                first: first.implementation(),
                second: second.implementation(),
            }),
        }
    }

    fn contains(&self, capability: TypeKey) -> bool {
        self.count(capability) > 0
    }
}

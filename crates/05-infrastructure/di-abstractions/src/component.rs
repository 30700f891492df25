//! 已装配组件的类型擦除表示

use crate::retriever::Retriever;
use infrastructure_common::{ModuleError, ModuleResult, TypeKey};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// 类型擦除的组件值，内部保存某个 `Arc<T>`
pub type Erased = Arc<dyn Any + Send + Sync>;

/// 组件存储中的一条记录
#[derive(Clone)]
pub struct Instance {
    /// 索引所用的能力类型
    capability: TypeKey,
    /// 提供时的具体实现类型
    implementation: TypeKey,
    /// 实例标识（数据指针地址）
    identity: usize,
    /// 保存 `Arc<capability>` 的擦除值
    value: Erased,
}

impl Instance {
    /// 创建新的组件记录
    pub fn new(capability: TypeKey, implementation: TypeKey, identity: usize, value: Erased) -> Self {
        Self {
            capability,
            implementation,
            identity,
            value,
        }
    }

    /// 索引所用的能力类型
    pub fn capability(&self) -> TypeKey {
        self.capability
    }

    /// 具体实现类型
    pub fn implementation(&self) -> TypeKey {
        self.implementation
    }

    /// 实例标识，同一对象在不同能力类型下标识相同
    pub fn identity(&self) -> usize {
        self.identity
    }

    /// 还原为具体的 `Arc<T>`
    pub fn downcast<T: ?Sized + 'static>(&self) -> ModuleResult<Arc<T>> {
        self.value.downcast_ref::<Arc<T>>().cloned().ok_or_else(|| {
            ModuleError::module(format!(
                "组件 {} 不能作为 {} 使用",
                self.capability,
                TypeKey::of::<T>()
            ))
        })
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("capability", &self.capability)
            .field("implementation", &self.implementation)
            .field("identity", &format_args!("{:#x}", self.identity))
            .finish()
    }
}

/// 装配完成后需要执行校验或收尾的组件
///
/// 通过 [`Ancestry::processable`](crate::Ancestry::processable) 声明后，
/// 组件被加入存储时会排入后处理队列，每个实例只执行一次。
pub trait Processable: Send + Sync {
    /// 执行校验
    fn process(&self, components: &dyn Retriever) -> anyhow::Result<()>;
}

/// 获取 `Arc` 的数据指针地址作为实例标识
pub fn identity_of<T: ?Sized>(instance: &Arc<T>) -> usize {
    Arc::as_ptr(instance).cast::<()>() as usize
}

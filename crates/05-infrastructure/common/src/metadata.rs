//! 类型元数据定义
//!
//! 提供能力类型（capability type）的标识信息

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

/// 能力类型标识
///
/// 组件存储和依赖图中使用的查找键。相等性只由 [`TypeId`] 决定，
/// 名称仅用于诊断输出。
#[derive(Clone, Copy)]
pub struct TypeKey {
    /// 类型ID
    id: TypeId,
    /// 完整类型名称
    name: &'static str,
}

impl TypeKey {
    /// 从类型获取类型标识
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// 类型ID
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// 完整类型名称
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// 获取简短的类型名称（不包含模块路径）
    pub fn short_name(&self) -> &'static str {
        if self.name.starts_with("dyn ") {
            return self.name;
        }
        // 泛型参数中也可能出现 `::`，只截取参数列表之前的部分
        let head = self.name.split('<').next().unwrap_or(self.name);
        match head.rfind("::") {
            Some(pos) => &self.name[pos + 2..],
            None => self.name,
        }
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

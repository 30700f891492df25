//! 参数与触发器键

use std::any::TypeId;
use std::fmt;
use std::marker::PhantomData;

/// 参数键，由名称和值类型共同标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParameterKey {
    /// 参数名称
    pub name: &'static str,
    /// 值类型
    pub value_type: TypeId,
}

/// 装配前提供的只读配置参数
///
/// 可以声明为 `static`：
///
/// ```rust,ignore
/// static PORT: Parameter<u16> = Parameter::new("server.port");
/// ```
pub struct Parameter<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T: 'static> Parameter<T> {
    /// 创建参数键
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    /// 参数名称
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// 存储键
    pub fn key(&self) -> ParameterKey {
        ParameterKey {
            name: self.name,
            value_type: TypeId::of::<T>(),
        }
    }
}

impl<T> Clone for Parameter<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Parameter<T> {}

impl<T> fmt::Debug for Parameter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Parameter").field(&self.name).finish()
    }
}

/// 装配完成后仍可设置的值
///
/// 每次设置都会按注册顺序同步通知全部监听器。
pub struct Trigger<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T: 'static> Trigger<T> {
    /// 创建触发器键
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    /// 触发器名称
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// 监听器注册表键
    pub fn key(&self) -> ParameterKey {
        ParameterKey {
            name: self.name,
            value_type: TypeId::of::<T>(),
        }
    }
}

impl<T> Clone for Trigger<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Trigger<T> {}

impl<T> fmt::Debug for Trigger<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Trigger").field(&self.name).finish()
    }
}

//! 错误类型定义

use crate::metadata::TypeKey;
use std::fmt;
use thiserror::Error;

/// 循环依赖错误
///
/// 每一层递归在向上传播时追加一帧，帧按从内到外的顺序保存。
#[derive(Debug, Clone)]
pub struct CyclicDependency {
    message: String,
    stack: Vec<String>,
}

impl CyclicDependency {
    /// 创建新的循环依赖错误
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stack: Vec::new(),
        }
    }

    /// 追加一帧调用路径
    pub fn push_frame(&mut self, frame: impl Into<String>) {
        self.stack.push(frame.into());
    }

    /// 原始消息
    pub fn message(&self) -> &str {
        &self.message
    }

    /// 调用路径，最内层在前
    pub fn path(&self) -> &[String] {
        &self.stack
    }
}

impl fmt::Display for CyclicDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        if !self.stack.is_empty() {
            f.write_str(".\n调用栈:\n")?;
            for frame in self.stack.iter().rev() {
                writeln!(f, "> {frame}")?;
            }
        }
        Ok(())
    }
}

/// 模块装配错误类型
#[derive(Error, Debug)]
pub enum ModuleError {
    #[error("组件不存在: {capability}")]
    MissingComponent { capability: TypeKey },

    #[error("组件实现不唯一: {capability}, 至少存在 {first} 与 {second}")]
    AmbiguousImplementation {
        capability: TypeKey,
        first: TypeKey,
        second: TypeKey,
    },

    #[error("必需参数未设置: {name}")]
    MissingParameter { name: &'static str },

    #[error("加载器 '{unit}' 声明了 {capability} 但没有提供")]
    MissingProviding { capability: TypeKey, unit: String },

    #[error("加载器 '{unit}' 提供了未声明的类型 {capability}")]
    NonDeclaredProviding { capability: TypeKey, unit: String },

    #[error("加载器 '{unit}' 的依赖 {capability} 没有任何提供者")]
    UnmetDependency { capability: TypeKey, unit: String },

    #[error("{0}")]
    CyclicDependency(CyclicDependency),

    #[error("加载失败: {message}")]
    Load {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("模块错误: {message}")]
    Module { message: String },
}

impl ModuleError {
    /// 创建加载失败错误
    pub fn load(message: impl Into<String>) -> Self {
        Self::Load {
            message: message.into(),
            source: None,
        }
    }

    /// 创建模块错误
    pub fn module(message: impl Into<String>) -> Self {
        Self::Module {
            message: message.into(),
        }
    }

    /// 创建循环依赖错误
    pub fn cyclic(message: impl Into<String>) -> Self {
        Self::CyclicDependency(CyclicDependency::new(message))
    }

    /// 转换外部代码返回的错误
    ///
    /// 已经是 [`ModuleError`] 的错误原样返回，其余包装为 [`ModuleError::Load`]。
    pub fn wrap_with(err: anyhow::Error, describe: impl FnOnce(&anyhow::Error) -> String) -> Self {
        match err.downcast::<Self>() {
            Ok(module_error) => module_error,
            Err(other) => Self::Load {
                message: describe(&other),
                source: Some(other.into()),
            },
        }
    }

    /// 是否为循环依赖错误
    pub fn is_cyclic(&self) -> bool {
        matches!(self, Self::CyclicDependency(_))
    }
}

/// 结果类型别名
pub type ModuleResult<T> = Result<T, ModuleError>;

//! # Dependency Injection Abstractions
//!
//! 组件加载器的抽象层，定义能力类型、组件读取与延迟求值的核心接口。
//!
//! ## 核心接口
//!
//! - [`Capability`] - 能力类型及其祖先声明
//! - [`Hierarchy`] - 能力类型的祖先闭包
//! - [`Retriever`] - 组件读取接口
//! - [`Processable`] - 装配后校验接口
//! - [`Parameter`] / [`Trigger`] - 参数与触发器键
//! - [`Resolvable`] / [`Selector`] - 延迟求值与按实现分派

pub mod capability;
pub mod component;
pub mod parameter;
pub mod resolvable;
pub mod retriever;

pub use capability::*;
pub use component::*;
pub use parameter::*;
pub use resolvable::*;
pub use retriever::*;

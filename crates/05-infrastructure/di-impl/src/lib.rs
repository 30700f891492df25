//! # 依赖图组件加载器实现
//!
//! 把独立编写的加载器组装为依赖图，按依赖顺序各执行一次，
//! 产出可查询的组件模块。
//!
//! ## 核心类型
//!
//! - [`LoaderUnit`] - 加载器描述
//! - [`ModuleBuilder`] - 注册加载器并装配模块
//! - [`BuildContext`] - 装配期间的可变上下文
//! - [`Module`] - 装配完成的只读模块
//! - [`PostProcessor`] - 装配完成后的钩子

pub mod builder;
pub mod context;
mod engine;
pub mod graph;
pub mod loader;
pub mod module;
pub mod parameters;
pub mod provider;
pub mod store;

pub use builder::{ModuleBuilder, PostProcessor};
pub use context::BuildContext;
pub use graph::{DependencyGraph, GraphNode, NodeId};
pub use loader::{Arguments, DeclaredType, LoaderUnit, LoaderUnitBuilder, Routine, Slot};
pub use module::Module;
pub use parameters::{ParameterValues, TriggerRegistry};
pub use provider::{ConstrainedProvider, ProviderHandle};
pub use store::ComponentStore;

//! # Infrastructure Common
//!
//! 组件加载器的公共类型：能力类型标识、错误分类与加载器配置。
//!
//! ## 核心类型
//!
//! - [`TypeKey`] - 能力类型标识
//! - [`ModuleError`] - 装配过程中的全部错误
//! - [`LoaderConfig`] - 加载器配置

pub mod configuration;
pub mod errors;
pub mod metadata;

pub use configuration::*;
pub use errors::*;
pub use metadata::*;

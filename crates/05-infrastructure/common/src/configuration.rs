//! 加载器配置

use crate::errors::{ModuleError, ModuleResult};
use serde::{Deserialize, Serialize};

/// 加载器配置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// 装配完成后是否以 info 级别输出完整的加载顺序
    pub log_load_trace: bool,
}

impl LoaderConfig {
    /// 从配置源的指定节读取加载器配置
    ///
    /// 配置节不存在时返回默认配置。
    pub fn from_settings(settings: &config::Config, section: &str) -> ModuleResult<Self> {
        match settings.get::<Self>(section) {
            Ok(loaded) => Ok(loaded),
            Err(config::ConfigError::NotFound(_)) => Ok(Self::default()),
            Err(err) => Err(ModuleError::Load {
                message: format!("加载器配置无效: {section}"),
                source: Some(Box::new(err)),
            }),
        }
    }

    /// 设置是否输出加载顺序
    pub fn with_load_trace(mut self, enabled: bool) -> Self {
        self.log_load_trace = enabled;
        self
    }
}

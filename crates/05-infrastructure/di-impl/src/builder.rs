//! 模块构建器

use crate::context::BuildContext;
use crate::engine::Resolution;
use crate::graph::DependencyGraph;
use crate::loader::LoaderUnit;
use crate::module::Module;
use crate::parameters::ParameterValues;
use di_abstractions::Parameter;
use infrastructure_common::{LoaderConfig, ModuleError, ModuleResult};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// 装配完成后执行的钩子
pub trait PostProcessor: Send + Sync {
    /// 以完整的读写权限处理装配上下文
    fn process(&self, context: &mut BuildContext) -> anyhow::Result<()>;
}

impl<F> PostProcessor for F
where
    F: Fn(&mut BuildContext) -> anyhow::Result<()> + Send + Sync,
{
    fn process(&self, context: &mut BuildContext) -> anyhow::Result<()> {
        self(context)
    }
}

/// 模块构建器
///
/// 收集加载器、参数和后处理器，每次 [`ModuleBuilder::get_module`] 都从头装配。
#[derive(Default)]
pub struct ModuleBuilder {
    graph: DependencyGraph,
    post_processors: Vec<Arc<dyn PostProcessor>>,
    parameters: ParameterValues,
    config: LoaderConfig,
}

impl ModuleBuilder {
    /// 创建新的构建器
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置加载器配置
    #[must_use]
    pub fn with_config(mut self, config: LoaderConfig) -> Self {
        self.config = config;
        self
    }

    /// 注册加载器，同名加载器只注册一次
    pub fn register(&mut self, unit: LoaderUnit) -> &mut Self {
        self.graph.register(unit);
        self
    }

    /// 批量注册加载器
    pub fn register_all(&mut self, units: impl IntoIterator<Item = LoaderUnit>) -> &mut Self {
        for unit in units {
            self.graph.register(unit);
        }
        self
    }

    /// 追加后处理器，按追加顺序执行
    pub fn add_post_processor<P: PostProcessor + 'static>(&mut self, processor: P) -> &mut Self {
        self.post_processors.push(Arc::new(processor));
        self
    }

    /// 批量追加后处理器
    pub fn add_post_processors(
        &mut self,
        processors: impl IntoIterator<Item = Arc<dyn PostProcessor>>,
    ) -> &mut Self {
        self.post_processors.extend(processors);
        self
    }

    /// 设置参数值
    pub fn set_parameter<T: Send + Sync + 'static>(
        &mut self,
        parameter: &Parameter<T>,
        value: T,
    ) -> &mut Self {
        self.parameters.set(parameter, value);
        self
    }

    /// 清除参数值
    pub fn clear_parameter<T: 'static>(&mut self, parameter: &Parameter<T>) -> &mut Self {
        self.parameters.clear(parameter);
        self
    }

    /// 从配置源读取参数值，参数名即配置路径
    ///
    /// 配置中不存在该键时参数保持原状。
    pub fn bind_parameter<T>(
        &mut self,
        settings: &config::Config,
        parameter: &Parameter<T>,
    ) -> ModuleResult<&mut Self>
    where
        T: DeserializeOwned + Send + Sync + 'static,
    {
        match settings.get::<T>(parameter.name()) {
            Ok(value) => {
                debug!(parameter = parameter.name(), "从配置读取参数");
                self.parameters.set(parameter, value);
            }
            Err(config::ConfigError::NotFound(_)) => {
                debug!(parameter = parameter.name(), "配置中没有该参数");
            }
            Err(err) => {
                return Err(ModuleError::Load {
                    message: format!("参数 '{}' 的配置值无效", parameter.name()),
                    source: Some(Box::new(err)),
                });
            }
        }
        Ok(self)
    }

    /// 已注册的依赖图
    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// 装配模块
    ///
    /// 解析全部加载器后依次执行组件校验、Resolvable 求值和后处理器，
    /// 后处理器新排入的工作在最后再执行一次。
    pub fn get_module(&self) -> ModuleResult<Module> {
        let started = Instant::now();
        info!(units = self.graph.len(), "开始装配模块");

        let mut context = Resolution::new(&self.graph, self.parameters.clone()).run()?;
        context.finish()?;

        for processor in &self.post_processors {
            processor.process(&mut context).map_err(|err| {
                ModuleError::wrap_with(err, |cause| format!("后处理器执行失败: {cause}"))
            })?;
        }
        context.finish()?;

        let module = context.into_module();
        if self.config.log_load_trace {
            info!(trace = ?module.load_log(), "加载顺序");
        }
        info!(
            loaded = module.load_log().len(),
            elapsed = ?started.elapsed(),
            "模块装配完成"
        );
        Ok(module)
    }

    /// 装配模块并获取能力类型 `T` 的唯一实例
    pub fn get_instance<T: ?Sized + 'static>(&self) -> ModuleResult<Arc<T>> {
        self.get_module()?.get_instance::<T>()
    }
}

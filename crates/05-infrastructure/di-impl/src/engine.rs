//! 解析引擎
//!
//! 深度优先遍历依赖图：按完成状态记忆化，按活动路径检测循环。

use crate::context::BuildContext;
use crate::graph::{DependencyGraph, GraphNode, NodeId};
use crate::loader::{Argument, Arguments, Slot};
use crate::parameters::ParameterValues;
use crate::provider::ConstrainedProvider;
use di_abstractions::Retriever;
use infrastructure_common::{ModuleError, ModuleResult, TypeKey};
use std::collections::HashSet;
use tracing::{debug, trace};

/// 一次装配的遍历状态
pub(crate) struct Resolution<'g> {
    graph: &'g DependencyGraph,
    context: BuildContext,
    active: HashSet<NodeId>,
    loaded: HashSet<NodeId>,
}

fn requested_label(requested: Option<TypeKey>) -> String {
    requested.map_or_else(|| "<root>".to_string(), |key| key.to_string())
}

impl<'g> Resolution<'g> {
    pub(crate) fn new(graph: &'g DependencyGraph, parameters: ParameterValues) -> Self {
        Self {
            graph,
            context: BuildContext::new(parameters),
            active: HashSet::new(),
            loaded: HashSet::new(),
        }
    }

    /// 先从起点出发，再从每个请求者出发，保证所有加载器都被执行
    pub(crate) fn run(mut self) -> ModuleResult<BuildContext> {
        let graph = self.graph;
        for &id in graph.start_points() {
            self.load(id, None)?;
        }
        for id in graph.requesters() {
            self.load(id, None)?;
        }
        Ok(self.context)
    }

    fn load(&mut self, id: NodeId, requested: Option<TypeKey>) -> ModuleResult<()> {
        if self.loaded.contains(&id) {
            return Ok(());
        }

        let graph = self.graph;
        let node = graph.node(id);
        if self.active.contains(&id) {
            return Err(ModuleError::cyclic(format!(
                "循环依赖: 类型 {} 在 '{}' 处被重复请求",
                requested_label(requested),
                node.name()
            )));
        }

        self.active.insert(id);
        let result = self.invoke(node);
        self.active.remove(&id);

        if let Err(mut err) = result {
            if let ModuleError::CyclicDependency(cycle) = &mut err {
                cycle.push_frame(format!("'{}' @ '{}'", requested_label(requested), node.name()));
            }
            return Err(err);
        }

        self.loaded.insert(id);
        self.context.push_load_log(node.name());
        debug!(unit = node.name(), "加载器执行完成");

        // 同一声明类型的其他提供者一并装配，歧义因此总能被检测到
        for &key in node.declared() {
            for &sibling in graph.providers_of(key) {
                if !self.loaded.contains(&sibling) {
                    trace!(unit = graph.node(sibling).name(), capability = %key, "装配同类型的其他提供者");
                    self.load(sibling, Some(key))?;
                }
            }
        }
        Ok(())
    }

    fn invoke(&mut self, node: &'g GraphNode) -> ModuleResult<()> {
        let unit = node.unit();
        let mut values = Vec::with_capacity(unit.slots().len());
        let mut provider = None;

        for slot in unit.slots() {
            match *slot {
                Slot::Component(key) if node.declares(key) && self.context.store().contains(key) => {
                    values.push(Argument::Component(self.context.store().lookup(key)?.clone()));
                }
                Slot::Provider => {
                    if provider.is_none() {
                        provider = Some(ConstrainedProvider::new(
                            node.name(),
                            unit.declared(),
                            unit.slots(),
                        ));
                    }
                    values.push(Argument::Provider);
                }
                Slot::Parameters => values.push(Argument::Parameters),
                Slot::Component(key) => {
                    let children = node.children(key);
                    if children.is_empty() {
                        return Err(ModuleError::UnmetDependency {
                            capability: key,
                            unit: node.name().to_string(),
                        });
                    }
                    for &child in children {
                        if !self.loaded.contains(&child) {
                            self.load(child, Some(key))?;
                        }
                    }
                    values.push(Argument::Component(self.context.store().lookup(key)?.clone()));
                }
            }
        }

        let mut arguments = Arguments::new(node.name(), values, provider, &mut self.context);
        (unit.routine())(&mut arguments).map_err(|err| {
            ModuleError::wrap_with(err, |cause| {
                format!("无法执行加载器 '{}': {}", node.name(), cause)
            })
        })?;

        if let Some(provider) = arguments.into_provider() {
            provider.validate()?;
        }
        Ok(())
    }
}

//! 依赖图
//!
//! 注册时按提供类型（含祖先闭包）和依赖类型建立索引，
//! 提供者与请求者之间的边与注册顺序无关。

use crate::loader::{LoaderUnit, Slot};
use infrastructure_common::TypeKey;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// 图节点编号
pub type NodeId = usize;

/// 依赖图节点
#[derive(Debug)]
pub struct GraphNode {
    unit: LoaderUnit,
    declared: Vec<TypeKey>,
    provided: Vec<TypeKey>,
    dependencies: Vec<TypeKey>,
    children: HashMap<TypeKey, Vec<NodeId>>,
}

impl GraphNode {
    fn new(unit: LoaderUnit) -> Self {
        let declared: Vec<TypeKey> = unit.declared().iter().map(|entry| entry.key()).collect();

        let mut provided = Vec::new();
        for entry in unit.declared() {
            for key in entry.hierarchy().keys() {
                if !provided.contains(&key) {
                    provided.push(key);
                }
            }
        }

        let mut dependencies = Vec::new();
        for slot in unit.slots() {
            if let Slot::Component(key) = slot {
                if !dependencies.contains(key) {
                    dependencies.push(*key);
                }
            }
        }

        Self {
            unit,
            declared,
            provided,
            dependencies,
            children: HashMap::new(),
        }
    }

    /// 加载器
    pub fn unit(&self) -> &LoaderUnit {
        &self.unit
    }

    /// 加载器名称
    pub fn name(&self) -> &str {
        self.unit.name()
    }

    /// 直接声明的类型
    pub fn declared(&self) -> &[TypeKey] {
        &self.declared
    }

    /// 是否直接声明了该类型
    pub fn declares(&self, key: TypeKey) -> bool {
        self.declared.contains(&key)
    }

    /// 声明类型的祖先闭包
    pub fn provided(&self) -> &[TypeKey] {
        &self.provided
    }

    /// 真实依赖（组件槽位类型）
    pub fn dependencies(&self) -> &[TypeKey] {
        &self.dependencies
    }

    /// 能提供某个依赖类型的节点
    pub fn children(&self, dependency: TypeKey) -> &[NodeId] {
        self.children
            .get(&dependency)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn add_child(&mut self, dependency: TypeKey, child: NodeId) {
        let children = self.children.entry(dependency).or_default();
        if !children.contains(&child) {
            children.push(child);
        }
    }
}

/// 依赖图
#[derive(Debug, Default)]
pub struct DependencyGraph {
    nodes: Vec<GraphNode>,
    names: HashSet<String>,
    start_points: Vec<NodeId>,
    providers: HashMap<TypeKey, Vec<NodeId>>,
    requesters: HashMap<TypeKey, Vec<NodeId>>,
    // 依赖类型首次出现的顺序，保证遍历确定
    requested: Vec<TypeKey>,
}

impl DependencyGraph {
    /// 创建空图
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册加载器
    ///
    /// 同名加载器已注册时忽略并返回 `false`。
    pub fn register(&mut self, unit: LoaderUnit) -> bool {
        if self.names.contains(unit.name()) {
            warn!(unit = unit.name(), "加载器已注册，忽略重复注册");
            return false;
        }
        self.names.insert(unit.name().to_string());

        let id = self.nodes.len();
        self.nodes.push(GraphNode::new(unit));
        let provided = self.nodes[id].provided().to_vec();
        let dependencies = self.nodes[id].dependencies().to_vec();

        for key in provided {
            self.providers.entry(key).or_default().push(id);
            let requesters = self.requesters.get(&key).cloned().unwrap_or_default();
            for requester in requesters {
                self.nodes[requester].add_child(key, id);
            }
        }

        if dependencies.is_empty() {
            self.start_points.push(id);
        } else {
            for key in dependencies {
                let requesters = self.requesters.entry(key).or_default();
                if requesters.is_empty() {
                    self.requested.push(key);
                }
                requesters.push(id);

                let providers = self.providers.get(&key).cloned().unwrap_or_default();
                for provider in providers {
                    // 节点不依赖自己尚未产出的声明类型
                    if provider == id && self.nodes[id].declares(key) {
                        continue;
                    }
                    self.nodes[id].add_child(key, provider);
                }
            }
        }

        let node = &self.nodes[id];
        debug!(
            unit = node.name(),
            declared = node.declared().len(),
            dependencies = node.dependencies().len(),
            "注册加载器"
        );
        true
    }

    /// 节点
    pub fn node(&self, id: NodeId) -> &GraphNode {
        &self.nodes[id]
    }

    /// 全部节点
    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    /// 节点数量
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// 没有组件依赖的节点
    pub fn start_points(&self) -> &[NodeId] {
        &self.start_points
    }

    /// 能提供某类型的全部节点，按注册顺序
    pub fn providers_of(&self, key: TypeKey) -> &[NodeId] {
        self.providers.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// 请求某类型的全部节点，按注册顺序
    pub fn requesters_of(&self, key: TypeKey) -> &[NodeId] {
        self.requesters.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// 全部请求者，按依赖类型首次出现的顺序
    pub fn requesters(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.requested
            .iter()
            .flat_map(|key| self.requesters_of(*key).iter().copied())
    }
}

//! 能力类型与祖先层次
//!
//! Rust 没有运行时继承信息，能力类型通过 [`Capability::ancestry`] 显式声明
//! 直接祖先以及对应的向上转换。[`Hierarchy::of`] 在此基础上计算传递闭包。

use crate::component::{Erased, Processable};
use crate::retriever::Retriever;
use infrastructure_common::TypeKey;
use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::trace;

/// 擦除值之间的转换：`Arc<T>` 到 `Arc<Ancestor>`
pub type Caster = Arc<dyn Fn(&Erased) -> Option<Erased> + Send + Sync>;

/// 组件后处理函数
pub type Processor = Arc<dyn Fn(&Erased, &dyn Retriever) -> anyhow::Result<()> + Send + Sync>;

/// 能力类型 trait
///
/// 具体结构体和 `dyn Trait` 都可以作为能力类型。默认没有祖先。
pub trait Capability: Send + Sync + 'static {
    /// 声明直接祖先
    fn ancestry(_ancestry: &mut Ancestry<Self>) {}
}

/// 直接祖先
struct Parent {
    key: TypeKey,
    cast: Caster,
    parents: fn() -> Vec<Parent>,
}

fn direct_parents<T: Capability + ?Sized>() -> Vec<Parent> {
    let mut ancestry = Ancestry::<T>::new();
    T::ancestry(&mut ancestry);
    ancestry.parents
}

/// 祖先声明构建器
pub struct Ancestry<T: ?Sized> {
    parents: Vec<Parent>,
    processor: Option<Processor>,
    _marker: PhantomData<fn(&T)>,
}

impl<T: Capability + ?Sized> Ancestry<T> {
    fn new() -> Self {
        Self {
            parents: Vec::new(),
            processor: None,
            _marker: PhantomData,
        }
    }

    /// 声明直接祖先 `P` 以及从 `Arc<T>` 到 `Arc<P>` 的转换
    pub fn extends<P, F>(&mut self, cast: F) -> &mut Self
    where
        P: Capability + ?Sized,
        F: Fn(Arc<T>) -> Arc<P> + Send + Sync + 'static,
    {
        let cast: Caster = Arc::new(move |value: &Erased| {
            value
                .downcast_ref::<Arc<T>>()
                .map(|this| Arc::new(cast(Arc::clone(this))) as Erased)
        });
        self.parents.push(Parent {
            key: TypeKey::of::<P>(),
            cast,
            parents: direct_parents::<P>,
        });
        self
    }

    /// 声明该类型的实例在装配完成后需要执行 [`Processable::process`]
    pub fn processable(&mut self) -> &mut Self
    where
        T: Processable,
    {
        self.processor = Some(Arc::new(|value: &Erased, components: &dyn Retriever| {
            match value.downcast_ref::<Arc<T>>() {
                Some(this) => this.process(components),
                None => Ok(()),
            }
        }));
        self
    }
}

/// 类型层次索引
///
/// 包含根类型自身以及所有传递祖先，每一项都带有从根类型出发的转换。
#[derive(Clone)]
pub struct Hierarchy {
    root: TypeKey,
    entries: Vec<(TypeKey, Caster)>,
    processor: Option<Processor>,
}

impl Hierarchy {
    /// 计算类型 `T` 的祖先闭包
    pub fn of<T: Capability + ?Sized>() -> Self {
        let root = TypeKey::of::<T>();
        let identity: Caster = Arc::new(|value: &Erased| Some(Arc::clone(value)));

        let mut ancestry = Ancestry::<T>::new();
        T::ancestry(&mut ancestry);

        let mut entries = vec![(root, Arc::clone(&identity))];
        let mut seen = HashSet::from([root]);
        let mut queue: VecDeque<(Caster, Parent)> = ancestry
            .parents
            .into_iter()
            .map(|parent| (Arc::clone(&identity), parent))
            .collect();

        while let Some((via, parent)) = queue.pop_front() {
            if !seen.insert(parent.key) {
                continue;
            }
            let step = parent.cast;
            let caster: Caster =
                Arc::new(move |value: &Erased| via(value).and_then(|mid| step(&mid)));
            for grand in (parent.parents)() {
                queue.push_back((Arc::clone(&caster), grand));
            }
            entries.push((parent.key, caster));
        }

        trace!(root = %root, size = entries.len(), "计算类型层次");
        Self {
            root,
            entries,
            processor: ancestry.processor,
        }
    }

    /// 根类型
    pub fn root(&self) -> TypeKey {
        self.root
    }

    /// 闭包中的全部类型，根类型在前
    pub fn keys(&self) -> impl Iterator<Item = TypeKey> + '_ {
        self.entries.iter().map(|(key, _)| *key)
    }

    /// 闭包大小
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 闭包总是包含根类型
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 检查类型是否在闭包中
    pub fn contains(&self, key: TypeKey) -> bool {
        self.entries.iter().any(|(entry, _)| *entry == key)
    }

    /// 把根类型的擦除值转换为祖先类型的擦除值
    pub fn cast(&self, key: TypeKey, value: &Erased) -> Option<Erased> {
        self.entries
            .iter()
            .find(|(entry, _)| *entry == key)
            .and_then(|(_, caster)| caster(value))
    }

    /// 闭包中的全部项
    pub fn entries(&self) -> impl Iterator<Item = (TypeKey, &Caster)> + '_ {
        self.entries.iter().map(|(key, caster)| (*key, caster))
    }

    /// 根类型的后处理函数
    pub fn processor(&self) -> Option<&Processor> {
        self.processor.as_ref()
    }
}

impl fmt::Debug for Hierarchy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hierarchy")
            .field("root", &self.root)
            .field("keys", &self.keys().collect::<Vec<_>>())
            .field("processable", &self.processor.is_some())
            .finish()
    }
}

/// 声明能力类型及其直接祖先
///
/// ```rust,ignore
/// capability!(dyn Entity);
/// capability!(EntityA: dyn Entity, dyn Named);
/// ```
#[macro_export]
macro_rules! capability {
    ($ty:ty : $($parent:ty),+ $(,)?) => {
        impl $crate::Capability for $ty {
            fn ancestry(ancestry: &mut $crate::Ancestry<Self>) {
                $(
                    ancestry.extends::<$parent, _>(|this| this as ::std::sync::Arc<$parent>);
                )+
            }
        }
    };
    ($ty:ty) => {
        impl $crate::Capability for $ty {}
    };
}

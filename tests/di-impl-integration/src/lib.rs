//! 集成测试共用的能力类型与加载器

use di_abstractions::{capability, Ancestry, Capability, Parameter, Processable, Retriever, Trigger};
use di_impl::LoaderUnit;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

/* ---------------- 实体 ---------------- */

/// 带名称的实体
pub trait Entity: Send + Sync {
    /// 名称
    fn name(&self) -> String;
}

/// 可以被外部设置名称的实体
pub trait Taggable: Send + Sync {
    /// 设置名称
    fn set_name(&self, name: &str);
}

capability!(dyn Entity);
capability!(dyn Taggable);

/// 实体 A，以自身类型提供
pub struct EntityA;

impl Entity for EntityA {
    fn name(&self) -> String {
        "entity A".to_string()
    }
}

capability!(EntityA: dyn Entity);

impl EntityA {
    /// 加载器
    pub fn loader() -> LoaderUnit {
        LoaderUnit::builder("EntityA::load")
            .provides::<EntityA>()
            .requires_provider()
            .build(|args| {
                args.provider(0)?.provide(EntityA)?;
                Ok(())
            })
    }
}

/// 实体 B，以 `dyn Entity` 提供
pub struct EntityB;

impl Entity for EntityB {
    fn name(&self) -> String {
        "entity B".to_string()
    }
}

capability!(EntityB: dyn Entity);

impl EntityB {
    /// 加载器
    pub fn loader() -> LoaderUnit {
        LoaderUnit::builder("EntityB::load")
            .provides::<dyn Entity>()
            .requires_provider()
            .build(|args| {
                args.provider(0)?
                    .provide_as::<dyn Entity, _>(Arc::new(EntityB))?;
                Ok(())
            })
    }
}

/// 依赖任意实体的实体，同时自身也是实体
pub struct CyclicEntityA {
    entity: Arc<dyn Entity>,
}

impl Entity for CyclicEntityA {
    fn name(&self) -> String {
        self.entity.name()
    }
}

capability!(CyclicEntityA: dyn Entity);

impl CyclicEntityA {
    /// 加载器
    pub fn loader() -> LoaderUnit {
        LoaderUnit::builder("CyclicEntityA::load")
            .provides::<CyclicEntityA>()
            .requires_provider()
            .requires::<dyn Entity>()
            .build(|args| {
                let entity = args.component::<dyn Entity>(1)?;
                args.provider(0)?.provide(CyclicEntityA { entity })?;
                Ok(())
            })
    }
}

/// 以 [`CyclicEntityA`] 为祖先的实体
pub struct CyclicExtEntityA {
    base: Arc<CyclicEntityA>,
}

impl Entity for CyclicExtEntityA {
    fn name(&self) -> String {
        self.base.name()
    }
}

impl Capability for CyclicExtEntityA {
    fn ancestry(ancestry: &mut Ancestry<Self>) {
        ancestry.extends::<CyclicEntityA, _>(|this| Arc::clone(&this.base));
    }
}

impl CyclicExtEntityA {
    /// 加载器
    pub fn loader() -> LoaderUnit {
        LoaderUnit::builder("CyclicExtEntityA::load")
            .provides::<CyclicExtEntityA>()
            .requires_provider()
            .requires::<CyclicEntityB>()
            .build(|args| {
                let entity: Arc<dyn Entity> = args.component::<CyclicEntityB>(1)?;
                let base = Arc::new(CyclicEntityA { entity });
                args.provider(0)?.provide(CyclicExtEntityA { base })?;
                Ok(())
            })
    }
}

/// 依赖 [`CyclicEntityA`] 的实体
pub struct CyclicEntityB {
    entity: Arc<dyn Entity>,
}

impl Entity for CyclicEntityB {
    fn name(&self) -> String {
        self.entity.name()
    }
}

capability!(CyclicEntityB: dyn Entity);

impl CyclicEntityB {
    /// 加载器
    pub fn loader() -> LoaderUnit {
        LoaderUnit::builder("CyclicEntityB::load")
            .provides::<CyclicEntityB>()
            .requires_provider()
            .requires::<CyclicEntityA>()
            .build(|args| {
                let entity: Arc<dyn Entity> = args.component::<CyclicEntityA>(1)?;
                args.provider(0)?.provide(CyclicEntityB { entity })?;
                Ok(())
            })
    }
}

/// 依赖 [`CyclicComplexEntityB`] 的实体
pub struct CyclicEntity {
    entity: Arc<CyclicComplexEntityB>,
}

impl Entity for CyclicEntity {
    fn name(&self) -> String {
        self.entity.text()
    }
}

capability!(CyclicEntity: dyn Entity);

impl CyclicEntity {
    /// 加载器
    pub fn loader() -> LoaderUnit {
        LoaderUnit::builder("CyclicEntity::load")
            .provides::<CyclicEntity>()
            .requires_provider()
            .requires::<CyclicComplexEntityB>()
            .build(|args| {
                let entity = args.component::<CyclicComplexEntityB>(1)?;
                args.provider(0)?.provide(CyclicEntity { entity })?;
                Ok(())
            })
    }
}

/// 由参数构造、可通过触发器修改数值的实体
pub struct ParametrizedEntity {
    text: Option<String>,
    value: AtomicI32,
}

impl ParametrizedEntity {
    /// 可选文本参数
    pub const TEXT: Parameter<String> = Parameter::new("ParametrizedEntity.TEXT");
    /// 必需数值参数
    pub const NUMBER: Parameter<i32> = Parameter::new("ParametrizedEntity.NUMBER");
    /// 装配后可修改的数值
    pub const TRIGGABLE_NUMBER: Trigger<i32> = Trigger::new("ParametrizedEntity.T_NUMBER");

    /// 加载器
    pub fn loader() -> LoaderUnit {
        LoaderUnit::builder("ParametrizedEntity::load")
            .provides::<dyn Entity>()
            .requires_provider()
            .requires_parameters()
            .build(|args| {
                let (text, number) = {
                    let parameters = args.parameters(1)?;
                    (
                        parameters.get_value(&Self::TEXT),
                        parameters.get_required_value(&Self::NUMBER)?,
                    )
                };
                let entity = args.provider(0)?.provide_as::<dyn Entity, _>(Arc::new(Self {
                    text,
                    value: AtomicI32::new(number),
                }))?;
                args.parameters(1)?
                    .add_listener(&Self::TRIGGABLE_NUMBER, move |value: &i32| {
                        entity.value.store(*value, Ordering::SeqCst);
                    });
                Ok(())
            })
    }
}

impl Entity for ParametrizedEntity {
    fn name(&self) -> String {
        format!(
            "name '{} {}'",
            self.text.as_deref().unwrap_or("null"),
            self.value.load(Ordering::SeqCst)
        )
    }
}

capability!(ParametrizedEntity: dyn Entity);

/// 装配完成后校验名称已被设置的实体
#[derive(Default)]
pub struct ProcessableEntity {
    name: Mutex<Option<String>>,
}

impl ProcessableEntity {
    /// 以 `dyn Entity` 和 `dyn Taggable` 提供同一实例
    pub fn entity_loader() -> LoaderUnit {
        LoaderUnit::builder("ProcessableEntity::loadEntity")
            .provides::<dyn Entity>()
            .provides::<dyn Taggable>()
            .requires_provider()
            .build(|args| {
                let shared = Arc::new(Self::default());
                let mut provider = args.provider(0)?;
                provider.provide_as::<dyn Entity, _>(Arc::clone(&shared))?;
                provider.provide_as::<dyn Taggable, _>(shared)?;
                Ok(())
            })
    }

    /// 为可标记实体设置名称
    pub fn validation_loader() -> LoaderUnit {
        LoaderUnit::builder("ProcessableEntity::loadValidation")
            .requires::<dyn Taggable>()
            .build(|args| {
                args.component::<dyn Taggable>(0)?.set_name("prueba");
                Ok(())
            })
    }
}

impl Entity for ProcessableEntity {
    fn name(&self) -> String {
        self.name.lock().clone().unwrap_or_default()
    }
}

impl Taggable for ProcessableEntity {
    fn set_name(&self, name: &str) {
        *self.name.lock() = Some(name.to_string());
    }
}

impl Processable for ProcessableEntity {
    fn process(&self, _components: &dyn Retriever) -> anyhow::Result<()> {
        if self.name.lock().is_none() {
            anyhow::bail!("null name");
        }
        Ok(())
    }
}

impl Capability for ProcessableEntity {
    fn ancestry(ancestry: &mut Ancestry<Self>) {
        ancestry
            .extends::<dyn Entity, _>(|this| this as Arc<dyn Entity>)
            .extends::<dyn Taggable, _>(|this| this as Arc<dyn Taggable>)
            .processable();
    }
}

/* ---------------- 复合实体 ---------------- */

/// 由实体派生文本的复合实体
pub trait ComplexEntity: Send + Sync {
    /// 文本
    fn text(&self) -> String;
}

capability!(dyn ComplexEntity);

/// 依赖任意实体的复合实体
pub struct SimpleComplexEntity {
    entity: Arc<dyn Entity>,
}

impl ComplexEntity for SimpleComplexEntity {
    fn text(&self) -> String {
        self.entity.name()
    }
}

capability!(SimpleComplexEntity: dyn ComplexEntity);

impl SimpleComplexEntity {
    /// 加载器
    pub fn loader() -> LoaderUnit {
        LoaderUnit::builder("SimpleComplexEntity::load")
            .provides::<SimpleComplexEntity>()
            .requires_provider()
            .requires::<dyn Entity>()
            .build(|args| {
                let entity = args.component::<dyn Entity>(1)?;
                args.provider(0)?.provide(SimpleComplexEntity { entity })?;
                Ok(())
            })
    }
}

/// 依赖任意实体的复合实体
pub struct CyclicComplexEntityA {
    entity: Arc<dyn Entity>,
}

impl ComplexEntity for CyclicComplexEntityA {
    fn text(&self) -> String {
        self.entity.name()
    }
}

capability!(CyclicComplexEntityA: dyn ComplexEntity);

impl CyclicComplexEntityA {
    /// 加载器
    pub fn loader() -> LoaderUnit {
        LoaderUnit::builder("CyclicComplexEntityA::load")
            .provides::<CyclicComplexEntityA>()
            .requires_provider()
            .requires::<dyn Entity>()
            .build(|args| {
                let entity = args.component::<dyn Entity>(1)?;
                args.provider(0)?.provide(CyclicComplexEntityA { entity })?;
                Ok(())
            })
    }
}

/// 依赖 [`CyclicComplexEntityA`] 的复合实体
pub struct CyclicComplexEntityB {
    entity: Arc<CyclicComplexEntityA>,
}

impl ComplexEntity for CyclicComplexEntityB {
    fn text(&self) -> String {
        self.entity.text()
    }
}

capability!(CyclicComplexEntityB: dyn ComplexEntity);

impl CyclicComplexEntityB {
    /// 加载器
    pub fn loader() -> LoaderUnit {
        LoaderUnit::builder("CyclicComplexEntityB::load")
            .provides::<CyclicComplexEntityB>()
            .requires_provider()
            .requires::<CyclicComplexEntityA>()
            .build(|args| {
                let entity = args.component::<CyclicComplexEntityA>(1)?;
                args.provider(0)?.provide(CyclicComplexEntityB { entity })?;
                Ok(())
            })
    }
}

/* ---------------- 大实体 ---------------- */

/// 同时依赖具体实体、任意实体和复合实体
pub struct BigEntity {
    entity_a: Arc<EntityA>,
    entity: Arc<dyn Entity>,
    complex: Arc<dyn ComplexEntity>,
}

capability!(BigEntity);

impl BigEntity {
    /// 加载器
    pub fn loader() -> LoaderUnit {
        LoaderUnit::builder("BigEntity::load")
            .provides::<BigEntity>()
            .requires_provider()
            .requires::<EntityA>()
            .requires::<dyn Entity>()
            .requires::<dyn ComplexEntity>()
            .build(|args| {
                let big = BigEntity {
                    entity_a: args.component::<EntityA>(1)?,
                    entity: args.component::<dyn Entity>(2)?,
                    complex: args.component::<dyn ComplexEntity>(3)?,
                };
                args.provider(0)?.provide(big)?;
                Ok(())
            })
    }

    /// 具体实体 A 的名称
    pub fn text_a(&self) -> String {
        self.entity_a.name()
    }

    /// 任意实体的名称
    pub fn text(&self) -> String {
        self.entity.name()
    }

    /// 复合实体的文本
    pub fn complex_text(&self) -> String {
        self.complex.text()
    }
}

/* ---------------- 违反提供约定的加载器 ---------------- */

/// 没有声明任何类型却提供了组件
pub fn non_declared_providing() -> LoaderUnit {
    LoaderUnit::builder("Loaders::nonDeclaredProviding")
        .requires_provider()
        .build(|args| {
            args.provider(0)?.provide(EntityA)?;
            Ok(())
        })
}

/// 声明了两个类型却只提供一个
pub fn missing_providing() -> LoaderUnit {
    LoaderUnit::builder("Loaders::missingProviding")
        .provides::<dyn Entity>()
        .provides::<dyn ComplexEntity>()
        .requires_provider()
        .build(|args| {
            args.provider(0)?
                .provide_as::<dyn Entity, _>(Arc::new(EntityA))?;
            Ok(())
        })
}

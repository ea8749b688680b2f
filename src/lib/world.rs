//! Component holders and the collaborator traits the light system needs from its host.
//!
//! The light system does not own entities. It reads and mutates them through [LightWorld] and
//! finds occluders near a light through [SpatialIndex]. [World] is a small in-memory
//! implementation of both, good enough for tests, tools and small scenes.

use std::collections::HashMap;

use crate::{
    affector::LightAffector, light::PointLight, matrix::Transform, occluder::Occluder,
    rect::FloatRect,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// Opaque entity identifier.
pub struct Entity(pub u32);

#[derive(Clone, Debug, Default, PartialEq)]
/// Component holding exactly one light.
pub struct LightEmitter {
    light: PointLight,
}

impl LightEmitter {
    #[allow(missing_docs)]
    pub fn new(light: PointLight) -> Self {
        Self { light }
    }

    #[allow(missing_docs)]
    pub fn light(&self) -> &PointLight {
        &self.light
    }

    #[allow(missing_docs)]
    pub fn light_mut(&mut self) -> &mut PointLight {
        &mut self.light
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
/// Component holding exactly one light collider.
pub struct ShadowEmitter {
    collider: Occluder,
}

impl ShadowEmitter {
    #[allow(missing_docs)]
    pub fn new(collider: Occluder) -> Self {
        Self { collider }
    }

    #[allow(missing_docs)]
    pub fn collider(&self) -> &Occluder {
        &self.collider
    }

    #[allow(missing_docs)]
    pub fn collider_mut(&mut self) -> &mut Occluder {
        &mut self.collider
    }
}

#[derive(Clone, Debug, PartialEq)]
/// Several components of the same kind on one entity.
pub struct Multi<T> {
    components: Vec<T>,
}

impl<T> Default for Multi<T> {
    fn default() -> Self {
        Self {
            components: Vec::new(),
        }
    }
}

impl<T> From<Vec<T>> for Multi<T> {
    fn from(components: Vec<T>) -> Self {
        Self { components }
    }
}

impl<T> Multi<T> {
    #[allow(missing_docs)]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.components.get(index)
    }

    #[allow(missing_docs)]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.components.get_mut(index)
    }

    #[allow(missing_docs)]
    pub fn push(&mut self, component: T) {
        self.components.push(component);
    }

    #[allow(missing_docs)]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    #[allow(missing_docs)]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    #[allow(missing_docs)]
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.components.iter()
    }

    #[allow(missing_docs)]
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.components.iter_mut()
    }
}

/// Several lights on one entity.
pub type MultiLightEmitter = Multi<LightEmitter>;
/// Several colliders on one entity.
pub type MultiShadowEmitter = Multi<ShadowEmitter>;
/// Several affectors on one entity, usually driving the lights of a [MultiLightEmitter].
pub type MultiLightAffector = Multi<LightAffector>;

#[derive(Clone, Debug, Default)]
/// Everything the light system may find on an entity.
pub struct LightComponents {
    /// World transform of the entity.
    pub transform: Transform,
    #[allow(missing_docs)]
    pub light: Option<LightEmitter>,
    #[allow(missing_docs)]
    pub multi_light: Option<MultiLightEmitter>,
    #[allow(missing_docs)]
    pub shadow: Option<ShadowEmitter>,
    #[allow(missing_docs)]
    pub multi_shadow: Option<MultiShadowEmitter>,
    #[allow(missing_docs)]
    pub affector: Option<LightAffector>,
    #[allow(missing_docs)]
    pub multi_affector: Option<MultiLightAffector>,
}

impl LightComponents {
    /// Every light on the entity, single holder first.
    pub fn lights(&self) -> impl Iterator<Item = &PointLight> {
        self.light
            .iter()
            .chain(self.multi_light.iter().flat_map(Multi::iter))
            .map(LightEmitter::light)
    }

    /// Every collider on the entity, single holder first.
    pub fn colliders(&self) -> impl Iterator<Item = &Occluder> {
        self.shadow
            .iter()
            .chain(self.multi_shadow.iter().flat_map(Multi::iter))
            .map(ShadowEmitter::collider)
    }

    /// Light addressed by an optional multi-holder index.
    pub fn light_at_mut(&mut self, index: Option<usize>) -> Option<&mut PointLight> {
        match index {
            None => self.light.as_mut(),
            Some(i) => self.multi_light.as_mut().and_then(|multi| multi.get_mut(i)),
        }
        .map(LightEmitter::light_mut)
    }
}

/// Entity storage as seen by the light system.
pub trait LightWorld {
    /// Components of `entity`, `None` if it does not exist.
    fn components(&self, entity: Entity) -> Option<&LightComponents>;

    #[allow(missing_docs)]
    fn components_mut(&mut self, entity: Entity) -> Option<&mut LightComponents>;
}

/// Range query over entity bounds.
pub trait SpatialIndex {
    /// Entities whose world bounds intersect `area`.
    fn retrieve(&self, area: &FloatRect) -> Vec<Entity>;
}

#[derive(Clone, Debug, Default)]
/// In-memory [LightWorld] with a linear-scan [SpatialIndex].
pub struct World {
    entities: HashMap<Entity, LightComponents>,
    next_id: u32,
}

impl World {
    #[allow(missing_docs)]
    pub fn new() -> Self {
        Self::default()
    }

    /// New entity at `transform` with no light components.
    pub fn spawn(&mut self, transform: Transform) -> Entity {
        let entity = Entity(self.next_id);
        self.next_id += 1;
        self.entities.insert(
            entity,
            LightComponents {
                transform,
                ..Default::default()
            },
        );
        entity
    }

    /// Remove an entity, returning its components.
    pub fn despawn(&mut self, entity: Entity) -> Option<LightComponents> {
        self.entities.remove(&entity)
    }

    /// Every entity, in id order.
    pub fn entities(&self) -> Vec<Entity> {
        let mut entities: Vec<Entity> = self.entities.keys().copied().collect();
        entities.sort();
        entities
    }

    /// World bounds of everything lighting-related on the entity.
    pub fn bounds(&self, entity: Entity) -> Option<FloatRect> {
        let components = self.entities.get(&entity)?;
        let transform = &components.transform;

        let rects: Vec<FloatRect> = components
            .lights()
            .map(|light| light.world_bounds(transform))
            .chain(components.colliders().map(|collider| collider.world_bounds(transform)))
            .collect();
        if rects.is_empty() {
            return None;
        }

        Some(FloatRect::from_points(rects.iter().flat_map(FloatRect::corners)))
    }
}

impl LightWorld for World {
    fn components(&self, entity: Entity) -> Option<&LightComponents> {
        self.entities.get(&entity)
    }

    fn components_mut(&mut self, entity: Entity) -> Option<&mut LightComponents> {
        self.entities.get_mut(&entity)
    }
}

impl SpatialIndex for World {
    fn retrieve(&self, area: &FloatRect) -> Vec<Entity> {
        self.entities()
            .into_iter()
            .filter(|&entity| self.bounds(entity).is_some_and(|bounds| bounds.intersects(area)))
            .collect()
    }
}

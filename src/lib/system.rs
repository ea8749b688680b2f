//! Frame-level entry point tying lights, colliders, affectors and the render pipeline together.

use crate::{
    affector::{LightAffect, LightHandle},
    canvas::Canvas,
    color::Color8,
    config::LightSystemConfig,
    light::PointLight,
    matrix::Transform,
    occluder::Occluder,
    pipeline::RenderPipeline,
    rect::{FloatRect, IntRect},
    vector::Vec2,
    world::{Entity, LightComponents, LightWorld, SpatialIndex},
};

#[derive(Debug, PartialEq, thiserror::Error)]
/// Errors raised by the mutation API.
pub enum Error {
    #[error("Entity {entity:?} has no {component} component")]
    /// The entity does not exist or lacks the addressed component.
    MissingComponent {
        #[allow(missing_docs)]
        entity: Entity,
        #[allow(missing_docs)]
        component: &'static str,
    },

    #[error("Index {index} is out of range for {component} of entity {entity:?} (length {len})")]
    /// Index past the end of a multi holder or a collider outline.
    OutOfRange {
        #[allow(missing_docs)]
        entity: Entity,
        #[allow(missing_docs)]
        component: &'static str,
        #[allow(missing_docs)]
        index: usize,
        #[allow(missing_docs)]
        len: usize,
    },
}

type ContentsChanged = Box<dyn FnMut(Entity, &IntRect)>;

/// Renders every light of a frame and maintains the state shared between frames.
pub struct LightSystem {
    pipeline: RenderPipeline,
    ambient: Color8,
    color_shift: [f32; 3],
    contents_changed: Vec<ContentsChanged>,
}

impl std::fmt::Debug for LightSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LightSystem")
            .field("image_size", &self.pipeline.image_size())
            .field("ambient", &self.ambient)
            .field("color_shift", &self.color_shift)
            .field("observers", &self.contents_changed.len())
            .finish()
    }
}

impl LightSystem {
    /// Create the render buffers and load the optional penumbra texture.
    pub fn new(config: &LightSystemConfig) -> Self {
        let (width, height) = config.image_size;
        let mut pipeline = RenderPipeline::new(width, height);
        if let Some(path) = &config.penumbra_texture {
            pipeline.load_penumbra_texture(path);
        }

        Self {
            pipeline,
            ambient: config.ambient_color,
            color_shift: [0.; 3],
            contents_changed: Vec::new(),
        }
    }

    /// Resize every render buffer, e.g. when the window was resized.
    pub fn set_image_size(&mut self, width: u32, height: u32) {
        self.pipeline.set_image_size(width, height);
    }

    #[allow(missing_docs)]
    pub fn pipeline(&self) -> &RenderPipeline {
        &self.pipeline
    }

    #[allow(missing_docs)]
    pub fn pipeline_mut(&mut self) -> &mut RenderPipeline {
        &mut self.pipeline
    }

    /// Render the lights of `candidates` and multiply the result over `target`.
    ///
    /// Occluders near each light are looked up through `index`, then filtered on their exact
    /// world bounds.
    pub fn render(
        &mut self,
        world: &impl LightWorld,
        index: &impl SpatialIndex,
        candidates: &[Entity],
        target: &mut Canvas,
    ) {
        self.pipeline.begin_frame(self.ambient.into());
        let view = *target.view();

        for &entity in candidates {
            let Some(components) = world.components(entity) else {
                continue;
            };

            for light in components.lights().filter(|light| light.is_active()) {
                let light_transform = &components.transform;
                let reach = light.world_bounds(light_transform);

                let colliders: Vec<(&Occluder, &Transform)> = index
                    .retrieve(&reach)
                    .into_iter()
                    .filter_map(|other| world.components(other))
                    .flat_map(|other: &LightComponents| {
                        other
                            .colliders()
                            .filter(move |collider| {
                                collider.world_bounds(&other.transform).intersects(&reach)
                            })
                            .map(move |collider| (collider, &other.transform))
                    })
                    .collect();

                log::trace!(
                    "Rendering light of {entity:?} against {} occluders",
                    colliders.len()
                );
                self.pipeline
                    .render_light(&view, light, light_transform, &colliders);
            }
        }

        self.pipeline.finish(target);
    }

    /// Run the active affectors of `entities` once.
    pub fn update(&mut self, world: &mut impl LightWorld, entities: &[Entity], delta: f32) {
        for &entity in entities {
            let Some(components) = world.components_mut(entity) else {
                continue;
            };

            // Callbacks are detached while they run so the targeted light can be borrowed.
            let mut pending = Vec::new();
            if let Some(affector) = components.affector.as_mut().filter(|a| a.is_ready()) {
                pending.extend(
                    affector
                        .target()
                        .zip(affector.take_callback())
                        .map(|(target, callback)| (None, target, callback)),
                );
            }
            if let Some(multi) = components.multi_affector.as_mut() {
                for (i, affector) in multi.iter_mut().enumerate() {
                    if !affector.is_ready() {
                        continue;
                    }
                    pending.extend(
                        affector
                            .target()
                            .zip(affector.take_callback())
                            .map(|(target, callback)| (Some(i), target, callback)),
                    );
                }
            }

            for (slot, target, mut callback) in pending {
                match resolve_light(world, target) {
                    Some(light) => callback.affect(delta, light),
                    None => log::debug!("Affector of {entity:?} targets missing light {target:?}"),
                }

                let affector = world.components_mut(entity).and_then(|components| match slot {
                    None => components.affector.as_mut(),
                    Some(i) => components
                        .multi_affector
                        .as_mut()
                        .and_then(|multi| multi.get_mut(i)),
                });
                if let Some(affector) = affector {
                    affector.restore_callback(callback);
                }
            }
        }
    }

    /// Set the ambient color immediately.
    pub fn set_ambient_color(&mut self, color: Color8) {
        self.ambient = color;
        self.color_shift = [0.; 3];
    }

    #[allow(missing_docs)]
    pub fn ambient_color(&self) -> Color8 {
        self.ambient
    }

    /// Move the ambient color one step towards `target`.
    ///
    /// Called repeatedly, the color reaches `target` in roughly `strength` calls. Fractional
    /// progress is accumulated per channel and flushed as whole channel steps, never past the
    /// target. A channel moves as soon as one whole unit has accumulated, so a one-unit gap at
    /// strength 1 closes on the first call. A non-positive `strength` jumps straight to `target`.
    pub fn interpolate_ambient_light(&mut self, target: Color8, strength: f32) {
        if strength <= 0. {
            self.set_ambient_color(target);
            return;
        }

        for ((channel, shift), goal) in self
            .ambient
            .channels_mut()
            .into_iter()
            .zip(self.color_shift.iter_mut())
            .zip(target.channels())
        {
            let delta = goal as f32 - *channel as f32;
            if delta == 0. {
                *shift = 0.;
                continue;
            }

            // Leftovers from a previous target in the other direction are dropped.
            if *shift * delta < 0. {
                *shift = 0.;
            }
            *shift += delta / strength;

            if *shift >= 1. {
                let steps = shift.floor().min(delta);
                *channel += steps as u8;
                *shift -= steps;
            } else if *shift <= -1. {
                let steps = (-*shift).floor().min(-delta);
                *channel -= steps as u8;
                *shift += steps;
            }

            if *channel == goal {
                *shift = 0.;
            }
        }
    }

    /// Subscribe to bounds changes caused by the mutation API.
    pub fn on_contents_changed(&mut self, callback: impl FnMut(Entity, &IntRect) + 'static) {
        self.contents_changed.push(Box::new(callback));
    }

    fn notify(&mut self, entity: Entity, bounds: FloatRect) {
        let rect = IntRect::from(bounds);
        for callback in &mut self.contents_changed {
            callback(entity, &rect);
        }
    }

    /// Local position of the single light of `entity`.
    pub fn set_local_light_position(
        &mut self,
        world: &mut impl LightWorld,
        entity: Entity,
        position: Vec2,
    ) -> Result<(), Error> {
        self.modify_light(world, entity, None, |light| light.set_position(position))
    }

    /// Local position of light `index` of the multi holder of `entity`.
    pub fn set_local_light_position_at(
        &mut self,
        world: &mut impl LightWorld,
        entity: Entity,
        index: usize,
        position: Vec2,
    ) -> Result<(), Error> {
        self.modify_light(world, entity, Some(index), |light| light.set_position(position))
    }

    #[allow(missing_docs)]
    pub fn set_light_scale(
        &mut self,
        world: &mut impl LightWorld,
        entity: Entity,
        scale: Vec2,
    ) -> Result<(), Error> {
        self.modify_light(world, entity, None, |light| light.set_scale(scale))
    }

    #[allow(missing_docs)]
    pub fn set_light_scale_at(
        &mut self,
        world: &mut impl LightWorld,
        entity: Entity,
        index: usize,
        scale: Vec2,
    ) -> Result<(), Error> {
        self.modify_light(world, entity, Some(index), |light| light.set_scale(scale))
    }

    /// Color changes leave the bounds alone and are not notified.
    pub fn set_light_color(
        &mut self,
        world: &mut impl LightWorld,
        entity: Entity,
        color: Color8,
    ) -> Result<(), Error> {
        light_mut(world, entity, None)?.0.set_color(color);
        Ok(())
    }

    #[allow(missing_docs)]
    pub fn set_light_color_at(
        &mut self,
        world: &mut impl LightWorld,
        entity: Entity,
        index: usize,
        color: Color8,
    ) -> Result<(), Error> {
        light_mut(world, entity, Some(index))?.0.set_color(color);
        Ok(())
    }

    /// Move point `point_index` of the single collider of `entity`.
    pub fn set_point(
        &mut self,
        world: &mut impl LightWorld,
        entity: Entity,
        point_index: usize,
        point: Vec2,
    ) -> Result<(), Error> {
        self.modify_collider(world, entity, None, |collider| {
            set_collider_point(collider, entity, point_index, point)
        })
    }

    /// Move point `point_index` of collider `collider_index` of the multi holder of `entity`.
    pub fn set_point_at(
        &mut self,
        world: &mut impl LightWorld,
        entity: Entity,
        collider_index: usize,
        point_index: usize,
        point: Vec2,
    ) -> Result<(), Error> {
        self.modify_collider(world, entity, Some(collider_index), |collider| {
            set_collider_point(collider, entity, point_index, point)
        })
    }

    /// Replace the outline of the single collider of `entity`.
    pub fn set_points(
        &mut self,
        world: &mut impl LightWorld,
        entity: Entity,
        points: &[Vec2],
    ) -> Result<(), Error> {
        self.modify_collider(world, entity, None, |collider| {
            collider.set_points(points);
            Ok(())
        })
    }

    #[allow(missing_docs)]
    pub fn set_points_at(
        &mut self,
        world: &mut impl LightWorld,
        entity: Entity,
        collider_index: usize,
        points: &[Vec2],
    ) -> Result<(), Error> {
        self.modify_collider(world, entity, Some(collider_index), |collider| {
            collider.set_points(points);
            Ok(())
        })
    }

    /// Bind the single affector of `entity` to its single light.
    pub fn set_affector_callback(
        &mut self,
        world: &mut impl LightWorld,
        entity: Entity,
        callback: impl LightAffect + 'static,
    ) -> Result<(), Error> {
        self.bind_affector(world, entity, None, None, Box::new(callback))
    }

    /// Bind the single affector of `entity` to light `light_index` of its multi holder.
    pub fn set_affector_callback_for(
        &mut self,
        world: &mut impl LightWorld,
        entity: Entity,
        light_index: usize,
        callback: impl LightAffect + 'static,
    ) -> Result<(), Error> {
        self.bind_affector(world, entity, Some(light_index), None, Box::new(callback))
    }

    /// Bind affector `affector_index` of `entity` to light `light_index`, both multi holders.
    pub fn set_affector_callback_at(
        &mut self,
        world: &mut impl LightWorld,
        entity: Entity,
        light_index: usize,
        affector_index: usize,
        callback: impl LightAffect + 'static,
    ) -> Result<(), Error> {
        self.bind_affector(
            world,
            entity,
            Some(light_index),
            Some(affector_index),
            Box::new(callback),
        )
    }

    /// Shift every light of `entity`, notifying each new bounds.
    pub fn move_lights(&mut self, world: &mut impl LightWorld, entity: Entity, offset: Vec2) {
        let Some(components) = world.components_mut(entity) else {
            return;
        };

        let transform = components.transform;
        let mut moved = Vec::new();
        for emitter in components
            .light
            .iter_mut()
            .chain(components.multi_light.iter_mut().flat_map(|multi| multi.iter_mut()))
        {
            let light = emitter.light_mut();
            light.move_by(offset);
            moved.push(light.world_bounds(&transform));
        }

        for bounds in moved {
            self.notify(entity, bounds);
        }
    }

    /// Shift every collider of `entity`, notifying each new bounds.
    pub fn move_light_colliders(
        &mut self,
        world: &mut impl LightWorld,
        entity: Entity,
        offset: Vec2,
    ) {
        let Some(components) = world.components_mut(entity) else {
            return;
        };

        let transform = components.transform;
        let mut moved = Vec::new();
        for shadow in components
            .shadow
            .iter_mut()
            .chain(components.multi_shadow.iter_mut().flat_map(|multi| multi.iter_mut()))
        {
            let collider = shadow.collider_mut();
            collider.move_by(offset);
            moved.push(collider.world_bounds(&transform));
        }

        for bounds in moved {
            self.notify(entity, bounds);
        }
    }

    fn modify_light(
        &mut self,
        world: &mut impl LightWorld,
        entity: Entity,
        index: Option<usize>,
        change: impl FnOnce(&mut PointLight),
    ) -> Result<(), Error> {
        let (light, transform) = light_mut(world, entity, index)?;
        change(light);
        let bounds = light.world_bounds(&transform);
        self.notify(entity, bounds);
        Ok(())
    }

    fn modify_collider(
        &mut self,
        world: &mut impl LightWorld,
        entity: Entity,
        index: Option<usize>,
        change: impl FnOnce(&mut Occluder) -> Result<(), Error>,
    ) -> Result<(), Error> {
        let (collider, transform) = collider_mut(world, entity, index)?;
        change(collider)?;
        let bounds = collider.world_bounds(&transform);
        self.notify(entity, bounds);
        Ok(())
    }

    fn bind_affector(
        &mut self,
        world: &mut impl LightWorld,
        entity: Entity,
        light_index: Option<usize>,
        affector_index: Option<usize>,
        callback: Box<dyn LightAffect>,
    ) -> Result<(), Error> {
        // The light has to exist at binding time, it is resolved again on every update.
        light_mut(world, entity, light_index)?;

        let components = world.components_mut(entity).ok_or(Error::MissingComponent {
            entity,
            component: "LightAffector",
        })?;
        let affector = match affector_index {
            None => components.affector.as_mut().ok_or(Error::MissingComponent {
                entity,
                component: "LightAffector",
            })?,
            Some(index) => {
                let multi = components
                    .multi_affector
                    .as_mut()
                    .ok_or(Error::MissingComponent {
                        entity,
                        component: "MultiLightAffector",
                    })?;
                let len = multi.len();
                multi.get_mut(index).ok_or(Error::OutOfRange {
                    entity,
                    component: "MultiLightAffector",
                    index,
                    len,
                })?
            }
        };

        affector.bind(
            LightHandle {
                entity,
                index: light_index,
            },
            callback,
        );
        Ok(())
    }
}

fn resolve_light(world: &mut impl LightWorld, handle: LightHandle) -> Option<&mut PointLight> {
    world
        .components_mut(handle.entity)?
        .light_at_mut(handle.index)
}

fn light_mut(
    world: &mut impl LightWorld,
    entity: Entity,
    index: Option<usize>,
) -> Result<(&mut PointLight, Transform), Error> {
    let components = world.components_mut(entity).ok_or(Error::MissingComponent {
        entity,
        component: if index.is_some() {
            "MultiLightEmitter"
        } else {
            "LightEmitter"
        },
    })?;
    let transform = components.transform;

    let emitter = match index {
        None => components.light.as_mut().ok_or(Error::MissingComponent {
            entity,
            component: "LightEmitter",
        })?,
        Some(index) => {
            let multi = components
                .multi_light
                .as_mut()
                .ok_or(Error::MissingComponent {
                    entity,
                    component: "MultiLightEmitter",
                })?;
            let len = multi.len();
            multi.get_mut(index).ok_or(Error::OutOfRange {
                entity,
                component: "MultiLightEmitter",
                index,
                len,
            })?
        }
    };

    Ok((emitter.light_mut(), transform))
}

fn collider_mut(
    world: &mut impl LightWorld,
    entity: Entity,
    index: Option<usize>,
) -> Result<(&mut Occluder, Transform), Error> {
    let components = world.components_mut(entity).ok_or(Error::MissingComponent {
        entity,
        component: if index.is_some() {
            "MultiShadowEmitter"
        } else {
            "ShadowEmitter"
        },
    })?;
    let transform = components.transform;

    let emitter = match index {
        None => components.shadow.as_mut().ok_or(Error::MissingComponent {
            entity,
            component: "ShadowEmitter",
        })?,
        Some(index) => {
            let multi = components
                .multi_shadow
                .as_mut()
                .ok_or(Error::MissingComponent {
                    entity,
                    component: "MultiShadowEmitter",
                })?;
            let len = multi.len();
            multi.get_mut(index).ok_or(Error::OutOfRange {
                entity,
                component: "MultiShadowEmitter",
                index,
                len,
            })?
        }
    };

    Ok((emitter.collider_mut(), transform))
}

fn set_collider_point(
    collider: &mut Occluder,
    entity: Entity,
    index: usize,
    point: Vec2,
) -> Result<(), Error> {
    let len = collider.point_count();
    if collider.set_point(index, point) {
        Ok(())
    } else {
        Err(Error::OutOfRange {
            entity,
            component: "LightCollider point",
            index,
            len,
        })
    }
}

#[cfg(test)]
mod test {
    use std::{cell::RefCell, rc::Rc, sync::Arc};

    use super::*;
    use crate::{
        affector::{LightAffector, LightFlickering},
        color::Color,
        image::Image,
        world::{LightEmitter, Multi, ShadowEmitter, World},
    };

    fn system(width: u32, height: u32) -> LightSystem {
        LightSystem::new(&LightSystemConfig::default().with_image_size(width, height))
    }

    fn square(left: f32, top: f32, size: f32) -> Vec<Vec2> {
        vec![
            Vec2::new(left, top),
            Vec2::new(left + size, top),
            Vec2::new(left + size, top + size),
            Vec2::new(left, top + size),
        ]
    }

    fn recorder(system: &mut LightSystem) -> Rc<RefCell<Vec<(Entity, IntRect)>>> {
        let record = Rc::new(RefCell::new(Vec::new()));
        let sink = record.clone();
        system.on_contents_changed(move |entity, rect| sink.borrow_mut().push((entity, *rect)));
        record
    }

    #[test]
    fn ambient_interpolation_is_idempotent() {
        let mut system = system(4, 4);
        let ambient = Color8::new(12, 200, 77);
        system.set_ambient_color(ambient);

        for strength in [0.3, 1., 7.5, 100.] {
            for _ in 0..50 {
                system.interpolate_ambient_light(ambient, strength);
            }
            assert_eq!(ambient, system.ambient_color());
        }
    }

    #[test]
    fn ambient_interpolation_converges_without_overshoot() {
        let mut system = system(4, 4);
        system.set_ambient_color(Color8::BLACK);
        let target = Color8::new(255, 128, 3);

        for _ in 0..500 {
            system.interpolate_ambient_light(target, 12.);
            let current = system.ambient_color();
            assert!(current.r <= target.r && current.g <= target.g && current.b <= target.b);
        }
        assert_eq!(target, system.ambient_color());

        // And back down.
        for _ in 0..500 {
            system.interpolate_ambient_light(Color8::new(0, 0, 0), 3.);
        }
        assert_eq!(Color8::BLACK, system.ambient_color());

        system.interpolate_ambient_light(target, 0.);
        assert_eq!(target, system.ambient_color());

        // A single whole unit is flushed right away.
        system.set_ambient_color(Color8::BLACK);
        system.interpolate_ambient_light(Color8::new(1, 0, 0), 1.);
        assert_eq!(Color8::new(1, 0, 0), system.ambient_color());
    }

    #[test]
    fn light_mutations_notify_world_bounds() {
        let mut system = system(4, 4);
        let record = recorder(&mut system);

        let mut world = World::new();
        let entity = world.spawn(Transform::default().translate(Vec2::new(1000., 0.)));
        if let Some(components) = world.components_mut(entity) {
            components.light = Some(LightEmitter::new(PointLight::with_texture(Arc::new(
                Image::new(10, 10, Color::WHITE),
            ))));
        }

        system
            .set_local_light_position(&mut world, entity, Vec2::new(20., 20.))
            .expect("entity has a light");
        system
            .set_light_scale(&mut world, entity, Vec2::new(2., 2.))
            .expect("entity has a light");
        system
            .set_light_color(&mut world, entity, Color8::new(255, 0, 0))
            .expect("entity has a light");

        let expected = vec![
            (
                entity,
                IntRect {
                    left: 1015,
                    top: 15,
                    width: 10,
                    height: 10,
                },
            ),
            (
                entity,
                IntRect {
                    left: 1010,
                    top: 10,
                    width: 20,
                    height: 20,
                },
            ),
        ];
        assert_eq!(expected, *record.borrow());

        assert_eq!(
            Err(Error::MissingComponent {
                entity,
                component: "MultiLightEmitter"
            }),
            system.set_light_scale_at(&mut world, entity, 0, Vec2::new(1., 1.))
        );
    }

    #[test]
    fn moving_lights_notifies_each_light() {
        let mut system = system(4, 4);
        let record = recorder(&mut system);

        let mut world = World::new();
        let entity = world.spawn(Transform::default().translate(Vec2::new(0., 100.)));
        let light_at = |x: f32| {
            let mut light = PointLight::with_texture(Arc::new(Image::new(10, 10, Color::WHITE)));
            light.set_position(Vec2::new(x, 0.));
            LightEmitter::new(light)
        };
        if let Some(components) = world.components_mut(entity) {
            components.light = Some(light_at(0.));
            components.multi_light = Some(Multi::from(vec![light_at(20.), light_at(40.)]));
        }

        system.move_lights(&mut world, entity, Vec2::new(5., 5.));

        let rect = |left: i32| IntRect {
            left,
            top: 100,
            width: 10,
            height: 10,
        };
        assert_eq!(
            vec![(entity, rect(0)), (entity, rect(20)), (entity, rect(40))],
            *record.borrow()
        );

        let moved = world
            .components(entity)
            .map(|components| components.lights().map(PointLight::position).collect::<Vec<_>>());
        assert_eq!(
            Some(vec![
                Vec2::new(5., 5.),
                Vec2::new(25., 5.),
                Vec2::new(45., 5.)
            ]),
            moved
        );

        system.move_lights(&mut world, Entity(99), Vec2::new(1., 1.));
        assert_eq!(3, record.borrow().len());
    }

    #[test]
    fn collider_mutations() {
        let mut system = system(4, 4);
        let record = recorder(&mut system);

        let mut world = World::new();
        let entity = world.spawn(Transform::default());
        if let Some(components) = world.components_mut(entity) {
            components.multi_shadow = Some(Multi::from(vec![ShadowEmitter::default()]));
        }

        system
            .set_points_at(&mut world, entity, 0, &square(0., 0., 4.))
            .expect("collider exists");
        system
            .set_point_at(&mut world, entity, 0, 2, Vec2::new(6., 6.))
            .expect("point exists");

        assert_eq!(
            Err(Error::OutOfRange {
                entity,
                component: "LightCollider point",
                index: 9,
                len: 4
            }),
            system.set_point_at(&mut world, entity, 0, 9, Vec2::default())
        );
        assert_eq!(
            Err(Error::OutOfRange {
                entity,
                component: "MultiShadowEmitter",
                index: 1,
                len: 1
            }),
            system.set_points_at(&mut world, entity, 1, &[])
        );
        assert!(matches!(
            system.set_points(&mut world, entity, &[]),
            Err(Error::MissingComponent { .. })
        ));

        system.move_light_colliders(&mut world, entity, Vec2::new(10., 0.));

        let rects: Vec<IntRect> = record.borrow().iter().map(|(_, rect)| *rect).collect();
        assert_eq!(
            vec![
                IntRect {
                    left: 0,
                    top: 0,
                    width: 4,
                    height: 4
                },
                IntRect {
                    left: 0,
                    top: 0,
                    width: 6,
                    height: 6
                },
                IntRect {
                    left: 10,
                    top: 0,
                    width: 6,
                    height: 6
                },
            ],
            rects
        );
    }

    #[test]
    fn affectors_follow_their_handles() {
        let mut system = system(4, 4);
        let mut world = World::new();
        let entity = world.spawn(Transform::default());
        if let Some(components) = world.components_mut(entity) {
            components.light = Some(LightEmitter::default());
            components.multi_light = Some(vec![LightEmitter::default(); 2].into());
            components.affector = Some(LightAffector::new());
            components.multi_affector = Some(vec![LightAffector::new()].into());
        }

        system
            .set_affector_callback(&mut world, entity, |delta: f32, light: &mut PointLight| {
                light.set_radius(light.radius() + delta)
            })
            .expect("single light and affector");
        system
            .set_affector_callback_at(&mut world, entity, 1, 0, LightFlickering::new(10., 1.))
            .expect("multi light and affector");

        system.update(&mut world, &[entity], 2.);

        let radius = |world: &World| {
            world
                .components(entity)
                .and_then(|c| c.light.as_ref())
                .map(|emitter| emitter.light().radius())
        };
        let multi_scale = |world: &World, i: usize| {
            world
                .components(entity)
                .and_then(|c| c.multi_light.as_ref())
                .and_then(|multi| multi.get(i))
                .map(|emitter| emitter.light().scale().x())
        };

        assert_eq!(Some(12.), radius(&world));
        assert_eq!(Some(1.), multi_scale(&world, 0));
        assert!(multi_scale(&world, 1).is_some_and(|scale| scale < 1.));

        // The single holder disappears: the affector is skipped but stays bound.
        if let Some(components) = world.components_mut(entity) {
            components.light = None;
        }
        system.update(&mut world, &[entity], 2.);
        let affector_ready = world
            .components(entity)
            .and_then(|c| c.affector.as_ref())
            .is_some_and(LightAffector::is_ready);
        assert!(affector_ready);

        assert_eq!(
            Err(Error::OutOfRange {
                entity,
                component: "MultiLightEmitter",
                index: 5,
                len: 2
            }),
            system.set_affector_callback_for(&mut world, entity, 5, LightFlickering::new(1., 1.))
        );
    }

    #[test]
    fn renders_a_frame() {
        let mut system = system(100, 100);
        system.set_ambient_color(Color8::BLACK);

        let mut world = World::new();
        let lamp = world.spawn(Transform::default().translate(Vec2::new(50., 5.)));
        let wall = world.spawn(Transform::default());
        let dark_lamp = world.spawn(Transform::default().translate(Vec2::new(5., 80.)));
        if let Some(components) = world.components_mut(lamp) {
            let mut light = PointLight::with_texture(Arc::new(Image::new(200, 200, Color::WHITE)));
            light.set_radius(2.);
            components.light = Some(LightEmitter::new(light));
        }
        if let Some(components) = world.components_mut(dark_lamp) {
            let mut light = PointLight::new();
            light.set_active(false);
            components.light = Some(LightEmitter::new(light));
        }
        system
            .set_points(&mut world, wall, &square(40., 30., 20.))
            .expect_err("wall has no collider yet");
        if let Some(components) = world.components_mut(wall) {
            components.shadow = Some(ShadowEmitter::new(Occluder::new(square(40., 30., 20.))));
        }

        let mut target = Canvas::new(100, 100);
        target.clear(Color::WHITE);
        let entities = world.entities();
        system.render(&world, &world, &entities, &mut target);

        assert_eq!(Some(Color::BLACK), target.pixel(50, 80));
        assert_eq!(Some(Color::WHITE), target.pixel(5, 80));
        assert_eq!(Some(Color::BLACK), target.pixel(50, 40));
    }
}

//! Per-tick light effects and the built-in flicker behaviors.

use dyn_clone::DynClone;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    light::PointLight,
    vector::{Vec2, EPSILON},
    world::Entity,
};

/// Callback run on a light once per update tick with the elapsed time.
///
/// Callbacks may change the light's scale and color but must not grow its bounding box past
/// its original size, the spatial index is not refreshed on every tick.
pub trait LightAffect: DynClone {
    #[allow(missing_docs)]
    fn affect(&mut self, delta: f32, light: &mut PointLight);
}

dyn_clone::clone_trait_object!(LightAffect);

impl<F> LightAffect for F
where
    F: FnMut(f32, &mut PointLight) + Clone + 'static,
{
    fn affect(&mut self, delta: f32, light: &mut PointLight) {
        self(delta, light)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// Addresses a light on an entity: the single light holder, or an entry of the multi holder.
pub struct LightHandle {
    #[allow(missing_docs)]
    pub entity: Entity,
    /// `None` for the single light, `Some(i)` for light `i` of the multi holder.
    pub index: Option<usize>,
}

#[derive(Clone)]
/// Binding of a [LightAffect] callback to one light.
///
/// The target is a handle, resolved again on every dispatch; a handle that no longer resolves
/// is skipped.
pub struct LightAffector {
    callback: Option<Box<dyn LightAffect>>,
    target: Option<LightHandle>,
    active: bool,
}

impl Default for LightAffector {
    fn default() -> Self {
        Self {
            callback: None,
            target: None,
            active: true,
        }
    }
}

impl std::fmt::Debug for LightAffector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LightAffector")
            .field("bound", &self.callback.is_some())
            .field("target", &self.target)
            .field("active", &self.active)
            .finish()
    }
}

activatable!(LightAffector);

impl LightAffector {
    /// Unbound affector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Point the affector at `target` with a new callback.
    pub fn bind(&mut self, target: LightHandle, callback: Box<dyn LightAffect>) {
        self.target = Some(target);
        self.callback = Some(callback);
    }

    #[allow(missing_docs)]
    pub fn target(&self) -> Option<LightHandle> {
        self.target
    }

    /// Active and bound.
    pub fn is_ready(&self) -> bool {
        self.active && self.callback.is_some() && self.target.is_some()
    }

    /// Detach the callback for a dispatch, see [LightAffector::restore_callback].
    pub(crate) fn take_callback(&mut self) -> Option<Box<dyn LightAffect>> {
        self.callback.take()
    }

    pub(crate) fn restore_callback(&mut self, callback: Box<dyn LightAffect>) {
        self.callback = Some(callback);
    }
}

/// Grow (or shrink, for a negative `step`) the magnitude of each scale component, keeping it
/// between zero and the base magnitude. Mirrored axes stay mirrored.
fn step_scale(scale: Vec2, step: f32, base: Vec2) -> Vec2 {
    let axis = |value: f32, base: f32| {
        (value.abs() + step).max(0.).min(base.abs()).copysign(base)
    };
    Vec2::new(axis(scale.x(), base.x()), axis(scale.y(), base.y()))
}

#[derive(Clone, Debug, PartialEq)]
/// Periodic flicker: the light shrinks then grows back, switching every `period` time units.
///
/// The scale change over one period is `strength`. The scale never exceeds the one seen on the
/// first tick.
pub struct LightFlickering {
    period: f32,
    strength: f32,
    growing: bool,
    elapsed: f32,
    base_scale: Option<Vec2>,
}

impl LightFlickering {
    /// `period` is in the same unit as the `delta` given to updates.
    pub fn new(period: f32, strength: f32) -> Self {
        Self {
            period,
            strength,
            growing: false,
            elapsed: 0.,
            base_scale: None,
        }
    }
}

impl LightAffect for LightFlickering {
    fn affect(&mut self, delta: f32, light: &mut PointLight) {
        let base = *self.base_scale.get_or_insert(light.scale());
        let step = self.strength * delta / self.period.max(EPSILON);
        let step = if self.growing { step } else { -step };

        light.set_scale(step_scale(light.scale(), step, base));

        self.elapsed += delta;
        if self.elapsed > self.period {
            self.elapsed = 0.;
            self.growing = !self.growing;
        }
    }
}

#[derive(Clone, Debug)]
/// Irregular flicker: like [LightFlickering], but every phase lasts a random fraction (half to
/// full) of the base period, and growing stops as soon as the original size is reached.
pub struct RandomizedFlickering {
    base_period: f32,
    period: f32,
    strength: f32,
    growing: bool,
    elapsed: f32,
    offset: f32,
    base_scale: Option<Vec2>,
    rng: StdRng,
}

impl RandomizedFlickering {
    #[allow(missing_docs)]
    pub fn new(base_period: f32, strength: f32) -> Self {
        Self::with_rng(base_period, strength, StdRng::from_entropy())
    }

    /// Reproducible flicker.
    pub fn with_seed(base_period: f32, strength: f32, seed: u64) -> Self {
        Self::with_rng(base_period, strength, StdRng::seed_from_u64(seed))
    }

    fn with_rng(base_period: f32, strength: f32, mut rng: StdRng) -> Self {
        Self {
            base_period,
            period: rng.gen_range(0.5..1.0) * base_period,
            strength,
            growing: false,
            elapsed: 0.,
            offset: 0.,
            base_scale: None,
            rng,
        }
    }

    fn next_phase(&mut self, growing: bool) {
        self.elapsed = 0.;
        self.growing = growing;
        self.period = self.rng.gen_range(0.5..1.0) * self.base_period;
    }
}

impl LightAffect for RandomizedFlickering {
    fn affect(&mut self, delta: f32, light: &mut PointLight) {
        let base = *self.base_scale.get_or_insert(light.scale());
        let step = self.strength * delta / self.period.max(EPSILON);
        self.elapsed += delta;

        if self.growing {
            light.set_scale(step_scale(light.scale(), step, base));
            self.offset += step;
            if self.offset >= 0. || self.elapsed > self.period {
                self.next_phase(false);
            }
        } else {
            light.set_scale(step_scale(light.scale(), -step, base));
            self.offset -= step;
            if self.offset <= -self.strength * self.period || self.elapsed > self.period {
                self.next_phase(true);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use float_eq::assert_float_eq;

    use super::*;

    #[test]
    fn flickering_shrinks_then_grows() {
        let mut light = PointLight::new();
        let mut flicker = LightFlickering::new(10., 0.5);

        flicker.affect(5., &mut light);
        assert_float_eq!(light.scale().x(), 0.75, abs <= 0.000_1);

        // Direction switches once the period has elapsed.
        flicker.affect(6., &mut light);
        flicker.affect(4., &mut light);
        assert_float_eq!(light.scale().x(), 0.65, abs <= 0.000_1);

        for _ in 0..100 {
            flicker.affect(1., &mut light);
            assert!(light.scale().x() <= 1.);
            assert!(light.scale().y() >= 0.);
        }
    }

    #[test]
    fn randomized_flickering_stays_bounded() {
        let mut light = PointLight::new();
        light.set_scale(Vec2::new(2., 2.));
        let mut flicker = RandomizedFlickering::with_seed(20., 0.05, 7);

        let mut smallest: f32 = 2.;
        for _ in 0..1_000 {
            flicker.affect(1., &mut light);
            let scale = light.scale();
            assert!(scale.x() <= 2. && scale.y() <= 2.);
            assert!(scale.x() >= 0.);
            smallest = smallest.min(scale.x());
        }
        assert!(smallest < 2.);
    }

    #[test]
    fn mirrored_lights_flicker() {
        let mut light = PointLight::new();
        light.set_scale(Vec2::new(-1., 1.));
        let mut flicker = LightFlickering::new(10., 0.5);

        flicker.affect(1., &mut light);
        assert_float_eq!(light.scale().x(), -0.95, abs <= 0.000_1);
        assert_float_eq!(light.scale().y(), 0.95, abs <= 0.000_1);

        let mut flicker = RandomizedFlickering::with_seed(4., 0.3, 11);
        for _ in 0..200 {
            flicker.affect(1., &mut light);
            let scale = light.scale();
            assert!((-1. ..=0.).contains(&scale.x()));
            assert!((0. ..=1.).contains(&scale.y()));
        }
    }

    #[test]
    fn closures_are_affects() {
        let mut light = PointLight::new();
        let mut callback: Box<dyn LightAffect> =
            Box::new(|delta: f32, light: &mut PointLight| light.set_radius(delta));

        let mut copy = callback.clone();
        callback.affect(3., &mut light);
        assert_eq!(3., light.radius());
        copy.affect(4., &mut light);
        assert_eq!(4., light.radius());
    }

    #[test]
    fn affector_binding() {
        let mut affector = LightAffector::new();
        assert!(!affector.is_ready());

        let handle = LightHandle {
            entity: Entity(3),
            index: Some(1),
        };
        affector.bind(handle, Box::new(LightFlickering::new(1., 1.)));
        assert!(affector.is_ready());
        assert_eq!(Some(handle), affector.target());

        affector.toggle_active();
        assert!(!affector.is_ready());
    }
}

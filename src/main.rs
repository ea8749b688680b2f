use std::path::PathBuf;

use anyhow::Context;
use softshadow::prelude::*;

const WIDTH: u32 = 640;
const HEIGHT: u32 = 480;

fn rect(left: f32, top: f32, width: f32, height: f32) -> Vec<Vec2> {
    vec![
        Vec2::new(left, top),
        Vec2::new(left + width, top),
        Vec2::new(left + width, top + height),
        Vec2::new(left, top + height),
    ]
}

fn floor(target: &mut Canvas) {
    target.clear(Color::gray(0.55));
    let tile = 40.;
    for row in 0..(HEIGHT / 40) {
        for column in (row % 2..(WIDTH / 40)).step_by(2) {
            target.fill_convex(
                &rect(column as f32 * tile, row as f32 * tile, tile, tile),
                Color::gray(0.7),
                BlendMode::Replace,
            );
        }
    }
}

fn populate(system: &mut LightSystem, world: &mut World) -> anyhow::Result<()> {
    let lamp = world.spawn(Transform::default().translate(Vec2::new(320., 140.)));
    let mut light = PointLight::new();
    light.set_scale(Vec2::new(5., 5.));
    light.set_radius(12.);
    light.set_color(Color8::new(255, 225, 170));
    world
        .components_mut(lamp)
        .context("Lamp entity vanished")?
        .light = Some(LightEmitter::new(light));

    let torches = world.spawn(Transform::default().translate(Vec2::new(0., 400.)));
    let torch = |x: f32, color: Color8| {
        let mut light = PointLight::new();
        light.set_position(Vec2::new(x, 0.));
        light.set_scale(Vec2::new(3., 3.));
        light.set_radius(6.);
        light.set_color(color);
        LightEmitter::new(light)
    };
    let components = world
        .components_mut(torches)
        .context("Torch entity vanished")?;
    components.multi_light = Some(Multi::from(vec![
        torch(90., Color8::new(255, 140, 60)),
        torch(550., Color8::new(120, 170, 255)),
    ]));
    components.multi_affector = Some(Multi::from(vec![LightAffector::new(); 2]));

    let walls = world.spawn(Transform::default());
    let mut pillar = Occluder::new(rect(-15., -15., 30., 30.));
    pillar.set_transform(
        Transform::default()
            .translate(Vec2::new(200., 280.))
            .rotate(std::f32::consts::FRAC_PI_4),
    );
    let mut glass = Occluder::new(rect(400., 250., 60., 20.));
    glass.set_light_over_shape(true);
    world
        .components_mut(walls)
        .context("Wall entity vanished")?
        .multi_shadow = Some(Multi::from(vec![
        ShadowEmitter::new(Occluder::new(rect(260., 200., 120., 16.))),
        ShadowEmitter::new(pillar),
        ShadowEmitter::new(glass),
        ShadowEmitter::new(Occluder::new(vec![
            Vec2::new(480., 330.),
            Vec2::new(520., 390.),
            Vec2::new(440., 390.),
        ])),
    ]));

    system.set_affector_callback_at(world, torches, 0, 0, LightFlickering::new(0.4, 0.3))?;
    system.set_affector_callback_at(
        world,
        torches,
        1,
        1,
        RandomizedFlickering::with_seed(0.5, 0.4, 42),
    )?;

    // Slide the top wall a little to the left.
    system.move_light_colliders(world, walls, Vec2::new(-20., 0.));

    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let output = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("output.ppm"));

    let config = LightSystemConfig::default()
        .with_image_size(WIDTH, HEIGHT)
        .with_ambient_color(Color8::BLACK);
    let mut system = LightSystem::new(&config);
    system.on_contents_changed(|entity, rect| log::debug!("{entity:?} now covers {rect:?}"));

    let mut world = World::new();
    populate(&mut system, &mut world)?;

    let entities = world.entities();
    let night = Color8::new(35, 35, 60);
    for _ in 0..20 {
        system.update(&mut world, &entities, 1. / 30.);
        system.interpolate_ambient_light(night, 8.);
    }

    let mut target = Canvas::new(WIDTH, HEIGHT);
    floor(&mut target);
    system.render(&world, &world, &entities, &mut target);

    target
        .image()
        .save_as_ppm(&output)
        .with_context(|| format!("Could not write {}", output.display()))?;
    log::info!("Wrote {}", output.display());

    Ok(())
}

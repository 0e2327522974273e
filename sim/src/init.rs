use std::path::PathBuf;
use std::time::Duration;

use bevy::prelude::*;
use bevy::transform::TransformPlugin;
use bevy_app::ScheduleRunnerPlugin;
use bevy_rapier3d::prelude::*;
use buoyancy::{BuoyancyConfig, BuoyancyPlugin};

use crate::report::{count_ticks, report_bodies, SimSettings, TickCounter};
use crate::scene::load_from_file::load_scene;
use crate::scene::spawn::{configure_gravity, spawn_scene};

pub const TICKS_PER_SECOND: u64 = 64;

pub fn init(scene_path: Option<PathBuf>, settings: SimSettings) {
    let mut app = App::new();
    app.add_plugins(
        MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
            1.0 / TICKS_PER_SECOND as f64,
        ))),
    );
    app.add_plugins(bevy::log::LogPlugin::default());
    app.add_plugins(TransformPlugin);

    let scene = match load_scene(scene_path.as_deref()) {
        Ok(scene) => scene,
        Err(err) => {
            error!("Failed to load scene: {}", err);
            return;
        }
    };

    app.insert_resource(Time::<Fixed>::from_hz(TICKS_PER_SECOND as f64));
    app.add_plugins(RapierPhysicsPlugin::<NoUserData>::default().in_fixed_schedule());
    app.add_plugins(BuoyancyPlugin::new(BuoyancyConfig {
        gravity: scene.gravity,
        ..default()
    }));

    app.insert_resource(scene);
    app.insert_resource(settings);
    app.init_resource::<TickCounter>();

    app.add_systems(Startup, spawn_scene);
    app.add_systems(PostStartup, configure_gravity);
    app.add_systems(FixedLast, (count_ticks, report_bodies).chain());

    info!(
        "Running {} ticks, reporting every {}",
        settings.ticks, settings.report_every
    );
    app.run();
}

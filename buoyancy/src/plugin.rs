//! Bevy + Rapier integration for buoyant bodies.
//!
//! Water volumes are Rapier sensors carrying a [`WaterVolume`]. Any dynamic
//! body whose collider starts touching one gets a [`FloatingBody`] on that
//! collider and a [`BuoyantRigidBody`] marker on the body; from then on its
//! `ExternalForce` and `Damping` are rebuilt every fixed step.

use bevy::prelude::*;
use bevy_log::{debug, info};
use bevy_rapier3d::prelude::*;

use crate::body::{
    BuoyancyFactory, BuoyancySettings, FloatingBody, OverlapCandidate, RigidBodyHandle,
};
use crate::constants::GRAVITY;
use crate::water::{WaterSurface, WaterSurfaceConfig};

/// Plugin-wide buoyancy settings.
#[derive(Resource, Clone, Debug)]
pub struct BuoyancyConfig {
    /// Gravity magnitude used for the buoyant force (m/s²)
    pub gravity: f32,
    /// Settings for bodies without a [`BuoyancyOverride`]
    pub defaults: BuoyancySettings,
    pub enabled: bool,
}

impl Default for BuoyancyConfig {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            defaults: BuoyancySettings::default(),
            enabled: true,
        }
    }
}

/// An animated water surface. Needs a sensor collider, see
/// [`water_volume_collider`].
#[derive(Component, Debug, Clone)]
pub struct WaterVolume {
    pub surface: WaterSurface,
}

impl WaterVolume {
    pub fn new(config: &WaterSurfaceConfig, transform: Transform) -> Self {
        Self {
            surface: WaterSurface::new(config, transform),
        }
    }
}

/// Marks a rigid body that owns at least one [`FloatingBody`] collider.
#[derive(Component, Default, Clone, Copy, Debug)]
pub struct BuoyantRigidBody;

/// Per-collider settings replacing [`BuoyancyConfig::defaults`].
#[derive(Component, Clone, Copy, Debug)]
pub struct BuoyancyOverride(pub BuoyancySettings);

/// Sensor box under the water grid, tall enough for the highest waves.
pub fn water_volume_collider(surface: &WaterSurface) -> Collider {
    let volume = surface
        .grid()
        .trigger_volume(surface.waves().max_height());
    Collider::compound(vec![(
        volume.center,
        Quat::IDENTITY,
        Collider::cuboid(
            volume.half_extents.x,
            volume.half_extents.y,
            volume.half_extents.z,
        ),
    )])
}

/// Components to spawn a water volume with.
pub fn water_volume_bundle(
    config: &WaterSurfaceConfig,
    transform: Transform,
) -> (WaterVolume, Collider, Sensor, ActiveEvents, Transform) {
    let volume = WaterVolume::new(config, transform);
    let collider = water_volume_collider(&volume.surface);
    (
        volume,
        collider,
        Sensor,
        ActiveEvents::COLLISION_EVENTS,
        transform,
    )
}

#[derive(Default)]
pub struct BuoyancyPlugin {
    pub config: BuoyancyConfig,
}

impl BuoyancyPlugin {
    pub fn new(config: BuoyancyConfig) -> Self {
        Self { config }
    }
}

impl Plugin for BuoyancyPlugin {
    fn build(&self, app: &mut App) {
        info!(
            "Buoyancy enabled (gravity {}, default coefficient {})",
            self.config.gravity, self.config.defaults.buoyancy
        );
        app.insert_resource(self.config.clone())
            .add_systems(Update, (sync_water_volumes, handle_water_overlaps).chain())
            .add_systems(FixedUpdate, apply_buoyancy_forces);
    }
}

/// Keeps every surface's transform and wave clock in step with the world.
fn sync_water_volumes(time: Res<Time>, mut waters: Query<(&mut WaterVolume, &GlobalTransform)>) {
    let elapsed = time.elapsed_secs();
    for (mut water, global) in waters.iter_mut() {
        water.surface.set_transform(global.compute_transform());
        water.surface.set_elapsed(elapsed);
    }
}

/// A buoyancy component waiting for the end of the frame to be inserted.
struct PendingAttach {
    collider: Entity,
    body: Entity,
    floating: FloatingBody,
}

fn handle_water_overlaps(
    mut commands: Commands,
    mut collisions: EventReader<CollisionEvent>,
    config: Res<BuoyancyConfig>,
    waters: Query<(), With<WaterVolume>>,
    mut floating: Query<&mut FloatingBody>,
    colliders: Query<(&Collider, Option<&Name>, Option<&BuoyancyOverride>), Without<Sensor>>,
    bodies: Query<(&RigidBody, Option<&Damping>)>,
    parents: Query<&ChildOf>,
    children: Query<&Children>,
    solids: Query<(), (With<Collider>, Without<Sensor>)>,
) {
    if !config.enabled {
        collisions.clear();
        return;
    }

    let factory = BuoyancyFactory::new(config.defaults);
    let mut pending: Vec<PendingAttach> = Vec::new();

    for event in collisions.read() {
        let (a, b, started) = match event {
            CollisionEvent::Started(a, b, _) => (*a, *b, true),
            CollisionEvent::Stopped(a, b, _) => (*a, *b, false),
        };
        let (water, other) = if waters.contains(a) && !waters.contains(b) {
            (a, b)
        } else if waters.contains(b) && !waters.contains(a) {
            (b, a)
        } else {
            continue;
        };
        let Ok((collider, name, tuning)) = colliders.get(other) else {
            continue;
        };

        let queued = pending.iter_mut().find(|p| p.collider == other);
        if !started {
            if let Ok(mut body) = floating.get_mut(other) {
                body.on_overlap_exit(water);
            } else if let Some(queued) = queued {
                queued.floating.on_overlap_exit(water);
            }
            continue;
        }
        if let Ok(mut body) = floating.get_mut(other) {
            body.on_overlap_enter(water, collider);
            continue;
        }
        if let Some(queued) = queued {
            queued.floating.on_overlap_enter(water, collider);
            continue;
        }

        let is_body = |entity: Entity| bodies.contains(entity);
        let owner = rigid_body_owner(other, is_body, &parents);
        let candidate = match owner.and_then(|owner| bodies.get(owner).ok().map(|b| (owner, b))) {
            Some((owner, (rigid_body, damping))) => {
                let damping = damping.cloned().unwrap_or_default();
                OverlapCandidate {
                    has_rigid_body: true,
                    kinematic: !matches!(rigid_body, RigidBody::Dynamic),
                    already_buoyant: false,
                    compound: owner != other,
                    solid_colliders: count_solid_colliders(owner, is_body, &children, &solids),
                    linear_damping: damping.linear_damping,
                    angular_damping: damping.angular_damping,
                    settings: tuning.map(|tuning| tuning.0),
                }
            }
            None => OverlapCandidate {
                has_rigid_body: false,
                kinematic: false,
                already_buoyant: false,
                compound: false,
                solid_colliders: 0,
                linear_damping: 0.0,
                angular_damping: 0.0,
                settings: None,
            },
        };

        let (Some(body), Some(mut attached)) = (owner, factory.attach(&candidate)) else {
            continue;
        };
        attached.on_overlap_enter(water, collider);
        debug!(
            "{} became buoyant with {} voxels",
            name.map_or_else(|| format!("{other:?}"), |name| name.to_string()),
            attached.voxels().len()
        );
        pending.push(PendingAttach {
            collider: other,
            body,
            floating: attached,
        });
    }

    for PendingAttach {
        collider,
        body,
        floating,
    } in pending
    {
        commands.entity(collider).insert(floating);
        commands.entity(body).insert(BuoyantRigidBody).insert_if_new((
            ExternalForce::default(),
            Damping::default(),
            ReadMassProperties::default(),
        ));
    }
}

/// Nearest entity at or above `entity` in the hierarchy that is a rigid body.
fn rigid_body_owner(
    entity: Entity,
    is_body: impl Fn(Entity) -> bool,
    parents: &Query<&ChildOf>,
) -> Option<Entity> {
    let mut current = entity;
    loop {
        if is_body(current) {
            return Some(current);
        }
        current = parents.get(current).ok()?.parent();
    }
}

/// Non-sensor colliders on `owner` and its descendants, stopping at nested
/// rigid bodies.
fn count_solid_colliders(
    owner: Entity,
    is_body: impl Fn(Entity) -> bool,
    children: &Query<&Children>,
    solids: &Query<(), (With<Collider>, Without<Sensor>)>,
) -> usize {
    let mut count = usize::from(solids.contains(owner));
    let mut stack = vec![owner];
    while let Some(entity) = stack.pop() {
        let Ok(kids) = children.get(entity) else {
            continue;
        };
        let kids: &[Entity] = kids;
        for &child in kids {
            if is_body(child) {
                continue;
            }
            count += usize::from(solids.contains(child));
            stack.push(child);
        }
    }
    count
}

/// Rapier body seen through [`RigidBodyHandle`]. Torque is accumulated about
/// the world-space centre of mass.
struct RapierBody<'a> {
    mass: f32,
    center_of_mass: Vec3,
    force: Mut<'a, ExternalForce>,
    damping: Mut<'a, Damping>,
}

impl RigidBodyHandle for RapierBody<'_> {
    fn mass(&self) -> f32 {
        self.mass
    }

    fn apply_force_at_point(&mut self, force: Vec3, point: Vec3) {
        self.force.force += force;
        self.force.torque += (point - self.center_of_mass).cross(force);
    }

    fn linear_damping(&self) -> f32 {
        self.damping.linear_damping
    }

    fn angular_damping(&self) -> f32 {
        self.damping.angular_damping
    }

    fn set_damping(&mut self, linear: f32, angular: f32) {
        self.damping.linear_damping = linear;
        self.damping.angular_damping = angular;
    }
}

fn apply_buoyancy_forces(
    config: Res<BuoyancyConfig>,
    waters: Query<&WaterVolume>,
    mut floating: Query<(Entity, &mut FloatingBody, &Collider, &GlobalTransform)>,
    parents: Query<&ChildOf>,
    mut bodies: Query<
        (&ReadMassProperties, &GlobalTransform, &mut ExternalForce, &mut Damping),
        With<BuoyantRigidBody>,
    >,
) {
    for (_, _, mut force, _) in bodies.iter_mut() {
        force.force = Vec3::ZERO;
        force.torque = Vec3::ZERO;
    }
    if !config.enabled {
        return;
    }

    for (entity, mut body, collider, global) in floating.iter_mut() {
        let Some(water) = body.water() else {
            continue;
        };
        let Ok(volume) = waters.get(water) else {
            continue;
        };
        let Some(owner) = rigid_body_owner(entity, |e| bodies.contains(e), &parents) else {
            continue;
        };
        let Ok((mass, body_global, force, damping)) = bodies.get_mut(owner) else {
            continue;
        };

        let mass = mass.get();
        let mut handle = RapierBody {
            mass: mass.mass,
            center_of_mass: body_global.transform_point(mass.local_center_of_mass),
            force,
            damping,
        };
        body.on_fixed_step(
            &volume.surface,
            collider,
            &global.compute_transform(),
            &mut handle,
            config.gravity,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{DEFAULT_BUOYANCY, WATER_TRIGGER_DEPTH};
    use crate::water::WavePreset;
    use bevy::ecs::system::RunSystemOnce;
    use bevy_rapier3d::rapier::geometry::CollisionEventFlags;

    fn world() -> World {
        let mut world = World::new();
        world.init_resource::<Events<CollisionEvent>>();
        world.insert_resource(BuoyancyConfig::default());
        world
    }

    /// Still water whose surface sits at y = 0 over x, z in [-5, 5].
    fn spawn_water(world: &mut World) -> Entity {
        let config = WaterSurfaceConfig {
            waves: WavePreset::Still.to_config(),
            ..Default::default()
        };
        let transform = Transform::from_xyz(-5.0, 0.0, -5.0);
        world
            .spawn((WaterVolume::new(&config, transform), Sensor, transform))
            .id()
    }

    fn spawn_body(world: &mut World, rigid_body: RigidBody) -> Entity {
        world
            .spawn((
                rigid_body,
                Collider::cuboid(0.5, 0.5, 0.5),
                GlobalTransform::default(),
                Damping {
                    linear_damping: 0.2,
                    angular_damping: 0.3,
                },
            ))
            .id()
    }

    fn started(water: Entity, other: Entity) -> CollisionEvent {
        CollisionEvent::Started(water, other, CollisionEventFlags::empty())
    }

    fn stopped(water: Entity, other: Entity) -> CollisionEvent {
        CollisionEvent::Stopped(water, other, CollisionEventFlags::empty())
    }

    fn deliver(world: &mut World, events: impl IntoIterator<Item = CollisionEvent>) {
        world.resource_mut::<Events<CollisionEvent>>().clear();
        for event in events {
            world.send_event(event);
        }
        world.run_system_once(handle_water_overlaps).unwrap();
    }

    #[test]
    fn test_dynamic_body_becomes_buoyant() {
        let mut world = world();
        let water = spawn_water(&mut world);
        let body = spawn_body(&mut world, RigidBody::Dynamic);

        deliver(&mut world, [started(water, body)]);

        let floating = world.get::<FloatingBody>(body).unwrap();
        assert_eq!(floating.water(), Some(water));
        assert_eq!(floating.voxels().len(), 8);
        assert_eq!(floating.dry_damping(), (0.2, 0.3));
        assert_eq!(floating.settings().buoyancy, DEFAULT_BUOYANCY);
        assert!(world.get::<BuoyantRigidBody>(body).is_some());
        assert!(world.get::<ExternalForce>(body).is_some());
        assert!(world.get::<ReadMassProperties>(body).is_some());
        assert_eq!(world.get::<Damping>(body).unwrap().linear_damping, 0.2);
    }

    #[test]
    fn test_kinematic_and_bodiless_colliders_are_ignored() {
        let mut world = world();
        let water = spawn_water(&mut world);
        let kinematic = spawn_body(&mut world, RigidBody::KinematicPositionBased);
        let loose = world.spawn(Collider::ball(0.5)).id();

        deliver(&mut world, [started(water, kinematic), started(loose, water)]);

        assert!(world.get::<FloatingBody>(kinematic).is_none());
        assert!(world.get::<BuoyantRigidBody>(kinematic).is_none());
        assert!(world.get::<FloatingBody>(loose).is_none());
    }

    #[test]
    fn test_nested_colliders_share_the_body_buoyancy() {
        let mut world = world();
        let water = spawn_water(&mut world);
        let body = spawn_body(&mut world, RigidBody::Dynamic);
        let side = world
            .spawn((Collider::cuboid(0.5, 0.5, 0.5), ChildOf(body)))
            .id();
        world.spawn((Collider::ball(2.0), Sensor, ChildOf(body)));
        let mount = world.spawn(ChildOf(body)).id();
        let keel = world
            .spawn((Collider::cuboid(0.5, 0.1, 0.5), ChildOf(mount)))
            .id();

        deliver(&mut world, [started(water, keel), started(side, water)]);

        for part in [keel, side] {
            let floating = world.get::<FloatingBody>(part).unwrap();
            assert!((floating.settings().buoyancy - DEFAULT_BUOYANCY / 3.0).abs() < 1e-6);
            assert_eq!(floating.water(), Some(water));
        }
        assert!(world.get::<BuoyantRigidBody>(body).is_some());
        assert!(world.get::<BuoyantRigidBody>(mount).is_none());
    }

    #[test]
    fn test_enter_and_exit_in_one_frame() {
        let mut world = world();
        let water = spawn_water(&mut world);
        let body = spawn_body(&mut world, RigidBody::Dynamic);

        deliver(&mut world, [started(water, body), stopped(water, body)]);

        let floating = world.get::<FloatingBody>(body).unwrap();
        assert_eq!(floating.water(), None);
        assert!(floating.is_voxelized());
    }

    #[test]
    fn test_exit_from_previous_volume_is_ignored() {
        let mut world = world();
        let first = spawn_water(&mut world);
        let second = spawn_water(&mut world);
        let body = spawn_body(&mut world, RigidBody::Dynamic);

        deliver(&mut world, [started(first, body)]);
        deliver(&mut world, [started(body, second), stopped(first, body)]);
        assert_eq!(world.get::<FloatingBody>(body).unwrap().water(), Some(second));

        deliver(&mut world, [stopped(body, second)]);
        assert_eq!(world.get::<FloatingBody>(body).unwrap().water(), None);
    }

    #[test]
    fn test_fixed_step_resets_force_and_writes_damping() {
        let mut world = world();
        let water = spawn_water(&mut world);
        let body = spawn_body(&mut world, RigidBody::Dynamic);
        deliver(&mut world, [started(water, body)]);

        world.get_mut::<ExternalForce>(body).unwrap().force = Vec3::ONE;
        world.get_mut::<ExternalForce>(body).unwrap().torque = Vec3::ONE;
        world.run_system_once(apply_buoyancy_forces).unwrap();

        // Massless until Rapier writes the mass properties back
        let force = world.get::<ExternalForce>(body).unwrap();
        assert_eq!(force.force, Vec3::ZERO);
        assert_eq!(force.torque, Vec3::ZERO);

        let report = *world
            .get::<FloatingBody>(body)
            .unwrap()
            .last_report()
            .unwrap();
        assert!((report.submerged_fraction - 0.5).abs() < 1e-5);
        let damping = world.get::<Damping>(body).unwrap();
        assert!((damping.linear_damping - 0.6).abs() < 1e-5);
        assert!((damping.angular_damping - 0.65).abs() < 1e-5);
    }

    #[test]
    fn test_fixed_step_without_water_only_resets_force() {
        let mut world = world();
        let water = spawn_water(&mut world);
        let body = spawn_body(&mut world, RigidBody::Dynamic);
        deliver(&mut world, [started(water, body), stopped(water, body)]);

        world.get_mut::<ExternalForce>(body).unwrap().force = Vec3::Y;
        world.run_system_once(apply_buoyancy_forces).unwrap();

        assert_eq!(world.get::<ExternalForce>(body).unwrap().force, Vec3::ZERO);
        assert_eq!(world.get::<Damping>(body).unwrap().linear_damping, 0.2);
        assert!(world.get::<FloatingBody>(body).unwrap().last_report().is_none());
    }

    #[test]
    fn test_water_collider_covers_grid() {
        let surface = WaterSurface::new(
            &WaterSurfaceConfig {
                rows: 4,
                columns: 6,
                cell_size: 2.0,
                waves: WavePreset::Still.to_config(),
            },
            Transform::IDENTITY,
        );
        let collider = water_volume_collider(&surface);
        let aabb = collider.raw.compute_local_aabb();
        assert!((aabb.mins.x - 0.0).abs() < 1e-5);
        assert!((aabb.maxs.x - 12.0).abs() < 1e-5);
        assert!((aabb.mins.z - 0.0).abs() < 1e-5);
        assert!((aabb.maxs.z - 8.0).abs() < 1e-5);
        assert!((aabb.maxs.y - 0.0).abs() < 1e-5);
        assert!((aabb.mins.y + WATER_TRIGGER_DEPTH).abs() < 1e-5);
    }

    #[test]
    fn test_rapier_body_accumulates_torque_about_center_of_mass() {
        let mut world = World::new();
        let entity = world
            .spawn((ExternalForce::default(), Damping::default()))
            .id();
        let mut query = world.query::<(&mut ExternalForce, &mut Damping)>();
        let (force, damping) = query.get_mut(&mut world, entity).unwrap();
        let mut handle = RapierBody {
            mass: 1.0,
            center_of_mass: Vec3::new(0.0, 1.0, 0.0),
            force,
            damping,
        };
        handle.apply_force_at_point(Vec3::Y, Vec3::new(1.0, 1.0, 0.0));
        handle.apply_force_at_point(Vec3::Y, Vec3::new(-1.0, 1.0, 0.0));
        handle.set_damping(0.3, 0.4);

        let force = world.get::<ExternalForce>(entity).unwrap();
        assert_eq!(force.force, Vec3::Y * 2.0);
        assert!(force.torque.length() < 1e-6);
        let damping = world.get::<Damping>(entity).unwrap();
        assert_eq!((damping.linear_damping, damping.angular_damping), (0.3, 0.4));
    }
}

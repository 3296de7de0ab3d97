//! Integration tests for rigid3d
//! These tests drive the full step pipeline: forces, broadphase,
//! narrowphase, solver, integration, and sleep bookkeeping together.

use approx::assert_abs_diff_eq;
use nalgebra::Vector3;
use rigid3d::{BodyId, PhysicsWorld, RigidBody, Shape};
use std::sync::atomic::{AtomicUsize, Ordering};

const DT: f64 = 1.0 / 120.0;

fn ground_slab() -> RigidBody {
    RigidBody::new_static().with_shape(Shape::new_box(Vector3::new(10.0, 1.0, 10.0)))
}

fn unit_cube(y: f64) -> RigidBody {
    RigidBody::new(1.0)
        .with_position(Vector3::new(0.0, y, 0.0))
        .with_restitution(0.0)
        .with_shape(Shape::new_box(Vector3::new(1.0, 1.0, 1.0)))
}

#[test]
fn test_resting_box_falls_asleep_with_tiny_penetration() {
    let mut world = PhysicsWorld::<8>::new();
    world.set_gravity(Vector3::new(0.0, -9.81, 0.0));
    world.add_body(ground_slab()).unwrap();
    // Start exactly touching the slab top (slab top at y=1, cube half 1)
    let id = world.add_body(unit_cube(2.0)).unwrap();

    // 5 simulated seconds
    for _ in 0..600 {
        world.step(DT);
    }

    let cube = world.body(id).unwrap();
    assert!(
        cube.is_sleeping(),
        "cube should reach a stable sleeping state, speed={}",
        cube.speed()
    );
    // Penetration below the resting height stays under 1e-3
    assert!(
        cube.position.y > 2.0 - 1e-3,
        "cube sank too deep: y={}",
        cube.position.y
    );
    assert!(cube.position.y < 2.01);
    assert_eq!(cube.velocity, Vector3::zeros());
}

#[test]
fn test_dropped_box_lands_and_settles() {
    let mut world = PhysicsWorld::<8>::new();
    world.set_gravity(Vector3::new(0.0, -9.81, 0.0));
    world.add_body(ground_slab()).unwrap();
    let id = world.add_body(unit_cube(3.0)).unwrap();

    for _ in 0..480 {
        world.step(DT);
    }

    let cube = world.body(id).unwrap();
    assert_abs_diff_eq!(cube.position.y, 2.0, epsilon = 0.02);
    assert!(cube.velocity.norm() < 0.1);
}

#[test]
fn test_two_box_stack_settles() {
    let mut world = PhysicsWorld::<8, 192>::new();
    world.set_gravity(Vector3::new(0.0, -9.81, 0.0));
    world.add_body(ground_slab()).unwrap();
    let lower = world.add_body(unit_cube(2.0)).unwrap();
    let upper = world.add_body(unit_cube(4.05)).unwrap();

    for _ in 0..600 {
        world.step(DT);
    }

    assert_abs_diff_eq!(world.body(lower).unwrap().position.y, 2.0, epsilon = 0.05);
    assert_abs_diff_eq!(world.body(upper).unwrap().position.y, 4.0, epsilon = 0.05);
    assert!(world.body(upper).unwrap().velocity.norm() < 0.1);
}

#[test]
fn test_friction_slows_sliding_box() {
    let mut world = PhysicsWorld::<8>::new();
    world.set_gravity(Vector3::new(0.0, -9.81, 0.0));
    world.add_body(ground_slab()).unwrap();
    let id = world
        .add_body(
            unit_cube(1.9995) // slight initial overlap so contact exists at once
                .with_velocity(Vector3::new(2.0, 0.0, 0.0))
                .with_friction(0.5),
        )
        .unwrap();

    for _ in 0..240 {
        world.step(DT);
    }

    let cube = world.body(id).unwrap();
    assert!(
        cube.velocity.x < 1.0,
        "friction should bleed off sliding speed, vx={}",
        cube.velocity.x
    );
    assert!(cube.velocity.x > -0.1, "friction must not reverse the slide");
}

#[test]
fn test_simulation_is_deterministic() {
    let run = || {
        let mut world = PhysicsWorld::<8>::new();
        world.set_gravity(Vector3::new(0.0, -9.81, 0.0));
        world.add_body(ground_slab()).unwrap();
        let a = world
            .add_body(unit_cube(2.5).with_velocity(Vector3::new(0.3, 0.0, 0.0)))
            .unwrap();
        let b = world
            .add_body(
                RigidBody::new(2.0)
                    .with_position(Vector3::new(2.5, 3.0, 0.0))
                    .with_shape(Shape::new_box(Vector3::new(1.0, 1.0, 1.0))),
            )
            .unwrap();
        for _ in 0..240 {
            world.step(DT);
        }
        (
            world.body(a).unwrap().position,
            world.body(b).unwrap().position,
            world.body(a).unwrap().orientation,
        )
    };

    let first = run();
    let second = run();
    // Identical input must produce bitwise identical output
    assert_eq!(first.0, second.0);
    assert_eq!(first.1, second.1);
    assert_eq!(first.2, second.2);
}

static WAKE_COUNT: AtomicUsize = AtomicUsize::new(0);

fn count_wake(_id: BodyId) {
    WAKE_COUNT.fetch_add(1, Ordering::SeqCst);
}

#[test]
fn test_wake_hook_fires_on_collision_with_moving_body() {
    let mut world = PhysicsWorld::<8>::new();
    world.set_wake_hook(Some(count_wake));

    let sleeper = world
        .add_body(
            RigidBody::new(1.0).with_shape(Shape::new_box(Vector3::new(1.0, 1.0, 1.0))),
        )
        .unwrap();
    world.body_mut(sleeper).unwrap().sleep();
    world
        .add_body(
            RigidBody::new(1.0)
                .with_position(Vector3::new(2.5, 0.0, 0.0))
                .with_velocity(Vector3::new(-3.0, 0.0, 0.0))
                .with_shape(Shape::new_box(Vector3::new(1.0, 1.0, 1.0))),
        )
        .unwrap();

    let before = WAKE_COUNT.load(Ordering::SeqCst);
    for _ in 0..60 {
        world.step(DT);
    }
    assert!(!world.body(sleeper).unwrap().is_sleeping());
    assert!(WAKE_COUNT.load(Ordering::SeqCst) > before);
}

#[test]
fn test_collision_filter_lets_bodies_pass_through() {
    let mut world = PhysicsWorld::<8>::new();
    world.set_gravity(Vector3::new(0.0, -9.81, 0.0));
    world.add_body(ground_slab()).unwrap();
    // Ghost cube in a group the ground's mask does not match
    let ghost = world
        .add_body(unit_cube(2.5).with_collision_filter(2, 2))
        .unwrap();

    for _ in 0..240 {
        world.step(DT);
    }

    // Fell straight through the slab
    assert!(world.body(ghost).unwrap().position.y < -1.0);
}

#[test]
fn test_removed_body_stops_colliding() {
    let mut world = PhysicsWorld::<8>::new();
    world.set_gravity(Vector3::new(0.0, -9.81, 0.0));
    world.add_body(ground_slab()).unwrap();
    let id = world.add_body(unit_cube(2.5)).unwrap();

    world.remove_body(id);
    for _ in 0..120 {
        world.step(DT);
    }
    // Deactivated: no gravity, no contacts, frozen in place
    assert_abs_diff_eq!(world.body(id).unwrap().position.y, 2.5, epsilon = 1e-12);
}

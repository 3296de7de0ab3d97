//! Rigid body physics engine with convex collision detection and
//! sequential impulse solving.
//!
//! The engine represents 3D bodies with convex collision shapes, detects
//! contacts between them with a separating-axis test plus polyhedral face
//! clipping, formulates contact and friction constraint equations, and
//! resolves them with an iterative impulse solver each step.
//!
//! Designed for `no_std` environments: all runtime collections are
//! fixed-capacity `heapless` buffers and the world's body and equation
//! capacities are compile-time parameters. All math is `f64` via `nalgebra`.
//!
//! # Example
//! ```
//! use rigid3d::{PhysicsWorld, RigidBody, Shape};
//! use nalgebra::Vector3;
//!
//! let mut world = PhysicsWorld::<16>::new();
//! world.set_gravity(Vector3::new(0.0, -9.81, 0.0));
//!
//! let ground = RigidBody::new_static()
//!     .with_shape(Shape::new_box(Vector3::new(10.0, 1.0, 10.0)));
//! world.add_body(ground).unwrap();
//!
//! let cube = RigidBody::new(1.0)
//!     .with_position(Vector3::new(0.0, 3.0, 0.0))
//!     .with_shape(Shape::new_box(Vector3::new(0.5, 0.5, 0.5)));
//! let id = world.add_body(cube).unwrap();
//!
//! // Fixed timestep recommended for solver stability
//! for _ in 0..60 {
//!     world.step(1.0 / 60.0);
//! }
//! let cube = world.body(id).unwrap();
//! assert!(cube.position.y < 3.0);
//! ```
#![no_std]

pub mod aabb;
pub mod body;
pub mod broadphase;
pub mod equations;
pub mod narrowphase;
pub mod shapes;
pub mod solver;
pub mod world;

pub use aabb::Aabb;
pub use body::{BodyId, BodyType, RigidBody, SleepState};
pub use broadphase::NaiveBroadphase;
pub use equations::{Equation, EquationKind, JacobianElement};
pub use narrowphase::{generate_contacts, ContactManifold, ContactPoint};
pub use shapes::{ConvexPolyhedron, Shape, ShapeError, ShapeKind, ShapeOptions};
pub use solver::Solver;
pub use world::PhysicsWorld;

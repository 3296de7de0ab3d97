//! The physics world: body storage and the per-step simulation pipeline.

use heapless::Vec;
use log::warn;
use nalgebra::Vector3;

use crate::aabb::Aabb;
use crate::body::{BodyId, BodyType, RigidBody, SleepState};
use crate::broadphase::NaiveBroadphase;
use crate::equations::{tangents, Equation, DEFAULT_RELAXATION, DEFAULT_STIFFNESS};
use crate::narrowphase::generate_contacts;
use crate::solver::Solver;

// ComplexField provides sqrt() for f64 in no_std via libm
#[allow(unused_imports)]
use nalgebra::ComplexField;

/// The physics simulation world.
///
/// Owns the bodies and the transient per-step contact equation buffers,
/// which are rebuilt from scratch every step. [`step`](Self::step) is the
/// single simulation entry point; it is synchronous, single-threaded, and
/// always runs to completion. Processing order is deterministic (ascending
/// body index), so identical input produces identical output across runs.
///
/// # Type parameters
/// * `N` - Maximum number of bodies.
/// * `E` - Maximum number of constraint equations per step. Each contact
///   point costs three equations (one contact + two friction).
///
/// # Example
/// ```
/// use rigid3d::{PhysicsWorld, RigidBody, Shape};
/// use nalgebra::Vector3;
///
/// let mut world = PhysicsWorld::<8>::new();
/// world.set_gravity(Vector3::new(0.0, -9.81, 0.0));
///
/// let ground = RigidBody::new_static()
///     .with_shape(Shape::new_box(Vector3::new(10.0, 1.0, 10.0)));
/// world.add_body(ground).unwrap();
///
/// let cube = RigidBody::new(1.0)
///     .with_position(Vector3::new(0.0, 5.0, 0.0))
///     .with_shape(Shape::new_box(Vector3::new(0.5, 0.5, 0.5)));
/// let id = world.add_body(cube).unwrap();
///
/// world.step(1.0 / 60.0);
/// assert!(world.body(id).unwrap().position.y < 5.0);
/// ```
pub struct PhysicsWorld<const N: usize, const E: usize = 96> {
    bodies: Vec<RigidBody, N>,
    broadphase: NaiveBroadphase,
    solver: Solver<E>,
    gravity: Vector3<f64>,
    /// Master switch for the sleep machine.
    pub allow_sleep: bool,
    /// Spook stiffness used for contact equations.
    pub contact_stiffness: f64,
    /// Spook relaxation (in timesteps) used for contact equations.
    pub contact_relaxation: f64,
    on_wake: Option<fn(BodyId)>,
}

impl<const N: usize, const E: usize> Default for PhysicsWorld<N, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize, const E: usize> PhysicsWorld<N, E> {
    /// Create a new physics world with no gravity.
    pub fn new() -> Self {
        Self {
            bodies: Vec::new(),
            broadphase: NaiveBroadphase,
            solver: Solver::new(),
            gravity: Vector3::zeros(),
            allow_sleep: true,
            contact_stiffness: DEFAULT_STIFFNESS,
            contact_relaxation: DEFAULT_RELAXATION,
            on_wake: None,
        }
    }

    /// Set the gravity vector (e.g. `Vector3::new(0.0, -9.81, 0.0)`).
    pub fn set_gravity(&mut self, gravity: Vector3<f64>) {
        self.gravity = gravity;
    }

    pub fn gravity(&self) -> Vector3<f64> {
        self.gravity
    }

    /// Install a hook called whenever a body transitions out of
    /// [`SleepState::Sleeping`] during a step.
    pub fn set_wake_hook(&mut self, hook: Option<fn(BodyId)>) {
        self.on_wake = hook;
    }

    /// Access the constraint solver (iteration count, tolerance).
    pub fn solver(&self) -> &Solver<E> {
        &self.solver
    }

    pub fn solver_mut(&mut self) -> &mut Solver<E> {
        &mut self.solver
    }

    /// Add a body to the world. Returns its [`BodyId`], or `None` if at
    /// capacity.
    pub fn add_body(&mut self, body: RigidBody) -> Option<BodyId> {
        let id = BodyId(self.bodies.len());
        self.bodies.push(body).ok()?;
        Some(id)
    }

    /// Get an immutable reference to a body by its ID.
    pub fn body(&self, id: BodyId) -> Option<&RigidBody> {
        self.bodies.get(id.0)
    }

    /// Get a mutable reference to a body by its ID.
    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut RigidBody> {
        self.bodies.get_mut(id.0)
    }

    /// Total number of bodies, including deactivated ones.
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Number of active bodies.
    pub fn active_body_count(&self) -> usize {
        self.bodies.iter().filter(|b| b.active).count()
    }

    /// Deactivate a body, removing it from the simulation while keeping its
    /// slot (existing [`BodyId`]s stay valid).
    ///
    /// Returns `true` if the body was found and deactivated.
    pub fn remove_body(&mut self, id: BodyId) -> bool {
        if let Some(body) = self.bodies.get_mut(id.0) {
            if body.active {
                body.active = false;
                body.velocity = Vector3::zeros();
                body.angular_velocity = Vector3::zeros();
                body.clear_accumulators();
                return true;
            }
        }
        false
    }

    /// Iterate over all bodies immutably.
    pub fn bodies(&self) -> impl Iterator<Item = (BodyId, &RigidBody)> {
        self.bodies.iter().enumerate().map(|(i, b)| (BodyId(i), b))
    }

    /// Iterate over all bodies mutably.
    pub fn bodies_mut(&mut self) -> impl Iterator<Item = (BodyId, &mut RigidBody)> {
        self.bodies
            .iter_mut()
            .enumerate()
            .map(|(i, b)| (BodyId(i), b))
    }

    /// Wake a body, firing the wake hook if it was sleeping.
    pub fn wake_body(&mut self, id: BodyId) {
        if let Some(body) = self.bodies.get_mut(id.0) {
            if body.wake_up() {
                if let Some(hook) = self.on_wake {
                    hook(id);
                }
            }
        }
    }

    /// Advance the simulation by `dt` seconds.
    ///
    /// Pipeline order: apply forces, broadphase, narrowphase + equation
    /// building, solve, integrate, sleep bookkeeping.
    pub fn step(&mut self, dt: f64) {
        if dt <= 0.0 {
            return;
        }

        // 1. Gravity into the force accumulators of awake dynamic bodies.
        let gravity = self.gravity;
        for body in self.bodies.iter_mut() {
            if body.active
                && body.body_type == BodyType::Dynamic
                && body.sleep_state() != SleepState::Sleeping
            {
                let force = gravity * body.mass;
                body.apply_force(force);
            }
        }

        // 2. Broadphase.
        let mut aabbs: Vec<Option<Aabb>, N> = Vec::new();
        for body in self.bodies.iter() {
            let _ = aabbs.push(body.world_aabb());
        }
        let pairs = self
            .broadphase
            .collision_pairs::<E>(&self.bodies, &aabbs);

        // 3. Narrowphase: manifolds, then contact + friction equations.
        self.solver.remove_all();
        for &(id_a, id_b) in pairs.iter() {
            let body_a = &self.bodies[id_a.0];
            let body_b = &self.bodies[id_b.0];
            let (shape_a, shape_b) = match (&body_a.shape, &body_b.shape) {
                (Some(a), Some(b)) => (a, b),
                _ => continue,
            };
            let manifold = match generate_contacts(
                shape_a,
                &body_a.position,
                &body_a.orientation,
                shape_b,
                &body_b.position,
                &body_b.orientation,
            ) {
                Some(m) => m,
                None => continue,
            };

            let restitution = body_a.restitution.min(body_b.restitution);
            let mu = (body_a.friction * body_b.friction).sqrt();
            let enabled =
                shape_a.options.collision_response && shape_b.options.collision_response;
            let pos_a = body_a.position;
            let pos_b = body_b.position;
            self.flag_wake_on_contact(id_a, id_b);

            // Without a body that can respond this step (awake dynamic, or a
            // sleeper about to be woken), equations would only pump velocity
            // into frozen bodies; skip them.
            if !self.pair_responsive(id_a) && !self.pair_responsive(id_b) {
                continue;
            }

            for cp in manifold.points.iter() {
                let ri = cp.point - pos_a;
                let rj = cp.point - pos_b;
                let mut contact = Equation::contact(
                    id_a,
                    id_b,
                    ri,
                    rj,
                    manifold.normal,
                    cp.depth,
                    restitution,
                );
                contact.set_spook_params(self.contact_stiffness, self.contact_relaxation, dt);
                contact.enabled = enabled;
                if self.solver.add_equation(contact).is_none() {
                    break;
                }
                let contact_index = self.solver.len() - 1;
                let (t1, t2) = tangents(&manifold.normal);
                for tangent in [t1, t2] {
                    let mut friction =
                        Equation::friction(id_a, id_b, ri, rj, tangent, mu, contact_index);
                    friction
                        .set_spook_params(self.contact_stiffness, self.contact_relaxation, dt);
                    friction.enabled = enabled;
                    if self.solver.add_equation(friction).is_none() {
                        break;
                    }
                }
            }
        }

        // Wake sleeping bodies that were touched by a moving body.
        for index in 0..self.bodies.len() {
            if self.bodies[index].wake_up_after_narrowphase {
                self.wake_body(BodyId(index));
            }
        }

        // 4. Filter non-finite velocities, then solve.
        for body in self.bodies.iter_mut() {
            if !is_finite_vec(&body.velocity) {
                warn!("non-finite velocity filtered before solve");
                body.velocity = Vector3::zeros();
            }
            if !is_finite_vec(&body.angular_velocity) {
                warn!("non-finite angular velocity filtered before solve");
                body.angular_velocity = Vector3::zeros();
            }
        }
        self.solver.solve(dt, &mut self.bodies);

        // 5. Integrate velocities, then positions.
        for body in self.bodies.iter_mut() {
            if body.active {
                body.integrate(dt);
            }
        }

        // 6. Sleep bookkeeping.
        if self.allow_sleep {
            for body in self.bodies.iter_mut() {
                if body.active {
                    body.sleep_tick(dt);
                }
            }
        }
    }

    /// Advance the simulation using fixed-size substeps for stability.
    pub fn step_fixed(&mut self, dt: f64, substeps: u32) {
        if substeps == 0 {
            return;
        }
        let sub_dt = dt / f64::from(substeps);
        for _ in 0..substeps {
            self.step(sub_dt);
        }
    }

    fn pair_responsive(&self, id: BodyId) -> bool {
        let body = &self.bodies[id.0];
        body.body_type == BodyType::Dynamic
            && (!body.is_sleeping() || body.wake_up_after_narrowphase)
    }

    /// A sleeping body in contact with a moving non-static body is flagged
    /// to wake after the narrowphase.
    fn flag_wake_on_contact(&mut self, id_a: BodyId, id_b: BodyId) {
        self.flag_wake_one(id_a, id_b);
        self.flag_wake_one(id_b, id_a);
    }

    fn flag_wake_one(&mut self, sleeper: BodyId, other: BodyId) {
        let other_moving = {
            let o = &self.bodies[other.0];
            let speed_sq = o.velocity.norm_squared() + o.angular_velocity.norm_squared();
            o.body_type != BodyType::Static
                && o.sleep_state() == SleepState::Awake
                && speed_sq >= o.sleep_speed_limit * o.sleep_speed_limit
        };
        let s = &mut self.bodies[sleeper.0];
        if s.is_sleeping() && other_moving {
            s.wake_up_after_narrowphase = true;
        }
    }
}

fn is_finite_vec(v: &Vector3<f64>) -> bool {
    v.x.is_finite() && v.y.is_finite() && v.z.is_finite()
}

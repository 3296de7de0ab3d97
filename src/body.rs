//! Rigid bodies: pose, velocity, mass properties, and sleep state.

use nalgebra::{Matrix3, UnitQuaternion, Vector3};

use crate::aabb::Aabb;
use crate::shapes::Shape;

// ComplexField provides sqrt() for f64 in no_std via libm
#[allow(unused_imports)]
use nalgebra::ComplexField;

/// Unique identifier for a rigid body within a
/// [`PhysicsWorld`](crate::world::PhysicsWorld).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct BodyId(pub(crate) usize);

impl BodyId {
    /// Slot index of the body inside its world. Stable for the lifetime of
    /// the world; removal deactivates a body without reusing its slot.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Determines how a body participates in the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyType {
    /// Fully simulated: moves according to forces and collision impulses.
    Dynamic,
    /// Never moves; behaves as if it has infinite mass. Floors and walls.
    Static,
    /// Moves according to its velocity but does not respond to forces.
    /// Behaves as if it has infinite mass toward dynamic bodies.
    Kinematic,
}

/// Activity state of a body's sleep machine.
///
/// Dynamic bodies that stay slow long enough are put to sleep and skipped by
/// integration and pair generation until something wakes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SleepState {
    Awake,
    /// Below the speed limit; the sleepy timer is running.
    Sleepy,
    Sleeping,
}

/// A rigid body with linear and angular dynamics.
#[derive(Debug, Clone)]
pub struct RigidBody {
    // -- Linear state --
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
    pub mass: f64,
    /// Inverse mass; zero for static and kinematic bodies.
    pub inv_mass: f64,
    pub body_type: BodyType,

    // -- Angular state --
    pub orientation: UnitQuaternion<f64>,
    /// Angular velocity in world space (radians per second).
    pub angular_velocity: Vector3<f64>,
    /// Inverse of the inertia tensor in body-local space.
    /// The zero matrix for static and kinematic bodies.
    pub inv_inertia_local: Matrix3<f64>,

    // -- Material --
    pub restitution: f64,
    /// Coulomb friction coefficient. The effective pair friction is the
    /// geometric mean `sqrt(mu_a * mu_b)`.
    pub friction: f64,

    /// Linear damping, applied each step as `velocity *= 1 - damping`.
    pub damping: f64,
    /// Angular damping, applied each step as `angular_velocity *= 1 - damping`.
    pub angular_damping: f64,

    pub shape: Option<Shape>,

    // -- Collision filtering --
    pub collision_filter_group: u32,
    pub collision_filter_mask: u32,

    // -- Sleep --
    pub allow_sleep: bool,
    /// Speed below which the body is considered for sleep.
    pub sleep_speed_limit: f64,
    /// Seconds of sustained low speed before the body falls asleep.
    pub sleep_time_limit: f64,
    sleep_state: SleepState,
    sleepy_timer: f64,
    pub(crate) wake_up_after_narrowphase: bool,

    /// Whether this body is active. Inactive bodies are skipped entirely.
    /// Set to `false` by [`PhysicsWorld::remove_body`](crate::world::PhysicsWorld::remove_body).
    pub active: bool,

    // -- Accumulators, cleared after each step --
    force_accumulator: Vector3<f64>,
    torque_accumulator: Vector3<f64>,

    // -- Solver scratch: velocity deltas accumulated during a solve --
    pub(crate) vlambda: Vector3<f64>,
    pub(crate) wlambda: Vector3<f64>,
}

impl RigidBody {
    /// Create a new dynamic rigid body with the given mass (in kg).
    ///
    /// The body starts with a default point-mass inertia tensor. Attaching a
    /// shape with [`with_shape`](Self::with_shape) replaces it with the
    /// shape's inertia.
    ///
    /// # Panics
    /// Panics if `mass` is not positive and finite.
    pub fn new(mass: f64) -> Self {
        assert!(
            mass > 0.0 && mass.is_finite(),
            "mass must be positive and finite"
        );
        let inv_i = 1.0 / (0.4 * mass);
        Self {
            position: Vector3::zeros(),
            velocity: Vector3::zeros(),
            mass,
            inv_mass: 1.0 / mass,
            body_type: BodyType::Dynamic,
            orientation: UnitQuaternion::identity(),
            angular_velocity: Vector3::zeros(),
            inv_inertia_local: Matrix3::from_diagonal(&Vector3::new(inv_i, inv_i, inv_i)),
            restitution: 0.3,
            friction: 0.3,
            damping: 0.01,
            angular_damping: 0.01,
            shape: None,
            collision_filter_group: 1,
            collision_filter_mask: u32::MAX,
            allow_sleep: true,
            sleep_speed_limit: 0.1,
            sleep_time_limit: 1.0,
            sleep_state: SleepState::Awake,
            sleepy_timer: 0.0,
            wake_up_after_narrowphase: false,
            active: true,
            force_accumulator: Vector3::zeros(),
            torque_accumulator: Vector3::zeros(),
            vlambda: Vector3::zeros(),
            wlambda: Vector3::zeros(),
        }
    }

    /// Create a static rigid body (infinite mass, never moves).
    pub fn new_static() -> Self {
        Self::new_infinite_mass(BodyType::Static)
    }

    /// Create a kinematic rigid body: moved by setting its velocity, not by
    /// forces, and infinitely heavy toward dynamic bodies.
    pub fn new_kinematic() -> Self {
        Self::new_infinite_mass(BodyType::Kinematic)
    }

    fn new_infinite_mass(body_type: BodyType) -> Self {
        Self {
            position: Vector3::zeros(),
            velocity: Vector3::zeros(),
            mass: f64::INFINITY,
            inv_mass: 0.0,
            body_type,
            orientation: UnitQuaternion::identity(),
            angular_velocity: Vector3::zeros(),
            inv_inertia_local: Matrix3::zeros(),
            restitution: 0.3,
            friction: 0.5,
            damping: 0.0,
            angular_damping: 0.0,
            shape: None,
            collision_filter_group: 1,
            collision_filter_mask: u32::MAX,
            allow_sleep: false,
            sleep_speed_limit: 0.1,
            sleep_time_limit: 1.0,
            sleep_state: SleepState::Awake,
            sleepy_timer: 0.0,
            wake_up_after_narrowphase: false,
            active: true,
            force_accumulator: Vector3::zeros(),
            torque_accumulator: Vector3::zeros(),
            vlambda: Vector3::zeros(),
            wlambda: Vector3::zeros(),
        }
    }

    /// Builder: set initial position.
    pub fn with_position(mut self, position: Vector3<f64>) -> Self {
        self.position = position;
        self
    }

    /// Builder: set initial velocity.
    pub fn with_velocity(mut self, velocity: Vector3<f64>) -> Self {
        self.velocity = velocity;
        self
    }

    /// Builder: set initial orientation.
    pub fn with_orientation(mut self, orientation: UnitQuaternion<f64>) -> Self {
        self.orientation = orientation;
        self
    }

    /// Builder: set initial angular velocity (radians per second).
    pub fn with_angular_velocity(mut self, angular_velocity: Vector3<f64>) -> Self {
        self.angular_velocity = angular_velocity;
        self
    }

    /// Builder: attach a collision shape.
    ///
    /// For dynamic bodies this also derives the inertia tensor from the
    /// shape's geometry and the body's mass.
    pub fn with_shape(mut self, shape: Shape) -> Self {
        if self.body_type == BodyType::Dynamic {
            let inertia = shape.calculate_local_inertia(self.mass);
            self.inv_inertia_local = Matrix3::from_diagonal(&Vector3::new(
                if inertia.x > 0.0 { 1.0 / inertia.x } else { 0.0 },
                if inertia.y > 0.0 { 1.0 / inertia.y } else { 0.0 },
                if inertia.z > 0.0 { 1.0 / inertia.z } else { 0.0 },
            ));
        }
        self.shape = Some(shape);
        self
    }

    /// Builder: set restitution (bounciness, 0.0..=1.0).
    pub fn with_restitution(mut self, restitution: f64) -> Self {
        self.restitution = restitution.clamp(0.0, 1.0);
        self
    }

    /// Builder: set friction coefficient (0.0..=1.0).
    pub fn with_friction(mut self, friction: f64) -> Self {
        self.friction = friction.clamp(0.0, 1.0);
        self
    }

    /// Builder: set linear damping (0.0..=1.0).
    pub fn with_damping(mut self, damping: f64) -> Self {
        self.damping = damping.clamp(0.0, 1.0);
        self
    }

    /// Builder: set angular damping (0.0..=1.0).
    pub fn with_angular_damping(mut self, damping: f64) -> Self {
        self.angular_damping = damping.clamp(0.0, 1.0);
        self
    }

    /// Builder: set the collision filter group and mask. Two bodies collide
    /// only if each body's group intersects the other's mask.
    pub fn with_collision_filter(mut self, group: u32, mask: u32) -> Self {
        self.collision_filter_group = group;
        self.collision_filter_mask = mask;
        self
    }

    /// Builder: set the sleep speed and time limits.
    pub fn with_sleep_limits(mut self, speed_limit: f64, time_limit: f64) -> Self {
        self.sleep_speed_limit = speed_limit;
        self.sleep_time_limit = time_limit;
        self
    }

    /// Apply a force (in Newtons) to this body. Forces accumulate until the
    /// next step.
    #[inline]
    pub fn apply_force(&mut self, force: Vector3<f64>) {
        self.force_accumulator += force;
    }

    /// Apply a torque (in N*m) to this body. Torques accumulate until the
    /// next step.
    #[inline]
    pub fn apply_torque(&mut self, torque: Vector3<f64>) {
        self.torque_accumulator += torque;
    }

    /// Apply an instantaneous impulse: `delta_v = impulse / mass`.
    /// Wakes the body.
    #[inline]
    pub fn apply_impulse(&mut self, impulse: Vector3<f64>) {
        if self.body_type == BodyType::Dynamic {
            self.velocity += impulse * self.inv_mass;
            self.wake_up();
        }
    }

    /// Apply an instantaneous angular impulse: `delta_w = I_world^-1 * impulse`.
    /// Wakes the body.
    #[inline]
    pub fn apply_angular_impulse(&mut self, impulse: Vector3<f64>) {
        if self.body_type == BodyType::Dynamic {
            let inv_inertia_world = self.inv_inertia_world();
            self.angular_velocity += inv_inertia_world * impulse;
            self.wake_up();
        }
    }

    /// Forces accumulated since the last step.
    pub fn accumulated_force(&self) -> Vector3<f64> {
        self.force_accumulator
    }

    /// Torques accumulated since the last step.
    pub fn accumulated_torque(&self) -> Vector3<f64> {
        self.torque_accumulator
    }

    /// World-space inverse inertia tensor: `R * I_local^-1 * R^T`.
    #[inline]
    pub fn inv_inertia_world(&self) -> Matrix3<f64> {
        let r = self.orientation.to_rotation_matrix();
        r.matrix() * self.inv_inertia_local * r.matrix().transpose()
    }

    /// Magnitude of the linear velocity.
    #[inline]
    pub fn speed(&self) -> f64 {
        self.velocity.norm()
    }

    /// Kinetic energy `0.5 * m * v^2` (infinite-mass bodies report zero).
    #[inline]
    pub fn kinetic_energy(&self) -> f64 {
        if self.inv_mass > 0.0 {
            0.5 * self.mass * self.velocity.norm_squared()
        } else {
            0.0
        }
    }

    /// World-space bounding box of the attached shape, if any.
    pub fn world_aabb(&self) -> Option<Aabb> {
        self.shape
            .as_ref()
            .map(|s| s.calculate_world_aabb(&self.position, &self.orientation))
    }

    // -- Sleep machine --

    pub fn sleep_state(&self) -> SleepState {
        self.sleep_state
    }

    pub fn is_sleeping(&self) -> bool {
        self.sleep_state == SleepState::Sleeping
    }

    /// Wake the body up.
    ///
    /// Returns `true` if the body transitioned out of [`SleepState::Sleeping`]
    /// (the observable state change the world's wake hook reports).
    pub fn wake_up(&mut self) -> bool {
        let was_sleeping = self.sleep_state == SleepState::Sleeping;
        self.sleep_state = SleepState::Awake;
        self.sleepy_timer = 0.0;
        self.wake_up_after_narrowphase = false;
        was_sleeping
    }

    /// Force the body to sleep, zeroing its velocities.
    pub fn sleep(&mut self) {
        self.sleep_state = SleepState::Sleeping;
        self.velocity = Vector3::zeros();
        self.angular_velocity = Vector3::zeros();
        self.sleepy_timer = 0.0;
        self.wake_up_after_narrowphase = false;
    }

    /// Advance the sleep state machine by `dt` seconds.
    ///
    /// Awake bodies below the speed limit become sleepy; sleepy bodies fall
    /// asleep after `sleep_time_limit` seconds, or wake back up if motion
    /// resumes. Only dynamic bodies participate.
    pub(crate) fn sleep_tick(&mut self, dt: f64) {
        if !self.allow_sleep || self.body_type != BodyType::Dynamic {
            return;
        }
        let speed_sq = self.velocity.norm_squared() + self.angular_velocity.norm_squared();
        let limit_sq = self.sleep_speed_limit * self.sleep_speed_limit;
        match self.sleep_state {
            SleepState::Awake if speed_sq < limit_sq => {
                self.sleep_state = SleepState::Sleepy;
                self.sleepy_timer = 0.0;
            }
            SleepState::Sleepy if speed_sq >= limit_sq => {
                self.wake_up();
            }
            SleepState::Sleepy => {
                self.sleepy_timer += dt;
                if self.sleepy_timer >= self.sleep_time_limit {
                    self.sleep();
                }
            }
            _ => {}
        }
    }

    /// Integrate this body forward by `dt` seconds using semi-implicit Euler:
    /// velocity first, then position and orientation.
    ///
    /// Static bodies, sleeping bodies, and bodies whose inverse mass is zero
    /// or non-finite are skipped (their accumulators still clear). Kinematic
    /// bodies integrate position from velocity but ignore forces.
    pub(crate) fn integrate(&mut self, dt: f64) {
        match self.body_type {
            BodyType::Static => {
                self.clear_accumulators();
                return;
            }
            BodyType::Kinematic => {
                self.position += self.velocity * dt;
                self.integrate_orientation(dt);
                self.clear_accumulators();
                return;
            }
            BodyType::Dynamic => {}
        }
        if self.sleep_state == SleepState::Sleeping {
            self.clear_accumulators();
            return;
        }
        // Zero or NaN inverse mass: treat as infinite-mass static.
        if !(self.inv_mass > 0.0) || !self.inv_mass.is_finite() {
            self.clear_accumulators();
            return;
        }

        self.velocity += self.force_accumulator * self.inv_mass * dt;
        self.velocity *= 1.0 - self.damping;
        self.position += self.velocity * dt;

        let inv_inertia_world = self.inv_inertia_world();
        self.angular_velocity += inv_inertia_world * self.torque_accumulator * dt;
        self.angular_velocity *= 1.0 - self.angular_damping;
        self.integrate_orientation(dt);

        self.clear_accumulators();
    }

    /// Integrate orientation via the quaternion derivative
    /// `q' = q + 0.5 * dt * w * q`, then renormalize to prevent drift.
    fn integrate_orientation(&mut self, dt: f64) {
        let w = &self.angular_velocity;
        let half_dt = 0.5 * dt;
        let dq = nalgebra::Quaternion::new(0.0, w.x * half_dt, w.y * half_dt, w.z * half_dt);
        let q = self.orientation.into_inner();
        self.orientation = UnitQuaternion::new_normalize(q + dq * q);
    }

    pub(crate) fn clear_accumulators(&mut self) {
        self.force_accumulator = Vector3::zeros();
        self.torque_accumulator = Vector3::zeros();
    }
}

//! Constraint equations between body pairs.
//!
//! Each equation is one scalar constraint row: a 12-component Jacobian
//! (3 spatial + 3 rotational per body), Spook softness parameters, and a
//! force range. Contact equations keep bodies from interpenetrating; each
//! contact carries two coupled friction rows bounded by the Coulomb cone.
//!
//! Equations are built fresh every step from detected contacts and discarded
//! after solving; nothing persists across steps.

use nalgebra::Vector3;

use crate::body::{BodyId, RigidBody};

// ComplexField provides sqrt() for f64 in no_std via libm
#[allow(unused_imports)]
use nalgebra::ComplexField;

/// Default Spook stiffness for contact constraints.
pub const DEFAULT_STIFFNESS: f64 = 1e7;
/// Default Spook relaxation, in timesteps.
pub const DEFAULT_RELAXATION: f64 = 3.0;

/// One half of a constraint Jacobian: 3 spatial and 3 rotational degrees of
/// freedom for a single body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JacobianElement {
    pub spatial: Vector3<f64>,
    pub rotational: Vector3<f64>,
}

impl JacobianElement {
    pub fn zero() -> Self {
        Self {
            spatial: Vector3::zeros(),
            rotational: Vector3::zeros(),
        }
    }

    /// Dot product with another Jacobian element across all 6 components.
    pub fn multiply_element(&self, element: &JacobianElement) -> f64 {
        element.spatial.dot(&self.spatial) + element.rotational.dot(&self.rotational)
    }

    /// Dot product with a spatial/rotational vector pair, e.g. a body's
    /// linear and angular velocity.
    pub fn multiply_vectors(&self, spatial: &Vector3<f64>, rotational: &Vector3<f64>) -> f64 {
        spatial.dot(&self.spatial) + rotational.dot(&self.rotational)
    }
}

/// What a constraint row enforces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EquationKind {
    /// Non-penetration along the contact normal; impulse bounded to be
    /// repulsive only.
    Contact,
    /// Tangential friction, bounded each solver pass by
    /// `mu * |impulse of the coupled contact row|`. `coupled` is the index
    /// of that contact row in the solver's current equation list.
    Friction { coupled: usize },
}

/// A single scalar constraint row between two bodies.
#[derive(Debug, Clone)]
pub struct Equation {
    /// Identifier assigned by the solver when the equation is added.
    pub id: u64,
    pub body_i: BodyId,
    pub body_j: BodyId,
    pub jacobian_i: JacobianElement,
    pub jacobian_j: JacobianElement,
    /// Force range in Newtons; the solver clamps the accumulated impulse to
    /// `[min_force * dt, max_force * dt]`. Friction rows override this each
    /// pass with the Coulomb bound.
    pub min_force: f64,
    pub max_force: f64,
    // Spook parameters; see `set_spook_params`.
    pub a: f64,
    pub b: f64,
    pub eps: f64,
    pub enabled: bool,
    /// Force applied along this row by the last solve, in Newtons
    /// (accumulated impulse divided by dt).
    pub multiplier: f64,
    pub kind: EquationKind,
    /// Signed separation along the normal: negative when penetrating.
    /// Zero for friction rows.
    g: f64,
    /// Restitution for contact rows, friction coefficient for friction rows.
    material: f64,
}

impl Equation {
    /// Build a contact equation at world point `p` with normal `n` pointing
    /// from body i toward body j.
    ///
    /// `ri`/`rj` are the offsets from each body's center to `p`; `depth` is
    /// the positive penetration depth; `restitution` the combined pair
    /// restitution.
    pub fn contact(
        body_i: BodyId,
        body_j: BodyId,
        ri: Vector3<f64>,
        rj: Vector3<f64>,
        normal: Vector3<f64>,
        depth: f64,
        restitution: f64,
    ) -> Self {
        Self {
            id: 0,
            body_i,
            body_j,
            jacobian_i: JacobianElement {
                spatial: -normal,
                rotational: -ri.cross(&normal),
            },
            jacobian_j: JacobianElement {
                spatial: normal,
                rotational: rj.cross(&normal),
            },
            min_force: 0.0,
            max_force: 1e6,
            a: 0.0,
            b: 0.0,
            eps: 0.0,
            enabled: true,
            multiplier: 0.0,
            kind: EquationKind::Contact,
            g: -depth,
            material: restitution,
        }
    }

    /// Build a friction equation along tangent `t` at the same contact
    /// point, coupled to the contact row at index `coupled` in the solver's
    /// equation list.
    pub fn friction(
        body_i: BodyId,
        body_j: BodyId,
        ri: Vector3<f64>,
        rj: Vector3<f64>,
        tangent: Vector3<f64>,
        mu: f64,
        coupled: usize,
    ) -> Self {
        Self {
            id: 0,
            body_i,
            body_j,
            jacobian_i: JacobianElement {
                spatial: -tangent,
                rotational: -ri.cross(&tangent),
            },
            jacobian_j: JacobianElement {
                spatial: tangent,
                rotational: rj.cross(&tangent),
            },
            min_force: -1e6,
            max_force: 1e6,
            a: 0.0,
            b: 0.0,
            eps: 0.0,
            enabled: true,
            multiplier: 0.0,
            kind: EquationKind::Friction { coupled },
            g: 0.0,
            material: mu,
        }
    }

    /// Derive the Spook parameters from stiffness `k`, relaxation `d`
    /// (in timesteps) and the step size `h`:
    ///
    /// ```text
    /// a   = 4 / (h (1 + 4d))
    /// b   = 4d / (1 + 4d)
    /// eps = 4 / (h^2 k (1 + 4d))
    /// ```
    pub fn set_spook_params(&mut self, stiffness: f64, relaxation: f64, dt: f64) {
        let k = stiffness;
        let d = relaxation;
        let h = dt;
        self.a = 4.0 / (h * (1.0 + 4.0 * d));
        self.b = (4.0 * d) / (1.0 + 4.0 * d);
        self.eps = 4.0 / (h * h * k * (1.0 + 4.0 * d));
    }

    /// Friction coefficient of a friction row (zero for contacts).
    pub fn friction_coefficient(&self) -> f64 {
        match self.kind {
            EquationKind::Friction { .. } => self.material,
            EquationKind::Contact => 0.0,
        }
    }

    /// The constraint-space velocity `J * v` over both bodies' current
    /// velocities.
    pub fn compute_gw(&self, bodies: &[RigidBody]) -> f64 {
        let bi = &bodies[self.body_i.0];
        let bj = &bodies[self.body_j.0];
        self.jacobian_i
            .multiply_vectors(&bi.velocity, &bi.angular_velocity)
            + self
                .jacobian_j
                .multiply_vectors(&bj.velocity, &bj.angular_velocity)
    }

    /// `J * vlambda` over the solver's accumulated velocity deltas.
    pub(crate) fn compute_gw_lambda(&self, bodies: &[RigidBody]) -> f64 {
        let bi = &bodies[self.body_i.0];
        let bj = &bodies[self.body_j.0];
        self.jacobian_i.multiply_vectors(&bi.vlambda, &bi.wlambda)
            + self.jacobian_j.multiply_vectors(&bj.vlambda, &bj.wlambda)
    }

    /// `J * M^-1 * f` over the accumulated external forces and torques.
    fn compute_gimf(&self, bodies: &[RigidBody]) -> f64 {
        let bi = &bodies[self.body_i.0];
        let bj = &bodies[self.body_j.0];
        let fi = bi.accumulated_force() * bi.inv_mass;
        let ti = bi.inv_inertia_world() * bi.accumulated_torque();
        let fj = bj.accumulated_force() * bj.inv_mass;
        let tj = bj.inv_inertia_world() * bj.accumulated_torque();
        self.jacobian_i.multiply_vectors(&fi, &ti) + self.jacobian_j.multiply_vectors(&fj, &tj)
    }

    /// Right-hand side of the Spook-stabilized constraint update.
    ///
    /// Contacts include the position term `-a*g` and scale the normal part
    /// of the relative velocity by `1 + restitution`; friction rows have no
    /// position term.
    pub(crate) fn compute_b(&self, dt: f64, bodies: &[RigidBody]) -> f64 {
        match self.kind {
            EquationKind::Contact => {
                let bi = &bodies[self.body_i.0];
                let bj = &bodies[self.body_j.0];
                let spatial = self.jacobian_i.spatial.dot(&bi.velocity)
                    + self.jacobian_j.spatial.dot(&bj.velocity);
                let rotational = self.jacobian_i.rotational.dot(&bi.angular_velocity)
                    + self.jacobian_j.rotational.dot(&bj.angular_velocity);
                let gw = (1.0 + self.material) * spatial + rotational;
                -self.g * self.a - gw * self.b - dt * self.compute_gimf(bodies)
            }
            EquationKind::Friction { .. } => {
                -self.compute_gw(bodies) * self.b - dt * self.compute_gimf(bodies)
            }
        }
    }

    /// Denominator `J * M^-1 * J^T + eps`, inverted. Returns zero when both
    /// bodies are immovable (the row is then inert).
    pub(crate) fn compute_inv_c(&self, bodies: &[RigidBody]) -> f64 {
        let bi = &bodies[self.body_i.0];
        let bj = &bodies[self.body_j.0];
        let mut c = self.eps;
        c += bi.inv_mass * self.jacobian_i.spatial.norm_squared();
        c += (bi.inv_inertia_world() * self.jacobian_i.rotational).dot(&self.jacobian_i.rotational);
        c += bj.inv_mass * self.jacobian_j.spatial.norm_squared();
        c += (bj.inv_inertia_world() * self.jacobian_j.rotational).dot(&self.jacobian_j.rotational);
        if c > 0.0 {
            1.0 / c
        } else {
            0.0
        }
    }

    /// Apply the velocity change of an impulse `deltalambda` along this row
    /// to both bodies' solver scratch velocities.
    pub(crate) fn add_to_wlambda(&self, bodies: &mut [RigidBody], deltalambda: f64) {
        {
            let bi = &mut bodies[self.body_i.0];
            let inv_inertia = bi.inv_inertia_world();
            bi.vlambda += self.jacobian_i.spatial * (bi.inv_mass * deltalambda);
            bi.wlambda += inv_inertia * self.jacobian_i.rotational * deltalambda;
        }
        {
            let bj = &mut bodies[self.body_j.0];
            let inv_inertia = bj.inv_inertia_world();
            bj.vlambda += self.jacobian_j.spatial * (bj.inv_mass * deltalambda);
            bj.wlambda += inv_inertia * self.jacobian_j.rotational * deltalambda;
        }
    }
}

/// Two unit tangents perpendicular to `normal` and to each other, spanning
/// the friction plane.
pub fn tangents(normal: &Vector3<f64>) -> (Vector3<f64>, Vector3<f64>) {
    let reference = if normal.x.abs() < 0.9 {
        Vector3::new(1.0, 0.0, 0.0)
    } else {
        Vector3::new(0.0, 1.0, 0.0)
    };
    let t1 = normal
        .cross(&reference)
        .try_normalize(1e-12)
        .unwrap_or_else(|| Vector3::new(0.0, 0.0, 1.0));
    let t2 = normal.cross(&t1);
    (t1, t2)
}

//! Iterative constraint solver: projected Gauss-Seidel / sequential impulse.
//!
//! Each pass walks the equation list in order, computes the impulse change
//! that drives one constraint toward its target, clamps the accumulated
//! impulse to the equation's force range, and applies the velocity change to
//! both bodies immediately so later equations see it. Passes repeat until
//! the iteration limit or until the summed impulse change falls below the
//! tolerance.

use heapless::Vec;
use log::warn;
use nalgebra::Vector3;

use crate::body::RigidBody;
use crate::equations::{Equation, EquationKind};

// ComplexField provides sqrt() for f64 in no_std via libm
#[allow(unused_imports)]
use nalgebra::ComplexField;

/// Sequential-impulse solver over a per-step equation set.
///
/// `E` is the maximum number of simultaneous equations. The set is rebuilt
/// from detected contacts every step; nothing persists across steps.
#[derive(Debug)]
pub struct Solver<const E: usize> {
    equations: Vec<Equation, E>,
    /// Maximum Gauss-Seidel passes per solve.
    pub iterations: u32,
    /// Early-exit threshold on the per-pass summed impulse change.
    pub tolerance: f64,
    next_id: u64,
}

impl<const E: usize> Default for Solver<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const E: usize> Solver<E> {
    pub fn new() -> Self {
        Self {
            equations: Vec::new(),
            iterations: 10,
            tolerance: 1e-7,
            next_id: 0,
        }
    }

    /// Add an equation to the current set. Returns its assigned id, or
    /// `None` when the set is at capacity.
    pub fn add_equation(&mut self, mut equation: Equation) -> Option<u64> {
        let id = self.next_id;
        equation.id = id;
        if self.equations.push(equation).is_err() {
            warn!("equation capacity ({}) exceeded, contact dropped", E);
            return None;
        }
        self.next_id += 1;
        Some(id)
    }

    /// Remove the equation with the given id, preserving the order of the
    /// rest. Returns `true` if it was present.
    pub fn remove_equation(&mut self, id: u64) -> bool {
        match self.equations.iter().position(|e| e.id == id) {
            Some(index) => {
                self.equations.remove(index);
                true
            }
            None => false,
        }
    }

    /// Drop all equations.
    pub fn remove_all(&mut self) {
        self.equations.clear();
    }

    pub fn equations(&self) -> &[Equation] {
        &self.equations
    }

    pub fn len(&self) -> usize {
        self.equations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.equations.is_empty()
    }

    /// Solve the current equation set, mutating body velocities in place.
    ///
    /// Returns the number of Gauss-Seidel passes used. The solver never
    /// fails: immovable pairs are inert and the `eps` term keeps every
    /// denominator positive.
    pub fn solve(&mut self, dt: f64, bodies: &mut [RigidBody]) -> u32 {
        if self.equations.is_empty() || dt <= 0.0 {
            return 0;
        }

        for body in bodies.iter_mut() {
            body.vlambda = Vector3::zeros();
            body.wlambda = Vector3::zeros();
        }

        // Per-equation state for this solve.
        let mut lambdas: Vec<f64, E> = Vec::new();
        let mut rhs: Vec<f64, E> = Vec::new();
        let mut inv_cs: Vec<f64, E> = Vec::new();
        for equation in self.equations.iter() {
            let _ = lambdas.push(0.0);
            let _ = rhs.push(equation.compute_b(dt, bodies));
            let _ = inv_cs.push(equation.compute_inv_c(bodies));
        }

        let tolerance_sq = self.tolerance * self.tolerance;
        let mut passes = 0;
        for _ in 0..self.iterations {
            passes += 1;
            let mut delta_total = 0.0;

            for (index, equation) in self.equations.iter().enumerate() {
                if !equation.enabled {
                    continue;
                }
                // Impulse bounds: contacts use the static force range,
                // friction rows the Coulomb cone of their coupled contact.
                let (lambda_min, lambda_max) = match equation.kind {
                    EquationKind::Contact => {
                        (equation.min_force * dt, equation.max_force * dt)
                    }
                    EquationKind::Friction { coupled } => {
                        let bound =
                            equation.friction_coefficient() * lambdas[coupled].max(0.0);
                        (-bound, bound)
                    }
                };

                let gw_lambda = equation.compute_gw_lambda(bodies);
                let mut delta_lambda = inv_cs[index]
                    * (rhs[index] - gw_lambda - equation.eps * lambdas[index]);

                // Clamp the accumulated impulse, not the increment.
                let clamped = (lambdas[index] + delta_lambda).clamp(lambda_min, lambda_max);
                delta_lambda = clamped - lambdas[index];
                lambdas[index] = clamped;

                equation.add_to_wlambda(bodies, delta_lambda);
                delta_total += delta_lambda.abs();
            }

            if delta_total * delta_total < tolerance_sq {
                break;
            }
        }

        // Merge the accumulated deltas into the body velocities. Sleeping
        // bodies stay frozen; anything strong enough to move them must go
        // through the wake machinery first.
        for body in bodies.iter_mut() {
            if body.is_sleeping() {
                continue;
            }
            body.velocity += body.vlambda;
            body.angular_velocity += body.wlambda;
        }
        for (index, equation) in self.equations.iter_mut().enumerate() {
            equation.multiplier = lambdas[index] / dt;
        }

        passes
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use super::*;
    use crate::body::BodyId;
    use crate::equations::{tangents, DEFAULT_RELAXATION, DEFAULT_STIFFNESS};

    fn contact_between(depth: f64, restitution: f64, dt: f64) -> Equation {
        let normal = Vector3::new(0.0, 1.0, 0.0);
        let mut eq = Equation::contact(
            BodyId(0),
            BodyId(1),
            Vector3::zeros(),
            Vector3::zeros(),
            normal,
            depth,
            restitution,
        );
        eq.set_spook_params(DEFAULT_STIFFNESS, DEFAULT_RELAXATION, dt);
        eq
    }

    #[test]
    fn test_add_remove_equations() {
        let mut solver: Solver<8> = Solver::new();
        let id0 = solver.add_equation(contact_between(0.0, 0.0, 1.0 / 60.0)).unwrap();
        let id1 = solver.add_equation(contact_between(0.0, 0.0, 1.0 / 60.0)).unwrap();
        assert_ne!(id0, id1);
        assert_eq!(solver.len(), 2);
        assert!(solver.remove_equation(id0));
        assert!(!solver.remove_equation(id0));
        assert_eq!(solver.len(), 1);
        solver.remove_all();
        assert!(solver.is_empty());
    }

    #[test]
    fn test_solve_empty_is_noop() {
        let mut bodies = [RigidBody::new(1.0).with_velocity(Vector3::new(0.0, -1.0, 0.0))];
        let mut solver: Solver<8> = Solver::new();
        assert_eq!(solver.solve(1.0 / 60.0, &mut bodies), 0);
        assert_eq!(bodies[0].velocity, Vector3::new(0.0, -1.0, 0.0));
    }

    #[test]
    fn test_contact_reduces_approach_velocity() {
        let dt = 1.0 / 60.0;
        // Body 1 falls onto static body 0; contact normal +y (0 -> 1)
        let mut bodies = [
            RigidBody::new_static(),
            RigidBody::new(1.0).with_velocity(Vector3::new(0.0, -1.0, 0.0)),
        ];
        let mut solver: Solver<8> = Solver::new();
        let _ = solver.add_equation(contact_between(0.0, 0.0, dt));

        // Repeated solver passes drive the relative normal velocity toward
        // zero (the restitution bound for e = 0)
        let mut previous = 1.0;
        for _ in 0..5 {
            solver.solve(dt, &mut bodies);
            let approach = -bodies[1].velocity.y;
            assert!(approach < previous + 1e-12);
            previous = approach;
        }
        assert!(bodies[1].velocity.y.abs() < 1e-3);
        // Static body never moves
        assert_eq!(bodies[0].velocity, Vector3::zeros());
    }

    #[test]
    fn test_min_force_zero_never_attracts() {
        let dt = 1.0 / 60.0;
        // Bodies already separating: the contact must not pull them back
        let mut bodies = [
            RigidBody::new_static(),
            RigidBody::new(1.0).with_velocity(Vector3::new(0.0, 2.0, 0.0)),
        ];
        let mut solver: Solver<8> = Solver::new();
        let _ = solver.add_equation(contact_between(0.0, 0.0, dt));
        solver.solve(dt, &mut bodies);
        // Impulse clamped at zero from below: separating velocity unchanged
        assert!((bodies[1].velocity.y - 2.0).abs() < 1e-9);
        assert!(solver.equations()[0].multiplier.abs() < 1e-9);
    }

    #[test]
    fn test_disabled_equation_skipped() {
        let dt = 1.0 / 60.0;
        let mut bodies = [
            RigidBody::new_static(),
            RigidBody::new(1.0).with_velocity(Vector3::new(0.0, -1.0, 0.0)),
        ];
        let mut solver: Solver<8> = Solver::new();
        let mut eq = contact_between(0.0, 0.0, dt);
        eq.enabled = false;
        let _ = solver.add_equation(eq);
        solver.solve(dt, &mut bodies);
        assert!((bodies[1].velocity.y + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_friction_bounded_by_coupled_contact() {
        let dt = 1.0 / 60.0;
        let normal = Vector3::new(0.0, 1.0, 0.0);
        // Sliding along x while resting: friction must not exceed mu * normal impulse
        let mut bodies = [
            RigidBody::new_static(),
            RigidBody::new(1.0).with_velocity(Vector3::new(3.0, -1.0, 0.0)),
        ];
        let mut solver: Solver<8> = Solver::new();
        let mut contact = Equation::contact(
            BodyId(0),
            BodyId(1),
            Vector3::zeros(),
            Vector3::zeros(),
            normal,
            0.0,
            0.0,
        );
        contact.set_spook_params(DEFAULT_STIFFNESS, DEFAULT_RELAXATION, dt);
        let _ = solver.add_equation(contact);
        let (t1, t2) = tangents(&normal);
        let mu = 0.4;
        for tangent in [t1, t2] {
            let mut friction = Equation::friction(
                BodyId(0),
                BodyId(1),
                Vector3::zeros(),
                Vector3::zeros(),
                tangent,
                mu,
                0,
            );
            friction.set_spook_params(DEFAULT_STIFFNESS, DEFAULT_RELAXATION, dt);
            let _ = solver.add_equation(friction);
        }
        solver.solve(dt, &mut bodies);

        let normal_force = solver.equations()[0].multiplier;
        assert!(normal_force > 0.0);
        for eq in &solver.equations()[1..] {
            assert!(eq.multiplier.abs() <= mu * normal_force + 1e-9);
        }
        // Friction slows the slide but cannot reverse it
        assert!(bodies[1].velocity.x > 0.0);
        assert!(bodies[1].velocity.x < 3.0);
    }

    #[test]
    fn test_solver_never_moves_static_bodies() {
        let dt = 1.0 / 60.0;
        let mut bodies = [
            RigidBody::new_static(),
            RigidBody::new(1.0).with_velocity(Vector3::new(0.0, -5.0, 0.0)),
        ];
        let mut solver: Solver<8> = Solver::new();
        let _ = solver.add_equation(contact_between(0.05, 0.0, dt));
        for _ in 0..10 {
            solver.solve(dt, &mut bodies);
        }
        assert_eq!(bodies[0].velocity, Vector3::zeros());
        assert_eq!(bodies[0].angular_velocity, Vector3::zeros());
    }
}

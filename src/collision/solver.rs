use crate::bodies::RigidBody;
use crate::collision::Contact;
use crate::math::{Vector3, EPSILON};

/// Sequential-impulse contact solver.
///
/// Resolves one contact at a time: a normal impulse with restitution and
/// Baumgarte penetration bias, followed by a Coulomb friction impulse
/// along the tangent of the relative velocity. Impulses are accumulated
/// in each body's solver work area and only change the actual velocities
/// once [`RigidBody::correct_velocity`] commits them, so the order in
/// which contacts are solved within a sub-step does not feed back into
/// the relative velocities read here.
#[derive(Debug, Clone, Copy)]
pub struct ContactSolver {
    bias_factor: f32,
}

impl ContactSolver {
    /// Default fraction of the penetration depth fed back as a velocity
    /// bias each sub-step
    pub const DEFAULT_BIAS_FACTOR: f32 = 0.05;

    pub fn new() -> Self {
        Self {
            bias_factor: Self::DEFAULT_BIAS_FACTOR,
        }
    }

    pub fn get_bias_factor(&self) -> f32 {
        self.bias_factor
    }

    /// Sets the Baumgarte stabilization factor. Larger values push
    /// penetrating bodies apart faster at the cost of added energy.
    pub fn set_bias_factor(&mut self, bias_factor: f32) {
        self.bias_factor = bias_factor;
    }

    /// Effective inverse mass of a body as seen from the contact along
    /// `direction`: the linear inverse mass plus the angular term from
    /// the lever arm `r`
    fn effective_inverse_mass(body: &RigidBody, r: &Vector3, direction: &Vector3) -> f32 {
        let angular = body
            .get_inverse_inertia_world()
            .multiply_vector(r.cross(direction).cross(r));

        body.get_inverse_mass() + angular.dot(direction)
    }

    /// Computes and accumulates the collision and friction impulses for
    /// one contact. `body0` and `body1` must be the bodies the contact
    /// was detected between, in that order; the contact normal points
    /// from `body1` toward `body0`.
    pub fn apply_impulse(&self, body0: &mut RigidBody, body1: &mut RigidBody, contact: &Contact, dt: f32) {
        let r0 = contact.relative_position[0];
        let r1 = contact.relative_position[1];
        let normal = contact.normal;

        let relative_velocity = (body0.get_linear_velocity()
            + body0.get_angular_velocity().cross(&r0))
            - (body1.get_linear_velocity() + body1.get_angular_velocity().cross(&r1));

        // Normal impulse: cancel the approaching velocity scaled by the
        // combined restitution, plus a bias proportional to penetration.
        let impulse_magnitude = {
            let k0 = Self::effective_inverse_mass(body0, &r0, &normal);
            let k1 = Self::effective_inverse_mass(body1, &r1, &normal);
            let restitution = body0.get_restitution() * body1.get_restitution();

            let mut magnitude = -(1.0 + restitution) * relative_velocity.dot(&normal);
            magnitude += self.bias_factor * contact.penetration.max(0.0) / dt;
            magnitude / (k0 + k1)
        };

        let impulse = impulse_magnitude * normal;
        body0.apply_impulse(impulse, r0);
        body1.apply_impulse(-impulse, r1);

        // Friction impulse along the tangential part of the relative
        // velocity. n x (n x v) is the negated tangential component, so
        // a positive impulse on body0 opposes its sliding motion.
        let mut tangent = normal.cross(&normal.cross(&relative_velocity));
        let tangent_length = tangent.length();
        if tangent_length > EPSILON {
            tangent /= tangent_length;
        } else {
            return;
        }

        let impulse_magnitude = {
            let k0 = Self::effective_inverse_mass(body0, &r0, &tangent);
            let k1 = Self::effective_inverse_mass(body1, &r1, &tangent);

            if k0 + k1 > EPSILON {
                1.0 / (k0 + k1)
            } else {
                0.0
            }
        };

        // Coulomb clamp: the friction impulse cannot exceed the combined
        // friction coefficient.
        let coefficient = tangent
            .dot(&relative_velocity)
            .abs()
            .min(body0.get_friction() * body1.get_friction());

        let impulse = coefficient * impulse_magnitude * tangent;
        body0.apply_impulse(impulse, r0);
        body1.apply_impulse(-impulse, r1);
    }
}

impl Default for ContactSolver {
    fn default() -> Self {
        Self::new()
    }
}

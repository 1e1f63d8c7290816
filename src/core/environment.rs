use crate::bodies::RigidBody;
use crate::collision::{detect, Contact, ContactSolver};
use crate::core::{BodyHandle, BodyStorage, EnvironmentConfig};
use crate::error::PhysicsError;
use crate::math::Vector3;
use crate::Result;

/// Two contacts closer than this (squared distance) are considered the
/// same contact and merged during detection
const CONTACT_MERGE_THRESHOLD: f32 = 0.02;

/// The simulation world: owns every registered body, runs the sub-stepped
/// update loop, and exposes the resulting state for rendering.
///
/// All processing is single-threaded and deterministic. Bodies are
/// visited in registration order everywhere, so two environments built by
/// the same sequence of calls produce bit-identical trajectories.
pub struct Environment {
    /// All bodies registered in the environment, in registration order
    bodies: BodyStorage,

    /// Contacts detected during the current sub-step. Rebuilt from
    /// scratch at every sub-step boundary; never valid across one.
    contacts: Vec<Contact>,

    /// The contact solver shared by all contacts
    solver: ContactSolver,

    config: EnvironmentConfig,
}

impl Environment {
    /// Creates an empty environment with default capacities
    pub fn new() -> Self {
        Self::with_config(EnvironmentConfig::default())
    }

    /// Creates an empty environment with the given capacity hints
    pub fn with_config(config: EnvironmentConfig) -> Self {
        Self {
            bodies: BodyStorage::with_capacity(config.body_capacity),
            contacts: Vec::with_capacity(config.contact_capacity),
            solver: ContactSolver::new(),
            config,
        }
    }

    pub fn get_config(&self) -> &EnvironmentConfig {
        &self.config
    }

    /// Transfers ownership of a body into the environment and returns
    /// the handle it is simulated under
    pub fn register(&mut self, body: RigidBody) -> BodyHandle {
        self.bodies.add(body)
    }

    /// Removes a body from the simulation and transfers it back to the
    /// caller. Contacts referencing the body die with the sub-step that
    /// produced them, so none survive its removal.
    pub fn unregister(&mut self, handle: BodyHandle) -> Result<RigidBody> {
        self.contacts.retain(|c| c.bodies[0] != handle && c.bodies[1] != handle);
        self.bodies
            .remove(handle)
            .ok_or(PhysicsError::BodyNotFound(handle.0))
    }

    pub fn get_body(&self, handle: BodyHandle) -> Result<&RigidBody> {
        self.bodies.get_body(handle)
    }

    pub fn get_body_mut(&mut self, handle: BodyHandle) -> Result<&mut RigidBody> {
        self.bodies.get_body_mut(handle)
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// All registered bodies with their handles, in registration order
    pub fn bodies(&self) -> impl Iterator<Item = (BodyHandle, &RigidBody)> {
        self.bodies.iter()
    }

    /// The contacts detected in the most recent sub-step
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    pub fn contact_count(&self) -> usize {
        self.contacts.len()
    }

    pub fn get_bias_factor(&self) -> f32 {
        self.solver.get_bias_factor()
    }

    /// Sets the penetration bias factor of the contact solver
    pub fn set_bias_factor(&mut self, bias_factor: f32) {
        self.solver.set_bias_factor(bias_factor);
    }

    /// Advances the simulation by `dtime` seconds split into `substeps`
    /// equal sub-steps.
    ///
    /// Every sub-step runs the same fixed sequence: refresh per-body
    /// derived state, detect contacts, integrate forces into velocities,
    /// resolve contacts, update sleep states, integrate velocities into
    /// positions. Forces and torques are zeroed once at the end of the
    /// whole update, so a force set by the caller acts over the entire
    /// frame.
    pub fn update(&mut self, dtime: f32, substeps: u32) {
        let substeps = substeps.max(1);
        let dt = dtime / substeps as f32;

        for _ in 0..substeps {
            // The previous sub-step moved the bodies, so the world-space
            // inertia tensors are stale. Contacts and solver scratch from
            // the previous sub-step are dead as well.
            self.contacts.clear();
            for (_, body) in self.bodies.iter_mut() {
                body.clear_solver_work_area();
                body.update_inv_inertia_world();
            }

            self.detect_contacts();

            for (_, body) in self.bodies.iter_mut() {
                body.update_velocity(dt);
            }

            for contact in &self.contacts {
                if let Some((body0, body1)) = self.bodies.pair_mut(contact.bodies[0], contact.bodies[1]) {
                    self.solver.apply_impulse(body0, body1, contact, dt);
                }
            }

            for (_, body) in self.bodies.iter_mut() {
                body.correct_velocity();
            }

            for (_, body) in self.bodies.iter_mut() {
                body.update_sleep_status(dt);
                if body.is_sleeping() {
                    body.set_linear_velocity(Vector3::zero());
                    // Also clears the angular momentum
                    body.set_angular_velocity(Vector3::zero());
                }
            }

            for (_, body) in self.bodies.iter_mut() {
                body.update_position(dt);
            }
        }

        for (_, body) in self.bodies.iter_mut() {
            body.set_force(Vector3::zero());
            body.set_torque(Vector3::zero());
        }
    }

    /// Exhaustive pairwise collision detection in registration order.
    /// Fixed-fixed pairs cannot move and are skipped; a contact landing
    /// within the merge threshold of an already-kept one is dropped.
    fn detect_contacts(&mut self) {
        let count = self.bodies.len();
        for i0 in 0..count {
            for i1 in (i0 + 1)..count {
                let (handle0, body0) = self.bodies.at(i0);
                let (handle1, body1) = self.bodies.at(i1);

                if body0.is_fixed() && body1.is_fixed() {
                    continue;
                }

                if let Some(point) = detect(body0, body1) {
                    let contact = Contact::new(handle0, handle1, point);
                    let duplicate = self.contacts.iter().any(|known| {
                        (known.position - contact.position).length_squared()
                            <= CONTACT_MERGE_THRESHOLD
                    });
                    if !duplicate {
                        self.contacts.push(contact);
                    }
                }
            }
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

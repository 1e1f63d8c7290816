use crate::bodies::body_flags::BodyFlags;
use crate::error::PhysicsError;
use crate::math::{Matrix3, Vector3};
use crate::Result;

/// Impulse deltas accumulated by the contact solver within one sub-step.
/// Batched here so several contacts can contribute before the result is
/// committed with [`RigidBody::correct_velocity`].
#[derive(Debug, Clone, Copy)]
struct SolverWorkArea {
    delta_linear_velocity: Vector3,
    delta_angular_momentum: Vector3,
    delta_angular_velocity: Vector3,
}

impl SolverWorkArea {
    fn new() -> Self {
        Self {
            delta_linear_velocity: Vector3::zero(),
            delta_angular_momentum: Vector3::zero(),
            delta_angular_velocity: Vector3::zero(),
        }
    }

    fn clear(&mut self) {
        self.delta_linear_velocity = Vector3::zero();
        self.delta_angular_momentum = Vector3::zero();
        self.delta_angular_velocity = Vector3::zero();
    }
}

/// Sleep state machine data for a body
#[derive(Debug, Clone, Copy)]
struct SleepState {
    sleeping: bool,
    go_sleep_threshold_linear: f32,
    go_sleep_threshold_angular: f32,
    wake_up_threshold_linear: f32,
    wake_up_threshold_angular: f32,
    go_sleep_duration: f32,
    sleeping_duration: f32,
}

impl SleepState {
    fn new() -> Self {
        Self {
            sleeping: false,
            go_sleep_threshold_linear: 0.03,
            go_sleep_threshold_angular: 0.03,
            wake_up_threshold_linear: 1.0,
            wake_up_threshold_angular: 1.0,
            go_sleep_duration: 0.5,
            sleeping_duration: 0.0,
        }
    }
}

/// A dynamic or fixed oriented box for physics simulation.
///
/// The shape is a concrete box described by half extents; there is no
/// shape polymorphism. Orientation is stored as a 3x3 rotation matrix
/// whose columns are kept orthonormal by [`RigidBody::update_position`].
#[derive(Debug)]
pub struct RigidBody {
    /// Center-of-mass position in world space
    position: Vector3,

    /// Orientation as a rotation matrix (columns stay orthonormal)
    orientation: Matrix3,

    /// The body's linear velocity
    linear_velocity: Vector3,

    /// The body's angular velocity
    angular_velocity: Vector3,

    /// The body's angular momentum
    angular_momentum: Vector3,

    /// Force accumulated for the current frame
    force: Vector3,

    /// Torque accumulated for the current frame
    torque: Vector3,

    /// Inverse inertia tensor in world space (cached, derived from the
    /// orientation and the body-space inverse inertia)
    inv_inertia_world: Matrix3,

    /// Half extent of the box along each local axis
    half_extent: Vector3,

    /// Inverse of the body's mass
    inv_mass: f32,

    /// Inverse inertia tensor in body space
    inv_inertia: Matrix3,

    /// Coefficient of restitution
    restitution: f32,

    /// Coefficient of friction
    friction: f32,

    /// The body's flags
    flags: BodyFlags,

    /// Scratch area written by the solver, committed by correct_velocity
    solver_work_area: SolverWorkArea,

    /// Sleep state machine data
    sleep: SleepState,
}

impl RigidBody {
    /// Creates a new unit box with identity state: unit half extents,
    /// mass 1, restitution 0.5, friction 0.5, no flags set.
    pub fn new() -> Self {
        Self {
            position: Vector3::zero(),
            orientation: Matrix3::identity(),
            linear_velocity: Vector3::zero(),
            angular_velocity: Vector3::zero(),
            angular_momentum: Vector3::zero(),
            force: Vector3::zero(),
            torque: Vector3::zero(),
            inv_inertia_world: Matrix3::identity(),
            half_extent: Vector3::one(),
            inv_mass: 1.0,
            inv_inertia: Matrix3::identity(),
            restitution: 0.5,
            friction: 0.5,
            flags: BodyFlags::empty(),
            solver_work_area: SolverWorkArea::new(),
            sleep: SleepState::new(),
        }
    }

    /// Sets the box's mass, half extents and surface coefficients, and
    /// derives the inverse mass and body-space inverse inertia of a
    /// uniform box. Mass and half extents must be positive. Shape
    /// parameters are not meant to change once the body is registered.
    pub fn set_shape_parameter(
        &mut self,
        mass: f32,
        hx: f32,
        hy: f32,
        hz: f32,
        restitution: f32,
        friction: f32,
    ) -> Result<()> {
        if mass <= 0.0 || hx <= 0.0 || hy <= 0.0 || hz <= 0.0 {
            return Err(PhysicsError::InvalidParameter(format!(
                "mass and half extents must be positive: mass={}, half extents=({}, {}, {})",
                mass, hx, hy, hz
            )));
        }

        self.half_extent = Vector3::new(hx, hy, hz);
        self.restitution = restitution;
        self.friction = friction;

        self.inv_mass = 1.0 / mass;

        let inertia = Matrix3::from_diagonal(Vector3::new(
            mass * (hy * hy + hz * hz) / 3.0,
            mass * (hx * hx + hz * hz) / 3.0,
            mass * (hx * hx + hy * hy) / 3.0,
        ));
        self.inv_inertia = inertia.inverse().unwrap_or_else(Matrix3::zero);

        Ok(())
    }

    /// Returns the body's position
    pub fn get_position(&self) -> Vector3 {
        self.position
    }

    /// Sets the body's position
    pub fn set_position(&mut self, position: Vector3) {
        self.position = position;
    }

    /// Returns the body's orientation matrix
    pub fn get_orientation(&self) -> Matrix3 {
        self.orientation
    }

    /// Returns the transpose of the body's orientation matrix
    pub fn get_orientation_transpose(&self) -> Matrix3 {
        self.orientation.transpose()
    }

    /// Sets the body's orientation matrix
    pub fn set_orientation(&mut self, orientation: Matrix3) {
        self.orientation = orientation;
    }

    /// Sets the body's orientation from Euler angles in radians,
    /// composed as Rz * Ry * Rx
    pub fn set_orientation_from_euler(&mut self, rad_x: f32, rad_y: f32, rad_z: f32) {
        let rz = Matrix3::from_axis_angle(Vector3::unit_z(), rad_z);
        let ry = Matrix3::from_axis_angle(Vector3::unit_y(), rad_y);
        let rx = Matrix3::from_axis_angle(Vector3::unit_x(), rad_x);
        self.orientation = rz.multiply_matrix(&ry).multiply_matrix(&rx);
    }

    /// Returns the body's linear velocity
    pub fn get_linear_velocity(&self) -> Vector3 {
        self.linear_velocity
    }

    /// Sets the body's linear velocity
    pub fn set_linear_velocity(&mut self, velocity: Vector3) {
        self.linear_velocity = velocity;
    }

    /// Returns the body's angular velocity
    pub fn get_angular_velocity(&self) -> Vector3 {
        self.angular_velocity
    }

    /// Sets the body's angular velocity and refreshes the cached angular
    /// momentum to match
    pub fn set_angular_velocity(&mut self, velocity: Vector3) {
        self.angular_velocity = velocity;
        self.angular_momentum = self.inv_inertia_world.multiply_vector(velocity);
    }

    /// Returns the body's angular momentum
    pub fn get_angular_momentum(&self) -> Vector3 {
        self.angular_momentum
    }

    /// Returns the force accumulated for the current frame
    pub fn get_force(&self) -> Vector3 {
        self.force
    }

    /// Sets the accumulated force
    pub fn set_force(&mut self, force: Vector3) {
        self.force = force;
    }

    /// Adds to the accumulated force
    pub fn add_force(&mut self, force: Vector3) {
        self.force += force;
    }

    /// Sets the accumulated torque from a force applied at a world point
    pub fn set_force_at(&mut self, force: Vector3, at: Vector3) {
        let relative_position = at - self.position;
        self.torque = relative_position.cross(&force);
    }

    /// Adds the torque of a force applied at a world point
    pub fn add_force_at(&mut self, force: Vector3, at: Vector3) {
        let relative_position = at - self.position;
        self.torque += relative_position.cross(&force);
    }

    /// Returns the torque accumulated for the current frame
    pub fn get_torque(&self) -> Vector3 {
        self.torque
    }

    /// Sets the accumulated torque
    pub fn set_torque(&mut self, torque: Vector3) {
        self.torque = torque;
    }

    /// Adds to the accumulated torque
    pub fn add_torque(&mut self, torque: Vector3) {
        self.torque += torque;
    }

    /// Returns the box's half extents
    pub fn get_half_extent(&self) -> Vector3 {
        self.half_extent
    }

    /// Returns the body's restitution coefficient
    pub fn get_restitution(&self) -> f32 {
        self.restitution
    }

    /// Returns the body's friction coefficient
    pub fn get_friction(&self) -> f32 {
        self.friction
    }

    /// Returns the body's inverse mass
    pub fn get_inverse_mass(&self) -> f32 {
        self.inv_mass
    }

    /// Returns the body-space inverse inertia tensor
    pub fn get_inverse_inertia(&self) -> Matrix3 {
        self.inv_inertia
    }

    /// Returns the world-space inverse inertia tensor
    pub fn get_inverse_inertia_world(&self) -> Matrix3 {
        self.inv_inertia_world
    }

    /// Returns the body's flags
    pub fn get_flags(&self) -> BodyFlags {
        self.flags
    }

    /// Enables the given flags
    pub fn enable_flags(&mut self, flags: BodyFlags) {
        self.flags.insert(flags);
    }

    /// Disables the given flags
    pub fn disable_flags(&mut self, flags: BodyFlags) {
        self.flags.remove(flags);
    }

    /// Returns whether the body is fixed
    pub fn is_fixed(&self) -> bool {
        self.flags.contains(BodyFlags::FIXED)
    }

    /// Sets whether the body is fixed
    pub fn set_fixed(&mut self, fixed: bool) {
        if fixed {
            self.flags.insert(BodyFlags::FIXED);
        } else {
            self.flags.remove(BodyFlags::FIXED);
        }
    }

    /// Returns whether the body participates in the sleep state machine
    pub fn is_auto_sleep(&self) -> bool {
        self.flags.contains(BodyFlags::AUTO_SLEEP)
    }

    /// Sets whether the body participates in the sleep state machine
    pub fn set_auto_sleep(&mut self, auto_sleep: bool) {
        if auto_sleep {
            self.flags.insert(BodyFlags::AUTO_SLEEP);
        } else {
            self.flags.remove(BodyFlags::AUTO_SLEEP);
        }
    }

    /// Returns whether the body is sleeping
    pub fn is_sleeping(&self) -> bool {
        self.sleep.sleeping
    }

    /// Forces the sleep state
    pub fn set_sleeping(&mut self, sleeping: bool) {
        self.sleep.sleeping = sleeping;
    }

    /// Sets the linear/angular speeds below which the body starts
    /// accumulating sleep time, and above which a sleeping body wakes
    pub fn set_sleep_thresholds(
        &mut self,
        go_sleep_linear: f32,
        go_sleep_angular: f32,
        wake_up_linear: f32,
        wake_up_angular: f32,
    ) {
        self.sleep.go_sleep_threshold_linear = go_sleep_linear;
        self.sleep.go_sleep_threshold_angular = go_sleep_angular;
        self.sleep.wake_up_threshold_linear = wake_up_linear;
        self.sleep.wake_up_threshold_angular = wake_up_angular;
    }

    /// Sets how long the body must stay below the go-sleep thresholds
    /// before it transitions to Sleeping
    pub fn set_go_sleep_duration(&mut self, duration: f32) {
        self.sleep.go_sleep_duration = duration;
    }

    /// Recomputes the world-space inverse inertia tensor as
    /// R * I_body^-1 * R^T. Must run whenever the orientation changes and
    /// before any impulse or velocity computation in the same sub-step.
    pub fn update_inv_inertia_world(&mut self) {
        let rt = self.orientation.transpose();
        self.inv_inertia_world = self
            .orientation
            .multiply_matrix(&self.inv_inertia)
            .multiply_matrix(&rt);
    }

    /// Integrates accumulated force and torque into velocities with
    /// semi-implicit (symplectic) Euler. No-op for fixed bodies.
    pub fn update_velocity(&mut self, dt: f32) {
        if self.is_fixed() {
            return;
        }

        self.linear_velocity += self.inv_mass * dt * self.force;

        self.angular_momentum += dt * self.torque;
        self.angular_velocity = self.inv_inertia_world.multiply_vector(self.angular_momentum);
    }

    /// Accumulates an impulse applied at a position relative to the
    /// center of mass into the solver scratch area. Nothing is applied to
    /// the actual velocities until [`RigidBody::correct_velocity`] runs.
    /// No-op for fixed bodies.
    pub fn apply_impulse(&mut self, impulse: Vector3, relative_position: Vector3) {
        if self.is_fixed() {
            return;
        }

        self.solver_work_area.delta_linear_velocity += self.inv_mass * impulse;

        let delta_momentum = relative_position.cross(&impulse);
        self.solver_work_area.delta_angular_momentum += delta_momentum;
        self.solver_work_area.delta_angular_velocity +=
            self.inv_inertia_world.multiply_vector(delta_momentum);
    }

    /// Commits the solver scratch deltas into the body's velocities and
    /// angular momentum. The scratch area itself is cleared by the
    /// environment at the next sub-step boundary. No-op for fixed bodies.
    pub fn correct_velocity(&mut self) {
        if self.is_fixed() {
            return;
        }

        self.linear_velocity += self.solver_work_area.delta_linear_velocity;

        self.angular_momentum += self.solver_work_area.delta_angular_momentum;
        self.angular_velocity += self.solver_work_area.delta_angular_velocity;
    }

    /// Integrates velocities into position and orientation. The
    /// orientation advances by the first-order update
    /// `R += dt * skew(omega) * R` and is re-orthonormalized immediately
    /// to counter drift. No-op for fixed bodies.
    pub fn update_position(&mut self, dt: f32) {
        if self.is_fixed() {
            return;
        }

        self.position += dt * self.linear_velocity;

        let spin = Matrix3::skew_symmetric(self.angular_velocity);
        self.orientation += spin.multiply_matrix(&self.orientation) * dt;
        self.orientation.orthonormalize();
    }

    /// Advances the sleep state machine. Only active when AUTO_SLEEP is
    /// set; other bodies stay Awake forever.
    ///
    /// An Awake body that stays below both go-sleep thresholds for longer
    /// than the configured duration transitions to Sleeping. A Sleeping
    /// body wakes when either wake-up threshold is exceeded; since the
    /// environment zeroes a sleeping body's velocities every sub-step,
    /// that only happens when an external force or impulse injects enough
    /// velocity before the next sleep check. That asymmetry is intended.
    pub fn update_sleep_status(&mut self, dt: f32) {
        if !self.is_auto_sleep() {
            return;
        }

        let linear_speed = self.linear_velocity.length();
        let angular_speed = self.angular_velocity.length();

        if !self.sleep.sleeping
            && linear_speed < self.sleep.go_sleep_threshold_linear
            && angular_speed < self.sleep.go_sleep_threshold_angular
        {
            self.sleep.sleeping_duration += dt;
            if self.sleep.sleeping_duration > self.sleep.go_sleep_duration {
                self.sleep.sleeping = true;
            }
        } else if self.sleep.sleeping
            && (linear_speed > self.sleep.wake_up_threshold_linear
                || angular_speed > self.sleep.wake_up_threshold_angular)
        {
            self.sleep.sleeping_duration = 0.0;
            self.sleep.sleeping = false;
        }
    }

    /// Clears the solver scratch area
    pub fn clear_solver_work_area(&mut self) {
        self.solver_work_area.clear();
    }

    /// Resets the sleep state machine to its defaults
    pub fn clear_sleep_status(&mut self) {
        self.sleep = SleepState::new();
    }

    /// Clears both the solver scratch area and the sleep state
    pub fn reset_statuses(&mut self) {
        self.clear_solver_work_area();
        self.clear_sleep_status();
    }
}

impl Default for RigidBody {
    fn default() -> Self {
        Self::new()
    }
}

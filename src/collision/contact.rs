use crate::core::BodyHandle;
use crate::math::Vector3;

/// The geometry of a single collision point between two boxes, as
/// produced by [`crate::collision::detect`].
///
/// By convention the normal always points from the second box toward the
/// first.
#[derive(Debug, Clone, Copy)]
pub struct ContactPoint {
    /// The position of the contact point in world space
    pub position: Vector3,

    /// The contact position relative to each body's center of mass
    pub relative_position: [Vector3; 2],

    /// The unit contact normal, pointing from the second body to the first
    pub normal: Vector3,

    /// The penetration depth of the contact (non-negative when valid)
    pub penetration: f32,
}

/// A contact between two registered bodies for the current sub-step.
///
/// Contacts reference bodies by handle, never by pointer, and the
/// environment clears its contact list at every sub-step boundary; a
/// contact is never valid beyond the sub-step that produced it.
#[derive(Debug, Clone, Copy)]
pub struct Contact {
    /// Handles of the two involved bodies; the normal points from
    /// `bodies[1]` toward `bodies[0]`
    pub bodies: [BodyHandle; 2],

    /// The position of the contact point in world space
    pub position: Vector3,

    /// The contact position relative to each body's center of mass
    pub relative_position: [Vector3; 2],

    /// The unit contact normal, pointing from the second body to the first
    pub normal: Vector3,

    /// The penetration depth of the contact
    pub penetration: f32,
}

impl Contact {
    /// Builds a contact from detector geometry and the handles of the two
    /// bodies it was detected between
    pub fn new(body0: BodyHandle, body1: BodyHandle, point: ContactPoint) -> Self {
        Self {
            bodies: [body0, body1],
            position: point.position,
            relative_position: point.relative_position,
            normal: point.normal,
            penetration: point.penetration,
        }
    }
}

mod rigid_body;

pub use self::rigid_body::RigidBody;
pub use self::body_flags::BodyFlags;

/// Flags for controlling body behavior
pub mod body_flags {
    use bitflags::bitflags;

    bitflags! {
        /// Flags for controlling the behavior of rigid bodies
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
        pub struct BodyFlags: u32 {
            /// Body is excluded from velocity and position integration.
            /// It still contributes its inverse mass and inertia to
            /// contact resolution, so it behaves as very heavy rather
            /// than literally immovable in the solver math.
            const FIXED = 0x01;

            /// Body participates in the sleep state machine
            const AUTO_SLEEP = 0x02;
        }
    }
}

mod contact;
mod detector;
mod solver;

pub use self::contact::{Contact, ContactPoint};
pub use self::detector::detect;
pub use self::solver::ContactSolver;

//! Session registry and background expiry sweep.

pub mod model;
pub mod registry;
pub mod sweep;

pub use model::Session;
pub use registry::{Admission, SessionRegistry};
pub use sweep::{SessionSweeper, SweepReport};

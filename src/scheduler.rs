pub mod daemon;
pub(crate) mod jobs;

pub use jobs::Scheduler;
pub(crate) use jobs::{RunError, Trigger};

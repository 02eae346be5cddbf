//! Rate estimation and per-key state management.

mod discrete;
mod duration;
mod options;
mod registry;
mod rolling;
mod window;

pub use discrete::DiscreteWindow;
pub use duration::{resolve, TimeUnit};
pub use options::{Mode, TrackerConfig, TrackerOptions};
pub use registry::RateTracker;
pub use rolling::RollingWindow;
pub use window::WindowState;

pub mod action;
pub mod appender;
pub mod counting;
pub mod error;
pub mod fixed_window;
pub mod plan;
pub mod policy;
pub mod size_trigger;

pub use action::*;
pub use appender::{RollingFileAppender, DEFAULT_MAX_BACKUP_INDEX};
pub use counting::*;
pub use error::*;
pub use fixed_window::*;
pub use plan::*;
pub use policy::*;
pub use size_trigger::*;

pub mod appender;
pub mod config;
pub mod legacy;
pub mod rolling;

pub use appender::{FileAppender, JsonLayout, Layout, LogEvent, SimpleLayout};
pub use config::AppenderConfig;
pub use legacy::SizeRollingFileAppender;
pub use rolling::*;

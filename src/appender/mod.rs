pub mod event;
pub mod file;
pub mod layout;

pub use event::*;
pub use file::*;
pub use layout::*;

//! Built-in handlers.

mod console;
mod file;
mod multi;

pub use console::{ConsoleHandler, Target};
pub use file::FileHandler;
pub use multi::MultiHandler;

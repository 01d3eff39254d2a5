mod compare;
mod config;

pub use self::compare::{CompareArgs, compare};
pub use self::config::config;

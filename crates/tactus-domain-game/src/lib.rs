pub mod matcher;
pub mod song;

pub use matcher::*;
pub use song::*;

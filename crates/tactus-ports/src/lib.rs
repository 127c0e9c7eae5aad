pub mod audio;
pub mod device;
pub mod storage;
pub mod synth;
pub mod types;

pub use audio::*;
pub use device::*;
pub use storage::*;
pub use synth::*;
pub use types::*;

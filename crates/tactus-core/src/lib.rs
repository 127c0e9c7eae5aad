pub mod app;
pub mod audio_graph;
pub mod diagnostics;
pub mod game;
pub mod glove_config;
pub mod ipc;
mod persist;
pub mod timers;
pub mod voices;

pub use app::*;
pub use audio_graph::*;
pub use diagnostics::*;
pub use game::*;
pub use glove_config::*;
pub use ipc::*;
pub use timers::*;
pub use voices::*;

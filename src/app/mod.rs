//! Window, GPU device and event loop.

mod game;

pub use game::run_game;

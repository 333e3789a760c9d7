//! 核心层：错误类型、UI 状态投影、命令控制循环

pub mod controller;
pub mod error;
pub mod state;

pub use controller::{create_console, spawn_console, Command};
pub use error::AdminError;
pub use state::{Banner, Screen, Tab, UiState};

//! Typer Admin - 打字游戏管理后台（终端版）
//!
//! 模块划分：
//! - **api**: REST 客户端抽象与实现（reqwest / Mock）
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 错误、状态投影与命令控制循环
//! - **session**: 会话与令牌持久化
//! - **store**: 会话/集合状态容器（主题、关卡、短语缓存与 CRUD）
//! - **ui**: Ratatui TUI 界面

pub mod api;
pub mod config;
pub mod core;
pub mod session;
pub mod store;
pub mod ui;

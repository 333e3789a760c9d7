//! REST 客户端层
//!
//! 所有后端（reqwest HTTP / Mock）实现 AdminApi；DTO 与后端的请求/响应结构一一对应。

pub mod http;
pub mod mock;
pub mod traits;
pub mod types;

pub use http::HttpAdminApi;
pub use mock::MockAdminApi;
pub use traits::AdminApi;
pub use types::{
    AuthResponse, Difficulty, LoginRequest, Phrase, PhraseDraft, Profile, Stage, StageDraft,
    Theme, ROLE_ADMIN,
};

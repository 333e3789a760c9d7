//! 管理控制台错误类型
//!
//! 所有错误在控制循环的命令处理处捕获并投影到 UiState（登录页内联 / 横幅），
//! 不向上传播，也不重试。

use thiserror::Error;

/// 运行过程中可能出现的错误（认证、会话过期、API 业务错误、传输、本地存储）
#[derive(Error, Debug)]
pub enum AdminError {
    /// 凭证错误或非管理员角色，在登录表单内联显示
    #[error("{0}")]
    Auth(String),

    /// 任一认证接口返回 401：清除令牌并回到登录页
    #[error("Session expired. Please login again.")]
    SessionExpired,

    /// 其余非 2xx：优先用服务端 error 字段原文，缺失时用调用方兜底文案
    #[error("{0}")]
    Api(String),

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// 令牌文件读写失败
    #[error("Token storage: {0}")]
    Storage(#[from] std::io::Error),
}

//! 客户端抽象
//!
//! 所有后端（reqwest HTTP / Mock）实现 AdminApi；调用方持有 Arc<dyn AdminApi>，
//! 令牌由会话层保管并逐调用传入，后端实现保持无状态。

use async_trait::async_trait;

use crate::api::types::{
    AuthResponse, LoginRequest, Phrase, PhraseDraft, Profile, Stage, StageDraft, Theme,
};
use crate::core::AdminError;

/// 管理 API 客户端 trait：认证两端点 + 主题/关卡/短语的读写
#[async_trait]
pub trait AdminApi: Send + Sync {
    /// 凭证换令牌；非 2xx 以 AdminError::Auth 返回（服务端 error 原文或 "Login failed"）
    async fn login(&self, req: &LoginRequest) -> Result<AuthResponse, AdminError>;

    /// 当前用户概况；role 为管理界面的二次准入依据
    async fn profile(&self, token: &str) -> Result<Profile, AdminError>;

    async fn list_themes(&self, token: &str) -> Result<Vec<Theme>, AdminError>;

    async fn list_stages(&self, token: &str) -> Result<Vec<Stage>, AdminError>;

    async fn create_stage(&self, token: &str, draft: &StageDraft) -> Result<(), AdminError>;

    async fn update_stage(
        &self,
        token: &str,
        id: &str,
        draft: &StageDraft,
    ) -> Result<(), AdminError>;

    async fn delete_stage(&self, token: &str, id: &str) -> Result<(), AdminError>;

    /// 取某一关卡的短语；后端无批量端点，全量列表由调用方逐关卡取
    async fn list_phrases(&self, token: &str, stage_id: &str) -> Result<Vec<Phrase>, AdminError>;

    async fn create_phrase(&self, token: &str, draft: &PhraseDraft) -> Result<(), AdminError>;

    async fn update_phrase(
        &self,
        token: &str,
        id: &str,
        draft: &PhraseDraft,
    ) -> Result<(), AdminError>;

    async fn delete_phrase(&self, token: &str, id: &str) -> Result<(), AdminError>;
}

//! reqwest HTTP 客户端
//!
//! 统一请求封装：附加 Bearer 令牌；401 转 SessionExpired；其余非 2xx 取响应体
//! error 字段原文（缺失时用兜底文案）；2xx 解析 JSON 返回。
//! 登录端点单独处理：它的 401 表示凭证错误而非会话过期。

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::api::traits::AdminApi;
use crate::api::types::{
    AuthResponse, ErrorBody, LoginRequest, Phrase, PhraseDraft, Profile, Stage, StageDraft, Theme,
};
use crate::core::AdminError;

/// HTTP 实现：持有 reqwest Client 与基础地址，超时由配置决定
pub struct HttpAdminApi {
    client: Client,
    base_url: String,
}

impl HttpAdminApi {
    pub fn new(base_url: &str, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// 读取错误响应的 error 字段，缺失或为空时用 fallback
    async fn error_message(resp: reqwest::Response, fallback: &str) -> String {
        resp.json::<ErrorBody>()
            .await
            .ok()
            .map(|b| b.error)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| fallback.to_string())
    }

    /// 认证请求的统一路径；body 为 None 时不发送请求体
    async fn call<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        token: &str,
        body: Option<&B>,
    ) -> Result<reqwest::Response, AdminError> {
        tracing::debug!(method = %method, path = %path, "api call");
        let mut req = self
            .client
            .request(method, self.url(path))
            .bearer_auth(token);
        if let Some(body) = body {
            req = req.json(body);
        }
        let resp = req.send().await?;

        if resp.status() == StatusCode::UNAUTHORIZED {
            return Err(AdminError::SessionExpired);
        }
        if !resp.status().is_success() {
            return Err(AdminError::Api(
                Self::error_message(resp, "Request failed").await,
            ));
        }
        Ok(resp)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        token: &str,
    ) -> Result<T, AdminError> {
        let resp = self.call::<()>(Method::GET, path, token, None).await?;
        Ok(resp.json().await?)
    }

    /// 变更类调用：响应体（创建的记录 / 删除确认消息）被丢弃，调用方随后整体重载列表
    async fn send_mutation<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        token: &str,
        body: Option<&B>,
    ) -> Result<(), AdminError> {
        self.call(method, path, token, body).await?;
        Ok(())
    }
}

#[async_trait]
impl AdminApi for HttpAdminApi {
    async fn login(&self, req: &LoginRequest) -> Result<AuthResponse, AdminError> {
        let resp = self
            .client
            .post(self.url("/api/auth/login"))
            .json(req)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(AdminError::Auth(
                Self::error_message(resp, "Login failed").await,
            ));
        }
        Ok(resp.json().await?)
    }

    async fn profile(&self, token: &str) -> Result<Profile, AdminError> {
        self.get_json("/api/auth/profile", token).await
    }

    async fn list_themes(&self, token: &str) -> Result<Vec<Theme>, AdminError> {
        self.get_json("/admin/themes", token).await
    }

    async fn list_stages(&self, token: &str) -> Result<Vec<Stage>, AdminError> {
        self.get_json("/admin/stages", token).await
    }

    async fn create_stage(&self, token: &str, draft: &StageDraft) -> Result<(), AdminError> {
        self.send_mutation(Method::POST, "/admin/stage", token, Some(draft))
            .await
    }

    async fn update_stage(
        &self,
        token: &str,
        id: &str,
        draft: &StageDraft,
    ) -> Result<(), AdminError> {
        self.send_mutation(
            Method::PUT,
            &format!("/admin/stage/{}", id),
            token,
            Some(draft),
        )
        .await
    }

    async fn delete_stage(&self, token: &str, id: &str) -> Result<(), AdminError> {
        self.send_mutation::<()>(Method::DELETE, &format!("/admin/stage/{}", id), token, None)
            .await
    }

    async fn list_phrases(&self, token: &str, stage_id: &str) -> Result<Vec<Phrase>, AdminError> {
        self.get_json(&format!("/admin/phrases?stage_id={}", stage_id), token)
            .await
    }

    async fn create_phrase(&self, token: &str, draft: &PhraseDraft) -> Result<(), AdminError> {
        self.send_mutation(Method::POST, "/admin/phrase", token, Some(draft))
            .await
    }

    async fn update_phrase(
        &self,
        token: &str,
        id: &str,
        draft: &PhraseDraft,
    ) -> Result<(), AdminError> {
        self.send_mutation(
            Method::PUT,
            &format!("/admin/phrase/{}", id),
            token,
            Some(draft),
        )
        .await
    }

    async fn delete_phrase(&self, token: &str, id: &str) -> Result<(), AdminError> {
        self.send_mutation::<()>(
            Method::DELETE,
            &format!("/admin/phrase/{}", id),
            token,
            None,
        )
        .await
    }
}

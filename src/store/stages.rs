//! 关卡集合：列表重载（含主题连接）与 CRUD
//!
//! 每个变更操作成功后整体重载列表；关卡表单的主题下拉与名称显示共用
//! 同一次重载得到的主题缓存。

use serde::Serialize;

use crate::api::{Stage, StageDraft};
use crate::core::AdminError;
use crate::store::AdminStore;

/// 关卡行：列表重载时由 Stage 与主题缓存按 theme_id 连接得到 theme_name
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StageRow {
    pub stage: Stage,
    /// 连接不到主题时为 "Unknown"
    pub theme_name: String,
}

impl AdminStore {
    /// 重载关卡列表：先取关卡再取主题，在内存中按 theme_id 连接（不走网络连接）。
    /// 任一请求失败则整体失败，已有缓存保持不变。
    pub async fn load_stages(&mut self) -> Result<(), AdminError> {
        let token = self.bearer()?;
        let stages = self.api().list_stages(&token).await?;
        let themes = self.api().list_themes(&token).await?;

        let rows = stages
            .into_iter()
            .map(|stage| {
                let theme_name = themes
                    .iter()
                    .find(|t| t.id == stage.theme_id)
                    .map(|t| t.name.clone())
                    .unwrap_or_else(|| "Unknown".to_string());
                StageRow { stage, theme_name }
            })
            .collect();

        self.set_stages(rows);
        self.set_themes(themes);
        tracing::debug!(count = self.stages().len(), "stages reloaded");
        Ok(())
    }

    pub async fn create_stage(&mut self, draft: &StageDraft) -> Result<(), AdminError> {
        let token = self.bearer()?;
        self.api().create_stage(&token, draft).await?;
        self.load_stages().await
    }

    pub async fn update_stage(&mut self, id: &str, draft: &StageDraft) -> Result<(), AdminError> {
        let token = self.bearer()?;
        self.api().update_stage(&token, id, draft).await?;
        self.load_stages().await
    }

    pub async fn delete_stage(&mut self, id: &str) -> Result<(), AdminError> {
        let token = self.bearer()?;
        self.api().delete_stage(&token, id).await?;
        self.load_stages().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::api::{Difficulty, MockAdminApi};
    use crate::session::MemoryTokenStore;

    async fn logged_in_store(api: &Arc<MockAdminApi>) -> AdminStore {
        let mut store = AdminStore::new(api.clone(), Arc::new(MemoryTokenStore::default()));
        store.login("admin", "pw").await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_theme_join_resolves_names() {
        let api = Arc::new(MockAdminApi::new("pw"));
        api.seed_theme("t1", "Space");
        api.seed_stage("s1", "Orbit", "t1", Difficulty::Easy, true);
        api.seed_stage("s2", "Lost", "t-missing", Difficulty::Hard, false);

        let mut store = logged_in_store(&api).await;
        store.load_stages().await.unwrap();

        let rows = store.stages();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].theme_name, "Space");
        assert_eq!(rows[1].theme_name, "Unknown");
    }

    #[tokio::test]
    async fn test_create_stage_roundtrip() {
        let api = Arc::new(MockAdminApi::new("pw"));
        api.seed_theme("t1", "Space");
        let mut store = logged_in_store(&api).await;

        store
            .create_stage(&StageDraft {
                name: "Orbit".to_string(),
                theme_id: "t1".to_string(),
                difficulty: Difficulty::Medium,
                is_active: true,
            })
            .await
            .unwrap();

        // 创建后列表已整体重载，新行带着连接好的主题名
        let rows = store.stages();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].stage.name, "Orbit");
        assert_eq!(rows[0].stage.difficulty, Difficulty::Medium);
        assert_eq!(rows[0].theme_name, "Space");
    }

    #[tokio::test]
    async fn test_update_stage_replaces_row() {
        let api = Arc::new(MockAdminApi::new("pw"));
        api.seed_theme("t1", "Space");
        api.seed_stage("s1", "Orbit", "t1", Difficulty::Easy, true);
        let mut store = logged_in_store(&api).await;
        store.load_stages().await.unwrap();

        store
            .update_stage(
                "s1",
                &StageDraft {
                    name: "Orbit II".to_string(),
                    theme_id: "t1".to_string(),
                    difficulty: Difficulty::Hard,
                    is_active: false,
                },
            )
            .await
            .unwrap();

        let rows = store.stages();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].stage.name, "Orbit II");
        assert!(!rows[0].stage.is_active);
    }

    #[tokio::test]
    async fn test_delete_missing_stage_keeps_cache() {
        let api = Arc::new(MockAdminApi::new("pw"));
        api.seed_theme("t1", "Space");
        api.seed_stage("s1", "Orbit", "t1", Difficulty::Easy, true);
        let mut store = logged_in_store(&api).await;
        store.load_stages().await.unwrap();

        let err = store.delete_stage("nope").await.unwrap_err();
        assert!(matches!(err, AdminError::Api(ref m) if m == "stage not found"));
        // 本地列表未被提前修改
        assert_eq!(store.stages().len(), 1);
        assert_eq!(store.stages()[0].stage.id, "s1");
    }

    #[tokio::test]
    async fn test_expired_session_surfaces_before_mutation() {
        let api = Arc::new(MockAdminApi::new("pw"));
        api.seed_theme("t1", "Space");
        api.seed_stage("s1", "Orbit", "t1", Difficulty::Easy, true);
        let mut store = logged_in_store(&api).await;
        store.load_stages().await.unwrap();

        api.expire_session();
        let err = store.delete_stage("s1").await.unwrap_err();
        assert!(matches!(err, AdminError::SessionExpired));
        assert_eq!(store.stages().len(), 1);
    }
}

//! 短语集合：列表重载（可按关卡过滤）与 CRUD
//!
//! 无过滤时是刻意的 N+1 扇出：后端没有批量端点，先取关卡列表，再逐关卡
//! 顺序取短语拼接。顺序而非并发，以限制对后端的并发压力，代价是延迟随
//! 关卡数线性增长。

use serde::Serialize;

use crate::api::PhraseDraft;
use crate::core::AdminError;
use crate::store::AdminStore;

/// 短语行：列表重载时标注所属关卡的名称
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PhraseRow {
    pub phrase: crate::api::Phrase,
    /// 解析不到关卡时为 "Unknown"
    pub stage_name: String,
}

impl AdminStore {
    /// 重载短语列表：有过滤时只取该关卡的短语（关卡名取自关卡缓存）；
    /// 无过滤时逐关卡顺序取全量。失败则整体失败，已有缓存保持不变。
    pub async fn load_phrases(&mut self) -> Result<(), AdminError> {
        let token = self.bearer()?;

        let rows: Vec<PhraseRow> = match self.phrase_filter().cloned() {
            Some(stage_id) => {
                let phrases = self.api().list_phrases(&token, &stage_id).await?;
                phrases
                    .into_iter()
                    .map(|phrase| {
                        // 响应里 stage_id 可能省略，此时用过滤条件回填
                        let key = if phrase.stage_id.is_empty() {
                            stage_id.as_str()
                        } else {
                            phrase.stage_id.as_str()
                        };
                        let stage_name = self.cached_stage_name(key);
                        PhraseRow { phrase, stage_name }
                    })
                    .collect()
            }
            None => {
                let stages = self.api().list_stages(&token).await?;
                let mut rows = Vec::new();
                for stage in &stages {
                    let phrases = self.api().list_phrases(&token, &stage.id).await?;
                    rows.extend(phrases.into_iter().map(|phrase| PhraseRow {
                        phrase,
                        stage_name: stage.name.clone(),
                    }));
                }
                rows
            }
        };

        self.set_phrases(rows);
        tracing::debug!(count = self.phrases().len(), "phrases reloaded");
        Ok(())
    }

    pub async fn create_phrase(&mut self, draft: &PhraseDraft) -> Result<(), AdminError> {
        let token = self.bearer()?;
        self.api().create_phrase(&token, draft).await?;
        self.load_phrases().await
    }

    pub async fn update_phrase(
        &mut self,
        id: &str,
        draft: &PhraseDraft,
    ) -> Result<(), AdminError> {
        let token = self.bearer()?;
        self.api().update_phrase(&token, id, draft).await?;
        self.load_phrases().await
    }

    pub async fn delete_phrase(&mut self, id: &str) -> Result<(), AdminError> {
        let token = self.bearer()?;
        self.api().delete_phrase(&token, id).await?;
        self.load_phrases().await
    }

    fn cached_stage_name(&self, stage_id: &str) -> String {
        self.stages()
            .iter()
            .find(|r| r.stage.id == stage_id)
            .map(|r| r.stage.name.clone())
            .unwrap_or_else(|| "Unknown".to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::api::{Difficulty, MockAdminApi};
    use crate::session::MemoryTokenStore;

    fn seeded_api() -> Arc<MockAdminApi> {
        let api = Arc::new(MockAdminApi::new("pw"));
        api.seed_theme("t1", "Space");
        api.seed_stage("s1", "Orbit", "t1", Difficulty::Easy, true);
        api.seed_stage("s2", "Nebula", "t1", Difficulty::Hard, true);
        api.seed_phrase("p1", "s1", "type fast", 1, 1.0);
        api.seed_phrase("p2", "s2", "warp speed", 1, 2.0);
        api.seed_phrase("p3", "s1", "stay calm", 2, 1.2);
        api
    }

    async fn logged_in_store(api: &Arc<MockAdminApi>) -> AdminStore {
        let mut store = AdminStore::new(api.clone(), Arc::new(MemoryTokenStore::default()));
        store.login("admin", "pw").await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_fan_out_concatenates_per_stage() {
        let api = seeded_api();
        let mut store = logged_in_store(&api).await;

        store.load_phrases().await.unwrap();
        let rows = store.phrases();

        // 按关卡顺序拼接：s1 的两条在前，s2 的一条在后
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].phrase.id, "p1");
        assert_eq!(rows[0].stage_name, "Orbit");
        assert_eq!(rows[1].phrase.id, "p3");
        assert_eq!(rows[2].phrase.id, "p2");
        assert_eq!(rows[2].stage_name, "Nebula");
    }

    #[tokio::test]
    async fn test_reload_without_mutation_is_idempotent() {
        let api = seeded_api();
        let mut store = logged_in_store(&api).await;

        store.load_phrases().await.unwrap();
        let first = store.phrases().to_vec();
        store.load_phrases().await.unwrap();

        assert_eq!(first, store.phrases());
    }

    #[tokio::test]
    async fn test_filtered_load_uses_stage_cache_for_names() {
        let api = seeded_api();
        let mut store = logged_in_store(&api).await;
        store.load_stages().await.unwrap();

        store.set_phrase_filter(Some("s1".to_string()));
        store.load_phrases().await.unwrap();

        let rows = store.phrases();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.stage_name == "Orbit"));
    }

    #[tokio::test]
    async fn test_create_phrase_roundtrip() {
        let api = seeded_api();
        let mut store = logged_in_store(&api).await;
        store.load_stages().await.unwrap();
        store.set_phrase_filter(Some("s1".to_string()));

        store
            .create_phrase(&PhraseDraft {
                stage_id: "s1".to_string(),
                text: "hello".to_string(),
                sequence_number: 1,
                base_multiplier: 1.5,
            })
            .await
            .unwrap();

        let created = store
            .phrases()
            .iter()
            .find(|r| r.phrase.text == "hello")
            .expect("created phrase listed");
        assert_eq!(created.phrase.sequence_number, 1);
        assert_eq!(created.phrase.multiplier, 1.5);
    }

    #[tokio::test]
    async fn test_delete_missing_phrase_keeps_cache() {
        let api = seeded_api();
        let mut store = logged_in_store(&api).await;
        store.load_phrases().await.unwrap();

        let err = store.delete_phrase("nope").await.unwrap_err();
        assert!(matches!(err, AdminError::Api(ref m) if m == "phrase not found"));
        assert_eq!(store.phrases().len(), 3);
    }

    #[tokio::test]
    async fn test_filtered_names_fall_back_to_unknown_without_stage_cache() {
        let api = seeded_api();
        let mut store = logged_in_store(&api).await;

        // 关卡缓存为空时，过滤加载解析不到名称
        store.set_phrase_filter(Some("s1".to_string()));
        store.load_phrases().await.unwrap();
        assert!(store.phrases().iter().all(|r| r.stage_name == "Unknown"));
    }
}

//! 控制台端到端流程测试：Mock 后端驱动控制循环，断言 UiState 投影

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use typer_admin::api::{Difficulty, MockAdminApi, PhraseDraft, StageDraft};
use typer_admin::core::{spawn_console, Command, Screen, Tab, UiState};
use typer_admin::session::{MemoryTokenStore, TokenStore};
use typer_admin::store::AdminStore;

fn console_with(
    api: &Arc<MockAdminApi>,
) -> (
    Arc<MemoryTokenStore>,
    tokio::sync::mpsc::UnboundedSender<Command>,
    watch::Receiver<UiState>,
) {
    let tokens = Arc::new(MemoryTokenStore::default());
    let store = AdminStore::new(api.clone(), tokens.clone());
    let (cmd_tx, state_rx) = spawn_console(store, Duration::from_secs(5));
    (tokens, cmd_tx, state_rx)
}

async fn wait_for(
    rx: &mut watch::Receiver<UiState>,
    f: impl Fn(&UiState) -> bool,
) -> UiState {
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            {
                let state = rx.borrow_and_update().clone();
                if f(&state) {
                    return state;
                }
            }
            rx.changed().await.expect("console task ended");
        }
    })
    .await
    .expect("condition not reached in time")
}

async fn login(
    cmd_tx: &tokio::sync::mpsc::UnboundedSender<Command>,
    state_rx: &mut watch::Receiver<UiState>,
    password: &str,
) -> UiState {
    cmd_tx
        .send(Command::Login {
            username: "admin".to_string(),
            password: password.to_string(),
        })
        .unwrap();
    wait_for(state_rx, |s| s.screen == Screen::Main && !s.pending).await
}

#[tokio::test]
async fn test_wrong_then_right_login() {
    let api = Arc::new(MockAdminApi::new("correctpass"));
    api.seed_theme("t1", "Space");
    api.seed_stage("s1", "Orbit", "t1", Difficulty::Easy, true);
    api.seed_stage("s2", "Nebula", "t1", Difficulty::Hard, false);
    let (tokens, cmd_tx, mut state_rx) = console_with(&api);

    cmd_tx
        .send(Command::Login {
            username: "admin".to_string(),
            password: "wrongpass".to_string(),
        })
        .unwrap();
    let state = wait_for(&mut state_rx, |s| s.login_error.is_some()).await;
    assert_eq!(state.screen, Screen::Login);
    assert_eq!(state.login_error.as_deref(), Some("invalid credentials"));
    assert!(tokens.load().await.is_none());

    // 正确凭证：进入主界面，关卡列表渲染两行，主题名已连接
    let state = login(&cmd_tx, &mut state_rx, "correctpass").await;
    assert_eq!(state.tab, Tab::Stages);
    assert_eq!(state.stages.len(), 2);
    assert_eq!(state.stages[0].theme_name, "Space");
    assert!(tokens.load().await.is_some());
}

#[tokio::test]
async fn test_valid_credentials_but_non_admin_denied() {
    let api = Arc::new(MockAdminApi::new("pw"));
    api.set_role("user");
    let (tokens, cmd_tx, mut state_rx) = console_with(&api);

    cmd_tx
        .send(Command::Login {
            username: "admin".to_string(),
            password: "pw".to_string(),
        })
        .unwrap();
    let state = wait_for(&mut state_rx, |s| s.login_error.is_some()).await;

    assert_eq!(state.screen, Screen::Login);
    assert_eq!(state.login_error.as_deref(), Some("Admin access required"));
    assert!(tokens.load().await.is_none());
}

#[tokio::test]
async fn test_session_expiry_forces_logout() {
    let api = Arc::new(MockAdminApi::new("pw"));
    api.seed_theme("t1", "Space");
    let (tokens, cmd_tx, mut state_rx) = console_with(&api);

    login(&cmd_tx, &mut state_rx, "pw").await;
    assert!(tokens.load().await.is_some());

    api.expire_session();
    cmd_tx.send(Command::Reload).unwrap();

    let state = wait_for(&mut state_rx, |s| s.screen == Screen::Login).await;
    assert_eq!(
        state.login_error.as_deref(),
        Some("Session expired. Please login again.")
    );
    assert!(tokens.load().await.is_none());
    assert!(state.stages.is_empty());
}

#[tokio::test]
async fn test_startup_restores_persisted_session() {
    let api = Arc::new(MockAdminApi::new("pw"));
    api.accept_token("tok-persisted");
    api.seed_theme("t1", "Space");
    api.seed_stage("s1", "Orbit", "t1", Difficulty::Easy, true);

    let tokens = Arc::new(MemoryTokenStore::default());
    tokens.save("tok-persisted").await.unwrap();
    let store = AdminStore::new(api.clone(), tokens.clone());
    let (_cmd_tx, mut state_rx) = spawn_console(store, Duration::from_secs(5));

    // 静默复用持久化令牌，直接进入主界面并加载关卡
    let state = wait_for(&mut state_rx, |s| s.screen == Screen::Main).await;
    assert!(state.login_error.is_none());
    assert_eq!(state.stages.len(), 1);
}

#[tokio::test]
async fn test_startup_with_stale_token_stays_on_login() {
    let api = Arc::new(MockAdminApi::new("pw"));
    let tokens = Arc::new(MemoryTokenStore::default());
    tokens.save("tok-unknown").await.unwrap();
    let store = AdminStore::new(api.clone(), tokens.clone());
    let (cmd_tx, mut state_rx) = spawn_console(store, Duration::from_secs(5));

    // 命令在启动校验之后才被消费，借 op_seq 确认校验已经结束
    cmd_tx.send(Command::DismissBanner).unwrap();
    let state = wait_for(&mut state_rx, |s| s.op_seq >= 1).await;

    // 隐式登出：停在登录页，没有错误提示，令牌已被清掉
    assert_eq!(state.screen, Screen::Login);
    assert!(state.login_error.is_none());
    assert!(state.banner.is_none());
    assert!(tokens.load().await.is_none());
}

#[tokio::test]
async fn test_stage_create_then_failed_delete() {
    let api = Arc::new(MockAdminApi::new("pw"));
    api.seed_theme("t1", "Space");
    let (_tokens, cmd_tx, mut state_rx) = console_with(&api);
    login(&cmd_tx, &mut state_rx, "pw").await;

    cmd_tx
        .send(Command::SaveStage {
            target: None,
            draft: StageDraft {
                name: "Orbit".to_string(),
                theme_id: "t1".to_string(),
                difficulty: Difficulty::Medium,
                is_active: true,
            },
        })
        .unwrap();
    let state = wait_for(&mut state_rx, |s| s.banner.is_some() && !s.pending).await;
    assert_eq!(
        state.banner.as_ref().unwrap().text,
        "Stage created successfully!"
    );
    assert_eq!(state.stages.len(), 1);
    assert_eq!(state.stages[0].theme_name, "Space");
    assert!(state.last_op_ok);

    // 删除不存在的关卡：错误横幅，本地列表不变
    cmd_tx.send(Command::DeleteStage("nope".to_string())).unwrap();
    let state = wait_for(&mut state_rx, |s| {
        s.banner.as_ref().is_some_and(|b| b.is_error)
    })
    .await;
    assert!(state.banner.as_ref().unwrap().text.contains("stage not found"));
    assert_eq!(state.stages.len(), 1);
    assert!(!state.last_op_ok);
}

#[tokio::test]
async fn test_phrase_create_roundtrip_with_filter() {
    let api = Arc::new(MockAdminApi::new("pw"));
    api.seed_theme("t1", "Space");
    api.seed_stage("s1", "Orbit", "t1", Difficulty::Easy, true);
    let (_tokens, cmd_tx, mut state_rx) = console_with(&api);
    login(&cmd_tx, &mut state_rx, "pw").await;

    cmd_tx.send(Command::SwitchTab(Tab::Phrases)).unwrap();
    cmd_tx
        .send(Command::SetPhraseFilter(Some("s1".to_string())))
        .unwrap();
    cmd_tx
        .send(Command::SavePhrase {
            target: None,
            draft: PhraseDraft {
                stage_id: "s1".to_string(),
                text: "hello".to_string(),
                sequence_number: 1,
                base_multiplier: 1.5,
            },
        })
        .unwrap();

    let state = wait_for(&mut state_rx, |s| !s.phrases.is_empty() && !s.pending).await;
    let row = state
        .phrases
        .iter()
        .find(|r| r.phrase.text == "hello")
        .expect("created phrase listed");
    assert_eq!(row.phrase.sequence_number, 1);
    assert_eq!(row.phrase.multiplier, 1.5);
    assert_eq!(row.stage_name, "Orbit");
}

#[tokio::test]
async fn test_phrases_tab_fans_out_across_stages() {
    let api = Arc::new(MockAdminApi::new("pw"));
    api.seed_theme("t1", "Space");
    api.seed_stage("s1", "Orbit", "t1", Difficulty::Easy, true);
    api.seed_stage("s2", "Nebula", "t1", Difficulty::Hard, true);
    api.seed_phrase("p1", "s1", "type fast", 1, 1.0);
    api.seed_phrase("p2", "s2", "warp speed", 1, 2.0);
    let (_tokens, cmd_tx, mut state_rx) = console_with(&api);
    login(&cmd_tx, &mut state_rx, "pw").await;

    cmd_tx.send(Command::SwitchTab(Tab::Phrases)).unwrap();
    let state = wait_for(&mut state_rx, |s| {
        s.tab == Tab::Phrases && s.phrases.len() == 2 && !s.pending
    })
    .await;
    assert_eq!(state.phrases[0].stage_name, "Orbit");
    assert_eq!(state.phrases[1].stage_name, "Nebula");
}

#[tokio::test]
async fn test_logout_returns_to_login_and_clears_token() {
    let api = Arc::new(MockAdminApi::new("pw"));
    api.seed_theme("t1", "Space");
    let (tokens, cmd_tx, mut state_rx) = console_with(&api);
    login(&cmd_tx, &mut state_rx, "pw").await;

    cmd_tx.send(Command::Logout).unwrap();
    let state = wait_for(&mut state_rx, |s| s.screen == Screen::Login).await;
    assert!(tokens.load().await.is_none());
    assert!(state.stages.is_empty());
    assert!(state.login_error.is_none());
}

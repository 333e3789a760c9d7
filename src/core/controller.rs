//! 控制循环：消费 UI 命令，驱动 AdminStore 并发布状态快照
//!
//! 所有会话与集合变更都经由这里的单一后台任务顺序处理（mpsc 入队、逐条执行），
//! 因此重载响应一定按命令顺序生效，不存在乱序覆盖；每条命令处理完毕后
//! 将 store 缓存投影为 UiState 并通过 watch 通道发布。

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};

use crate::api::{HttpAdminApi, PhraseDraft, StageDraft};
use crate::config::{load_config, AppConfig};
use crate::core::{AdminError, Banner, Screen, Tab, UiState};
use crate::session::FileTokenStore;
use crate::store::AdminStore;

/// 从 UI 发往控制循环的用户命令
#[derive(Debug, Clone)]
pub enum Command {
    /// 提交登录表单（成功后进入主界面并加载关卡列表）
    Login { username: String, password: String },
    /// 退出登录：清除令牌与缓存，回到登录页
    Logout,
    /// 切换标签页并加载对应数据
    SwitchTab(Tab),
    /// 重新加载当前标签页的数据
    Reload,
    /// 设置短语列表的关卡过滤并重载（None 表示全部关卡）
    SetPhraseFilter(Option<String>),
    /// 创建（target 为 None）或更新关卡，成功后整体重载列表
    SaveStage {
        target: Option<String>,
        draft: StageDraft,
    },
    /// 删除关卡（UI 已完成交互确认）
    DeleteStage(String),
    /// 创建（target 为 None）或更新短语，成功后整体重载列表
    SavePhrase {
        target: Option<String>,
        draft: PhraseDraft,
    },
    /// 删除短语（UI 已完成交互确认）
    DeletePhrase(String),
    /// UI 侧产生的错误（如数字解析失败），以错误横幅显示
    ShowError(String),
    /// 手动关闭横幅
    DismissBanner,
    /// 退出应用
    Quit,
}

/// 创建控制台运行时：加载配置，组装 HTTP 客户端与文件令牌存储，启动控制循环
pub async fn create_console(
    config_path: Option<PathBuf>,
) -> anyhow::Result<(mpsc::UnboundedSender<Command>, watch::Receiver<UiState>)> {
    let cfg = load_config(config_path).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        AppConfig::default()
    });

    let api = Arc::new(HttpAdminApi::new(
        &cfg.api.base_url,
        cfg.api.request_timeout_secs,
    ));
    let tokens = Arc::new(FileTokenStore::new(cfg.auth.token_file.clone()));
    let store = AdminStore::new(api, tokens);

    Ok(spawn_console(
        store,
        Duration::from_secs(cfg.ui.banner_ttl_secs),
    ))
}

/// 以现成的 AdminStore 启动控制循环（测试注入 Mock 后端时直接调用）
pub fn spawn_console(
    mut store: AdminStore,
    banner_ttl: Duration,
) -> (mpsc::UnboundedSender<Command>, watch::Receiver<UiState>) {
    let (cmd_tx, mut cmd_rx) = mpsc::unbounded_channel::<Command>();
    let (state_tx, state_rx) = watch::channel(UiState::default());

    tokio::spawn(async move {
        let mut ui = UiState {
            banner_ttl,
            ..UiState::default()
        };

        // 启动时静默校验持久化令牌；失效或非管理员则停留在登录页，不提示错误
        if store.restore_session().await {
            ui.screen = Screen::Main;
            if let Err(e) = store.load_stages().await {
                apply_error(&mut ui, &mut store, e, "Error loading stages: ").await;
            }
        }
        sync_caches(&mut ui, &store);
        let _ = state_tx.send(ui.clone());

        while let Some(cmd) = cmd_rx.recv().await {
            match cmd {
                Command::Quit => break,

                Command::Login { username, password } => {
                    ui.pending = true;
                    ui.login_error = None;
                    let _ = state_tx.send(ui.clone());

                    match store.login(&username, &password).await {
                        Ok(()) => {
                            tracing::info!(user = %username, "admin login ok");
                            ui.screen = Screen::Main;
                            ui.tab = Tab::Stages;
                            ui.login_error = None;
                            ui.last_op_ok = true;
                            if let Err(e) = store.load_stages().await {
                                apply_error(&mut ui, &mut store, e, "Error loading stages: ")
                                    .await;
                            }
                        }
                        Err(e) => {
                            tracing::warn!(user = %username, "login rejected: {}", e);
                            ui.login_error = Some(e.to_string());
                            ui.last_op_ok = false;
                        }
                    }
                }

                Command::Logout => {
                    store.logout().await;
                    ui = UiState {
                        banner_ttl: ui.banner_ttl,
                        ..UiState::default()
                    };
                }

                Command::SwitchTab(tab) => {
                    ui.tab = tab;
                    ui.pending = true;
                    let _ = state_tx.send(ui.clone());
                    let ok = load_tab(&mut ui, &mut store, tab).await;
                    ui.last_op_ok = ok;
                }

                Command::Reload => {
                    ui.pending = true;
                    let _ = state_tx.send(ui.clone());
                    let tab = ui.tab;
                    let ok = load_tab(&mut ui, &mut store, tab).await;
                    ui.last_op_ok = ok;
                }

                Command::SetPhraseFilter(filter) => {
                    store.set_phrase_filter(filter);
                    ui.pending = true;
                    let _ = state_tx.send(ui.clone());
                    match store.load_phrases().await {
                        Ok(()) => ui.last_op_ok = true,
                        Err(e) => {
                            apply_error(&mut ui, &mut store, e, "Error loading phrases: ").await;
                            ui.last_op_ok = false;
                        }
                    }
                }

                Command::SaveStage { target, draft } => {
                    ui.pending = true;
                    let _ = state_tx.send(ui.clone());
                    let (result, done) = match target {
                        Some(ref id) => (
                            store.update_stage(id, &draft).await,
                            "Stage updated successfully!",
                        ),
                        None => (
                            store.create_stage(&draft).await,
                            "Stage created successfully!",
                        ),
                    };
                    match result {
                        Ok(()) => {
                            ui.banner = Some(Banner::success(done));
                            ui.last_op_ok = true;
                        }
                        Err(e) => {
                            apply_error(&mut ui, &mut store, e, "Error saving stage: ").await;
                            ui.last_op_ok = false;
                        }
                    }
                }

                Command::DeleteStage(id) => {
                    ui.pending = true;
                    let _ = state_tx.send(ui.clone());
                    match store.delete_stage(&id).await {
                        Ok(()) => {
                            ui.banner = Some(Banner::success("Stage deleted successfully!"));
                            ui.last_op_ok = true;
                        }
                        Err(e) => {
                            apply_error(&mut ui, &mut store, e, "Error deleting stage: ").await;
                            ui.last_op_ok = false;
                        }
                    }
                }

                Command::SavePhrase { target, draft } => {
                    ui.pending = true;
                    let _ = state_tx.send(ui.clone());
                    let (result, done) = match target {
                        Some(ref id) => (
                            store.update_phrase(id, &draft).await,
                            "Phrase updated successfully!",
                        ),
                        None => (
                            store.create_phrase(&draft).await,
                            "Phrase created successfully!",
                        ),
                    };
                    match result {
                        Ok(()) => {
                            ui.banner = Some(Banner::success(done));
                            ui.last_op_ok = true;
                        }
                        Err(e) => {
                            apply_error(&mut ui, &mut store, e, "Error saving phrase: ").await;
                            ui.last_op_ok = false;
                        }
                    }
                }

                Command::DeletePhrase(id) => {
                    ui.pending = true;
                    let _ = state_tx.send(ui.clone());
                    match store.delete_phrase(&id).await {
                        Ok(()) => {
                            ui.banner = Some(Banner::success("Phrase deleted successfully!"));
                            ui.last_op_ok = true;
                        }
                        Err(e) => {
                            apply_error(&mut ui, &mut store, e, "Error deleting phrase: ").await;
                            ui.last_op_ok = false;
                        }
                    }
                }

                Command::ShowError(msg) => {
                    ui.banner = Some(Banner::error(msg));
                }

                Command::DismissBanner => {
                    ui.banner = None;
                }
            }

            ui.pending = false;
            ui.op_seq += 1;
            sync_caches(&mut ui, &store);
            let _ = state_tx.send(ui.clone());
        }
    });

    (cmd_tx, state_rx)
}

/// 加载标签页数据：关卡页只载关卡（含主题连接）；短语页先刷新关卡下拉来源，再载短语
async fn load_tab(ui: &mut UiState, store: &mut AdminStore, tab: Tab) -> bool {
    match tab {
        Tab::Stages => {
            if let Err(e) = store.load_stages().await {
                apply_error(ui, store, e, "Error loading stages: ").await;
                return false;
            }
        }
        Tab::Phrases => {
            if let Err(e) = store.load_stages().await {
                apply_error(ui, store, e, "Error loading stages: ").await;
                return false;
            }
            if let Err(e) = store.load_phrases().await {
                apply_error(ui, store, e, "Error loading phrases: ").await;
                return false;
            }
        }
    }
    true
}

/// 错误投影：401 强制登出并回登录页（每个响应恰好一次），其余以错误横幅显示
async fn apply_error(ui: &mut UiState, store: &mut AdminStore, err: AdminError, prefix: &str) {
    if matches!(err, AdminError::SessionExpired) {
        tracing::info!("session expired, forcing logout");
        store.logout().await;
        ui.screen = Screen::Login;
        ui.login_error = Some(err.to_string());
        ui.banner = None;
    } else {
        ui.banner = Some(Banner::error(format!("{}{}", prefix, err)));
    }
}

/// 将 store 缓存投影到 UiState（每条命令处理完后调用）
fn sync_caches(ui: &mut UiState, store: &AdminStore) {
    ui.themes = store.themes().to_vec();
    ui.stages = store.stages().to_vec();
    ui.phrases = store.phrases().to_vec();
    ui.phrase_filter = store.phrase_filter().cloned();
}

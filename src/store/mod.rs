//! 判定結果ストア
//!
//! 画像ID → 検証者 → 判定 のマップを保持し、以下の手順で永続化する。
//!
//! - 起動時: 結果ファイルがなければ空で作成。ハートビートファイルが残っていれば
//!   前回は異常終了とみなし、結果ファイルではなくハートビートから復元する
//! - 実行中: バックグラウンドタスクが一定間隔で差分を確認し、変化があれば
//!   ハートビートファイルを上書き
//! - 終了時: 結果ファイルへ書き出し、ハートビートファイルを削除

mod file;
mod heartbeat;

pub(crate) use file::to_json_bytes;

use crate::error::{Result, ValidatorError};
use label_validator_common::{Judgment, JudgmentMap, Verdict};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

pub const PRIMARY_FILE_NAME: &str = "validate_results.json";
pub const HEARTBEAT_FILE_NAME: &str = ".heartbeat.json";

/// 結果ファイルとハートビートファイルのパス
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorePaths {
    pub primary: PathBuf,
    pub heartbeat: PathBuf,
}

impl StorePaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            primary: dir.join(PRIMARY_FILE_NAME),
            heartbeat: dir.join(HEARTBEAT_FILE_NAME),
        }
    }

    /// ハートビートが残っている = 前回は正常終了していない
    pub fn has_unclean_shutdown(&self) -> bool {
        self.heartbeat.exists()
    }
}

/// ストアのライフサイクル
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    /// ハートビートなしで起動
    Clean,
    /// ハートビートから復元して起動
    Recovered,
    /// ハートビートタスク稼働中
    Running,
    ShuttingDown,
    Closed,
}

/// フォアグラウンドとハートビートタスクで共有する部分
pub(crate) struct Shared {
    paths: StorePaths,
    judgments: Mutex<JudgmentMap>,
    /// 最後にハートビートへ書いた内容。ハートビート書き込み中はこのロックを保持する
    last_heartbeat: Mutex<JudgmentMap>,
    state: Mutex<StoreState>,
    heartbeat_task: Mutex<Option<JoinHandle<()>>>,
    closed: AtomicBool,
    heartbeat_failures: AtomicU64,
}

/// マップは1回の挿入で常に完全な状態に保たれるため、poisonは無視してよい
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Shared {
    fn snapshot(&self) -> JudgmentMap {
        lock(&self.judgments).clone()
    }

    fn set_state(&self, state: StoreState) {
        *lock(&self.state) = state;
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// 結果ファイルへ書き出してハートビートを削除する
    ///
    /// 成功するまで `closed` は立てないので、失敗後の再呼び出しや `Drop` で再度保存を試みる。
    /// 結果ファイルに書けなかった場合はハートビートへ退避し、次回起動時に復元できるようにする。
    fn shutdown(&self) -> Result<()> {
        // ハートビート書き込みと終了処理はこのロックで直列化する
        let _heartbeat_guard = lock(&self.last_heartbeat);
        if self.is_closed() {
            return Ok(());
        }
        self.set_state(StoreState::ShuttingDown);

        if let Some(task) = lock(&self.heartbeat_task).take() {
            task.abort();
        }

        let snapshot = self.snapshot();
        if let Err(e) = file::write_map(&self.paths.primary, &snapshot) {
            error!(error = %e, "結果ファイルの保存に失敗しました。ハートビートへ退避します");
            if let Err(fallback) = file::write_map(&self.paths.heartbeat, &snapshot) {
                error!(error = %fallback, "ハートビートへの退避にも失敗しました");
            }
            return Err(e);
        }

        if self.paths.heartbeat.exists() {
            std::fs::remove_file(&self.paths.heartbeat).map_err(|source| {
                ValidatorError::Persist {
                    path: self.paths.heartbeat.display().to_string(),
                    source,
                }
            })?;
        }

        self.closed.store(true, Ordering::SeqCst);
        self.set_state(StoreState::Closed);
        info!(
            images = snapshot.len(),
            path = %self.paths.primary.display(),
            "判定結果を保存しました"
        );
        Ok(())
    }
}

pub struct ResultStore {
    shared: Arc<Shared>,
}

impl ResultStore {
    /// ストアを開く
    pub fn open(paths: StorePaths) -> Result<Self> {
        if !paths.primary.exists() {
            info!(path = %paths.primary.display(), "結果ファイルを新規作成");
            file::write_map(&paths.primary, &JudgmentMap::new())?;
        }

        let (judgments, state) = if paths.has_unclean_shutdown() {
            warn!(
                path = %paths.heartbeat.display(),
                "前回は正常終了していません。ハートビートから復元します"
            );
            (file::read_map(&paths.heartbeat)?, StoreState::Recovered)
        } else {
            (file::read_map(&paths.primary)?, StoreState::Clean)
        };

        info!(images = judgments.len(), state = ?state, "判定結果を読み込みました");

        Ok(Self {
            shared: Arc::new(Shared {
                paths,
                last_heartbeat: Mutex::new(judgments.clone()),
                judgments: Mutex::new(judgments),
                state: Mutex::new(state),
                heartbeat_task: Mutex::new(None),
                closed: AtomicBool::new(false),
                heartbeat_failures: AtomicU64::new(0),
            }),
        })
    }

    /// ファイルを変更せずに現在の判定を読む（ハートビート優先、どちらもなければ空）
    ///
    /// 別の端末でレビュー中でも安全に呼べる。
    pub fn read_snapshot(paths: &StorePaths) -> Result<JudgmentMap> {
        if paths.has_unclean_shutdown() {
            file::read_map(&paths.heartbeat)
        } else if paths.primary.exists() {
            file::read_map(&paths.primary)
        } else {
            Ok(JudgmentMap::new())
        }
    }

    pub fn paths(&self) -> &StorePaths {
        &self.shared.paths
    }

    pub fn state(&self) -> StoreState {
        *lock(&self.shared.state)
    }

    /// 判定を記録（同じ画像×検証者は上書き）
    pub fn record(
        &self,
        image_id: &str,
        validator_name: &str,
        verdict: Verdict,
        remark: Option<&str>,
    ) {
        if self.shared.is_closed() {
            warn!(image_id, validator_name, "ストアは閉じています。判定は保存されません");
        }
        let judgment = Judgment::new(image_id, validator_name, verdict, remark);
        lock(&self.shared.judgments)
            .entry(image_id.to_string())
            .or_default()
            .insert(validator_name.to_string(), judgment);
    }

    pub fn is_judged_by(&self, image_id: &str, validator_name: &str) -> bool {
        lock(&self.shared.judgments)
            .get(image_id)
            .is_some_and(|by_validator| by_validator.contains_key(validator_name))
    }

    pub fn judgment(&self, image_id: &str, validator_name: &str) -> Option<Judgment> {
        lock(&self.shared.judgments)
            .get(image_id)
            .and_then(|by_validator| by_validator.get(validator_name))
            .cloned()
    }

    /// 指定検証者の判定済み枚数
    pub fn judged_count(&self, validator_name: &str) -> usize {
        lock(&self.shared.judgments)
            .values()
            .filter(|by_validator| by_validator.contains_key(validator_name))
            .count()
    }

    /// 判定のある画像数
    pub fn len(&self) -> usize {
        lock(&self.shared.judgments).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn snapshot(&self) -> JudgmentMap {
        self.shared.snapshot()
    }

    /// ハートビートタスクを開始（tokioランタイム内で呼ぶこと）
    pub fn start_heartbeat(&self, period: Duration) -> Result<()> {
        if self.shared.is_closed() {
            return Err(ValidatorError::Heartbeat("ストアは既に閉じています".into()));
        }

        let mut task = lock(&self.shared.heartbeat_task);
        if task.is_some() {
            warn!("ハートビートは既に稼働中です");
            return Ok(());
        }

        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| ValidatorError::Heartbeat(e.to_string()))?;

        info!(interval_secs = period.as_secs_f64(), "ハートビートを開始");
        *task = Some(heartbeat::spawn(&runtime, self.shared.clone(), period));
        self.shared.set_state(StoreState::Running);
        Ok(())
    }

    /// 差分があればハートビートを書き込む（書き込んだら `true`）
    pub fn heartbeat_now(&self) -> Result<bool> {
        self.shared.write_heartbeat()
    }

    /// ハートビート書き込みの失敗回数
    pub fn heartbeat_failures(&self) -> u64 {
        self.shared.heartbeat_failures.load(Ordering::Relaxed)
    }

    /// シグナルハンドラなど別の経路から終了処理を呼ぶためのハンドル
    pub fn closer(&self) -> StoreCloser {
        StoreCloser {
            shared: self.shared.clone(),
        }
    }

    /// 正常終了: 結果ファイルへ書き出し、ハートビートを削除する
    pub fn close(self) -> Result<()> {
        self.shared.shutdown()
    }
}

impl Drop for ResultStore {
    fn drop(&mut self) {
        if self.shared.is_closed() {
            return;
        }
        warn!("close() を経由せずに破棄されました。結果を保存します");
        if let Err(e) = self.shared.shutdown() {
            error!(error = %e, "終了時の保存に失敗しました");
        }
    }
}

/// 終了処理だけを行えるハンドル。`ResultStore::close` と合わせて、成功するのは1回だけ
#[derive(Clone)]
pub struct StoreCloser {
    shared: Arc<Shared>,
}

impl StoreCloser {
    pub fn close(&self) -> Result<()> {
        self.shared.shutdown()
    }

    pub fn is_closed(&self) -> bool {
        self.shared.is_closed()
    }
}

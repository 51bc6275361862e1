//! ハートビート（異常終了に備えた定期スナップショット）

use super::{file, lock, Shared};
use crate::error::Result;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error};

impl Shared {
    /// 前回書き込み時から変化があればハートビートファイルを上書きする
    ///
    /// 失敗時は前回の内容を更新しないので、次の周期で再試行される。
    pub(super) fn write_heartbeat(&self) -> Result<bool> {
        let mut last = lock(&self.last_heartbeat);
        if self.is_closed() {
            return Ok(false);
        }

        // 判定マップのロックはコピーの間だけ保持する
        let current = self.snapshot();
        if *last == current {
            return Ok(false);
        }

        if let Err(e) = file::write_map(&self.paths.heartbeat, &current) {
            self.heartbeat_failures.fetch_add(1, Ordering::Relaxed);
            return Err(e);
        }

        *last = current;
        Ok(true)
    }
}

pub(super) fn spawn(runtime: &Handle, shared: Arc<Shared>, period: Duration) -> JoinHandle<()> {
    runtime.spawn(async move {
        let mut timer = interval(period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // 初回tickは即時に返るので読み捨てる
        timer.tick().await;

        loop {
            timer.tick().await;

            if shared.is_closed() {
                break;
            }

            let task_shared = shared.clone();
            match tokio::task::spawn_blocking(move || task_shared.write_heartbeat()).await {
                Ok(Ok(true)) => debug!(path = %shared.paths.heartbeat.display(), "ハートビートを書き込みました"),
                Ok(Ok(false)) => debug!("変更なし、ハートビートをスキップ"),
                Ok(Err(e)) => error!(
                    error = %e,
                    failures = shared.heartbeat_failures.load(Ordering::Relaxed),
                    "ハートビートの書き込みに失敗しました。次の周期で再試行します"
                ),
                Err(e) => error!(error = %e, "ハートビートタスクが異常終了しました"),
            }
        }
    })
}

//! 线程化驱动（对外 API）
//!
//! 在专用线程上运行 [`ControlLoop`]，其他线程通过共享上下文读取遥测快照和指标。

use crate::controller::ControllerUpdate;
use crate::error::DriverError;
use crate::metrics::MetricsSnapshot;
use crate::pipeline::ControlLoop;
use crate::state::{DriverContext, TelemetrySnapshot};
use crossbeam_channel::{RecvTimeoutError, bounded};
use fri_protocol::Codec;
use fri_transport::Transport;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{error, info};

/// 等待控制线程退出的超时
const JOIN_TIMEOUT: Duration = Duration::from_secs(2);

/// 在辅助线程上 join 控制线程，调用方最多等待 `timeout`
///
/// 超时后辅助线程继续等待，控制线程退出时自行结束。
fn join_with_timeout(handle: JoinHandle<()>, timeout: Duration) -> Result<(), DriverError> {
    let (done_tx, done_rx) = bounded(1);
    std::thread::Builder::new()
        .name("fri_join".to_string())
        .spawn(move || {
            let _ = done_tx.send(handle.join().is_ok());
        })
        .map_err(|e| DriverError::Thread(format!("failed to spawn join watcher: {}", e)))?;

    match done_rx.recv_timeout(timeout) {
        Ok(true) => Ok(()),
        Ok(false) => Err(DriverError::Thread("control thread panicked".to_string())),
        Err(RecvTimeoutError::Timeout) => Err(DriverError::Thread(format!(
            "control thread did not exit within {:?}",
            timeout
        ))),
        Err(RecvTimeoutError::Disconnected) => Err(DriverError::Thread(
            "join watcher exited without reporting".to_string(),
        )),
    }
}

/// FRI 驱动
///
/// 持有控制线程。`stop()` 或 `Drop` 时设置停止标志并等待线程退出（带超时），
/// 控制线程在退出前关闭通道。
pub struct FriDriver {
    ctx: Arc<DriverContext>,
    is_running: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl FriDriver {
    /// 在新线程上运行已连接的控制循环
    ///
    /// # Errors
    /// - `DriverError::Thread`: 线程创建失败
    pub fn spawn<T, C, U>(
        mut control: ControlLoop<T, C, U>,
        thread_name: impl Into<String>,
    ) -> Result<Self, DriverError>
    where
        T: Transport + Send + 'static,
        C: Codec + Send + 'static,
        U: ControllerUpdate + Send + 'static,
    {
        let ctx = control.context().clone();
        let is_running = Arc::new(AtomicBool::new(true));
        let thread_running = is_running.clone();

        let thread = std::thread::Builder::new()
            .name(thread_name.into())
            .spawn(move || {
                set_realtime_priority();
                control.run(&thread_running);
                thread_running.store(false, Ordering::Release);
            })
            .map_err(|e| DriverError::Thread(format!("failed to spawn control thread: {}", e)))?;

        info!("FRI driver started");
        Ok(Self {
            ctx,
            is_running,
            thread: Some(thread),
        })
    }

    /// 共享上下文
    pub fn context(&self) -> &Arc<DriverContext> {
        &self.ctx
    }

    /// 最新遥测快照
    pub fn snapshot(&self) -> Arc<TelemetrySnapshot> {
        self.ctx.snapshot()
    }

    /// 指标快照
    pub fn metrics(&self) -> MetricsSnapshot {
        self.ctx.metrics.snapshot()
    }

    /// 控制线程是否仍在运行
    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::Acquire)
            && self.thread.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// 停止控制线程并等待其退出
    ///
    /// # Errors
    /// - `DriverError::Thread`: 线程 panic 或未在超时内退出
    pub fn stop(&mut self) -> Result<(), DriverError> {
        self.is_running.store(false, Ordering::Release);
        let Some(handle) = self.thread.take() else {
            return Ok(());
        };
        join_with_timeout(handle, JOIN_TIMEOUT)?;
        info!("FRI driver stopped");
        Ok(())
    }
}

impl Drop for FriDriver {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            error!("{}", e);
        }
    }
}

#[cfg(feature = "realtime")]
fn set_realtime_priority() {
    use thread_priority::*;
    use tracing::warn;

    match set_current_thread_priority(ThreadPriority::Max) {
        Ok(_) => info!("FRI control thread priority set to MAX (realtime)"),
        Err(e) => warn!(
            "Failed to set control thread priority: {:?}. \
             On Linux, you may need to run with CAP_SYS_NICE or use rtkit.",
            e
        ),
    }
}

#[cfg(not(feature = "realtime"))]
fn set_realtime_priority() {}

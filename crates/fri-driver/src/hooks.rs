//! 钩子系统（Hook System）
//!
//! 在控制线程上触发的会话事件回调：会话状态跳变、命令发送成功。
//!
//! 回调与控制循环同步执行，实现必须是非阻塞的。推荐像
//! [`ChannelTransitionHook`] 一样只做 `try_send`，在其他线程消费事件。
//!
//! # 使用示例
//!
//! ```rust
//! use fri_driver::hooks::{ChannelTransitionHook, HookManager, SessionCallback};
//! use fri_driver::SessionTransition;
//! use fri_protocol::SessionState;
//! use std::sync::Arc;
//!
//! let mut hooks = HookManager::new();
//! let (hook, rx) = ChannelTransitionHook::new(16);
//! hooks.add_callback(Arc::new(hook) as Arc<dyn SessionCallback>);
//!
//! hooks.trigger_transition(&SessionTransition {
//!     from: SessionState::Idle,
//!     to: SessionState::MonitoringWait,
//! });
//! assert_eq!(rx.try_recv().unwrap().to, SessionState::MonitoringWait);
//! ```

use crate::session::SessionTransition;
use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use fri_protocol::CommandHeader;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// 会话事件回调
///
/// # 性能要求
///
/// - 禁止阻塞操作（Mutex、I/O）
/// - 推荐使用 `try_send` 而非 `send`
pub trait SessionCallback: Send + Sync {
    /// 会话状态跳变时调用
    fn on_transition(&self, transition: &SessionTransition);

    /// 命令发送成功后调用（可选）
    ///
    /// 仅在 `Transport::send` 成功后触发，编码或发送失败的命令不会出现在这里。
    fn on_command_sent(&self, header: &CommandHeader) {
        let _ = header;
    }
}

/// 钩子管理器
///
/// 回调列表在控制循环启动前注册，运行期间只读。
#[derive(Default)]
pub struct HookManager {
    callbacks: Vec<Arc<dyn SessionCallback>>,
}

impl HookManager {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            callbacks: Vec::new(),
        }
    }

    pub fn add_callback(&mut self, callback: Arc<dyn SessionCallback>) {
        self.callbacks.push(callback);
    }

    /// 移除所有回调
    pub fn clear(&mut self) {
        self.callbacks.clear();
    }

    /// 触发所有跳变回调
    pub fn trigger_transition(&self, transition: &SessionTransition) {
        for callback in self.callbacks.iter() {
            callback.on_transition(transition);
        }
    }

    /// 触发所有发送回调
    pub fn trigger_command_sent(&self, header: &CommandHeader) {
        for callback in self.callbacks.iter() {
            callback.on_command_sent(header);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

impl std::fmt::Debug for HookManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookManager")
            .field("callbacks", &self.callbacks.len())
            .finish()
    }
}

/// 把会话跳变转发到有界 Channel 的钩子
///
/// 队列满时丢弃事件并计数，不会阻塞控制线程。
pub struct ChannelTransitionHook {
    tx: Sender<SessionTransition>,
    dropped: Arc<AtomicU64>,
}

impl ChannelTransitionHook {
    /// 创建钩子，返回钩子和接收端
    pub fn new(capacity: usize) -> (Self, Receiver<SessionTransition>) {
        let (tx, rx) = bounded(capacity);
        let hook = Self {
            tx,
            dropped: Arc::new(AtomicU64::new(0)),
        };
        (hook, rx)
    }

    /// 丢弃事件计数器
    pub fn dropped(&self) -> &Arc<AtomicU64> {
        &self.dropped
    }
}

impl SessionCallback for ChannelTransitionHook {
    fn on_transition(&self, transition: &SessionTransition) {
        match self.tx.try_send(*transition) {
            Ok(()) => {},
            Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
            },
        }
    }
}

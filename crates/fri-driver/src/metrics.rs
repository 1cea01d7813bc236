//! FRI 驱动运行指标
//!
//! 零开销的原子计数器，用于监控控制循环的健康状态。
//! 控制线程写入，任意线程都可以读取快照，不会引入锁竞争。

use std::sync::atomic::{AtomicU64, Ordering};

/// 驱动实时指标
///
/// # 使用示例
///
/// ```rust
/// use fri_driver::DriverMetrics;
/// use std::sync::atomic::Ordering;
///
/// let metrics = DriverMetrics::new();
/// metrics.ticks.fetch_add(1, Ordering::Relaxed);
///
/// let snapshot = metrics.snapshot();
/// assert_eq!(snapshot.ticks, 1);
/// ```
#[derive(Debug, Default)]
pub struct DriverMetrics {
    /// 执行过的周期数
    pub ticks: AtomicU64,
    /// 收到的数据报数
    pub rx_datagrams: AtomicU64,
    /// 接收缺失次数（超时 / 0 字节 / 接收错误）
    pub rx_misses: AtomicU64,
    /// 解码失败次数
    pub decode_errors: AtomicU64,
    /// 消息 ID 不匹配次数
    pub identifier_mismatches: AtomicU64,
    /// 当前连续 ID 不匹配周期数（健康信号）
    pub identifier_mismatch_streak: AtomicU64,
    /// 命令模式错误次数
    pub mode_errors: AtomicU64,
    /// 会话状态跳变次数
    pub transitions: AtomicU64,
    /// 空闲周期数
    pub idle_ticks: AtomicU64,
    /// 实际发送的命令数
    pub tx_sent: AtomicU64,
    /// 被节拍控制器抑制的命令数
    pub tx_suppressed: AtomicU64,
    /// 编码或发送失败次数
    pub tx_errors: AtomicU64,
    /// 周期超时（未能按时进入下一个周期）次数
    pub overruns: AtomicU64,
}

impl DriverMetrics {
    /// 创建新的指标实例（所有计数器初始化为 0）
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn incr(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// 获取指标快照
    ///
    /// 使用 `Ordering::Relaxed`，不同计数器之间可能有微小的时间差。
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            ticks: self.ticks.load(Ordering::Relaxed),
            rx_datagrams: self.rx_datagrams.load(Ordering::Relaxed),
            rx_misses: self.rx_misses.load(Ordering::Relaxed),
            decode_errors: self.decode_errors.load(Ordering::Relaxed),
            identifier_mismatches: self.identifier_mismatches.load(Ordering::Relaxed),
            identifier_mismatch_streak: self.identifier_mismatch_streak.load(Ordering::Relaxed),
            mode_errors: self.mode_errors.load(Ordering::Relaxed),
            transitions: self.transitions.load(Ordering::Relaxed),
            idle_ticks: self.idle_ticks.load(Ordering::Relaxed),
            tx_sent: self.tx_sent.load(Ordering::Relaxed),
            tx_suppressed: self.tx_suppressed.load(Ordering::Relaxed),
            tx_errors: self.tx_errors.load(Ordering::Relaxed),
            overruns: self.overruns.load(Ordering::Relaxed),
        }
    }

    /// 重置所有计数器
    pub fn reset(&self) {
        for counter in [
            &self.ticks,
            &self.rx_datagrams,
            &self.rx_misses,
            &self.decode_errors,
            &self.identifier_mismatches,
            &self.identifier_mismatch_streak,
            &self.mode_errors,
            &self.transitions,
            &self.idle_ticks,
            &self.tx_sent,
            &self.tx_suppressed,
            &self.tx_errors,
            &self.overruns,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

/// 指标快照（不可变）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub ticks: u64,
    pub rx_datagrams: u64,
    pub rx_misses: u64,
    pub decode_errors: u64,
    pub identifier_mismatches: u64,
    pub identifier_mismatch_streak: u64,
    pub mode_errors: u64,
    pub transitions: u64,
    pub idle_ticks: u64,
    pub tx_sent: u64,
    pub tx_suppressed: u64,
    pub tx_errors: u64,
    pub overruns: u64,
}

impl MetricsSnapshot {
    /// 接收缺失率（百分比）
    ///
    /// 返回 0.0 到 100.0 之间的值。如果 `ticks` 为 0，返回 0.0。
    pub fn rx_miss_rate(&self) -> f64 {
        if self.ticks == 0 {
            return 0.0;
        }
        (self.rx_misses as f64 / self.ticks as f64) * 100.0
    }

    /// 所有周期内失败次数合计
    pub fn total_tick_failures(&self) -> u64 {
        self.rx_misses
            + self.decode_errors
            + self.identifier_mismatches
            + self.mode_errors
            + self.tx_errors
    }
}

//! 状态结构定义
//!
//! - `JointState` / `JointCommand`: 控制线程独占的关节缓冲区
//! - `TelemetrySnapshot`: 每个周期发布一次的只读快照（ArcSwap，供其他线程无锁读取）
//! - `DriverContext`: 跨线程共享的上下文（快照 + 指标）

use crate::metrics::DriverMetrics;
use crate::session::SessionTransition;
use arc_swap::ArcSwap;
use fri_protocol::{CommandMode, SessionState};
use std::sync::Arc;

/// 关节状态（测量值）
///
/// 三个向量长度相同，等于关节数，在会话生命周期内不变。
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JointState {
    /// 关节位置（弧度）
    pub position: Vec<f64>,
    /// 关节速度估计（弧度/秒）
    pub velocity: Vec<f64>,
    /// 关节力矩（Nm）
    pub effort: Vec<f64>,
}

impl JointState {
    /// 创建全零状态
    pub fn zeros(num_joints: usize) -> Self {
        Self {
            position: vec![0.0; num_joints],
            velocity: vec![0.0; num_joints],
            effort: vec![0.0; num_joints],
        }
    }

    pub fn num_joints(&self) -> usize {
        self.position.len()
    }
}

/// 关节命令（由外部控制器写入）
///
/// 三个向量长度相同，等于关节数。
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JointCommand {
    /// 位置目标（弧度），位置模式使用
    pub position: Vec<f64>,
    /// 速度目标（弧度/秒），FRI 关节模式不下发，仅供控制器记录
    pub velocity: Vec<f64>,
    /// 力矩目标（Nm），力矩模式使用
    pub effort: Vec<f64>,
}

impl JointCommand {
    /// 创建全零命令
    pub fn zeros(num_joints: usize) -> Self {
        Self {
            position: vec![0.0; num_joints],
            velocity: vec![0.0; num_joints],
            effort: vec![0.0; num_joints],
        }
    }

    pub fn num_joints(&self) -> usize {
        self.position.len()
    }
}

/// 链路状态（控制循环视角）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkState {
    /// 通道未打开
    #[default]
    Disconnected,
    /// 通道已打开，会话空闲（不发送命令）
    ConnectedIdle,
    /// 通道已打开，会话非空闲（正在交换遥测与命令）
    ConnectedActive,
}

impl LinkState {
    pub fn is_connected(self) -> bool {
        !matches!(self, Self::Disconnected)
    }
}

/// 遥测快照
///
/// 控制线程每个周期复制一份发布，读取方拿到的是不可变副本，永远不会与控制线程共享可变缓冲区。
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TelemetrySnapshot {
    /// 周期计数（从 0 开始）
    pub tick: u64,
    pub link_state: LinkState,
    pub session_state: SessionState,
    pub command_mode: CommandMode,
    pub idle: bool,
    pub joint_state: JointState,
    pub joint_command: JointCommand,
    /// 下一次发送将使用的序列号
    pub next_sequence_counter: u32,
    /// 最近一次回显的机器人端序列号
    pub reflected_sequence_counter: u32,
    /// 最近一次会话状态跳变
    pub last_transition: Option<SessionTransition>,
}

/// 跨线程共享的驱动上下文
#[derive(Debug)]
pub struct DriverContext {
    /// 最新遥测快照
    pub telemetry: ArcSwap<TelemetrySnapshot>,
    /// 运行指标
    pub metrics: DriverMetrics,
}

impl DriverContext {
    /// 创建新的上下文
    ///
    /// 初始快照为空闲、断开状态，关节向量全零。
    pub fn new(num_joints: usize) -> Self {
        let snapshot = TelemetrySnapshot {
            idle: true,
            joint_state: JointState::zeros(num_joints),
            joint_command: JointCommand::zeros(num_joints),
            ..TelemetrySnapshot::default()
        };
        Self {
            telemetry: ArcSwap::from_pointee(snapshot),
            metrics: DriverMetrics::new(),
        }
    }

    /// 读取最新快照（无锁）
    pub fn snapshot(&self) -> Arc<TelemetrySnapshot> {
        self.telemetry.load_full()
    }

    pub(crate) fn publish(&self, snapshot: TelemetrySnapshot) {
        self.telemetry.store(Arc::new(snapshot));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_zero_filled_vectors_have_joint_count_length(n in 1usize..64) {
            let state = JointState::zeros(n);
            let command = JointCommand::zeros(n);
            prop_assert_eq!(state.position.len(), n);
            prop_assert_eq!(state.velocity.len(), n);
            prop_assert_eq!(state.effort.len(), n);
            prop_assert_eq!(command.position.len(), n);
            prop_assert_eq!(command.velocity.len(), n);
            prop_assert_eq!(command.effort.len(), n);
            prop_assert!(state.position.iter().chain(&state.velocity).chain(&state.effort).all(|v| *v == 0.0));
            prop_assert!(command.position.iter().chain(&command.velocity).chain(&command.effort).all(|v| *v == 0.0));
        }
    }

    #[test]
    fn test_link_state() {
        assert_eq!(LinkState::default(), LinkState::Disconnected);
        assert!(!LinkState::Disconnected.is_connected());
        assert!(LinkState::ConnectedIdle.is_connected());
        assert!(LinkState::ConnectedActive.is_connected());
    }

    #[test]
    fn test_context_initial_snapshot() {
        let ctx = DriverContext::new(7);
        let snap = ctx.snapshot();
        assert!(snap.idle);
        assert_eq!(snap.link_state, LinkState::Disconnected);
        assert_eq!(snap.joint_state.num_joints(), 7);
        assert_eq!(snap.joint_command.num_joints(), 7);
    }

    #[test]
    fn test_publish_replaces_snapshot() {
        let ctx = DriverContext::new(2);
        let before = ctx.snapshot();

        let mut next = (*before).clone();
        next.tick = 5;
        next.joint_state.position = vec![1.0, 2.0];
        ctx.publish(next);

        // 旧快照不受影响
        assert_eq!(before.tick, 0);
        assert_eq!(ctx.snapshot().tick, 5);
        assert_eq!(ctx.snapshot().joint_state.position, vec![1.0, 2.0]);
    }
}

//! 外部控制器接口
//!
//! 控制循环在每个非空闲周期调用一次控制器，控制器读取关节状态并写入关节命令。

use crate::session::SessionTransition;
use crate::state::{JointCommand, JointState};
use std::time::{Duration, Instant};

/// 控制器更新接口
///
/// 控制器在控制线程上同步运行，耗时直接计入控制周期。
/// 闭包 `FnMut(Instant, Duration, &JointState, &mut JointCommand)` 自动实现此 trait。
///
/// # 示例
///
/// ```
/// use fri_driver::{ControllerUpdate, JointCommand, JointState};
/// use std::time::{Duration, Instant};
///
/// // 保持当前位置
/// let mut hold = |_now: Instant, _dt: Duration, state: &JointState, cmd: &mut JointCommand| {
///     cmd.position.copy_from_slice(&state.position);
/// };
///
/// let state = JointState::zeros(7);
/// let mut cmd = JointCommand::zeros(7);
/// hold.update(Instant::now(), Duration::from_millis(20), &state, &mut cmd);
/// ```
pub trait ControllerUpdate {
    /// 计算本周期的关节命令
    ///
    /// `elapsed` 为标称控制周期。`command` 的向量长度等于关节数，不应改变。
    fn update(
        &mut self,
        now: Instant,
        elapsed: Duration,
        state: &JointState,
        command: &mut JointCommand,
    );

    /// 会话状态跳变通知（可选）
    fn on_session_transition(&mut self, transition: &SessionTransition) {
        let _ = transition;
    }
}

impl<F> ControllerUpdate for F
where
    F: FnMut(Instant, Duration, &JointState, &mut JointCommand),
{
    fn update(
        &mut self,
        now: Instant,
        elapsed: Duration,
        state: &JointState,
        command: &mut JointCommand,
    ) {
        self(now, elapsed, state, command)
    }
}

/// 保持控制器：位置命令始终等于测量位置，力矩命令为 0
#[derive(Debug, Clone, Copy, Default)]
pub struct HoldPosition;

impl ControllerUpdate for HoldPosition {
    fn update(
        &mut self,
        _now: Instant,
        _elapsed: Duration,
        state: &JointState,
        command: &mut JointCommand,
    ) {
        command.position.copy_from_slice(&state.position);
        command.effort.fill(0.0);
    }
}

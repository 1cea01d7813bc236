//! 命令构建
//!
//! 根据机器人端当前的命令模式，把关节命令缓冲区写入可复用的命令消息。

use crate::error::ModeError;
use fri_protocol::{CommandMessage, CommandMode};

/// 命令构建器
///
/// # 模式规则
///
/// | 模式 | `joint_position` | `joint_torque` |
/// |---|---|---|
/// | `Torque` | 测量位置（协议要求回显） | 力矩命令 |
/// | `Position` | 位置命令 | 不设置 |
/// | 其他 | 返回 `ModeError`，消息保持不变 | |
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandBuilder;

impl CommandBuilder {
    pub fn new() -> Self {
        Self
    }

    /// 构建命令负载
    ///
    /// 成功时先清空上一周期的负载再写入；消息头（ID、序列号）保持不变。
    pub fn build(
        &self,
        mode: CommandMode,
        effort_command: &[f64],
        position_command: &[f64],
        measured_position: &[f64],
        out: &mut CommandMessage,
    ) -> Result<(), ModeError> {
        match mode {
            CommandMode::Torque => {
                out.reset_payload();
                out.set_joint_torque(effort_command);
                out.set_joint_position(measured_position);
                Ok(())
            },
            CommandMode::Position => {
                out.reset_payload();
                out.set_joint_position(position_command);
                Ok(())
            },
            other => Err(ModeError { mode: other }),
        }
    }
}

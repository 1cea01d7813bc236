//! 监控消息（机器人控制器 -> 客户端）
//!
//! 监控消息由外部 `Codec` 解码填充。控制循环持有同一个实例，
//! 每个周期原地覆盖，避免周期内分配。

use crate::state::{CommandMode, SessionState};

/// 解码后的监控消息
///
/// 只包含控制核心需要读取的字段。
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MonitoringMessage {
    /// 消息标识符（用于校验协议版本）
    pub message_identifier: u32,
    /// 机器人端序列号（客户端在命令中回显）
    pub sequence_counter: u32,
    /// 当前会话状态
    pub session_state: SessionState,
    /// 当前客户端命令模式
    pub command_mode: CommandMode,
    /// 接收倍率：机器人端每发送多少条监控消息期望收到一条命令
    pub receive_multiplier: u32,
    /// 测量关节位置（弧度）
    pub measured_joint_position: Vec<f64>,
    /// 测量关节力矩（Nm），机器人端未上报时为 `None`
    pub measured_torque: Option<Vec<f64>>,
}

impl MonitoringMessage {
    /// 创建指定关节数的空消息（位置全部为 0）
    pub fn with_joints(num_joints: usize) -> Self {
        Self {
            measured_joint_position: vec![0.0; num_joints],
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_joints() {
        let msg = MonitoringMessage::with_joints(7);
        assert_eq!(msg.measured_joint_position, vec![0.0; 7]);
        assert_eq!(msg.session_state, SessionState::Idle);
        assert_eq!(msg.command_mode, CommandMode::NoCommandMode);
        assert!(msg.measured_torque.is_none());
        assert_eq!(msg.receive_multiplier, 0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_json_roundtrip() {
        let mut msg = MonitoringMessage::with_joints(2);
        msg.session_state = SessionState::CommandingActive;
        msg.command_mode = CommandMode::Torque;
        msg.measured_torque = Some(vec![0.5, -0.5]);

        let json = serde_json::to_string(&msg).unwrap();
        let parsed: MonitoringMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, msg);
    }
}

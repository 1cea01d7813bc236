//! 命令消息（客户端 -> 机器人控制器）
//!
//! 命令消息是一个可复用缓冲区：控制循环只持有一个实例，
//! 每次发送前由命令构建器原地重写负载，由节拍控制器填写序列号。

/// 命令消息头
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CommandHeader {
    /// 消息标识符
    pub message_identifier: u32,
    /// 客户端序列号（每次实际发送递增 1）
    pub sequence_counter: u32,
    /// 回显的机器人端序列号
    pub reflected_sequence_counter: u32,
}

/// 命令消息
///
/// # 负载规则
///
/// - 位置模式：只携带 `joint_position`
/// - 力矩模式：同时携带 `joint_torque` 与 `joint_position`（协议要求力矩模式也回显位置）
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CommandMessage {
    pub header: CommandHeader,
    /// 关节位置目标（弧度）
    pub joint_position: Option<Vec<f64>>,
    /// 关节力矩目标（Nm）
    pub joint_torque: Option<Vec<f64>>,
}

impl CommandMessage {
    /// 创建带指定消息 ID 的空命令
    pub fn new(message_identifier: u32) -> Self {
        Self {
            header: CommandHeader {
                message_identifier,
                ..CommandHeader::default()
            },
            joint_position: None,
            joint_torque: None,
        }
    }

    /// 清空负载（保留消息头）
    pub fn reset_payload(&mut self) {
        self.joint_position = None;
        self.joint_torque = None;
    }

    /// 设置关节位置目标
    ///
    /// 复用已有分配，避免每个周期重新分配 `Vec`。
    pub fn set_joint_position(&mut self, values: &[f64]) {
        copy_into(&mut self.joint_position, values);
    }

    /// 设置关节力矩目标
    pub fn set_joint_torque(&mut self, values: &[f64]) {
        copy_into(&mut self.joint_torque, values);
    }

    /// 是否携带任何负载
    pub fn has_payload(&self) -> bool {
        self.joint_position.is_some() || self.joint_torque.is_some()
    }
}

fn copy_into(slot: &mut Option<Vec<f64>>, values: &[f64]) {
    match slot {
        Some(buf) => {
            buf.clear();
            buf.extend_from_slice(values);
        },
        None => *slot = Some(values.to_vec()),
    }
}

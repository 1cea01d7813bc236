//! 会话状态与命令模式
//!
//! 两个枚举都直接对应线上的整数值。线上可能出现本实现不认识的值
//! （例如机器人端固件更新），因此都带有 `Unknown(raw)` 兜底分支，
//! 转换是全函数，不会失败。

use num_enum::FromPrimitive;

/// FRI 会话状态（由机器人控制器在每条监控消息中上报）
///
/// # 状态说明
///
/// - `Idle`: 会话未建立，禁止发送命令
/// - `MonitoringWait` / `MonitoringReady`: 监控阶段，机器人期望收到应答
/// - `CommandingWait` / `CommandingActive`: 命令阶段，命令会被执行
/// - `Unknown`: 未定义的线上取值，按 `Idle` 处理
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum SessionState {
    Idle = 0,
    MonitoringWait = 1,
    MonitoringReady = 2,
    CommandingWait = 3,
    CommandingActive = 4,
    #[num_enum(catch_all)]
    Unknown(u8),
}

impl Default for SessionState {
    fn default() -> Self {
        Self::Idle
    }
}

impl SessionState {
    /// 转换为线上取值
    pub fn as_u8(self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::MonitoringWait => 1,
            Self::MonitoringReady => 2,
            Self::CommandingWait => 3,
            Self::CommandingActive => 4,
            Self::Unknown(raw) => raw,
        }
    }

    /// 是否为空闲状态
    ///
    /// `Idle` 和所有未定义取值都视为空闲；其余四个状态为非空闲。
    pub fn is_idle(self) -> bool {
        !matches!(
            self,
            Self::MonitoringWait
                | Self::MonitoringReady
                | Self::CommandingWait
                | Self::CommandingActive
        )
    }

    /// 是否处于命令阶段（命令会被机器人执行）
    pub fn is_commanding(self) -> bool {
        matches!(self, Self::CommandingWait | Self::CommandingActive)
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "IDLE"),
            Self::MonitoringWait => write!(f, "MONITORING_WAIT"),
            Self::MonitoringReady => write!(f, "MONITORING_READY"),
            Self::CommandingWait => write!(f, "COMMANDING_WAIT"),
            Self::CommandingActive => write!(f, "COMMANDING_ACTIVE"),
            Self::Unknown(raw) => write!(f, "UNKNOWN({})", raw),
        }
    }
}

/// 客户端命令模式（机器人端当前期望的控制量）
///
/// 只有 `Position` 和 `Torque` 可以构建命令，其余取值由命令构建器报告为错误。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum CommandMode {
    NoCommandMode = 0,
    Position = 1,
    Wrench = 2,
    Torque = 3,
    #[num_enum(catch_all)]
    Unknown(u8),
}

impl Default for CommandMode {
    fn default() -> Self {
        Self::NoCommandMode
    }
}

impl CommandMode {
    /// 转换为线上取值
    pub fn as_u8(self) -> u8 {
        match self {
            Self::NoCommandMode => 0,
            Self::Position => 1,
            Self::Wrench => 2,
            Self::Torque => 3,
            Self::Unknown(raw) => raw,
        }
    }
}

impl std::fmt::Display for CommandMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoCommandMode => write!(f, "NO_COMMAND_MODE"),
            Self::Position => write!(f, "POSITION"),
            Self::Wrench => write!(f, "WRENCH"),
            Self::Torque => write!(f, "TORQUE"),
            Self::Unknown(raw) => write!(f, "UNKNOWN({})", raw),
        }
    }
}

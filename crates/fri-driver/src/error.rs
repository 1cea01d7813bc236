//! 驱动层错误类型定义

use fri_protocol::{CommandMode, ProtocolError};
use fri_transport::TransportError;
use thiserror::Error;

/// 命令模式错误
///
/// 机器人端上报的命令模式既不是位置模式也不是力矩模式，本周期不构建、不发送命令。
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Unsupported command mode: {mode}")]
pub struct ModeError {
    pub mode: CommandMode,
}

/// 驱动层错误类型
#[derive(Error, Debug)]
pub enum DriverError {
    /// 传输通道错误（周期内收发）
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// 通道打开失败，会话无法开始
    #[error("Failed to open channel: {0}")]
    Open(TransportError),

    /// 编解码错误
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// 监控消息 ID 与期望不符（协议版本不匹配）
    #[error("Incompatible message identifier: expected 0x{expected:X}, got 0x{actual:X}")]
    IdentifierMismatch { expected: u32, actual: u32 },

    /// 命令模式错误
    #[error("{0}")]
    Mode(#[from] ModeError),

    /// 本周期未收到数据报
    #[error("No monitoring datagram received")]
    NoData,

    /// 通道未打开
    #[error("Channel not connected")]
    NotConnected,

    /// 配置错误
    #[error("Configuration error: {0}")]
    Config(String),

    /// 控制线程启动失败
    #[error("Control thread error: {0}")]
    Thread(String),
}

impl DriverError {
    /// 是否为单周期可恢复错误
    ///
    /// 通道打开失败、配置错误和线程启动错误会阻止会话开始，其余错误都只影响产生它的那个周期。
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Open(_) | Self::Config(_) | Self::Thread(_))
    }
}

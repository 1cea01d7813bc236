//! # FRI Protocol
//!
//! FRI（Fast Robot Interface）关节控制协议的消息模型（无硬件依赖）
//!
//! ## 模块
//!
//! - `constants`: 协议常量（消息 ID、缓冲区大小、默认端口）
//! - `state`: 会话状态与命令模式枚举
//! - `monitoring`: 监控消息（机器人 -> 客户端）
//! - `command`: 命令消息（客户端 -> 机器人）
//! - `codec`: 编解码器边界（字节布局由外部实现）
//!
//! ## 数据流
//!
//! ```text
//! UDP datagram ──Codec::decode──▶ MonitoringMessage
//! CommandMessage ──Codec::encode──▶ UDP datagram
//! ```

pub mod codec;
pub mod command;
pub mod constants;
pub mod monitoring;
pub mod state;

pub use codec::Codec;
pub use command::{CommandHeader, CommandMessage};
pub use constants::*;
pub use monitoring::MonitoringMessage;
pub use state::{CommandMode, SessionState};

use thiserror::Error;

/// 协议层错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Encode error: {0}")]
    Encode(String),

    #[error("Invalid length for {field}: expected {expected}, got {actual}")]
    InvalidLength {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Buffer too small: need {needed} bytes, have {available}")]
    BufferTooSmall { needed: usize, available: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_error_display() {
        let err = ProtocolError::InvalidLength {
            field: "measured_joint_position",
            expected: 7,
            actual: 6,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("measured_joint_position"));
        assert!(msg.contains("expected 7, got 6"));

        let err = ProtocolError::BufferTooSmall {
            needed: 64,
            available: 16,
        };
        assert_eq!(
            format!("{}", err),
            "Buffer too small: need 64 bytes, have 16"
        );

        let err = ProtocolError::Decode("truncated".to_string());
        assert_eq!(format!("{}", err), "Decode error: truncated");
    }
}

//! 发送节拍控制
//!
//! 机器人端通过 `receive_multiplier` 告知客户端：每收到 N 个监控消息才需要回复一个命令。
//! 节拍控制器按周期计数，判断本周期是否发送，并维护客户端序列号。

use crate::error::DriverError;
use fri_protocol::{Codec, CommandHeader, CommandMessage, ProtocolError};
use fri_transport::Transport;
use tracing::trace;

/// 单个周期的节拍判定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CadenceDecision {
    /// 本周期发送（消息头已写好）
    Send,
    /// 本周期不发送
    Suppress,
}

/// 单个周期的发送结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CadenceOutcome {
    /// 已发送，附带使用的序列号
    Sent { sequence_counter: u32 },
    /// 被节拍抑制
    Suppressed,
}

/// 节拍控制器
///
/// - `pending_count`: 距上次发送经过的周期数，始终小于生效的倍率
/// - `next_sequence`: 下一次发送使用的序列号，从 0 开始，每次发送加 1（u32 回绕）
///
/// 倍率为 0 时按 1 处理（每个周期都发送）。
#[derive(Debug, Clone, Default)]
pub struct CadenceController {
    pending_count: u32,
    next_sequence: u32,
}

impl CadenceController {
    pub fn new() -> Self {
        Self::default()
    }

    /// 推进一个周期
    ///
    /// 判定为发送时写入消息头的 `sequence_counter` 和 `reflected_sequence_counter`；
    /// 判定为抑制时消息头不变。
    pub fn step(
        &mut self,
        receive_multiplier: u32,
        incoming_sequence: u32,
        header: &mut CommandHeader,
    ) -> CadenceDecision {
        self.pending_count += 1;
        if self.pending_count < receive_multiplier.max(1) {
            return CadenceDecision::Suppress;
        }

        self.pending_count = 0;
        header.sequence_counter = self.next_sequence;
        header.reflected_sequence_counter = incoming_sequence;
        self.next_sequence = self.next_sequence.wrapping_add(1);
        CadenceDecision::Send
    }

    /// 推进一个周期，需要时编码并发送命令
    ///
    /// 序列号在编码之前就已经消耗：编码或发送失败时不会回退，
    /// 下一次发送使用下一个序列号。
    ///
    /// # Errors
    /// - `DriverError::Protocol`: 编码失败，或编码器报告的长度超出发送缓冲区
    /// - `DriverError::Transport`: 发送失败
    pub fn dispatch<C, T>(
        &mut self,
        codec: &mut C,
        transport: &mut T,
        command: &mut CommandMessage,
        send_buf: &mut [u8],
        receive_multiplier: u32,
        incoming_sequence: u32,
    ) -> Result<CadenceOutcome, DriverError>
    where
        C: Codec + ?Sized,
        T: Transport + ?Sized,
    {
        match self.step(receive_multiplier, incoming_sequence, &mut command.header) {
            CadenceDecision::Suppress => {
                trace!(
                    "Command suppressed ({}/{})",
                    self.pending_count,
                    receive_multiplier.max(1)
                );
                Ok(CadenceOutcome::Suppressed)
            },
            CadenceDecision::Send => {
                let len = codec.encode(command, send_buf)?;
                let available = send_buf.len();
                let datagram = send_buf.get(..len).ok_or(ProtocolError::BufferTooSmall {
                    needed: len,
                    available,
                })?;
                transport.send(datagram)?;
                Ok(CadenceOutcome::Sent {
                    sequence_counter: command.header.sequence_counter,
                })
            },
        }
    }

    /// 距上次发送经过的周期数
    pub fn pending_count(&self) -> u32 {
        self.pending_count
    }

    /// 下一次发送使用的序列号
    pub fn next_sequence(&self) -> u32 {
        self.next_sequence
    }

    /// 重置计数与序列号
    pub fn reset(&mut self) {
        self.pending_count = 0;
        self.next_sequence = 0;
    }
}

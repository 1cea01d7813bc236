//! 编解码器边界
//!
//! 线上字节布局不在本仓库内定义；控制核心只依赖下面的 trait。
//! 两个方法都写入调用方持有的缓冲区，实现不得在调用之间保留对缓冲区的引用。

use crate::ProtocolError;
use crate::command::CommandMessage;
use crate::monitoring::MonitoringMessage;

/// FRI 消息编解码器
///
/// # 约定
///
/// - `decode`: 用 `buf` 中的数据报填充 `msg`；失败时 `msg` 内容未定义，调用方会丢弃本周期
/// - `encode`: 将 `msg` 序列化到 `buf`，返回写入的字节数
///
/// # 示例
///
/// ```rust
/// use fri_protocol::{Codec, CommandMessage, MonitoringMessage, ProtocolError};
///
/// struct NullCodec;
///
/// impl Codec for NullCodec {
///     fn decode(&mut self, buf: &[u8], _msg: &mut MonitoringMessage) -> Result<(), ProtocolError> {
///         if buf.is_empty() {
///             return Err(ProtocolError::Decode("empty datagram".into()));
///         }
///         Ok(())
///     }
///
///     fn encode(&mut self, _msg: &CommandMessage, _buf: &mut [u8]) -> Result<usize, ProtocolError> {
///         Ok(0)
///     }
/// }
///
/// let mut codec = NullCodec;
/// let mut msg = MonitoringMessage::with_joints(7);
/// assert!(codec.decode(&[], &mut msg).is_err());
/// ```
pub trait Codec {
    /// 解码监控消息
    fn decode(&mut self, buf: &[u8], msg: &mut MonitoringMessage) -> Result<(), ProtocolError>;

    /// 编码命令消息，返回写入的字节数
    fn encode(&mut self, msg: &CommandMessage, buf: &mut [u8]) -> Result<usize, ProtocolError>;
}

impl<C: Codec + ?Sized> Codec for Box<C> {
    fn decode(&mut self, buf: &[u8], msg: &mut MonitoringMessage) -> Result<(), ProtocolError> {
        (**self).decode(buf, msg)
    }

    fn encode(&mut self, msg: &CommandMessage, buf: &mut [u8]) -> Result<usize, ProtocolError> {
        (**self).encode(msg, buf)
    }
}

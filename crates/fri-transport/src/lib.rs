//! # FRI Transport Layer
//!
//! 点对点数据报通道抽象，提供统一的收发接口。
//!
//! - `udp`: 基于 `std::net::UdpSocket` 的实现（带接收超时，不会无限阻塞）
//! - `mock`: 脚本化的内存通道（feature `mock`，用于测试）

use std::time::Duration;
use thiserror::Error;

pub mod udp;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use udp::UdpTransport;

#[cfg(any(test, feature = "mock"))]
pub use mock::{MockReceive, MockTransport, MockTransportHandle};

/// 传输层统一错误类型
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
    #[error("Read timeout")]
    Timeout,
    #[error("Channel not open")]
    NotOpen,
    #[error("Datagram truncated: sent {sent} of {expected} bytes")]
    Truncated { sent: usize, expected: usize },
}

impl TransportError {
    /// 是否为“无数据”类错误（接收超时）
    ///
    /// 控制循环把这类错误当作一次接收缺失，而不是设备故障。
    pub fn is_no_data(&self) -> bool {
        matches!(self, Self::Timeout)
    }
}

/// 数据报传输通道
///
/// # 约定
///
/// - `receive` 必须是有界的：超过接收超时仍无数据时返回 `Err(Timeout)` 或 `Ok(0)`
/// - `send` 一次发送一个完整数据报
/// - `close` 幂等
pub trait Transport {
    /// 打开通道
    fn open(&mut self, port: u16, host: &str) -> Result<(), TransportError>;

    /// 通道是否已打开
    fn is_open(&self) -> bool;

    /// 接收一个数据报到 `buf`，返回字节数
    fn receive(&mut self, buf: &mut [u8]) -> Result<usize, TransportError>;

    /// 发送一个数据报
    fn send(&mut self, buf: &[u8]) -> Result<(), TransportError>;

    /// 关闭通道
    fn close(&mut self);

    /// 设置接收超时（可选）
    fn set_receive_timeout(&mut self, _timeout: Duration) {}
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn open(&mut self, port: u16, host: &str) -> Result<(), TransportError> {
        (**self).open(port, host)
    }

    fn is_open(&self) -> bool {
        (**self).is_open()
    }

    fn receive(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        (**self).receive(buf)
    }

    fn send(&mut self, buf: &[u8]) -> Result<(), TransportError> {
        (**self).send(buf)
    }

    fn close(&mut self) {
        (**self).close()
    }

    fn set_receive_timeout(&mut self, timeout: Duration) {
        (**self).set_receive_timeout(timeout)
    }
}

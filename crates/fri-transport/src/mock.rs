//! Mock 传输通道
//!
//! 用于测试的脚本化内存通道：预先排队接收结果，记录所有发送的数据报。
//! `MockTransportHandle` 与通道共享内部状态，通道被移入控制循环后仍可检查与注入故障。

use crate::{Transport, TransportError};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

/// 一次脚本化的接收结果
#[derive(Debug, Clone)]
pub enum MockReceive {
    /// 收到一个数据报
    Datagram(Vec<u8>),
    /// 通道报告 0 字节
    Empty,
    /// 接收超时
    Timeout,
}

#[derive(Debug, Default)]
struct MockState {
    rx_queue: VecDeque<MockReceive>,
    sent: Vec<Vec<u8>>,
    open: bool,
    opened_with: Option<(u16, String)>,
    fail_open: bool,
    fail_send: bool,
    open_calls: usize,
    close_calls: usize,
}

/// Mock 传输通道
#[derive(Debug, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

/// 与 `MockTransport` 共享状态的句柄
#[derive(Debug, Clone)]
pub struct MockTransportHandle {
    state: Arc<Mutex<MockState>>,
}

fn lock(state: &Mutex<MockState>) -> MutexGuard<'_, MockState> {
    // 测试中某个线程 panic 不应连带毒化后续断言
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建通道及其共享句柄
    pub fn with_handle() -> (Self, MockTransportHandle) {
        let transport = Self::new();
        let handle = transport.handle();
        (transport, handle)
    }

    pub fn handle(&self) -> MockTransportHandle {
        MockTransportHandle {
            state: Arc::clone(&self.state),
        }
    }
}

impl MockTransportHandle {
    /// 排队一个数据报
    pub fn push_datagram(&self, bytes: impl Into<Vec<u8>>) {
        lock(&self.state)
            .rx_queue
            .push_back(MockReceive::Datagram(bytes.into()));
    }

    /// 排队一个任意接收结果
    pub fn push_receive(&self, result: MockReceive) {
        lock(&self.state).rx_queue.push_back(result);
    }

    /// 已发送的数据报
    pub fn sent(&self) -> Vec<Vec<u8>> {
        lock(&self.state).sent.clone()
    }

    pub fn sent_count(&self) -> usize {
        lock(&self.state).sent.len()
    }

    pub fn is_open(&self) -> bool {
        lock(&self.state).open
    }

    /// 最近一次 `open` 的参数
    pub fn opened_with(&self) -> Option<(u16, String)> {
        lock(&self.state).opened_with.clone()
    }

    pub fn open_calls(&self) -> usize {
        lock(&self.state).open_calls
    }

    pub fn close_calls(&self) -> usize {
        lock(&self.state).close_calls
    }

    /// 让后续 `open` 失败
    pub fn set_fail_open(&self, fail: bool) {
        lock(&self.state).fail_open = fail;
    }

    /// 让后续 `send` 失败
    pub fn set_fail_send(&self, fail: bool) {
        lock(&self.state).fail_send = fail;
    }

    /// 剩余未消费的接收脚本条数
    pub fn pending_receives(&self) -> usize {
        lock(&self.state).rx_queue.len()
    }
}

impl Transport for MockTransport {
    fn open(&mut self, port: u16, host: &str) -> Result<(), TransportError> {
        let mut state = lock(&self.state);
        state.open_calls += 1;
        if state.fail_open {
            return Err(TransportError::Io(std::io::Error::new(
                std::io::ErrorKind::AddrInUse,
                "mock open failure",
            )));
        }
        state.open = true;
        state.opened_with = Some((port, host.to_string()));
        Ok(())
    }

    fn is_open(&self) -> bool {
        lock(&self.state).open
    }

    fn receive(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        let mut state = lock(&self.state);
        if !state.open {
            return Err(TransportError::NotOpen);
        }
        match state.rx_queue.pop_front() {
            Some(MockReceive::Datagram(bytes)) => {
                let len = bytes.len().min(buf.len());
                buf[..len].copy_from_slice(&bytes[..len]);
                Ok(len)
            },
            Some(MockReceive::Empty) => Ok(0),
            Some(MockReceive::Timeout) | None => Err(TransportError::Timeout),
        }
    }

    fn send(&mut self, buf: &[u8]) -> Result<(), TransportError> {
        let mut state = lock(&self.state);
        if !state.open {
            return Err(TransportError::NotOpen);
        }
        if state.fail_send {
            return Err(TransportError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "mock send failure",
            )));
        }
        state.sent.push(buf.to_vec());
        Ok(())
    }

    fn close(&mut self) {
        let mut state = lock(&self.state);
        state.open = false;
        state.close_calls += 1;
    }
}

//! UDP 传输通道
//!
//! 绑定本地端口，向机器人控制器的 `host:port` 发送命令数据报。
//! 只接受来自该远端的数据报；未指定 host 时，远端地址从第一个收到的数据报学习。

use crate::{Transport, TransportError};
use std::io::ErrorKind;
use std::net::{Ipv4Addr, SocketAddr, ToSocketAddrs, UdpSocket};
use std::time::Duration;
use tracing::{debug, trace, warn};

/// 默认接收超时
///
/// 控制周期通常为 1-20ms，接收必须在一个周期内返回。
pub const DEFAULT_RECEIVE_TIMEOUT: Duration = Duration::from_millis(5);

/// UDP 传输通道
///
/// # Example
///
/// ```no_run
/// use fri_transport::{Transport, UdpTransport};
///
/// let mut udp = UdpTransport::new();
/// udp.open(30200, "192.170.10.2").unwrap();
///
/// let mut buf = [0u8; 1500];
/// match udp.receive(&mut buf) {
///     Ok(n) => println!("received {} bytes", n),
///     Err(e) => println!("no datagram: {}", e),
/// }
/// ```
pub struct UdpTransport {
    socket: Option<UdpSocket>,
    /// 远端地址（机器人控制器）
    remote: Option<SocketAddr>,
    /// 本地绑定地址覆盖（默认 `0.0.0.0:port`）
    bind_override: Option<SocketAddr>,
    receive_timeout: Duration,
}

impl UdpTransport {
    pub fn new() -> Self {
        Self {
            socket: None,
            remote: None,
            bind_override: None,
            receive_timeout: DEFAULT_RECEIVE_TIMEOUT,
        }
    }

    /// 指定本地绑定地址（默认绑定 `0.0.0.0:<port>`）
    ///
    /// 主要用于本机回环测试：机器人端与客户端不能在同一台机器上绑定同一端口。
    pub fn bind_to(mut self, addr: SocketAddr) -> Self {
        self.bind_override = Some(addr);
        self
    }

    /// 设置接收超时
    pub fn with_receive_timeout(mut self, timeout: Duration) -> Self {
        self.receive_timeout = timeout;
        self
    }

    /// 本地绑定地址（未打开时为 `None`）
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.socket.as_ref().and_then(|s| s.local_addr().ok())
    }

    /// 当前远端地址
    pub fn remote_addr(&self) -> Option<SocketAddr> {
        self.remote
    }

    fn resolve(host: &str, port: u16) -> Result<SocketAddr, TransportError> {
        let mut addrs = (host, port)
            .to_socket_addrs()
            .map_err(|e| TransportError::InvalidAddress(format!("{}:{} ({})", host, port, e)))?;
        addrs
            .find(SocketAddr::is_ipv4)
            .ok_or_else(|| TransportError::InvalidAddress(format!("{}:{}", host, port)))
    }

    fn apply_timeout(socket: &UdpSocket, timeout: Duration) -> Result<(), TransportError> {
        // set_read_timeout 不接受 0，0 表示纯非阻塞
        if timeout.is_zero() {
            socket.set_nonblocking(true)?;
        } else {
            socket.set_nonblocking(false)?;
            socket.set_read_timeout(Some(timeout))?;
        }
        Ok(())
    }
}

impl Default for UdpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UdpTransport {
    fn open(&mut self, port: u16, host: &str) -> Result<(), TransportError> {
        if self.socket.is_some() {
            warn!("UDP channel already open, ignoring open request");
            return Ok(());
        }

        let remote = if host.is_empty() {
            None
        } else {
            Some(Self::resolve(host, port)?)
        };

        let bind_addr = self
            .bind_override
            .unwrap_or_else(|| SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)));
        let socket = UdpSocket::bind(bind_addr)?;
        Self::apply_timeout(&socket, self.receive_timeout)?;

        debug!(
            "UDP channel open: local={:?}, remote={:?}",
            socket.local_addr().ok(),
            remote
        );

        self.socket = Some(socket);
        self.remote = remote;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.socket.is_some()
    }

    fn receive(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        let socket = self.socket.as_ref().ok_or(TransportError::NotOpen)?;

        let (len, from) = match socket.recv_from(buf) {
            Ok(r) => r,
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                return Err(TransportError::Timeout);
            },
            Err(e) => return Err(TransportError::Io(e)),
        };

        match self.remote {
            Some(remote) if remote.ip() != from.ip() => {
                trace!("Dropping datagram from unexpected peer {}", from);
                Ok(0)
            },
            Some(_) => Ok(len),
            None => {
                debug!("Learned remote address {}", from);
                self.remote = Some(from);
                Ok(len)
            },
        }
    }

    fn send(&mut self, buf: &[u8]) -> Result<(), TransportError> {
        let socket = self.socket.as_ref().ok_or(TransportError::NotOpen)?;
        let remote = self.remote.ok_or(TransportError::NotOpen)?;

        let sent = socket.send_to(buf, remote)?;
        if sent != buf.len() {
            return Err(TransportError::Truncated {
                sent,
                expected: buf.len(),
            });
        }
        Ok(())
    }

    fn close(&mut self) {
        if self.socket.take().is_some() {
            debug!("UDP channel closed");
        }
    }

    fn set_receive_timeout(&mut self, timeout: Duration) {
        self.receive_timeout = timeout;
        if let Some(socket) = self.socket.as_ref()
            && let Err(e) = Self::apply_timeout(socket, timeout)
        {
            warn!("Failed to apply UDP receive timeout {:?}: {}", timeout, e);
        }
    }
}

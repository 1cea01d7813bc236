//! Builder 模式实现
//!
//! 提供链式构造控制循环 / 线程化驱动的便捷方式。
//! 通道、编解码器、控制器在设置时改变 Builder 的类型参数，缺少任何一项都无法调用 `build_loop`。

use crate::config::SessionConfig;
use crate::controller::ControllerUpdate;
use crate::driver::FriDriver;
use crate::error::DriverError;
use crate::hooks::{HookManager, SessionCallback};
use crate::pipeline::ControlLoop;
use fri_protocol::Codec;
use fri_transport::Transport;
use std::sync::Arc;

/// 默认控制线程名
pub const DEFAULT_THREAD_NAME: &str = "fri_control";

/// FRI 驱动 Builder（链式构造）
///
/// # Example
///
/// ```no_run
/// use fri_driver::{FriDriverBuilder, HoldPosition, SessionConfig};
/// use fri_transport::UdpTransport;
/// # use fri_protocol::{Codec, CommandMessage, MonitoringMessage, ProtocolError};
/// # struct MyCodec;
/// # impl Codec for MyCodec {
/// #     fn decode(&mut self, _: &[u8], _: &mut MonitoringMessage) -> Result<(), ProtocolError> { Ok(()) }
/// #     fn encode(&mut self, _: &CommandMessage, _: &mut [u8]) -> Result<usize, ProtocolError> { Ok(0) }
/// # }
///
/// let driver = FriDriverBuilder::new()
///     .config(SessionConfig::default())
///     .transport(UdpTransport::new())
///     .codec(MyCodec)
///     .controller(HoldPosition)
///     .spawn()
///     .unwrap();
///
/// println!("{:?}", driver.metrics());
/// ```
pub struct FriDriverBuilder<T = (), C = (), U = ()> {
    config: SessionConfig,
    transport: T,
    codec: C,
    controller: U,
    hooks: HookManager,
    thread_name: String,
}

impl FriDriverBuilder {
    /// 创建新的 Builder（默认配置）
    pub fn new() -> Self {
        Self {
            config: SessionConfig::default(),
            transport: (),
            codec: (),
            controller: (),
            hooks: HookManager::new(),
            thread_name: DEFAULT_THREAD_NAME.to_string(),
        }
    }
}

impl Default for FriDriverBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, C, U> FriDriverBuilder<T, C, U> {
    /// 设置会话配置
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// 设置传输通道
    pub fn transport<T2: Transport>(self, transport: T2) -> FriDriverBuilder<T2, C, U> {
        FriDriverBuilder {
            config: self.config,
            transport,
            codec: self.codec,
            controller: self.controller,
            hooks: self.hooks,
            thread_name: self.thread_name,
        }
    }

    /// 设置编解码器
    pub fn codec<C2: Codec>(self, codec: C2) -> FriDriverBuilder<T, C2, U> {
        FriDriverBuilder {
            config: self.config,
            transport: self.transport,
            codec,
            controller: self.controller,
            hooks: self.hooks,
            thread_name: self.thread_name,
        }
    }

    /// 设置控制器
    pub fn controller<U2: ControllerUpdate>(self, controller: U2) -> FriDriverBuilder<T, C, U2> {
        FriDriverBuilder {
            config: self.config,
            transport: self.transport,
            codec: self.codec,
            controller,
            hooks: self.hooks,
            thread_name: self.thread_name,
        }
    }

    /// 注册会话回调（可多次调用）
    pub fn hook(mut self, callback: Arc<dyn SessionCallback>) -> Self {
        self.hooks.add_callback(callback);
        self
    }

    /// 设置控制线程名（仅 `spawn` 使用）
    pub fn thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }
}

impl<T, C, U> FriDriverBuilder<T, C, U>
where
    T: Transport,
    C: Codec,
    U: ControllerUpdate,
{
    /// 构建控制循环并打开通道
    ///
    /// # Errors
    /// - `DriverError::Config`: 配置校验失败
    /// - `DriverError::Open`: 通道打开失败（致命）
    pub fn build_loop(self) -> Result<ControlLoop<T, C, U>, DriverError> {
        let mut control =
            ControlLoop::new(self.config, self.transport, self.codec, self.controller)?;
        control.set_hooks(self.hooks);
        control.connect()?;
        Ok(control)
    }
}

impl<T, C, U> FriDriverBuilder<T, C, U>
where
    T: Transport + Send + 'static,
    C: Codec + Send + 'static,
    U: ControllerUpdate + Send + 'static,
{
    /// 构建控制循环，打开通道，并在专用线程上运行
    ///
    /// 通道在调用线程上打开：打开失败直接返回错误，不会启动线程。
    pub fn spawn(self) -> Result<FriDriver, DriverError> {
        let thread_name = self.thread_name.clone();
        let control = self.build_loop()?;
        FriDriver::spawn(control, thread_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::HoldPosition;
    use crate::hooks::ChannelTransitionHook;
    use crate::state::LinkState;
    use fri_protocol::{CommandMessage, MonitoringMessage, ProtocolError};
    use fri_transport::MockTransport;

    struct NullCodec;

    impl Codec for NullCodec {
        fn decode(&mut self, _: &[u8], _: &mut MonitoringMessage) -> Result<(), ProtocolError> {
            Ok(())
        }

        fn encode(&mut self, _: &CommandMessage, _: &mut [u8]) -> Result<usize, ProtocolError> {
            Ok(0)
        }
    }

    #[test]
    fn test_build_loop_opens_channel() {
        let (transport, handle) = MockTransport::with_handle();
        let config = SessionConfig {
            port: 30222,
            host: "10.0.0.7".to_string(),
            ..SessionConfig::default()
        };

        let control = FriDriverBuilder::new()
            .config(config)
            .transport(transport)
            .codec(NullCodec)
            .controller(HoldPosition)
            .build_loop()
            .unwrap();

        assert_eq!(control.link_state(), LinkState::ConnectedIdle);
        assert_eq!(handle.opened_with(), Some((30222, "10.0.0.7".to_string())));
    }

    #[test]
    fn test_build_loop_open_failure_is_fatal() {
        let (transport, handle) = MockTransport::with_handle();
        handle.set_fail_open(true);

        let result = FriDriverBuilder::new()
            .transport(transport)
            .codec(NullCodec)
            .controller(HoldPosition)
            .build_loop();

        assert!(matches!(result, Err(DriverError::Open(_))));
    }

    #[test]
    fn test_invalid_config_rejected_before_open() {
        let (transport, handle) = MockTransport::with_handle();
        let config = SessionConfig {
            joint_names: Vec::new(),
            ..SessionConfig::default()
        };

        let result = FriDriverBuilder::new()
            .config(config)
            .transport(transport)
            .codec(NullCodec)
            .controller(HoldPosition)
            .build_loop();

        assert!(matches!(result, Err(DriverError::Config(_))));
        assert_eq!(handle.open_calls(), 0);
    }

    #[test]
    fn test_hooks_are_installed() {
        let (hook, _rx) = ChannelTransitionHook::new(4);
        let builder = FriDriverBuilder::new()
            .hook(Arc::new(hook))
            .thread_name("custom");
        assert_eq!(builder.hooks.len(), 1);
        assert_eq!(builder.thread_name, "custom");
    }
}

//! 驱动层模块
//!
//! FRI 会话的实时控制核心，包括：
//! - 会话状态跟踪（状态跳变检测、空闲判定）
//! - 关节状态估计（位置差分 + 指数平滑）
//! - 命令构建（位置模式 / 力矩模式）
//! - 发送节拍控制（`receive_multiplier` 分频与序列号）
//! - 固定频率控制循环与线程化驱动（ArcSwap 快照无锁读取）
//! - 钩子系统：会话跳变、命令发送回调
//!
//! # 使用示例
//!
//! ```no_run
//! use fri_driver::{FriDriverBuilder, JointCommand, JointState, SessionConfig};
//! use fri_transport::UdpTransport;
//! use std::time::{Duration, Instant};
//! # use fri_protocol::{Codec, CommandMessage, MonitoringMessage, ProtocolError};
//! # struct MyCodec;
//! # impl Codec for MyCodec {
//! #     fn decode(&mut self, _: &[u8], _: &mut MonitoringMessage) -> Result<(), ProtocolError> { Ok(()) }
//! #     fn encode(&mut self, _: &CommandMessage, _: &mut [u8]) -> Result<usize, ProtocolError> { Ok(0) }
//! # }
//!
//! fri_driver::init_logger();
//!
//! let config = SessionConfig::from_toml_file("fri.toml").unwrap();
//! let mut driver = FriDriverBuilder::new()
//!     .config(config)
//!     .transport(UdpTransport::new())
//!     .codec(MyCodec)
//!     .controller(|_: Instant, _: Duration, state: &JointState, cmd: &mut JointCommand| {
//!         cmd.position.copy_from_slice(&state.position);
//!     })
//!     .spawn()
//!     .unwrap();
//!
//! std::thread::sleep(Duration::from_secs(1));
//! println!("{:?}", driver.snapshot().joint_state);
//! driver.stop().unwrap();
//! ```

mod builder;
pub mod cadence;
pub mod command;
mod config;
pub mod controller;
mod driver;
mod error;
pub mod estimator;
pub mod hooks;
mod logging;
pub mod metrics;
pub mod pipeline;
pub mod session;
pub mod state;

pub use builder::{DEFAULT_THREAD_NAME, FriDriverBuilder};
pub use cadence::{CadenceController, CadenceDecision, CadenceOutcome};
pub use command::CommandBuilder;
pub use config::SessionConfig;
pub use controller::{ControllerUpdate, HoldPosition};
pub use driver::FriDriver;
pub use error::{DriverError, ModeError};
pub use estimator::{JointStateEstimator, VELOCITY_SMOOTHING_FACTOR, exponential_smoothing};
pub use hooks::{ChannelTransitionHook, HookManager, SessionCallback};
pub use logging::{DEFAULT_LOG_FILTER, init_logger, init_logger_with_default};
pub use metrics::{DriverMetrics, MetricsSnapshot};
pub use pipeline::{ControlLoop, TickOutcome};
pub use session::{SessionStateTracker, SessionTransition};
pub use state::*;

pub use fri_protocol::{CommandMode, SessionState};

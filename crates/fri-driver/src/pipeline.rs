//! 控制循环
//!
//! 单线程固定频率循环，每个周期依次执行：
//!
//! ```text
//! receive ─▶ decode ─▶ 消息 ID 校验 ─▶ 会话状态跟踪 ─┬─▶ (空闲) 结束本周期
//!                                                    └─▶ 状态估计 ─▶ 控制器 ─▶ 命令构建 ─▶ 节拍发送
//! ```
//!
//! 除了通道打开失败以外，所有错误都只影响当前周期：记录指标、打印日志，下一个周期照常执行。

use crate::cadence::{CadenceController, CadenceOutcome};
use crate::command::CommandBuilder;
use crate::config::SessionConfig;
use crate::controller::ControllerUpdate;
use crate::error::DriverError;
use crate::estimator::JointStateEstimator;
use crate::hooks::{HookManager, SessionCallback};
use crate::metrics::DriverMetrics;
use crate::session::{SessionStateTracker, SessionTransition};
use crate::state::{DriverContext, JointCommand, JointState, LinkState, TelemetrySnapshot};
use fri_protocol::{
    Codec, CommandMessage, FRI_COMMAND_MSG_MAX_SIZE, FRI_MONITOR_MSG_MAX_SIZE, MonitoringMessage,
};
use fri_transport::Transport;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, trace, warn};

/// 单个周期的执行结果
#[derive(Debug)]
pub enum TickOutcome {
    /// 会话空闲，未估计、未发送
    Idle,
    /// 命令已发送
    Sent { sequence_counter: u32 },
    /// 命令已构建，但被节拍控制器抑制
    Suppressed,
    /// 本周期失败（可恢复），附带原因
    Failed(DriverError),
}

impl TickOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, Self::Sent { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// 失败原因
    pub fn error(&self) -> Option<&DriverError> {
        match self {
            Self::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// 固定频率节拍器
///
/// 截止时间每次累加一个周期；已经超时则把截止时间重新锚定到当前时刻，不补发。
struct FixedRate {
    period: Duration,
    next_deadline: Instant,
}

impl FixedRate {
    fn new(period: Duration) -> Self {
        Self {
            period,
            next_deadline: Instant::now(),
        }
    }

    /// 睡眠到下一个截止时间，返回本周期是否超时
    fn wait(&mut self) -> bool {
        self.next_deadline += self.period;
        let now = Instant::now();
        if now >= self.next_deadline {
            self.next_deadline = now;
            return true;
        }
        // 使用 spin_sleep 获得微秒级精度
        spin_sleep::sleep(self.next_deadline - now);
        false
    }
}

/// FRI 控制循环
///
/// 独占会话状态、序列号和关节缓冲区；收发缓冲区与消息结构体在循环内复用。
///
/// # Example
///
/// ```
/// use fri_driver::{ControlLoop, HoldPosition, SessionConfig};
/// use fri_protocol::{Codec, CommandMessage, MonitoringMessage, ProtocolError};
/// use fri_transport::MockTransport;
///
/// struct NullCodec;
/// impl Codec for NullCodec {
///     fn decode(&mut self, _: &[u8], _: &mut MonitoringMessage) -> Result<(), ProtocolError> {
///         Err(ProtocolError::Decode("empty".into()))
///     }
///     fn encode(&mut self, _: &CommandMessage, _: &mut [u8]) -> Result<usize, ProtocolError> {
///         Ok(0)
///     }
/// }
///
/// let mut control = ControlLoop::new(
///     SessionConfig::default(),
///     MockTransport::new(),
///     NullCodec,
///     HoldPosition,
/// ).unwrap();
/// control.connect().unwrap();
///
/// // 没有数据报：本周期失败但可恢复
/// assert!(control.tick().is_failed());
/// ```
pub struct ControlLoop<T, C, U> {
    config: SessionConfig,
    transport: T,
    codec: C,
    controller: U,
    hooks: HookManager,

    link: LinkState,
    tracker: SessionStateTracker,
    estimator: JointStateEstimator,
    builder: CommandBuilder,
    cadence: CadenceController,

    joint_state: JointState,
    joint_command: JointCommand,
    monitoring: MonitoringMessage,
    command: CommandMessage,
    recv_buf: Vec<u8>,
    send_buf: Vec<u8>,

    idle: bool,
    period: Duration,
    tick_count: u64,
    last_transition: Option<SessionTransition>,
    failure_streak: u64,
    id_mismatch_streak: u64,

    ctx: Arc<DriverContext>,
}

impl<T, C, U> ControlLoop<T, C, U>
where
    T: Transport,
    C: Codec,
    U: ControllerUpdate,
{
    /// 创建控制循环（不打开通道）
    ///
    /// 所有关节缓冲区按 `config.joint_names` 的长度分配并清零。
    ///
    /// # Errors
    /// - `DriverError::Config`: 配置校验失败
    pub fn new(
        config: SessionConfig,
        transport: T,
        codec: C,
        controller: U,
    ) -> Result<Self, DriverError> {
        config.validate()?;
        let num_joints = config.num_joints();
        let period = config.period();
        let command = CommandMessage::new(config.command_message_id);

        Ok(Self {
            transport,
            codec,
            controller,
            hooks: HookManager::new(),
            link: LinkState::Disconnected,
            tracker: SessionStateTracker::new(),
            estimator: JointStateEstimator::new(num_joints),
            builder: CommandBuilder::new(),
            cadence: CadenceController::new(),
            joint_state: JointState::zeros(num_joints),
            joint_command: JointCommand::zeros(num_joints),
            monitoring: MonitoringMessage::with_joints(num_joints),
            command,
            recv_buf: vec![0u8; FRI_MONITOR_MSG_MAX_SIZE],
            send_buf: vec![0u8; FRI_COMMAND_MSG_MAX_SIZE],
            idle: true,
            period,
            tick_count: 0,
            last_transition: None,
            failure_streak: 0,
            id_mismatch_streak: 0,
            ctx: Arc::new(DriverContext::new(num_joints)),
            config,
        })
    }

    /// 注册会话回调
    pub fn add_hook(&mut self, callback: Arc<dyn SessionCallback>) {
        self.hooks.add_callback(callback);
    }

    pub(crate) fn set_hooks(&mut self, hooks: HookManager) {
        self.hooks = hooks;
    }

    /// 打开通道
    ///
    /// 成功后链路进入 `ConnectedIdle`。这是唯一的致命错误来源：失败时控制循环不应启动。
    ///
    /// # Errors
    /// - `DriverError::Open`: 通道打开失败
    pub fn connect(&mut self) -> Result<(), DriverError> {
        if self.transport.is_open() {
            warn!("FRI channel already open, skipping connect");
            self.link = LinkState::ConnectedIdle;
            return Ok(());
        }

        self.transport.set_receive_timeout(self.config.receive_timeout());
        if let Err(e) = self.transport.open(self.config.port, &self.config.host) {
            error!(
                "Failed to open FRI channel {}:{}: {}",
                self.config.host, self.config.port, e
            );
            return Err(DriverError::Open(e));
        }

        self.link = LinkState::ConnectedIdle;
        info!(
            "FRI channel open on {}:{} ({} joints @ {} Hz)",
            self.config.host,
            self.config.port,
            self.config.num_joints(),
            self.config.control_frequency_hz
        );
        self.publish();
        Ok(())
    }

    /// 执行一个周期（不睡眠）
    pub fn tick(&mut self) -> TickOutcome {
        DriverMetrics::incr(&self.ctx.metrics.ticks);

        let outcome = match self.exchange() {
            Ok(outcome) => {
                if self.failure_streak > 0 {
                    debug!(
                        "FRI tick {} recovered after {} failed ticks",
                        self.tick_count, self.failure_streak
                    );
                }
                self.failure_streak = 0;
                outcome
            },
            Err(e) => {
                // 连续失败只在第一次打印 warn，避免每个周期刷屏
                if self.failure_streak == 0 {
                    warn!("FRI tick {} skipped: {}", self.tick_count, e);
                } else {
                    trace!("FRI tick {} skipped: {}", self.tick_count, e);
                }
                self.failure_streak += 1;
                TickOutcome::Failed(e)
            },
        };

        self.publish();
        self.tick_count += 1;
        outcome
    }

    fn exchange(&mut self) -> Result<TickOutcome, DriverError> {
        let metrics = &self.ctx.metrics;

        if !self.transport.is_open() {
            DriverMetrics::incr(&metrics.rx_misses);
            return Err(DriverError::NotConnected);
        }

        // 1. 接收：0 字节、超时、接收错误都算一次缺失
        let received = match self.transport.receive(&mut self.recv_buf) {
            Ok(0) => {
                DriverMetrics::incr(&metrics.rx_misses);
                return Err(DriverError::NoData);
            },
            Ok(n) => n,
            Err(e) if e.is_no_data() => {
                DriverMetrics::incr(&metrics.rx_misses);
                return Err(DriverError::NoData);
            },
            Err(e) => {
                DriverMetrics::incr(&metrics.rx_misses);
                return Err(e.into());
            },
        };
        DriverMetrics::incr(&metrics.rx_datagrams);

        // 2. 解码
        self.codec
            .decode(&self.recv_buf[..received], &mut self.monitoring)
            .inspect_err(|_| DriverMetrics::incr(&metrics.decode_errors))?;

        // 3. 消息 ID 校验
        let expected = self.config.expected_monitoring_id;
        let actual = self.monitoring.message_identifier;
        if actual != expected {
            DriverMetrics::incr(&metrics.identifier_mismatches);
            self.id_mismatch_streak += 1;
            metrics
                .identifier_mismatch_streak
                .store(self.id_mismatch_streak, Ordering::Relaxed);
            if self.id_mismatch_streak == self.config.id_mismatch_warn_threshold {
                error!(
                    "FRI message identifier mismatch for {} consecutive ticks \
                     (expected 0x{:X}, got 0x{:X}); client and robot protocol versions differ",
                    self.id_mismatch_streak, expected, actual
                );
            }
            return Err(DriverError::IdentifierMismatch { expected, actual });
        }
        if self.id_mismatch_streak > 0 {
            self.id_mismatch_streak = 0;
            metrics.identifier_mismatch_streak.store(0, Ordering::Relaxed);
        }

        // 4. 会话状态跳变
        let session_state = self.monitoring.session_state;
        if let Some(transition) = self.tracker.observe(session_state) {
            DriverMetrics::incr(&metrics.transitions);
            info!("FRI session state changed: {}", transition);
            self.hooks.trigger_transition(&transition);
            self.controller.on_session_transition(&transition);
            self.last_transition = Some(transition);
        }

        // 5. 空闲：不估计、不发送
        if SessionStateTracker::is_idle(session_state) {
            self.idle = true;
            self.link = LinkState::ConnectedIdle;
            DriverMetrics::incr(&metrics.idle_ticks);
            trace!("FRI session idle ({})", session_state);
            return Ok(TickOutcome::Idle);
        }

        // 6. 状态估计（标称周期）
        let (position, velocity) = self
            .estimator
            .update(&self.monitoring.measured_joint_position, self.period.as_secs_f64())
            .inspect_err(|_| DriverMetrics::incr(&metrics.decode_errors))?;
        self.joint_state.position.copy_from_slice(position);
        self.joint_state.velocity.copy_from_slice(velocity);
        if let Some(torque) = &self.monitoring.measured_torque {
            if torque.len() == self.joint_state.effort.len() {
                self.joint_state.effort.copy_from_slice(torque);
            }
        }
        self.idle = false;
        self.link = LinkState::ConnectedActive;

        self.controller.update(
            Instant::now(),
            self.period,
            &self.joint_state,
            &mut self.joint_command,
        );

        // 7. 命令构建；模式错误时不推进节拍
        self.builder
            .build(
                self.monitoring.command_mode,
                &self.joint_command.effort,
                &self.joint_command.position,
                &self.joint_state.position,
                &mut self.command,
            )
            .inspect_err(|_| DriverMetrics::incr(&metrics.mode_errors))?;

        // 8. 节拍控制与发送
        let outcome = self
            .cadence
            .dispatch(
                &mut self.codec,
                &mut self.transport,
                &mut self.command,
                &mut self.send_buf,
                self.monitoring.receive_multiplier,
                self.monitoring.sequence_counter,
            )
            .inspect_err(|_| DriverMetrics::incr(&metrics.tx_errors))?;

        match outcome {
            CadenceOutcome::Sent { sequence_counter } => {
                DriverMetrics::incr(&metrics.tx_sent);
                self.hooks.trigger_command_sent(&self.command.header);
                trace!(
                    "FRI command sent: seq={}, reflected={}",
                    sequence_counter, self.command.header.reflected_sequence_counter
                );
                Ok(TickOutcome::Sent { sequence_counter })
            },
            CadenceOutcome::Suppressed => {
                DriverMetrics::incr(&metrics.tx_suppressed);
                Ok(TickOutcome::Suppressed)
            },
        }
    }

    /// 按固定频率运行，直到 `is_running` 变为 `false`
    ///
    /// 每个周期检查一次停止标志；退出时关闭通道。
    pub fn run(&mut self, is_running: &AtomicBool) {
        info!("FRI control loop started (period {:?})", self.period);
        let mut rate = FixedRate::new(self.period);

        while is_running.load(Ordering::Acquire) {
            self.tick();
            if rate.wait() {
                DriverMetrics::incr(&self.ctx.metrics.overruns);
                trace!("FRI tick {} overran the control period", self.tick_count);
            }
        }

        self.shutdown();
        info!("FRI control loop stopped after {} ticks", self.tick_count);
    }

    /// 按固定频率运行 `ticks` 个周期（不关闭通道）
    pub fn run_for(&mut self, ticks: usize) -> Vec<TickOutcome> {
        let mut rate = FixedRate::new(self.period);
        let mut outcomes = Vec::with_capacity(ticks);
        for i in 0..ticks {
            outcomes.push(self.tick());
            if i + 1 < ticks && rate.wait() {
                DriverMetrics::incr(&self.ctx.metrics.overruns);
            }
        }
        outcomes
    }

    /// 关闭通道，链路进入 `Disconnected`
    pub fn shutdown(&mut self) {
        self.transport.close();
        self.link = LinkState::Disconnected;
        self.idle = true;
        self.publish();
        debug!("FRI channel closed");
    }

    fn publish(&self) {
        self.ctx.publish(TelemetrySnapshot {
            tick: self.tick_count,
            link_state: self.link,
            session_state: self.tracker.current(),
            command_mode: self.monitoring.command_mode,
            idle: self.idle,
            joint_state: self.joint_state.clone(),
            joint_command: self.joint_command.clone(),
            next_sequence_counter: self.cadence.next_sequence(),
            reflected_sequence_counter: self.command.header.reflected_sequence_counter,
            last_transition: self.last_transition,
        });
    }

    pub fn link_state(&self) -> LinkState {
        self.link
    }

    pub fn is_idle(&self) -> bool {
        self.idle
    }

    pub fn joint_state(&self) -> &JointState {
        &self.joint_state
    }

    pub fn joint_command(&self) -> &JointCommand {
        &self.joint_command
    }

    pub fn cadence(&self) -> &CadenceController {
        &self.cadence
    }

    pub fn tracker(&self) -> &SessionStateTracker {
        &self.tracker
    }

    /// 最近一次构建的命令消息
    pub fn command(&self) -> &CommandMessage {
        &self.command
    }

    pub fn controller(&self) -> &U {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut U {
        &mut self.controller
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn joint_names(&self) -> &[String] {
        &self.config.joint_names
    }

    /// 共享上下文（快照 + 指标）
    pub fn context(&self) -> &Arc<DriverContext> {
        &self.ctx
    }

    pub fn ticks(&self) -> u64 {
        self.tick_count
    }
}

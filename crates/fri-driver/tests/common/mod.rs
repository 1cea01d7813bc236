//! 集成测试公共设施
//!
//! - `ScriptedCodec`: 按脚本顺序返回解码结果，记录每次编码的命令
//! - `RecordingController`: 记录调用参数，写入固定的命令目标
//! - `connected_loop`: 基于 `MockTransport` 的已连接控制循环

#![allow(dead_code)]

use fri_driver::{
    ControlLoop, ControllerUpdate, JointCommand, JointState, SessionConfig, SessionTransition,
};
use fri_protocol::{
    Codec, CommandMessage, CommandMode, LBR_MONITORING_MESSAGE_ID, MonitoringMessage,
    ProtocolError, SessionState,
};
use fri_transport::{MockTransport, MockTransportHandle};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

#[derive(Default)]
struct CodecState {
    decode: VecDeque<Result<MonitoringMessage, ProtocolError>>,
    encoded: Vec<CommandMessage>,
    fail_encode: bool,
}

/// 脚本化编解码器
pub struct ScriptedCodec {
    state: Arc<Mutex<CodecState>>,
}

/// 编解码器脚本句柄（测试侧持有）
#[derive(Clone)]
pub struct CodecHandle {
    state: Arc<Mutex<CodecState>>,
}

impl ScriptedCodec {
    pub fn with_handle() -> (Self, CodecHandle) {
        let state = Arc::new(Mutex::new(CodecState::default()));
        (
            Self {
                state: state.clone(),
            },
            CodecHandle { state },
        )
    }
}

impl CodecHandle {
    pub fn push_message(&self, msg: MonitoringMessage) {
        lock(&self.state).decode.push_back(Ok(msg));
    }

    pub fn push_decode_error(&self, err: ProtocolError) {
        lock(&self.state).decode.push_back(Err(err));
    }

    pub fn encoded(&self) -> Vec<CommandMessage> {
        lock(&self.state).encoded.clone()
    }

    pub fn set_fail_encode(&self, fail: bool) {
        lock(&self.state).fail_encode = fail;
    }
}

impl Codec for ScriptedCodec {
    fn decode(&mut self, _buf: &[u8], msg: &mut MonitoringMessage) -> Result<(), ProtocolError> {
        match lock(&self.state).decode.pop_front() {
            Some(Ok(decoded)) => {
                *msg = decoded;
                Ok(())
            },
            Some(Err(e)) => Err(e),
            None => Err(ProtocolError::Decode("no scripted message".into())),
        }
    }

    fn encode(&mut self, msg: &CommandMessage, buf: &mut [u8]) -> Result<usize, ProtocolError> {
        let mut state = lock(&self.state);
        if state.fail_encode {
            return Err(ProtocolError::Encode("scripted encode failure".into()));
        }
        state.encoded.push(msg.clone());
        buf[..4].copy_from_slice(&msg.header.sequence_counter.to_le_bytes());
        Ok(4)
    }
}

/// 控制器调用记录
#[derive(Debug, Default)]
pub struct ControllerLog {
    pub updates: usize,
    pub elapsed: Vec<Duration>,
    pub transitions: Vec<SessionTransition>,
    pub last_state: Option<JointState>,
}

/// 记录型控制器：位置目标 = 测量位置 + `position_offset`，力矩目标 = `effort`
pub struct RecordingController {
    log: Arc<Mutex<ControllerLog>>,
    pub position_offset: f64,
    pub effort: f64,
}

impl RecordingController {
    pub fn new() -> (Self, Arc<Mutex<ControllerLog>>) {
        let log = Arc::new(Mutex::new(ControllerLog::default()));
        (
            Self {
                log: log.clone(),
                position_offset: 0.01,
                effort: 1.5,
            },
            log,
        )
    }
}

impl ControllerUpdate for RecordingController {
    fn update(
        &mut self,
        _now: Instant,
        elapsed: Duration,
        state: &JointState,
        command: &mut JointCommand,
    ) {
        let mut log = lock(&self.log);
        log.updates += 1;
        log.elapsed.push(elapsed);
        log.last_state = Some(state.clone());

        for (target, measured) in command.position.iter_mut().zip(&state.position) {
            *target = measured + self.position_offset;
        }
        command.effort.fill(self.effort);
    }

    fn on_session_transition(&mut self, transition: &SessionTransition) {
        lock(&self.log).transitions.push(*transition);
    }
}

pub type TestLoop = ControlLoop<MockTransport, ScriptedCodec, RecordingController>;

/// 测试侧句柄集合
pub struct Harness {
    pub transport: MockTransportHandle,
    pub codec: CodecHandle,
    pub controller: Arc<Mutex<ControllerLog>>,
}

impl Harness {
    /// 投递一个数据报及其解码结果
    pub fn deliver(&self, msg: MonitoringMessage) {
        self.transport.push_datagram(vec![0xAB; 16]);
        self.codec.push_message(msg);
    }

    pub fn controller_log(&self) -> MutexGuard<'_, ControllerLog> {
        lock(&self.controller)
    }
}

/// 构建并连接控制循环
pub fn connected_loop(config: SessionConfig) -> (TestLoop, Harness) {
    let (transport, transport_handle) = MockTransport::with_handle();
    let (codec, codec_handle) = ScriptedCodec::with_handle();
    let (controller, log) = RecordingController::new();

    let mut control = ControlLoop::new(config, transport, codec, controller).unwrap();
    control.connect().unwrap();

    (
        control,
        Harness {
            transport: transport_handle,
            codec: codec_handle,
            controller: log,
        },
    )
}

/// 构造一条有效的监控消息
pub fn monitoring(
    session_state: SessionState,
    command_mode: CommandMode,
    receive_multiplier: u32,
    sequence_counter: u32,
    positions: &[f64],
) -> MonitoringMessage {
    MonitoringMessage {
        message_identifier: LBR_MONITORING_MESSAGE_ID,
        sequence_counter,
        session_state,
        command_mode,
        receive_multiplier,
        measured_joint_position: positions.to_vec(),
        measured_torque: None,
    }
}

/// 7 关节 50 Hz 默认配置
pub fn default_config() -> SessionConfig {
    SessionConfig::default()
}

/// 轮询等待条件成立
pub fn wait_until(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < timeout {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    cond()
}

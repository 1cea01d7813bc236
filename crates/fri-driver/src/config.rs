//! 会话配置
//!
//! 会话参数在初始化时提供一次，之后不可变。

use crate::error::DriverError;
use fri_protocol::{
    DEFAULT_FRI_PORT, DEFAULT_ROBOT_HOST, LBR_COMMAND_MESSAGE_ID, LBR_MONITORING_MESSAGE_ID,
    LBR_NUMBER_OF_JOINTS,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::warn;

/// 会话配置
///
/// # Example
///
/// ```
/// use fri_driver::SessionConfig;
///
/// let config = SessionConfig::from_toml_str(r#"
///     port = 30201
///     host = "172.31.1.147"
///     control_frequency_hz = 200.0
///     joint_names = ["j1", "j2", "j3", "j4", "j5", "j6", "j7"]
/// "#).unwrap();
///
/// assert_eq!(config.port, 30201);
/// assert_eq!(config.num_joints(), 7);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// FRI UDP 端口
    pub port: u16,
    /// 机器人控制器地址
    pub host: String,
    /// 控制频率（Hz）
    pub control_frequency_hz: f64,
    /// 关节名称（决定关节数与顺序）
    pub joint_names: Vec<String>,
    /// 接收超时（毫秒）
    pub receive_timeout_ms: u64,
    /// 连续 ID 不匹配多少个周期后上报健康告警
    pub id_mismatch_warn_threshold: u64,
    /// 期望的监控消息 ID
    pub expected_monitoring_id: u32,
    /// 命令消息 ID
    pub command_message_id: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_FRI_PORT,
            host: DEFAULT_ROBOT_HOST.to_string(),
            control_frequency_hz: 50.0,
            joint_names: (1..=LBR_NUMBER_OF_JOINTS)
                .map(|i| format!("iiwa_joint_{}", i))
                .collect(),
            receive_timeout_ms: 5,
            id_mismatch_warn_threshold: 50,
            expected_monitoring_id: LBR_MONITORING_MESSAGE_ID,
            command_message_id: LBR_COMMAND_MESSAGE_ID,
        }
    }
}

impl SessionConfig {
    /// 从 TOML 字符串解析（缺省字段使用默认值）
    pub fn from_toml_str(s: &str) -> Result<Self, DriverError> {
        let config: Self =
            toml::from_str(s).map_err(|e| DriverError::Config(format!("invalid TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// 从 TOML 文件读取
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, DriverError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| DriverError::Config(format!("failed to read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// 校验配置
    ///
    /// # Errors
    /// - 控制频率不是有限正数
    /// - 控制周期无法用 `Duration` 表示（频率过低或过高）
    /// - 关节列表为空
    pub fn validate(&self) -> Result<(), DriverError> {
        if !self.control_frequency_hz.is_finite() || self.control_frequency_hz <= 0.0 {
            return Err(DriverError::Config(format!(
                "Invalid control_frequency_hz: {} (must be > 0)",
                self.control_frequency_hz
            )));
        }
        let period = match Duration::try_from_secs_f64(1.0 / self.control_frequency_hz) {
            Ok(period) if !period.is_zero() => period,
            _ => {
                return Err(DriverError::Config(format!(
                    "Invalid control_frequency_hz: {} (period not representable)",
                    self.control_frequency_hz
                )));
            },
        };
        if self.control_frequency_hz > 10000.0 {
            warn!(
                "Very high control frequency: {} Hz. This may cause performance issues.",
                self.control_frequency_hz
            );
        }
        if self.joint_names.is_empty() {
            return Err(DriverError::Config(
                "joint_names must contain at least one joint".to_string(),
            ));
        }
        if self.receive_timeout() >= period {
            warn!(
                "receive_timeout_ms ({}) is not shorter than the control period ({:?}); \
                 a missed datagram will stretch the cycle",
                self.receive_timeout_ms, period
            );
        }
        Ok(())
    }

    /// 关节数
    pub fn num_joints(&self) -> usize {
        self.joint_names.len()
    }

    /// 标称控制周期
    ///
    /// 仅对通过 `validate` 的配置有意义；无法表示的周期返回 `Duration::ZERO`。
    pub fn period(&self) -> Duration {
        Duration::try_from_secs_f64(1.0 / self.control_frequency_hz).unwrap_or_default()
    }

    /// 接收超时
    pub fn receive_timeout(&self) -> Duration {
        Duration::from_millis(self.receive_timeout_ms)
    }
}

//! 协议常量定义

/// LBR 监控消息标识符（机器人 -> 客户端）
///
/// 接收到的监控消息必须携带此 ID，否则说明客户端与机器人端的协议版本不匹配。
pub const LBR_MONITORING_MESSAGE_ID: u32 = 0x245142;

/// LBR 命令消息标识符（客户端 -> 机器人）
pub const LBR_COMMAND_MESSAGE_ID: u32 = 0x34001;

/// 监控消息最大字节数（单个 UDP 数据报）
pub const FRI_MONITOR_MSG_MAX_SIZE: usize = 1500;

/// 命令消息最大字节数（单个 UDP 数据报）
pub const FRI_COMMAND_MSG_MAX_SIZE: usize = 1500;

/// LBR 机械臂关节数
pub const LBR_NUMBER_OF_JOINTS: usize = 7;

/// FRI 默认 UDP 端口
pub const DEFAULT_FRI_PORT: u16 = 30200;

/// 机器人控制器默认 IP
pub const DEFAULT_ROBOT_HOST: &str = "192.170.10.2";

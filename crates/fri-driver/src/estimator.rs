//! 关节状态估计
//!
//! 机器人端只上报关节位置，速度由相邻两个周期的位置差分得到，再做指数平滑。

use fri_protocol::ProtocolError;

/// 速度估计的平滑系数
pub const VELOCITY_SMOOTHING_FACTOR: f64 = 0.2;

/// 指数平滑：`alpha * x + (1 - alpha) * prev`
#[inline]
pub fn exponential_smoothing(x: f64, prev: f64, alpha: f64) -> f64 {
    alpha * x + (1.0 - alpha) * prev
}

/// 关节状态估计器
///
/// 保存上一周期的位置和速度。只应在非空闲周期调用 [`update`](Self::update)。
#[derive(Debug, Clone)]
pub struct JointStateEstimator {
    position: Vec<f64>,
    previous_position: Vec<f64>,
    velocity: Vec<f64>,
}

impl JointStateEstimator {
    /// 创建估计器（历史全部为 0）
    pub fn new(num_joints: usize) -> Self {
        Self {
            position: vec![0.0; num_joints],
            previous_position: vec![0.0; num_joints],
            velocity: vec![0.0; num_joints],
        }
    }

    pub fn num_joints(&self) -> usize {
        self.position.len()
    }

    /// 用新的测量位置更新估计
    ///
    /// `elapsed_secs` 必须为正数；控制循环总是传入标称周期。
    ///
    /// # Errors
    /// - `ProtocolError::InvalidLength`: 测量位置数与关节数不符（估计器状态不变）
    pub fn update(
        &mut self,
        measured: &[f64],
        elapsed_secs: f64,
    ) -> Result<(&[f64], &[f64]), ProtocolError> {
        if measured.len() != self.position.len() {
            return Err(ProtocolError::InvalidLength {
                field: "measured_joint_position",
                expected: self.position.len(),
                actual: measured.len(),
            });
        }
        debug_assert!(elapsed_secs > 0.0, "elapsed time must be positive");

        self.previous_position.copy_from_slice(&self.position);
        self.position.copy_from_slice(measured);

        for ((velocity, position), previous) in self
            .velocity
            .iter_mut()
            .zip(&self.position)
            .zip(&self.previous_position)
        {
            let raw_rate = (position - previous) / elapsed_secs;
            *velocity = exponential_smoothing(raw_rate, *velocity, VELOCITY_SMOOTHING_FACTOR);
        }

        Ok((&self.position, &self.velocity))
    }

    pub fn position(&self) -> &[f64] {
        &self.position
    }

    pub fn velocity(&self) -> &[f64] {
        &self.velocity
    }

    /// 清空历史（位置与速度归零）
    pub fn reset(&mut self) {
        self.position.fill(0.0);
        self.previous_position.fill(0.0);
        self.velocity.fill(0.0);
    }
}

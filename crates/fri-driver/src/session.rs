//! 会话状态跟踪
//!
//! 记录上一次观测到的会话状态，检测状态跳变。

use fri_protocol::SessionState;

/// 一次会话状态跳变
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTransition {
    pub from: SessionState,
    pub to: SessionState,
}

impl std::fmt::Display for SessionTransition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// 会话状态跟踪器
///
/// 初始状态为 `Idle`。
#[derive(Debug, Clone, Default)]
pub struct SessionStateTracker {
    last: SessionState,
}

impl SessionStateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// 观测新状态
    ///
    /// 与上一次记录的状态不同时返回跳变事件并更新记录；相同时什么也不做。
    pub fn observe(&mut self, state: SessionState) -> Option<SessionTransition> {
        if state == self.last {
            return None;
        }
        let transition = SessionTransition {
            from: self.last,
            to: state,
        };
        self.last = state;
        Some(transition)
    }

    /// 上一次记录的状态
    pub fn current(&self) -> SessionState {
        self.last
    }

    /// 状态是否为空闲（`Idle` 或未定义取值）
    pub fn is_idle(state: SessionState) -> bool {
        state.is_idle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STATES: [SessionState; 6] = [
        SessionState::Idle,
        SessionState::MonitoringWait,
        SessionState::MonitoringReady,
        SessionState::CommandingWait,
        SessionState::CommandingActive,
        SessionState::Unknown(17),
    ];

    #[test]
    fn test_initial_state_is_idle() {
        let tracker = SessionStateTracker::new();
        assert_eq!(tracker.current(), SessionState::Idle);
    }

    #[test]
    fn test_repeated_state_never_transitions() {
        for state in ALL_STATES {
            let mut tracker = SessionStateTracker::new();
            tracker.observe(state);
            assert_eq!(tracker.observe(state), None, "state {}", state);
            assert_eq!(tracker.current(), state);
        }
    }

    #[test]
    fn test_differing_states_emit_one_transition() {
        for from in ALL_STATES {
            for to in ALL_STATES {
                if from == to {
                    continue;
                }
                let mut tracker = SessionStateTracker::new();
                tracker.observe(from);
                assert_eq!(
                    tracker.observe(to),
                    Some(SessionTransition { from, to }),
                    "{} -> {}",
                    from,
                    to
                );
                assert_eq!(tracker.current(), to);
            }
        }
    }

    #[test]
    fn test_first_observation_from_idle() {
        let mut tracker = SessionStateTracker::new();
        assert_eq!(tracker.observe(SessionState::Idle), None);
        assert_eq!(
            tracker.observe(SessionState::MonitoringWait),
            Some(SessionTransition {
                from: SessionState::Idle,
                to: SessionState::MonitoringWait,
            })
        );
    }

    #[test]
    fn test_is_idle() {
        assert!(SessionStateTracker::is_idle(SessionState::Idle));
        assert!(SessionStateTracker::is_idle(SessionState::Unknown(200)));
        assert!(!SessionStateTracker::is_idle(SessionState::MonitoringWait));
        assert!(!SessionStateTracker::is_idle(SessionState::MonitoringReady));
        assert!(!SessionStateTracker::is_idle(SessionState::CommandingWait));
        assert!(!SessionStateTracker::is_idle(SessionState::CommandingActive));
    }

    #[test]
    fn test_transition_display() {
        let t = SessionTransition {
            from: SessionState::Idle,
            to: SessionState::CommandingActive,
        };
        assert_eq!(t.to_string(), "IDLE -> COMMANDING_ACTIVE");
    }
}

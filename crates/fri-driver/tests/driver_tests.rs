//! 线程化驱动测试
//!
//! 验证控制线程的启动、停止、通道关闭，以及其他线程对快照的并发读取。

mod common;

use common::*;
use fri_driver::{FriDriver, FriDriverBuilder, HoldPosition, LinkState, SessionConfig};
use fri_protocol::{CommandMode, SessionState};
use fri_transport::MockTransport;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn fast_config() -> SessionConfig {
    SessionConfig {
        control_frequency_hz: 500.0,
        receive_timeout_ms: 1,
        ..default_config()
    }
}

#[test]
fn test_spawn_runs_ticks_and_stop_closes_channel() {
    let (transport, handle) = MockTransport::with_handle();
    let (codec, _codec) = ScriptedCodec::with_handle();

    let mut driver = FriDriverBuilder::new()
        .config(fast_config())
        .transport(transport)
        .codec(codec)
        .controller(HoldPosition)
        .thread_name("fri_test")
        .spawn()
        .unwrap();

    assert!(handle.is_open());
    assert!(wait_until(Duration::from_secs(2), || driver.metrics().ticks >= 5));
    assert!(driver.is_running());

    driver.stop().unwrap();
    assert!(!driver.is_running());
    assert!(!handle.is_open());
    assert_eq!(handle.close_calls(), 1);
    assert_eq!(driver.snapshot().link_state, LinkState::Disconnected);

    // 重复 stop 是安全的
    driver.stop().unwrap();
}

#[test]
fn test_scripted_session_sends_every_command() {
    let (transport, handle) = MockTransport::with_handle();
    let (codec, codec_handle) = ScriptedCodec::with_handle();
    for seq in 0..20 {
        handle.push_datagram(vec![0u8; 16]);
        codec_handle.push_message(monitoring(
            SessionState::CommandingActive,
            CommandMode::Position,
            1,
            seq,
            &[0.5; 7],
        ));
    }

    let driver = FriDriverBuilder::new()
        .config(fast_config())
        .transport(transport)
        .codec(codec)
        .controller(HoldPosition)
        .spawn()
        .unwrap();

    assert!(wait_until(Duration::from_secs(2), || driver.metrics().tx_sent == 20));

    let snap = driver.snapshot();
    assert_eq!(snap.session_state, SessionState::CommandingActive);
    assert_eq!(snap.joint_state.position, vec![0.5; 7]);

    let encoded = codec_handle.encoded();
    assert_eq!(encoded.len(), 20);
    for (i, cmd) in encoded.iter().enumerate() {
        assert_eq!(cmd.header.sequence_counter, i as u32);
        assert_eq!(cmd.header.reflected_sequence_counter, i as u32);
        assert_eq!(cmd.joint_position, Some(vec![0.5; 7]));
    }
}

#[test]
fn test_drop_stops_thread() {
    let (transport, handle) = MockTransport::with_handle();
    let (codec, _codec) = ScriptedCodec::with_handle();

    let control = FriDriverBuilder::new()
        .config(fast_config())
        .transport(transport)
        .codec(codec)
        .controller(HoldPosition)
        .build_loop()
        .unwrap();
    let driver = FriDriver::spawn(control, "fri_drop_test").unwrap();
    let ctx = driver.context().clone();

    drop(driver);

    assert!(!handle.is_open());
    assert_eq!(ctx.snapshot().link_state, LinkState::Disconnected);
}

#[test]
fn test_concurrent_snapshot_reads() {
    let (transport, _handle) = MockTransport::with_handle();
    let (codec, _codec) = ScriptedCodec::with_handle();

    let driver = FriDriverBuilder::new()
        .config(fast_config())
        .transport(transport)
        .codec(codec)
        .controller(HoldPosition)
        .spawn()
        .unwrap();

    let ctx = driver.context().clone();
    let readers: Vec<_> = (0..4)
        .map(|_| {
            let ctx = Arc::clone(&ctx);
            thread::spawn(move || {
                let mut last_tick = 0;
                for _ in 0..200 {
                    let snap = ctx.snapshot();
                    assert_eq!(snap.joint_state.position.len(), 7);
                    assert_eq!(snap.joint_command.effort.len(), 7);
                    assert!(snap.tick >= last_tick);
                    last_tick = snap.tick;
                    thread::yield_now();
                }
            })
        })
        .collect();

    for reader in readers {
        reader.join().unwrap();
    }
    drop(driver);
}

//! Integration tests for the device pollers
//!
//! All tests run against a scripted transport under paused tokio time, so
//! scheduling behaviour (thresholds, disconnect counting, cancellation,
//! reconnect probing) is deterministic.

use async_trait::async_trait;
use overton_device::error::{DeviceError, Result};
use overton_device::wire::SliderChannel::*;
use overton_device::{
    sliders, switches, ConnectionHealth, DeviceTransport, SliderFrame, SliderPollerConfig,
    StatusFrame, SwitchFrame, SwitchId, SwitchPollerConfig,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

// =============================================================================
// Scripted transport
// =============================================================================

enum SliderStep {
    Frame(SliderFrame),
    Fail,
    Hang,
}

enum SwitchStep {
    Frame(SwitchFrame),
    Fail,
}

#[derive(Clone, Default)]
struct FakeTransport {
    sliders: Arc<Mutex<VecDeque<SliderStep>>>,
    switches: Arc<Mutex<VecDeque<SwitchStep>>>,
    status: Arc<Mutex<VecDeque<bool>>>,
    hosts: Arc<Mutex<Vec<String>>>,
}

impl FakeTransport {
    fn push_frame(&self, a: f64, b: f64, c: f64, d: f64) {
        self.sliders
            .lock()
            .unwrap()
            .push_back(SliderStep::Frame(frame(a, b, c, d)));
    }

    fn push_fail(&self) {
        self.sliders.lock().unwrap().push_back(SliderStep::Fail);
    }

    fn push_hang(&self) {
        self.sliders.lock().unwrap().push_back(SliderStep::Hang);
    }

    fn push_switches(&self, switch1: u8, switch2: u8) {
        self.switches
            .lock()
            .unwrap()
            .push_back(SwitchStep::Frame(SwitchFrame { switch1, switch2 }));
    }

    fn push_switch_fail(&self, count: usize) {
        let mut script = self.switches.lock().unwrap();
        for _ in 0..count {
            script.push_back(SwitchStep::Fail);
        }
    }

    fn push_status(&self, ok: bool) {
        self.status.lock().unwrap().push_back(ok);
    }
}

fn frame(a: f64, b: f64, c: f64, d: f64) -> SliderFrame {
    let reading = |percentage: f64| overton_device::ChannelReading {
        raw: (percentage * 10.0) as i64,
        percentage,
    };
    SliderFrame {
        slider1: overton_device::SliderPair {
            channel_a: reading(a),
            channel_b: reading(b),
        },
        slider2: overton_device::SliderPair {
            channel_a: reading(c),
            channel_b: reading(d),
        },
    }
}

#[async_trait]
impl DeviceTransport for FakeTransport {
    async fn fetch_sliders(&self) -> Result<SliderFrame> {
        let step = self.sliders.lock().unwrap().pop_front();
        match step {
            Some(SliderStep::Frame(frame)) => Ok(frame),
            Some(SliderStep::Hang) => std::future::pending().await,
            Some(SliderStep::Fail) | None => Err(DeviceError::Timeout),
        }
    }

    async fn fetch_switches(&self) -> Result<SwitchFrame> {
        let step = self.switches.lock().unwrap().pop_front();
        match step {
            Some(SwitchStep::Frame(frame)) => Ok(frame),
            Some(SwitchStep::Fail) | None => Err(DeviceError::Timeout),
        }
    }

    async fn probe_status(&self) -> Result<StatusFrame> {
        let ok = self.status.lock().unwrap().pop_front().unwrap_or(false);
        if ok {
            Ok(StatusFrame {
                status: "ok".into(),
                uptime: 1,
            })
        } else {
            Err(DeviceError::Timeout)
        }
    }

    fn set_host(&self, host: &str) {
        self.hosts.lock().unwrap().push(host.to_string());
    }
}

// =============================================================================
// Analog poller
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_first_frame_fires_every_channel_then_threshold_applies() {
    let transport = FakeTransport::default();
    transport.push_frame(10.0, 20.0, 30.0, 40.0);
    // Jitter under the threshold on channel 1A: must not fire
    transport.push_frame(11.0, 20.0, 30.0, 40.0);
    // Crosses the threshold relative to the last *reported* value (10)
    transport.push_frame(13.0, 20.0, 30.0, 40.0);

    let mut handle = sliders::spawn(transport.clone(), SliderPollerConfig::default());

    let expected = [
        (Slider1A, 10.0),
        (Slider1B, 20.0),
        (Slider2A, 30.0),
        (Slider2B, 40.0),
    ];
    for (channel, percentage) in expected {
        let event = handle.events.recv().await.unwrap();
        assert_eq!((event.channel, event.percentage), (channel, percentage));
    }

    // The jitter frame produced nothing; the next event is the crossing
    let event = handle.events.recv().await.unwrap();
    assert_eq!((event.channel, event.percentage), (Slider1A, 13.0));
}

#[tokio::test(start_paused = true)]
async fn test_disconnect_after_three_failures_single_success_reconnects() {
    let transport = FakeTransport::default();
    transport.push_frame(50.0, 50.0, 50.0, 50.0);
    transport.push_fail();
    transport.push_fail();
    transport.push_fail();
    transport.push_frame(80.0, 50.0, 50.0, 50.0);

    let handle = sliders::spawn(transport.clone(), SliderPollerConfig::default());
    let mut health = handle.health.clone();

    health.wait_for(|h| h.connected).await.unwrap();
    health.wait_for(|h| !h.connected).await.unwrap();

    // One success is enough to come back
    let snapshot = *health.wait_for(|h| h.connected).await.unwrap();
    assert!(snapshot.connected);
}

#[tokio::test(start_paused = true)]
async fn test_superseded_request_is_not_a_failure() {
    let transport = FakeTransport::default();
    transport.push_frame(10.0, 10.0, 10.0, 10.0);
    // Three polls that never answer; each is superseded by the next tick
    transport.push_hang();
    transport.push_hang();
    transport.push_hang();
    transport.push_frame(50.0, 10.0, 10.0, 10.0);

    let mut handle = sliders::spawn(transport.clone(), SliderPollerConfig::default());

    for _ in 0..4 {
        handle.events.recv().await.unwrap();
    }
    let event = handle.events.recv().await.unwrap();
    assert_eq!((event.channel, event.percentage), (Slider1A, 50.0));

    // Two successes, zero recorded failures: still connected at full
    // strength. Had the superseded polls counted, the score would have
    // dropped and the connection flapped.
    assert_eq!(
        *handle.health.borrow(),
        ConnectionHealth {
            connected: true,
            strength: 5
        }
    );
}

#[tokio::test(start_paused = true)]
async fn test_address_change_resets_reported_values() {
    let transport = FakeTransport::default();
    transport.push_frame(10.0, 20.0, 30.0, 40.0);
    transport.push_frame(10.0, 20.0, 30.0, 40.0);

    let mut handle = sliders::spawn(transport.clone(), SliderPollerConfig::default());

    for _ in 0..4 {
        handle.events.recv().await.unwrap();
    }

    handle.set_address("10.0.0.9").await;

    // Identical readings fire again: the tracker forgot the old device
    for (channel, percentage) in [
        (Slider1A, 10.0),
        (Slider1B, 20.0),
        (Slider2A, 30.0),
        (Slider2B, 40.0),
    ] {
        let event = handle.events.recv().await.unwrap();
        assert_eq!((event.channel, event.percentage), (channel, percentage));
    }

    assert_eq!(*transport.hosts.lock().unwrap(), vec!["10.0.0.9".to_string()]);
}

// =============================================================================
// Digital poller
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_switch_initial_reading_and_changes_fire() {
    let transport = FakeTransport::default();
    transport.push_switches(1, 0);
    transport.push_switches(1, 0); // unchanged: silent
    transport.push_switches(1, 1);

    let mut handle = switches::spawn(transport.clone(), SwitchPollerConfig::default());

    let event = handle.events.recv().await.unwrap();
    assert_eq!((event.switch, event.state), (SwitchId::Switch1, 1));
    let event = handle.events.recv().await.unwrap();
    assert_eq!((event.switch, event.state), (SwitchId::Switch2, 0));

    let event = handle.events.recv().await.unwrap();
    assert_eq!((event.switch, event.state), (SwitchId::Switch2, 1));
}

#[tokio::test(start_paused = true)]
async fn test_switch_disconnect_then_reconnect_probe() {
    let transport = FakeTransport::default();
    transport.push_switches(0, 0);
    transport.push_switch_fail(5);
    // First probe misses, second finds the device
    transport.push_status(false);
    transport.push_status(true);
    transport.push_switches(0, 1);

    let mut handle = switches::spawn(transport.clone(), SwitchPollerConfig::default());
    let mut health = handle.health.clone();

    health.wait_for(|h| h.connected).await.unwrap();
    health.wait_for(|h| !h.connected).await.unwrap();
    health.wait_for(|h| h.connected).await.unwrap();

    // Regular polling resumed and picked up the changed switch
    // (switch2 flipped 0 -> 1; switch1 is unchanged and stays silent)
    loop {
        let event = handle.events.recv().await.unwrap();
        if event.switch == SwitchId::Switch2 && event.state == 1 {
            break;
        }
    }

    // Both probes were consumed
    assert!(transport.status.lock().unwrap().is_empty());
}

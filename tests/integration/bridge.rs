//! End-to-end data path tests.

use crate::helpers::*;
use midiboy::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

#[test]
fn test_controller_note_reaches_link_and_host() {
    init_tracing();
    let mut rig = test_rig();

    rig.feed(&[0x90, 0x40, 0x7F]);
    let summary = rig.bridge.poll();

    assert_eq!(summary.bytes, 3);
    assert_eq!(summary.controller_messages, 1);
    assert_eq!(summary.forwarded, 1);
    assert_eq!(rig.link.bytes(), vec![0x90, 0x40, 0x7F]);
    assert_eq!(rig.host.drain_messages(), vec![Message::note_on(0, 0x40, 0x7F)]);
}

#[test]
fn test_running_status_and_realtime_stream() {
    let mut rig = test_rig();

    // Note on, running-status note off, clock mid-message, SysEx, CC on ch2
    rig.feed(&[
        0x90, 0x40, 0x7F, 0x40, 0xF8, 0x00, 0xF0, 0x01, 0x02, 0xF7, 0xB1, 0x07, 0x64,
    ]);
    rig.bridge.poll();

    insta::assert_debug_snapshot!(rig.link.bytes(), @r###"
    [
        144,
        64,
        127,
        128,
        64,
        0,
        177,
        7,
        100,
    ]
    "###);

    let mirrored = rig.host.drain_messages();
    assert_eq!(
        mirrored,
        vec![
            Message::note_on(0, 0x40, 0x7F),
            Message::single(MessageKind::Clock),
            Message::note_off(0, 0x40, 0),
            Message::control_change(1, 0x07, 0x64),
        ]
    );
}

#[test]
fn test_host_messages_route_without_loopback() {
    let mut rig = test_rig();

    rig.host.send_message(&Message::note_on(2, 60, 90));
    rig.host.send_message(&Message::single(MessageKind::Start));
    let summary = rig.bridge.poll();

    assert_eq!(summary.host_messages, 2);
    assert_eq!(summary.forwarded, 1);
    assert_eq!(rig.link.bytes(), vec![0x92, 60, 90]);
    assert!(rig.host.recv_packet().is_none());
    assert_eq!(rig.bridge.stats().router.mirrored, 0);
}

#[test]
fn test_unmounted_host_drops_mirror_but_not_link() {
    let mut rig = test_rig();
    rig.host.unmount();

    rig.feed(&[0x91, 0x30, 0x40]);
    rig.bridge.poll();

    assert_eq!(rig.link.bytes(), vec![0x91, 0x30, 0x40]);
    assert!(!rig.bridge.is_host_mounted());
    let stats = rig.bridge.stats();
    assert_eq!(stats.router.mirror_drops, 1);
    assert_eq!(stats.host_bus.tx_drops, 1);
}

#[test]
fn test_pacing_between_link_bytes() {
    let mut rig = rig_with(Bridge::builder());
    assert_eq!(
        rig.bridge.config().link.min_byte_gap,
        Duration::from_micros(500)
    );

    // Three 3-byte messages: nine link bytes
    rig.feed(&[0x90, 60, 100, 0x91, 62, 100, 0x92, 64, 100]);
    let start = Instant::now();
    rig.bridge.poll();
    let span = start.elapsed();

    let stamps = rig.link.timestamps();
    assert_eq!(stamps.len(), 9);
    assert!(span >= Duration::from_micros(500) * 8);
    for pair in stamps.windows(2) {
        assert!(pair[1] - pair[0] >= Duration::from_micros(500));
    }
}

#[test]
fn test_ring_overflow_counted_and_resynchronized() {
    init_tracing();
    let mut rig = rig_with(
        Bridge::builder()
            .ring_capacity(8)
            .link_config(fast_link_config()),
    );

    // 7 fit, the last 3 are lost mid-message
    rig.feed(&[0x90, 0x40, 0x7F, 0x91, 0x41, 0x7F, 0x92, 0x42, 0x7F, 0x93]);
    let summary = rig.bridge.poll();
    assert_eq!(summary.bytes, 7);

    let stats = rig.bridge.stats();
    assert_eq!(stats.ring.overflows, 3);
    assert_eq!(stats.ring.received, 10);

    // A fresh status byte recovers the stream
    rig.feed(&[0x93, 0x43, 0x7F]);
    rig.bridge.poll();
    assert_eq!(
        rig.link.bytes(),
        vec![0x90, 0x40, 0x7F, 0x91, 0x41, 0x7F, 0x93, 0x43, 0x7F]
    );
}

#[test]
fn test_tap_observes_controller_messages() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut rig = rig_with(Bridge::builder().link_config(fast_link_config()).tap({
        let seen = Arc::clone(&seen);
        move |message: &Message| seen.lock().unwrap().push(*message)
    }));

    rig.feed(&[0xC5, 0x10, 0xFC]);
    rig.host.send_message(&Message::note_on(0, 1, 1));
    rig.bridge.poll();

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            Message::program_change(5, 0x10),
            Message::single(MessageKind::Stop),
        ]
    );
}

#[test]
fn test_byte_tap_sees_every_drained_byte() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut rig = rig_with(Bridge::builder().link_config(fast_link_config()).byte_tap({
        let seen = Arc::clone(&seen);
        move |byte: u8| seen.lock().unwrap().push(byte)
    }));

    // Stray data, a SysEx block, then a note on
    let stream = [0x12, 0x34, 0xF0, 0x7E, 0x01, 0xF7, 0x90, 0x40, 0x7F];
    rig.feed(&stream);
    rig.host.send_message(&Message::note_on(1, 1, 1));
    let summary = rig.bridge.poll();

    assert_eq!(*seen.lock().unwrap(), stream.to_vec());
    assert_eq!(summary.controller_messages, 1);
    assert_eq!(rig.bridge.stats().parser.discarded, 4);
}

#[test]
fn test_byte_tap_skips_overflowed_bytes() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut rig = rig_with(
        Bridge::builder()
            .ring_capacity(4)
            .link_config(fast_link_config())
            .byte_tap({
                let seen = Arc::clone(&seen);
                move |byte: u8| seen.lock().unwrap().push(byte)
            }),
    );

    rig.feed(&[0xF8, 0xFA, 0xFC, 0xFE, 0xFF]);
    rig.bridge.poll();

    assert_eq!(*seen.lock().unwrap(), vec![0xF8, 0xFA, 0xFC]);
}

#[test]
fn test_indicator_pulses_per_forward() {
    let pulses = PulseCounter::new();
    let mut rig = rig_with(
        Bridge::builder()
            .link_config(fast_link_config())
            .indicator(pulses.clone()),
    );

    rig.feed(&[0x90, 1, 1, 0x9F, 1, 1, 0x84, 1, 0]);
    rig.bridge.poll();

    assert_eq!(pulses.count(), 2);
}

#[test]
fn test_run_until_stopped() {
    let link = RecordingLink::new();
    let (bus, host) = memory_host_bus(16).unwrap();
    host.mount();
    let (mut bridge, mut uart) = Bridge::builder()
        .link_config(fast_link_config())
        .link(link.clone())
        .host_bus(bus)
        .build()
        .unwrap();

    let running = Arc::new(AtomicBool::new(true));
    let poller = thread::Builder::new()
        .name("bridge-poll".to_string())
        .spawn({
            let running = Arc::clone(&running);
            move || {
                bridge.run(&running);
                bridge
            }
        })
        .unwrap();

    for byte in [0x93, 0x24, 0x50, 0x83, 0x24, 0x00] {
        while !uart.push(byte) {
            thread::yield_now();
        }
    }

    let deadline = Instant::now() + Duration::from_secs(2);
    while link.bytes().len() < 6 && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(1));
    }
    running.store(false, Ordering::Release);
    let bridge = poller.join().unwrap();

    assert_eq!(link.bytes(), vec![0x93, 0x24, 0x50, 0x83, 0x24, 0x00]);
    assert_eq!(bridge.stats().link_bytes_sent, 6);
    assert_eq!(host.drain_messages().len(), 2);
}

#[test]
fn test_reset_stats() {
    let mut rig = test_rig();
    rig.feed(&[0x90, 0x40, 0x7F, 0x40]);
    rig.bridge.poll();
    assert_ne!(rig.bridge.stats().parser, Default::default());

    rig.bridge.reset_stats();
    let stats = rig.bridge.stats();
    assert_eq!(stats.parser.messages, 0);
    assert_eq!(stats.router, Default::default());
    assert_eq!(stats.ring.received, 0);
    assert_eq!(stats.link_bytes_sent, 3);

    // Parser state survives the reset; running status still applies
    rig.feed(&[0x00]);
    rig.bridge.poll();
    assert_eq!(&rig.link.bytes()[3..], &[0x80, 0x40, 0x00]);
}

#[test]
fn test_stats_serialize() {
    let mut rig = test_rig();
    rig.feed(&[0xF8]);
    rig.bridge.poll();

    let encoded = bincode::serialize(&rig.bridge.stats()).unwrap();
    assert!(!encoded.is_empty());
}

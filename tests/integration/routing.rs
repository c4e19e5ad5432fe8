//! Channel policy as observed on the link.

use crate::helpers::*;
use midiboy::prelude::*;
use std::thread;

#[test]
fn test_default_map_external_five_is_poly() {
    let mut rig = test_rig();

    // External channel 5 is nibble 4
    rig.feed(&[0x94, 0x3C, 0x64]);
    rig.bridge.poll();

    assert_eq!(rig.link.bytes(), vec![0x90 | POLY, 0x3C, 0x64]);
}

#[test]
fn test_default_map_external_six_is_dropped() {
    let mut rig = test_rig();

    rig.feed(&[0x95, 0x3C, 0x64]);
    rig.bridge.poll();

    let stats = rig.bridge.stats();
    assert!(rig.link.bytes().is_empty());
    assert_eq!(stats.link_bytes_sent, 0);
    assert_eq!(stats.router.dropped, 1);
    assert_eq!(rig.host.drain_messages(), vec![Message::note_on(5, 0x3C, 0x64)]);
}

#[test]
fn test_every_voice_kind_is_rewritten() {
    let map = ChannelMap::disabled().with_mapping(12, WAVE).unwrap();
    let mut rig = rig_with(
        Bridge::builder()
            .link_config(fast_link_config())
            .channel_map(map),
    );

    for message in [
        Message::note_off(12, 1, 2),
        Message::note_on(12, 3, 4),
        Message::poly_pressure(12, 5, 6),
        Message::control_change(12, 7, 8),
        Message::program_change(12, 9),
        Message::channel_pressure(12, 10),
        Message::pitch_bend(12, 0x2000),
    ] {
        rig.feed(message.bytes());
    }
    rig.bridge.poll();

    insta::assert_debug_snapshot!(rig.link.bytes(), @r###"
    [
        130,
        1,
        2,
        146,
        3,
        4,
        162,
        5,
        6,
        178,
        7,
        8,
        194,
        9,
        210,
        10,
        226,
        0,
        64,
    ]
    "###);
}

#[test]
fn test_system_messages_never_reach_link() {
    let mut rig = test_rig();

    rig.feed(&[0xF1, 0x10, 0xF2, 0x00, 0x10, 0xF3, 0x02, 0xF6, 0xFA, 0xFC]);
    rig.host.send_message(&Message::single(MessageKind::Continue));
    let summary = rig.bridge.poll();

    assert_eq!(summary.controller_messages, 6);
    assert_eq!(summary.forwarded, 0);
    assert!(rig.link.bytes().is_empty());
    assert_eq!(rig.host.drain_messages().len(), 6);
}

#[test]
fn test_disabled_internal_channel() {
    let mut rig = test_rig();
    rig.bridge
        .channel_map()
        .update(|map| map.set_enabled(PULSE_2, false))
        .unwrap();

    rig.feed(&[0x91, 0x30, 0x40, 0x90, 0x30, 0x40]);
    rig.bridge.poll();

    assert_eq!(rig.link.bytes(), vec![0x90, 0x30, 0x40]);
    assert_eq!(rig.bridge.stats().router.dropped, 1);
}

#[test]
fn test_map_replaced_from_housekeeping_thread() {
    let mut rig = test_rig();
    let handle = rig.bridge.channel_map().clone();

    thread::spawn(move || {
        let map = ChannelMap::disabled()
            .with_mapping(7, NOISE)
            .unwrap()
            .with_mapping(8, NOISE)
            .unwrap();
        handle.store(map).unwrap();
    })
    .join()
    .unwrap();

    rig.feed(&[0x97, 0x20, 0x7F, 0x98, 0x21, 0x7F, 0x90, 0x22, 0x7F]);
    rig.bridge.poll();

    assert_eq!(
        rig.link.bytes(),
        vec![0x93, 0x20, 0x7F, 0x93, 0x21, 0x7F]
    );

    rig.bridge.channel_map().reset();
    rig.feed(&[0x90, 0x22, 0x7F]);
    rig.bridge.poll();
    assert_eq!(rig.link.bytes().len(), 9);
}

#[test]
fn test_rejected_map_update_keeps_routing() {
    let mut rig = test_rig();
    let result = rig.bridge.channel_map().update(|map| map.map(0, 9));
    assert!(result.is_err());

    rig.feed(&[0x90, 0x10, 0x10]);
    rig.bridge.poll();
    assert_eq!(rig.link.bytes(), vec![0x90, 0x10, 0x10]);
}

//! # Bridge Loopback
//!
//! Run the full data path against software transports: a thread plays the
//! serial interrupt, a clocked link stands in for the Game Boy, and an
//! in-memory host bus plays the USB host.
//!
//! **Concepts:** Builder, ring producer hand-off, channel map, run loop
//!
//! ```bash
//! cargo run --example bridge_loopback
//! ```

use midiboy::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn main() -> midiboy::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let (link, wire) = ClockedLink::spawn(DEFAULT_BIT_CLOCK_HZ)?;
    let (bus, host) = memory_host_bus(64)?;
    host.mount();

    // Drums on external channel 10 go to the noise channel too
    let map = ChannelMap::default().with_mapping(9, NOISE)?;

    let (mut bridge, mut uart) = Bridge::builder()
        .channel_map(map)
        .link(link)
        .host_bus(bus)
        .build()?;

    let running = Arc::new(AtomicBool::new(true));
    let poller = thread::spawn({
        let running = Arc::clone(&running);
        move || {
            bridge.run(&running);
            bridge
        }
    });

    // Controller: chord on channel 1 with running status, a clock tick,
    // a kick on channel 10 and a note on unmapped channel 6
    let controller = [
        0x90, 60, 100, 64, 100, 67, 100, 0xF8, 0x99, 36, 127, 0x95, 72, 80,
    ];
    for byte in controller {
        while !uart.push(byte) {
            thread::yield_now();
        }
    }

    // Host: pitch bend on channel 3 (wave)
    host.send_message(&Message::pitch_bend(2, 0x3000));

    thread::sleep(Duration::from_millis(50));
    running.store(false, Ordering::Release);
    let bridge = poller
        .join()
        .map_err(|_| std::io::Error::other("poll thread panicked"))?;

    let link_bytes: Vec<String> = wire.try_iter().map(|b| format!("{:02X}", b)).collect();
    println!("Link:   {}", link_bytes.join(" "));

    for message in host.drain_messages() {
        println!("Mirror: {:?} {:02X?}", message.kind(), message.bytes());
    }

    let stats = bridge.stats();
    println!(
        "Forwarded {} / dropped {} / mirrored {}",
        stats.router.forwarded, stats.router.dropped, stats.router.mirrored
    );

    Ok(())
}

//! Sequencing walkthrough
//!
//! Demonstrates the news / ad / banner transition protocol without a video
//! backend or a device.
//!
//! Run with: cargo run -p overton-core --example sequencing_demo

use overton_core::{Position, Sequencer, SequencerConfig, SourceCatalog};
use std::time::{Duration, Instant};

fn main() {
    println!("Overton Core - Sequencing Example");
    println!("=================================\n");

    let mut sequencer = Sequencer::new(
        SequencerConfig::default(),
        SourceCatalog::default(),
        Position::new("collective", "progressive"),
    );
    let mut now = Instant::now();

    show("startup", &sequencer, now);

    // A normal cycle: the news clip runs out, an ad plays, news returns
    let _ = sequencer.handle_finished(now);
    show("news finished", &sequencer, now);

    let _ = sequencer.handle_finished(now);
    show("ad finished", &sequencer, now);

    // A visitor drags the economic slider while news is playing: the cut
    // goes through the neutral banner and the new position waits
    let _ = sequencer.request_position_change(Position::new("neoliberal", "progressive"), now);
    show("position change requested", &sequencer, now);

    // The cooldown clears on its own; the banner keeps playing
    now += Duration::from_secs(1);
    show("after cooldown", &sequencer, now);

    // When the banner finishes the pending position is committed
    let _ = sequencer.handle_finished(now);
    show("banner finished", &sequencer, now);
}

fn show(label: &str, sequencer: &Sequencer, now: Instant) {
    let directive = sequencer.directive(now);
    println!("{label}:");
    println!("  content:     {}", sequencer.content());
    println!("  position:    {}", sequencer.active_position());
    if let Some(pending) = sequencer.pending_position() {
        println!("  pending:     {pending}");
    }
    println!("  source:      {} (v{})", directive.source, directive.version);
    println!(
        "  transition:  {}",
        if sequencer.is_transitioning(now) {
            "in progress"
        } else {
            "none"
        }
    );
    println!();
}

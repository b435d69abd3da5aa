//! Headless frame-loop runner: drives the engine exactly the way a render
//! thread would (wait → step → go), printing events and notifications.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

use engine_control::BasicPilot;
use engine_core::{
    EventKind, GovernmentId, InputCapture, MessageLog, NullAudio, PlayerState, ShipEvent,
    Simulation,
};
use engine_runtime::Engine;

#[derive(Parser)]
#[command(name = "engine_cli", about = "Space combat engine headless runner")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the engine for a fixed number of frames.
    Run {
        #[arg(long, default_value_t = 600)]
        frames: u64,
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Load content from a directory of JSON files instead of the
        /// built-in demo world.
        #[arg(long)]
        content_dir: Option<String>,
        /// Print a world summary every N frames (0 disables).
        #[arg(long, default_value_t = 120)]
        print_every: u64,
        /// Dump the final frame snapshot as JSON.
        #[arg(long)]
        dump_frame: bool,
    },
}

fn event_label(kind: EventKind) -> &'static str {
    match kind {
        EventKind::Jump => "jump",
        EventKind::Damage => "damage",
        EventKind::Disable => "disable",
        EventKind::Destroy => "destroy",
        EventKind::Board => "board",
        EventKind::Assist => "assist",
        EventKind::ScanOutfits => "scan-outfits",
        EventKind::ScanCargo => "scan-cargo",
    }
}

fn print_events(frame: u64, events: &[ShipEvent]) {
    for event in events {
        // Damage events are too chatty for a console log.
        if event.kind == EventKind::Damage {
            continue;
        }
        println!("[{frame:>6}] {} -> {}", event_label(event.kind), event.target);
    }
}

#[allow(clippy::too_many_lines)]
fn run(
    frames: u64,
    seed: u64,
    content_dir: Option<&str>,
    print_every: u64,
    dump_frame: bool,
) -> Result<()> {
    let content = match content_dir {
        Some(dir) => {
            let content = engine_world::load_content(dir)
                .with_context(|| format!("loading content from {dir}"))?;
            engine_world::validate_content(&content);
            content
        }
        None => engine_world::demo_content(),
    };
    info!(version = %content.content_version, seed, "starting run");

    // The demo world starts in Harbor; generic content starts in its
    // alphabetically first system.
    let start_system = if content_dir.is_none() {
        engine_core::SystemId("harbor".to_string())
    } else {
        content
            .systems
            .keys()
            .min()
            .cloned()
            .context("content has no systems")?
    };

    let player = PlayerState::new(GovernmentId("player".to_string()), start_system);
    let pilot = BasicPilot::new(&content);
    let messages = MessageLog::new();
    let mut sim = Simulation::new(
        content,
        player,
        Box::new(pilot),
        Box::new(NullAudio),
        Box::new(messages.clone()),
        Box::new(ChaCha8Rng::seed_from_u64(seed)),
    );
    engine_world::deploy_start(&mut sim);

    let engine = Engine::new(sim);
    let mut totals: std::collections::BTreeMap<&'static str, u64> = std::collections::BTreeMap::new();
    for frame in 0..frames {
        engine.wait();
        let events = engine.step(InputCapture::default());
        for event in &events {
            *totals.entry(event_label(event.kind)).or_insert(0) += 1;
        }
        print_events(frame, &events);
        for message in messages.drain() {
            println!("[{frame:>6}] {message}");
        }
        engine.go();

        if print_every > 0 && frame > 0 && frame % print_every == 0 {
            let snapshot = engine.snapshot();
            println!(
                "[{frame:>6}] drawing {} bodies, {} radar contacts, load {:.3}",
                snapshot.draw.len(),
                snapshot.radar.len(),
                snapshot.load,
            );
        }
    }
    engine.wait();

    println!("--- run complete: {frames} frames, seed {seed} ---");
    for (label, count) in &totals {
        println!("{label:>14}: {count}");
    }
    if dump_frame {
        let snapshot = engine.snapshot();
        println!(
            "{}",
            serde_json::to_string_pretty(&*snapshot).context("serializing final frame")?
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            frames,
            seed,
            content_dir,
            print_every,
            dump_frame,
        } => run(frames, seed, content_dir.as_deref(), print_every, dump_frame),
    }
}

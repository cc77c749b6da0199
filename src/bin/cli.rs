//! gbtracker CLI: headless playback and WAV export of the demo songs.
//!
//! Usage:
//!   gbt-cli --list
//!   gbt-cli --demo chiptune
//!   gbt-cli --demo slides --wav slides.wav --seconds 30

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use gbt_master::{demo, render_to_wav, Module, Player, PlayerConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[cfg(feature = "alloc_check")]
#[global_allocator]
static A: assert_no_alloc::AllocDisabler = assert_no_alloc::AllocDisabler;

#[derive(Parser, Debug)]
#[command(name = "gbt-cli", about = "Play gbtracker songs")]
struct Args {
    /// Demo song to play
    #[arg(long, default_value = "chiptune")]
    demo: String,

    /// List the demo songs and exit
    #[arg(long)]
    list: bool,

    /// Render to a WAV file instead of playing
    #[arg(long, value_name = "PATH")]
    wav: Option<PathBuf>,

    /// Length limit for playback and rendering
    #[arg(long, default_value_t = 60)]
    seconds: u32,

    /// Order to start from
    #[arg(long, default_value_t = 0)]
    order: u8,

    /// Row to start from
    #[arg(long, default_value_t = 0)]
    row: u8,

    /// TOML file with player settings
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if args.list {
        for name in demo::song_names() {
            println!("{name}");
        }
        return Ok(());
    }

    let config = match &args.config {
        Some(path) => PlayerConfig::load(path)?,
        None => PlayerConfig::default(),
    };
    let Some(module) = demo::build(&args.demo) else {
        bail!(
            "unknown demo {:?}, expected one of: {}",
            args.demo,
            demo::song_names().join(", ")
        );
    };

    print_summary(&module);

    match &args.wav {
        Some(path) => export(&module, &config, &args, path),
        None => play(module, config, &args),
    }
}

fn print_summary(module: &Module) {
    let song = &module.song;
    println!("Title:       {}", song.name);
    println!("Orders:      {}", song.order_count());
    println!("Rows:        {}", song.pattern_size);
    println!("Speed:       {:#04x}", song.speed);
    println!("Instruments: {}", module.instruments.len());
    println!("Waveforms:   {}", module.waveforms.len());
    println!();
    print!("{}", gbt_master::analyze(song));
    println!();
}

fn export(module: &Module, config: &PlayerConfig, args: &Args, path: &PathBuf) -> Result<()> {
    if args.order != 0 || args.row != 0 {
        bail!("--order and --row only apply to live playback");
    }
    info!(path = %path.display(), sample_rate = config.sample_rate, "rendering");
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut w = BufWriter::new(file);
    let frames = render_to_wav(module, config, args.seconds, &mut w)?;
    w.flush()?;
    println!(
        "Rendered {:.1}s to {}",
        frames as f64 / config.sample_rate as f64,
        path.display()
    );
    Ok(())
}

fn play(module: Module, config: PlayerConfig, args: &Args) -> Result<()> {
    let mut player = Player::new(config)?;
    player.play(Arc::new(module), args.order, args.row)?;
    println!("Playing...");

    let limit = Duration::from_secs(args.seconds as u64);
    let started = std::time::Instant::now();
    while player.is_playing() && started.elapsed() < limit {
        if let Some(pos) = player.position() {
            print!(
                "\rOrd: {:02X} | Row: {:02X} | Speed: {:02X}",
                pos.order, pos.row, pos.speed
            );
            let _ = std::io::stdout().flush();
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    player.stop();

    println!("\rDone.                              ");
    Ok(())
}

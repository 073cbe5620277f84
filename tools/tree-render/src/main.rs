//! tree-render: renders the spiral tree to a PNG still or a looping GIF.
//!
//! Usage:
//!   tree-render still [-o tree.png]
//!   tree-render animate [-o tree-glow.gif]
//!   tree-render config > tree.json

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueHint};
use glow_tree::{render_animation, render_still, save_png, Error, GifWriter, OutputFormat, TreeConfig};
use log::{error, info};

#[derive(Parser)]
#[command(author, version, about = "Render a glowing spiral Christmas tree")]
struct Cli {
    /// JSON config file; missing fields keep their defaults
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Output width in pixels
    #[arg(long, global = true)]
    width: Option<u32>,

    /// Output height in pixels
    #[arg(long, global = true)]
    height: Option<u32>,

    /// Number of animation frames
    #[arg(long, global = true)]
    frames: Option<usize>,

    /// Camera elevation in degrees
    #[arg(long, global = true, allow_negative_numbers = true)]
    elevation: Option<f64>,

    /// Camera azimuth in degrees
    #[arg(long, global = true, allow_negative_numbers = true)]
    azimuth: Option<f64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render the static tree with its shadows
    Still {
        #[arg(short, long, default_value = "tree.png", value_hint = ValueHint::FilePath)]
        output: PathBuf,
    },

    /// Render the rotating glow animation
    Animate {
        #[arg(short, long, default_value = "tree-glow.gif", value_hint = ValueHint::FilePath)]
        output: PathBuf,
    },

    /// Print the effective config as JSON
    Config,
}

fn load_config(cli: &Cli) -> glow_tree::Result<TreeConfig> {
    let mut config = match &cli.config {
        Some(path) => TreeConfig::from_json_file(path)?,
        None => TreeConfig::default(),
    };
    if let Some(w) = cli.width {
        config.width = w;
    }
    if let Some(h) = cli.height {
        config.height = h;
    }
    if let Some(n) = cli.frames {
        config.animation.frames = n;
    }
    for view in [&mut config.still.view, &mut config.glow.view] {
        if let Some(e) = cli.elevation {
            view.elevation_deg = e;
        }
        if let Some(a) = cli.azimuth {
            view.azimuth_deg = a;
        }
    }
    config.validate()?;
    Ok(config)
}

fn expect_format(output: &Path, wanted: OutputFormat) -> glow_tree::Result<()> {
    if OutputFormat::from_path(output)? == wanted {
        Ok(())
    } else {
        Err(Error::UnsupportedFormat(output.to_path_buf()))
    }
}

fn run(cli: &Cli) -> glow_tree::Result<()> {
    let config = load_config(cli)?;
    match &cli.command {
        Command::Still { output } => {
            expect_format(output, OutputFormat::Png)?;
            info!("rendering still tree at {}x{}", config.width, config.height);
            save_png(&render_still(&config), output)
        }
        Command::Animate { output } => {
            expect_format(output, OutputFormat::Gif)?;
            info!(
                "rendering {} frames at {}x{}",
                config.animation.frames, config.width, config.height
            );
            let writer = GifWriter::create(
                output,
                config.animation.gif_speed,
                config.animation.timing.repeat,
            )?;
            render_animation(&config, writer)?;
            Ok(())
        }
        Command::Config => {
            println!("{}", config.to_json_pretty()?);
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

use clap::{Parser, Subcommand};
use std::io::stdin;
use std::path::{Path, PathBuf};
use vehicle_speed::capture::{PointCapture, RecordingCapture, ScriptedCapture, TerminalCapture};
use vehicle_speed::config::SessionConfig;
use vehicle_speed::frames::{list_frames, FrameId, FramePair};
use vehicle_speed::io::{object_from_json, object_to_json, write_report};
use vehicle_speed::replay::{find_sessions, replay_all, RecordedSession};
use vehicle_speed::session::{CalibrationPlan, Session, SpeedReport};

#[derive(Parser)]
#[command(version, about, author)]
struct VspeedCli {
    #[command(subcommand)]
    command: Commands,

    /// Session configuration JSON
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Folder holding the numbered frames
    #[arg(long, global = true)]
    data_folder: Option<PathBuf>,

    /// Seconds between the two frames
    #[arg(long, global = true)]
    delta_t: Option<f64>,

    /// Clicks per vehicle point (1 or 3 are typical)
    #[arg(long, global = true)]
    clicks: Option<usize>,

    /// Number of one-meter marking pairs to click
    #[arg(long, global = true)]
    marking_pairs: Option<usize>,

    /// Replay clicks from a capture script instead of reading stdin
    #[arg(long, global = true)]
    script: Option<PathBuf>,

    /// Save the session so it can be replayed
    #[arg(long, global = true)]
    record: Option<PathBuf>,

    /// Write the report here (.json, anything else is plain text)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Scale from road markings one meter apart
    Markings {
        #[arg(long)]
        frame_a: u32,
        #[arg(long)]
        frame_b: u32,
        /// Frame showing the markings, defaults to the configured one
        #[arg(long)]
        reference_frame: Option<u32>,
    },
    /// Scale from a vehicle of known length
    KnownLength {
        #[arg(long)]
        reference_frame: u32,
        /// Real vehicle length in meters
        #[arg(long)]
        length: f64,
        #[arg(long)]
        frame_a: u32,
        #[arg(long)]
        frame_b: u32,
    },
    /// Re-estimate recorded sessions matching a glob pattern
    Replay { pattern: String },
}

fn load_config(cli: &VspeedCli) -> Result<SessionConfig, Box<dyn std::error::Error>> {
    let mut config: SessionConfig = match &cli.config {
        Some(path) => object_from_json(path)?,
        None => SessionConfig::default(),
    };
    if let Some(folder) = &cli.data_folder {
        config.data_folder = folder.clone();
    }
    if let Some(delta_t) = cli.delta_t {
        config.delta_t = delta_t;
    }
    if let Some(clicks) = cli.clicks {
        config.head_clicks = clicks;
        config.length_clicks = clicks;
    }
    if let Some(pairs) = cli.marking_pairs {
        config.marking_pairs = pairs;
    }
    config.validate()?;
    Ok(config)
}

fn save_reports(output: &Path, reports: &[SpeedReport]) -> Result<(), Box<dyn std::error::Error>> {
    if output.extension().is_some_and(|e| e == "json") {
        object_to_json(output, &reports)?;
    } else {
        write_report(output, reports)?;
    }
    log::info!("report written to {}", output.display());
    Ok(())
}

fn estimate_once(
    cli: &VspeedCli,
    config: SessionConfig,
    plan: CalibrationPlan,
    frames: FramePair,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Ok(available) = list_frames(&config) {
        log::debug!("{} frames in {}", available.len(), config.data_folder.display());
    }
    let session = Session::new(&config)?;
    let mut source: Box<dyn PointCapture> = match &cli.script {
        Some(path) => Box::new(ScriptedCapture::new(object_from_json(path)?)),
        None => Box::new(TerminalCapture::new(stdin().lock())),
    };
    let mut capture = RecordingCapture::new(source.as_mut());
    let report = session.run(&plan, &frames, &mut capture)?;
    println!("{}", report.summary());

    if let Some(record) = &cli.record {
        let recorded = RecordedSession {
            config: config.clone(),
            plan,
            frames,
            script: capture.into_script(),
        };
        object_to_json(record, &recorded)?;
        log::info!("session recorded to {}", record.display());
    }
    if let Some(output) = &cli.output {
        save_reports(output, &[report])?;
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = VspeedCli::parse();
    let config = load_config(&cli)?;

    match &cli.command {
        Commands::Markings {
            frame_a,
            frame_b,
            reference_frame,
        } => {
            let reference = FrameId::Index(reference_frame.unwrap_or(config.reference_frame));
            let plan = CalibrationPlan::ReferenceMarkings { reference };
            let frames = FramePair::new(FrameId::Index(*frame_a), FrameId::Index(*frame_b));
            estimate_once(&cli, config, plan, frames)?;
        }
        Commands::KnownLength {
            reference_frame,
            length,
            frame_a,
            frame_b,
        } => {
            let plan = CalibrationPlan::KnownLength {
                reference: FrameId::Index(*reference_frame),
                real_length_m: *length,
            };
            let frames = FramePair::new(FrameId::Index(*frame_a), FrameId::Index(*frame_b));
            estimate_once(&cli, config, plan, frames)?;
        }
        Commands::Replay { pattern } => {
            let paths = find_sessions(pattern)?;
            log::info!("replaying {} session(s)", paths.len());
            let mut reports = Vec::new();
            let mut failed = 0;
            for (path, result) in replay_all(&paths) {
                match result {
                    Ok(report) => {
                        println!("{}: {}", path.display(), report.summary());
                        reports.push(report);
                    }
                    Err(e) => {
                        log::error!("{}: {}", path.display(), e);
                        failed += 1;
                    }
                }
            }
            if let Some(output) = &cli.output {
                save_reports(output, &reports)?;
            }
            if failed > 0 {
                return Err(format!("{} of {} session(s) failed", failed, paths.len()).into());
            }
        }
    }
    Ok(())
}

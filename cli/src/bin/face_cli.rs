use clap::{Parser, Subcommand};
use cli::{read_document, transform_job, ErrorReport, JobConfig};
use color_eyre::eyre::Result;
use face_common::{JsonLandmarkProvider, LandmarkProvider};
use feminize::{EditCommand, EditSession, FeminizeConfig, FeminizeError, StageKind};
use std::path::{Path, PathBuf};
use strum::IntoEnumIterator;
use tracing::{error, info};
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Transform one photograph
    Transform {
        #[arg(short, long)]
        input: PathBuf,
        /// Landmark JSON produced by the detector
        #[arg(short, long)]
        landmarks: PathBuf,
        #[arg(short, long)]
        output_dir: PathBuf,
        /// Hairstyle image on a plain background
        #[arg(long)]
        hairstyle: Option<PathBuf>,
        /// Stage parameters (.toml or .json)
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
    /// Transform using a job file
    Run {
        /// Path to the job configuration (.toml or .json)
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Replay a list of edit commands
    Edit {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        landmarks: PathBuf,
        /// JSON array of edit commands
        #[arg(short, long)]
        script: PathBuf,
        #[arg(long)]
        hairstyle: Option<PathBuf>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// List stages in pipeline order
    Stages,
    /// Print the JSON schemas of edit commands and stage parameters
    Schema,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    let cli = Cli::parse();

    // workers abandoned at a timeout are not waited for
    let runtime = tokio::runtime::Runtime::new()?;
    let outcome = runtime.block_on(dispatch(cli));
    runtime.shutdown_background();
    outcome
}

async fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Transform { input, landmarks, output_dir, hairstyle, config, timeout_secs } => {
            let feminize = match config {
                Some(path) => read_document::<FeminizeConfig, _>(path)?,
                None => FeminizeConfig::default(),
            };
            let job = JobConfig { input, landmarks, output_dir, hairstyle, timeout_secs, feminize };
            transform(job).await?;
        }
        Commands::Run { config } => {
            let job = JobConfig::from_file(&config)?;
            info!("Job: {:?}", job);
            transform(job).await?;
        }
        Commands::Edit { input, landmarks, script, hairstyle, config } => {
            edit(&input, &landmarks, &script, hairstyle, config)?;
        }
        Commands::Stages => {
            for kind in StageKind::iter() {
                println!("{:<8} {}", kind.to_string(), kind.phase());
            }
        }
        Commands::Schema => {
            let schemas = serde_json::json!({
                "edit_command": EditCommand::schema(),
                "feminize_config": FeminizeConfig::schema(),
            });
            println!("{}", serde_json::to_string_pretty(&schemas)?);
        }
    }

    Ok(())
}

/// Run a job under its time budget and print the outcome as JSON
async fn transform(job: JobConfig) -> Result<()> {
    match transform_job(job).await {
        Ok(report) => {
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Err(e) => {
            error!("Transformation failed: {}", e);
            println!("{}", serde_json::to_string_pretty(&ErrorReport::from(&e))?);
            Err(e.into())
        }
    }
}

fn edit(
    input: &Path,
    landmarks: &Path,
    script: &Path,
    hairstyle: Option<PathBuf>,
    config: Option<PathBuf>,
) -> Result<()> {
    let feminize = match config {
        Some(path) => read_document::<FeminizeConfig, _>(path)?,
        None => FeminizeConfig::default(),
    };
    let job = JobConfig {
        input: input.to_path_buf(),
        landmarks: landmarks.to_path_buf(),
        output_dir: PathBuf::new(),
        hairstyle,
        timeout_secs: None,
        feminize,
    };
    let commands: Vec<EditCommand> = read_document(script)?;

    let image = image::open(input).map_err(FeminizeError::Input)?.to_rgb8();
    let landmarks = JsonLandmarkProvider::new(landmarks)
        .detect(&image)?
        .ok_or(FeminizeError::NoFaceDetected)?;
    let mut session = EditSession::new(image, landmarks, job.pipeline()?);

    for command in commands {
        info!("{}: {}", command, command.description());
        let state = session.execute(command)?;
        println!("{}", serde_json::to_string(&state)?);
    }
    Ok(())
}

use face_common::JsonLandmarkProvider;
use feminize::{FeminizeConfig, FeminizeError, Feminizer, Pipeline};
use schemars::JsonSchema;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    SerdeError(#[from] serde_json::Error),
    #[error(transparent)]
    TomlDeError(#[from] toml::de::Error),
    #[error(transparent)]
    TomlSerError(#[from] toml::ser::Error),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error(transparent)]
    Feminize(#[from] FeminizeError),
    #[error("Transformation did not finish within {0:?}")]
    Timeout(Duration),
    #[error("Run was cancelled before its output was written")]
    Cancelled,
    #[error("Worker task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
    #[error("Unsupported file format. Please use .toml or .json files")]
    UnsupportedFileFormat,
}

impl CliError {
    /// Machine-readable error category
    pub fn kind(&self) -> String {
        match self {
            Self::Feminize(e) => e.kind().to_string(),
            Self::Timeout(_) | Self::Cancelled => "timeout".to_string(),
            Self::IoError(_) => "io".to_string(),
            _ => "config".to_string(),
        }
    }
}

/// Read a `.toml` or `.json` document, chosen by extension
pub fn read_document<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T, CliError> {
    let path = path.as_ref();
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => Ok(toml::from_str(&fs::read_to_string(path)?)?),
        Some("json") => Ok(serde_json::from_str(&fs::read_to_string(path)?)?),
        _ => Err(CliError::UnsupportedFileFormat),
    }
}

/// One transformation job
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct JobConfig {
    pub input: PathBuf,
    /// Landmark document written by the detector
    pub landmarks: PathBuf,
    pub output_dir: PathBuf,
    pub hairstyle: Option<PathBuf>,
    /// Budget for the whole run
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub feminize: FeminizeConfig,
}

impl JobConfig {
    /// Load JobConfig from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, CliError> {
        Ok(toml::from_str(content)?)
    }

    /// Load JobConfig from a JSON string
    pub fn from_json(content: &str) -> Result<Self, CliError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Auto-detect file format and load configuration
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CliError> {
        read_document(path)
    }

    /// Convert JobConfig to TOML string
    pub fn to_toml(&self) -> Result<String, CliError> {
        Ok(toml::to_string_pretty(&self)?)
    }

    /// Convert JobConfig to JSON string
    pub fn to_json(&self) -> Result<String, CliError> {
        Ok(serde_json::to_string_pretty(&self)?)
    }

    pub fn to_toml_file<P: AsRef<Path>>(&self, path: P) -> Result<(), CliError> {
        fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> Result<(), CliError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn pipeline(&self) -> Result<Pipeline, CliError> {
        let mut builder = Pipeline::builder().with_config(self.feminize.clone());
        if let Some(hairstyle) = &self.hairstyle {
            builder = builder.with_hair_asset_path(hairstyle);
        }
        Ok(builder.build()?)
    }
}

/// Paths of a finished run
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct RunReport {
    pub original: PathBuf,
    pub result: PathBuf,
}

/// What a failed run prints
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ErrorReport {
    pub error: String,
    pub kind: String,
}

impl From<&CliError> for ErrorReport {
    fn from(error: &CliError) -> Self {
        Self { error: error.to_string(), kind: error.kind() }
    }
}

/// `original_<stem>_<ts>.png` and `result_<stem>_<ts>.png` under `output_dir`
pub fn output_paths(output_dir: &Path, input: &Path, timestamp: i64) -> RunReport {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    RunReport {
        original: output_dir.join(format!("original_{stem}_{timestamp}.png")),
        result: output_dir.join(format!("result_{stem}_{timestamp}.png")),
    }
}

/// Run a job to completion on the current thread
pub fn run_job(job: &JobConfig) -> Result<RunReport, CliError> {
    run_job_until(job, &AtomicBool::new(false))
}

fn ensure_live(cancel: &AtomicBool) -> Result<(), CliError> {
    if cancel.load(Ordering::SeqCst) {
        return Err(CliError::Cancelled);
    }
    Ok(())
}

/// Run a job, writing nothing once `cancel` has been raised
pub fn run_job_until(job: &JobConfig, cancel: &AtomicBool) -> Result<RunReport, CliError> {
    let pipeline = job.pipeline()?;
    info!("{}", pipeline.info());
    let mut feminizer = Feminizer::new(JsonLandmarkProvider::new(&job.landmarks), pipeline);
    let transformation = feminizer.transform_path(&job.input)?;

    ensure_live(cancel)?;
    fs::create_dir_all(&job.output_dir)?;
    let report = output_paths(&job.output_dir, &job.input, chrono::Utc::now().timestamp());
    transformation.original.save(&report.original).map_err(FeminizeError::Output)?;
    if let Err(e) = ensure_live(cancel) {
        // a run that gave up leaves no half-written pair behind
        fs::remove_file(&report.original).ok();
        return Err(e);
    }
    transformation.result.save(&report.result).map_err(FeminizeError::Output)?;
    info!("Result written to {}", report.result.display());
    Ok(report)
}

/// Run `work` on the blocking pool. When `budget` runs out the cancel flag
/// handed to `work` is raised and `CliError::Timeout` returned at once; the
/// worker is not awaited.
pub async fn run_with_budget<T, F>(budget: Option<Duration>, work: F) -> Result<T, CliError>
where
    T: Send + 'static,
    F: FnOnce(&AtomicBool) -> Result<T, CliError> + Send + 'static,
{
    let cancel = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancel);
    let task = tokio::task::spawn_blocking(move || work(&flag));
    match budget {
        Some(limit) => match tokio::time::timeout(limit, task).await {
            Ok(joined) => joined?,
            Err(_) => {
                cancel.store(true, Ordering::SeqCst);
                warn!("Time budget of {:?} exceeded, abandoning the run", limit);
                Err(CliError::Timeout(limit))
            }
        },
        None => task.await?,
    }
}

/// Run a job under its own time budget
pub async fn transform_job(job: JobConfig) -> Result<RunReport, CliError> {
    let budget = job.timeout_secs.map(Duration::from_secs);
    run_with_budget(budget, move |cancel| run_job_until(&job, cancel)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use face_common::synthetic;
    use image::{Rgb, RgbImage};

    fn job(dir: &Path) -> JobConfig {
        JobConfig {
            input: dir.join("face.png"),
            landmarks: dir.join("face.json"),
            output_dir: dir.join("out"),
            hairstyle: None,
            timeout_secs: Some(30),
            feminize: FeminizeConfig::default(),
        }
    }

    #[test]
    fn test_toml_job_keeps_stage_defaults() {
        let job = JobConfig::from_toml(
            r#"
            input = "face.jpg"
            landmarks = "face.json"
            output_dir = "out"

            [feminize.lips]
            scale = 1.2
            "#,
        )
        .expect("Should parse");
        assert_eq!(job.feminize.lips.scale, 1.2);
        assert_eq!(job.feminize.nose, FeminizeConfig::default().nose);
        assert_eq!(job.timeout_secs, None);
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let job = job(dir.path());
        for name in ["job.toml", "job.json"] {
            let path = dir.path().join(name);
            if name.ends_with("toml") {
                job.to_toml_file(&path).unwrap();
            } else {
                job.to_json_file(&path).unwrap();
            }
            assert_eq!(JobConfig::from_file(&path).unwrap(), job);
        }
        assert!(matches!(
            JobConfig::from_file(dir.path().join("job.yaml")),
            Err(CliError::UnsupportedFileFormat)
        ));
    }

    #[test]
    fn test_output_names() {
        let report = output_paths(Path::new("out"), Path::new("photos/alex.jpg"), 1700000000);
        assert_eq!(report.original, PathBuf::from("out/original_alex_1700000000.png"));
        assert_eq!(report.result, PathBuf::from("out/result_alex_1700000000.png"));
    }

    #[test]
    fn test_run_job_writes_both_images() {
        let dir = tempfile::tempdir().unwrap();
        let job = job(dir.path());
        RgbImage::from_pixel(160, 160, Rgb([180, 140, 120])).save(&job.input).unwrap();
        let points = synthetic::face(160, 160).as_slice().to_vec();
        fs::write(&job.landmarks, serde_json::to_string(&points).unwrap()).unwrap();

        let report = run_job(&job).expect("Should run");
        assert!(report.original.exists());
        assert!(report.result.exists());
    }

    #[test]
    fn test_no_face_report() {
        let dir = tempfile::tempdir().unwrap();
        let job = job(dir.path());
        RgbImage::new(20, 20).save(&job.input).unwrap();
        fs::write(&job.landmarks, "null").unwrap();

        let err = run_job(&job).unwrap_err();
        let report = ErrorReport::from(&err);
        assert_eq!(report.kind, "no_face_detected");
        assert!(!job.output_dir.exists());
    }

    #[test]
    fn test_cancelled_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let job = job(dir.path());
        RgbImage::from_pixel(120, 120, Rgb([180, 140, 120])).save(&job.input).unwrap();
        let points = synthetic::face(120, 120).as_slice().to_vec();
        fs::write(&job.landmarks, serde_json::to_string(&points).unwrap()).unwrap();

        let err = run_job_until(&job, &AtomicBool::new(true)).unwrap_err();
        assert!(matches!(err, CliError::Cancelled));
        assert_eq!(ErrorReport::from(&err).kind, "timeout");
        assert!(!job.output_dir.exists());
    }

    #[tokio::test]
    async fn test_budget_reports_timeout_and_blocks_late_writes() {
        let dir = tempfile::tempdir().unwrap();
        let late = dir.path().join("late.txt");
        let target = late.clone();

        let err = run_with_budget(Some(Duration::from_millis(50)), move |cancel| {
            std::thread::sleep(Duration::from_millis(300));
            ensure_live(cancel)?;
            fs::write(&target, "late")?;
            Ok(())
        })
        .await
        .unwrap_err();
        assert!(matches!(err, CliError::Timeout(_)));
        assert_eq!(ErrorReport::from(&err).kind, "timeout");

        // give the abandoned worker time to reach its write
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert!(!late.exists());
    }

    #[tokio::test]
    async fn test_budget_passes_through_a_quick_result() {
        let value = run_with_budget(Some(Duration::from_secs(5)), |cancel| {
            ensure_live(cancel)?;
            Ok(7)
        })
        .await
        .expect("Should finish in time");
        assert_eq!(value, 7);
        assert_eq!(run_with_budget(None, |_| Ok("done")).await.unwrap(), "done");
    }
}

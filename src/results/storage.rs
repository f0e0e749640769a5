//! Results storage and retrieval
//!
//! Provides persistent storage for verification runs in JSON format.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::models::RunSummary;

/// Stored verification run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoredRun {
    /// Unique run ID
    pub id: String,

    /// Run outcome, results included
    pub summary: RunSummary,

    /// Environment info
    pub environment: EnvironmentInfo,
}

/// Environment information
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EnvironmentInfo {
    /// Operating system
    pub os: String,

    /// Architecture
    pub arch: String,

    /// Tool version
    pub tool_version: String,
}

impl Default for EnvironmentInfo {
    fn default() -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl StoredRun {
    pub fn new(summary: RunSummary) -> Self {
        Self {
            id: generate_run_id(),
            summary,
            environment: EnvironmentInfo::default(),
        }
    }
}

/// Generate unique run ID
fn generate_run_id() -> String {
    let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
    let random: u32 = rand::random::<u32>() % 10000;
    format!("{timestamp}_{random:04}")
}

/// Results storage manager
pub struct ResultsStorage {
    /// Base directory for results
    base_dir: PathBuf,
}

impl ResultsStorage {
    /// Create a new results storage
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Create with default directory
    pub fn default_dir() -> Self {
        let base_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("linguo-verify")
            .join("results");
        Self::new(base_dir)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Get path for a specific run
    fn run_path(&self, run_id: &str) -> PathBuf {
        self.base_dir.join(format!("{run_id}.json"))
    }

    /// Save a run
    pub fn save(&self, run: &StoredRun) -> Result<PathBuf> {
        fs::create_dir_all(&self.base_dir).with_context(|| {
            format!("Failed to create results directory {}", self.base_dir.display())
        })?;

        let path = self.run_path(&run.id);
        let file = File::create(&path).context("Failed to create results file")?;
        let writer = BufWriter::new(file);

        serde_json::to_writer_pretty(writer, run).context("Failed to write results")?;

        info!("Saved verification results to {}", path.display());
        Ok(path)
    }

    /// Load a run by ID
    pub fn load(&self, run_id: &str) -> Result<StoredRun> {
        let path = self.run_path(run_id);
        let run = self.load_from_path(&path)?;
        debug!("Loaded verification results from {}", path.display());
        Ok(run)
    }

    /// Load from a specific path
    pub fn load_from_path(&self, path: &Path) -> Result<StoredRun> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open results file {}", path.display()))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader).context("Failed to parse results")
    }

    /// Load every stored run, newest first; unreadable files are skipped
    pub fn load_all(&self) -> Result<Vec<StoredRun>> {
        if !self.base_dir.exists() {
            return Ok(Vec::new());
        }

        let mut runs = Vec::new();
        for entry in fs::read_dir(&self.base_dir)? {
            let path = entry?.path();

            if path.extension().map(|e| e == "json").unwrap_or(false) {
                match self.load_from_path(&path) {
                    Ok(run) => runs.push(run),
                    Err(e) => {
                        debug!("Failed to load {}: {}", path.display(), e);
                    }
                }
            }
        }

        runs.sort_by(|a, b| {
            b.summary
                .started_at
                .cmp(&a.summary.started_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(runs)
    }

    /// List stored runs, newest first
    pub fn list_runs(&self) -> Result<Vec<RunInfo>> {
        Ok(self.load_all()?.iter().map(RunInfo::from).collect())
    }

    /// Get the latest run
    pub fn latest(&self) -> Result<Option<StoredRun>> {
        Ok(self.load_all()?.into_iter().next())
    }

    /// Delete a run
    pub fn delete(&self, run_id: &str) -> Result<()> {
        let path = self.run_path(run_id);
        if path.exists() {
            fs::remove_file(&path)?;
            info!("Deleted results: {}", path.display());
        }
        Ok(())
    }

    /// Export run to a file
    pub fn export(&self, run: &StoredRun, path: &Path, format: ExportFormat) -> Result<()> {
        match format {
            ExportFormat::Json => {
                let file = File::create(path)?;
                let writer = BufWriter::new(file);
                serde_json::to_writer_pretty(writer, run)?;
            }
            ExportFormat::Csv => {
                let mut writer = csv::Writer::from_path(path)?;

                writer.write_record([
                    "run_id",
                    "name",
                    "success",
                    "critical",
                    "message",
                    "details",
                    "duration_ms",
                    "timestamp",
                ])?;

                for result in &run.summary.results {
                    writer.write_record([
                        run.id.clone(),
                        result.name().to_string(),
                        result.success().to_string(),
                        result
                            .is_critical(&run.summary.critical_keywords)
                            .to_string(),
                        result.message().to_string(),
                        result.details().unwrap_or_default().to_string(),
                        result.duration_ms().to_string(),
                        result.timestamp().to_rfc3339(),
                    ])?;
                }
                writer.flush()?;
            }
        }

        info!("Exported results to {}", path.display());
        Ok(())
    }
}

/// Brief run information
#[derive(Clone, Debug)]
pub struct RunInfo {
    pub id: String,
    pub base_url: String,
    pub started_at: DateTime<Utc>,
    pub total: usize,
    pub passed: usize,
    pub success_rate: f64,
    pub critical_failures: usize,
}

impl From<&StoredRun> for RunInfo {
    fn from(run: &StoredRun) -> Self {
        Self {
            id: run.id.clone(),
            base_url: run.summary.base_url.clone(),
            started_at: run.summary.started_at,
            total: run.summary.total,
            passed: run.summary.passed,
            success_rate: run.summary.success_rate,
            critical_failures: run.summary.critical_failures,
        }
    }
}

/// Export format
#[derive(Clone, Copy, Debug)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(ExportFormat::Json),
            "csv" => Some(ExportFormat::Csv),
            _ => None,
        }
    }

    pub fn from_extension(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CheckResult;
    use chrono::Duration;

    fn summary_at(started_at: DateTime<Utc>) -> RunSummary {
        RunSummary::new(
            "http://localhost:3000/api",
            "testuser_00000001@example.com",
            started_at,
            vec![
                CheckResult::pass("AI Tutor - B1 Level Conversation", "ok"),
                CheckResult::fail("Authentication - Login", "HTTP 500: boom").with_details("x"),
            ],
            &["authentication".to_string()],
        )
    }

    #[test]
    fn test_generate_run_id() {
        let id = generate_run_id();
        let parts: Vec<&str> = id.split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].len(), 8);
        assert_eq!(parts[1].len(), 6);
        assert_eq!(parts[2].len(), 4);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let storage = ResultsStorage::new(dir.path().join("results"));

        let run = StoredRun::new(summary_at(Utc::now()));
        let path = storage.save(&run).unwrap();
        assert!(path.exists());

        let loaded = storage.load(&run.id).unwrap();
        assert_eq!(loaded.id, run.id);
        assert_eq!(loaded.summary.total, 2);
        assert_eq!(loaded.summary.results[1].message(), "HTTP 500: boom");
    }

    #[test]
    fn test_latest_is_newest() {
        let dir = tempfile::tempdir().unwrap();
        let storage = ResultsStorage::new(dir.path());

        let mut older = StoredRun::new(summary_at(Utc::now() - Duration::hours(1)));
        older.id = "20260101_000000_0001".to_string();
        let mut newer = StoredRun::new(summary_at(Utc::now()));
        newer.id = "20260101_010000_0002".to_string();
        storage.save(&older).unwrap();
        storage.save(&newer).unwrap();
        fs::write(dir.path().join("garbage.json"), "not json").unwrap();

        let runs = storage.list_runs().unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].id, newer.id);
        assert_eq!(storage.latest().unwrap().unwrap().id, newer.id);

        storage.delete(&newer.id).unwrap();
        assert_eq!(storage.latest().unwrap().unwrap().id, older.id);
    }

    #[test]
    fn test_empty_storage() {
        let dir = tempfile::tempdir().unwrap();
        let storage = ResultsStorage::new(dir.path().join("missing"));
        assert!(storage.list_runs().unwrap().is_empty());
        assert!(storage.latest().unwrap().is_none());
    }

    #[test]
    fn test_export_csv() {
        let dir = tempfile::tempdir().unwrap();
        let storage = ResultsStorage::new(dir.path());
        let run = StoredRun::new(summary_at(Utc::now()));
        let path = dir.path().join("latest.csv");

        storage.export(&run, &path, ExportFormat::Csv).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[1][1], "Authentication - Login");
        assert_eq!(&rows[1][2], "false");
        assert_eq!(&rows[1][3], "true");
    }

    #[test]
    fn test_export_format() {
        assert!(matches!(
            ExportFormat::from_extension(Path::new("out.JSON")),
            Some(ExportFormat::Json)
        ));
        assert!(matches!(
            ExportFormat::from_str("csv"),
            Some(ExportFormat::Csv)
        ));
        assert!(ExportFormat::from_str("xml").is_none());
    }
}

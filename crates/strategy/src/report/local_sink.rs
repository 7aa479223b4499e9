use std::fs;
use std::path::PathBuf;

use async_trait::async_trait;
use common::models::AnalysisRow;
use tracing::{error, info};

use super::{ReportError, ReportSink, to_csv};

/// Writes reports into a directory that is emptied at the start of each run.
/// The directory itself is kept so bind mounts survive.
pub struct LocalReportSink {
    dir: PathBuf,
}

impl LocalReportSink {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }
}

#[async_trait]
impl ReportSink for LocalReportSink {
    async fn prepare(&self) -> Result<(), ReportError> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)?;
            info!("[LOCAL] Created fresh '{}' directory.", self.dir.display());
            return Ok(());
        }

        info!("[LOCAL] Cleaning up old files in '{}'...", self.dir.display());
        for entry in fs::read_dir(&self.dir)? {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(e) => {
                    error!("Failed to read entry in {}: {}", self.dir.display(), e);
                    continue;
                }
            };
            let removed = if path.is_dir() {
                fs::remove_dir_all(&path)
            } else {
                fs::remove_file(&path)
            };
            if let Err(e) = removed {
                error!("Failed to delete {}. Reason: {}", path.display(), e);
            }
        }
        Ok(())
    }

    async fn publish(&self, file_name: &str, rows: &[AnalysisRow]) -> Result<String, ReportError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(file_name);
        fs::write(&path, to_csv(rows)?)?;
        info!("[LOCAL] Saved analysis to: {}", path.display());
        Ok(path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use common::models::SignalKind;

    #[tokio::test]
    async fn prepare_empties_but_keeps_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("signals");
        fs::create_dir_all(dir.join("nested")).unwrap();
        fs::write(dir.join("analysis_2026-10-18.csv"), "old").unwrap();
        fs::write(dir.join("nested").join("x.txt"), "old").unwrap();

        let sink = LocalReportSink::new(dir.clone());
        sink.prepare().await.unwrap();

        assert!(dir.is_dir());
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn prepare_creates_missing_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("signals");
        LocalReportSink::new(dir.clone()).prepare().await.unwrap();
        assert!(dir.is_dir());
    }

    #[tokio::test]
    async fn publish_writes_csv() {
        let tmp = tempfile::tempdir().unwrap();
        let sink = LocalReportSink::new(tmp.path().to_path_buf());
        let rows = vec![AnalysisRow {
            ticker: "AAPL".into(),
            date: NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
            signal: SignalKind::Sell,
            price: 180.0,
            previous_price: 182.5,
        }];

        let location = sink.publish("analysis_2026-10-19.csv", &rows).await.unwrap();
        let written = fs::read_to_string(&location).unwrap();
        assert!(written.starts_with("Ticker,Date,Signal,Price,Yesterday_Price\n"));
        assert!(written.contains("AAPL,2026-10-19,SELL,180.0,182.5"));
    }
}

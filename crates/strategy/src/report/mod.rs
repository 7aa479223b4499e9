//! Nightly report artifact covering every analyzed ticker: a CSV in a local
//! directory, or an xlsx workbook in blob storage.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use common::config::ReportMode;
use common::identity::{IdentityError, ManagedIdentity};
use common::models::AnalysisRow;
use common::models::analysis::{REPORT_COLUMNS, cents};
use rust_xlsxwriter::{Workbook, XlsxError};
use thiserror::Error;

pub mod blob_sink;
pub mod local_sink;

pub use blob_sink::BlobReportSink;
pub use local_sink::LocalReportSink;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Workbook error: {0}")]
    Xlsx(#[from] XlsxError),
    #[error("Upload failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Upload rejected ({status}): {body}")]
    Rejected { status: u16, body: String },
    #[error("Could not obtain storage token: {0}")]
    Token(#[from] IdentityError),
    #[error("STORAGE_ACCOUNT is not set")]
    MissingStorageAccount,
}

#[async_trait]
pub trait ReportSink: Send + Sync {
    /// Runs before any ticker is analyzed.
    async fn prepare(&self) -> Result<(), ReportError> {
        Ok(())
    }

    fn file_name(&self, date: NaiveDate) -> String {
        report_file_name(date, "csv")
    }

    /// Stores the artifact and returns where it went.
    async fn publish(&self, file_name: &str, rows: &[AnalysisRow]) -> Result<String, ReportError>;
}

pub fn report_file_name(date: NaiveDate, extension: &str) -> String {
    format!("analysis_{}.{}", date.format("%Y-%m-%d"), extension)
}

pub fn to_csv(rows: &[AnalysisRow]) -> Result<Vec<u8>, ReportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.into_inner().map_err(|e| ReportError::Io(e.into_error()))
}

/// Single-sheet workbook with the same columns and rounding as the CSV.
pub fn to_xlsx(rows: &[AnalysisRow]) -> Result<Vec<u8>, ReportError> {
    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        for (col, name) in (0u16..).zip(REPORT_COLUMNS) {
            sheet.write_string(0, col, name)?;
        }
        for (row_idx, row) in (1u32..).zip(rows) {
            sheet.write_string(row_idx, 0, row.ticker.as_str())?;
            sheet.write_string(row_idx, 1, row.date.format("%Y-%m-%d").to_string())?;
            sheet.write_string(row_idx, 2, row.signal.as_str())?;
            sheet.write_number(row_idx, 3, cents(row.price))?;
            sheet.write_number(row_idx, 4, cents(row.previous_price))?;
        }
    }
    Ok(workbook.save_to_buffer()?)
}

pub fn build_report_sink(mode: &ReportMode, identity: ManagedIdentity) -> Arc<dyn ReportSink> {
    match mode {
        ReportMode::Local { dir } => Arc::new(LocalReportSink::new(dir.clone())),
        ReportMode::Cloud(target) => Arc::new(BlobReportSink::new(target.clone(), identity)),
    }
}

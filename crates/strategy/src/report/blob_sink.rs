use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use common::config::BlobTarget;
use common::identity::ManagedIdentity;
use common::models::AnalysisRow;
use reqwest::{Client, RequestBuilder};
use tracing::info;

use super::{ReportError, ReportSink, report_file_name, to_xlsx};

const STORAGE_RESOURCE: &str = "https://storage.azure.com/";
const STORAGE_API_VERSION: &str = "2021-08-06";
const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Uploads the report as an xlsx block blob, overwriting any blob of the same name.
/// A SAS token is used when configured, a managed identity token otherwise.
pub struct BlobReportSink {
    client: Client,
    target: BlobTarget,
    identity: ManagedIdentity,
}

impl BlobReportSink {
    pub fn new(target: BlobTarget, identity: ManagedIdentity) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            target,
            identity,
        }
    }

    fn blob_url(&self, account: &str, file_name: &str) -> String {
        let base = format!(
            "https://{}.blob.core.windows.net/{}/{}",
            account, self.target.container, file_name
        );
        match &self.target.sas_token {
            Some(sas) => format!("{}?{}", base, sas.trim_start_matches('?')),
            None => base,
        }
    }

    fn upload_request(
        &self,
        account: &str,
        file_name: &str,
        rows: &[AnalysisRow],
    ) -> Result<RequestBuilder, ReportError> {
        Ok(self
            .client
            .put(self.blob_url(account, file_name))
            .header("x-ms-blob-type", "BlockBlob")
            .header("x-ms-version", STORAGE_API_VERSION)
            .header("Content-Type", XLSX_CONTENT_TYPE)
            .body(to_xlsx(rows)?))
    }
}

#[async_trait]
impl ReportSink for BlobReportSink {
    fn file_name(&self, date: NaiveDate) -> String {
        report_file_name(date, "xlsx")
    }

    async fn publish(&self, file_name: &str, rows: &[AnalysisRow]) -> Result<String, ReportError> {
        let account = self
            .target
            .account
            .as_deref()
            .ok_or(ReportError::MissingStorageAccount)?;
        info!("[CLOUD] Uploading {} to storage account {}...", file_name, account);

        let mut request = self.upload_request(account, file_name, rows)?;

        if self.target.sas_token.is_none() {
            let token = self.identity.token(STORAGE_RESOURCE).await?;
            request = request.bearer_auth(token);
        }

        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ReportError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let location = format!("{}/{}", self.target.container, file_name);
        info!("[CLOUD] Uploaded {} successfully.", location);
        Ok(location)
    }
}

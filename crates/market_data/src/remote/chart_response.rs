use serde::Deserialize;

use crate::MarketDataError;
use crate::traits::RemoteResponse;

#[derive(Debug, Deserialize)]
pub struct ChartEnvelope {
    pub chart: Chart,
}

#[derive(Debug, Deserialize)]
pub struct Chart {
    pub result: Option<Vec<ChartResult>>,
    pub error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
pub struct ChartError {
    pub code: String,
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct ChartResult {
    pub indicators: Indicators,
}

#[derive(Debug, Deserialize)]
pub struct Indicators {
    pub quote: Vec<QuoteSeries>,
}

#[derive(Debug, Deserialize)]
pub struct QuoteSeries {
    #[serde(default)]
    pub close: Vec<Option<f64>>,
}

impl RemoteResponse<Vec<f64>> for ChartEnvelope {
    /// Daily closes oldest first. Gaps (null or non-finite) are dropped.
    fn to_domain(&self, ticker: &str) -> Result<Vec<f64>, MarketDataError> {
        if let Some(ref err) = self.chart.error {
            return Err(MarketDataError::NoData {
                ticker: ticker.to_string(),
                detail: format!("{}: {}", err.code, err.description),
            });
        }

        let closes = self
            .chart
            .result
            .as_deref()
            .and_then(|r| r.first())
            .and_then(|r| r.indicators.quote.first())
            .map(|q| {
                q.close
                    .iter()
                    .filter_map(|c| *c)
                    .filter(|c| c.is_finite())
                    .collect()
            })
            .unwrap_or_default();

        Ok(closes)
    }
}

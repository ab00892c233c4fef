//! Data types for FMP API responses.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Reporting period for financial statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Period {
    /// Annual reports (10-K filings).
    #[default]
    Annual,
    /// Quarterly reports (10-Q filings).
    Quarter,
}

impl Period {
    /// Get the API parameter value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Annual => "annual",
            Self::Quarter => "quarter",
        }
    }
}

/// Period-over-period growth figures from FMP.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialGrowth {
    /// Filing date.
    pub date: String,
    /// Ticker symbol.
    pub symbol: String,
    /// Reporting period.
    #[serde(default)]
    pub period: String,
    /// Revenue growth as a fraction.
    #[serde(default)]
    pub revenue_growth: Option<f64>,
}

/// Leverage and valuation ratios from FMP.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialRatios {
    /// Filing date.
    pub date: String,
    /// Ticker symbol.
    pub symbol: String,
    /// Reporting period.
    #[serde(default)]
    pub period: String,
    /// Debt to equity ratio.
    #[serde(default, alias = "debtEquityRatio")]
    pub debt_to_equity_ratio: Option<f64>,
    /// Price to book ratio.
    #[serde(default)]
    pub price_to_book_ratio: Option<f64>,
}

impl FinancialGrowth {
    /// Parse the date string into a NaiveDate.
    #[must_use]
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").ok()
    }
}

impl FinancialRatios {
    /// Parse the date string into a NaiveDate.
    #[must_use]
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ratios() {
        let json = r#"[{"date":"2024-09-28","symbol":"AAPL","period":"FY",
            "debtToEquityRatio":1.87,"priceToBookRatio":61.4,"currentRatio":0.87}]"#;
        let ratios: Vec<FinancialRatios> = serde_json::from_str(json).unwrap();
        assert_eq!(ratios[0].debt_to_equity_ratio, Some(1.87));
        assert_eq!(ratios[0].price_to_book_ratio, Some(61.4));
        assert_eq!(
            ratios[0].parsed_date(),
            NaiveDate::from_ymd_opt(2024, 9, 28)
        );
    }

    #[test]
    fn test_parse_legacy_ratio_name_and_nulls() {
        let json = r#"{"date":"2023-12-31","symbol":"XYZ","debtEquityRatio":0.4,"priceToBookRatio":null}"#;
        let ratios: FinancialRatios = serde_json::from_str(json).unwrap();
        assert_eq!(ratios.debt_to_equity_ratio, Some(0.4));
        assert_eq!(ratios.price_to_book_ratio, None);
    }

    #[test]
    fn test_parse_growth() {
        let json = r#"[{"date":"2024-09-28","symbol":"AAPL","period":"FY","revenueGrowth":0.0202}]"#;
        let growth: Vec<FinancialGrowth> = serde_json::from_str(json).unwrap();
        assert_eq!(growth[0].revenue_growth, Some(0.0202));
        assert_eq!(Period::Quarter.as_str(), "quarter");
    }
}

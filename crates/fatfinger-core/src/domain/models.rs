use serde::{Deserialize, Serialize};

use crate::{Interval, Ticker, UtcDateTime, ValidationError};

/// OHLCV bar record for a given interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub ts: UtcDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<u64>,
}

impl Bar {
    pub fn new(
        ts: UtcDateTime,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: Option<u64>,
    ) -> Result<Self, ValidationError> {
        validate_non_negative("open", open)?;
        validate_non_negative("high", high)?;
        validate_non_negative("low", low)?;
        validate_non_negative("close", close)?;

        if high < low {
            return Err(ValidationError::InvalidBarRange);
        }

        if open < low || open > high || close < low || close > high {
            return Err(ValidationError::InvalidBarBounds);
        }

        Ok(Self {
            ts,
            open,
            high,
            low,
            close,
            volume,
        })
    }
}

/// Bars for one ticker. An empty series means the provider had no data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarSeries {
    pub ticker: Ticker,
    pub interval: Interval,
    pub bars: Vec<Bar>,
}

impl BarSeries {
    pub fn new(ticker: Ticker, interval: Interval, bars: Vec<Bar>) -> Self {
        Self {
            ticker,
            interval,
            bars,
        }
    }

    pub fn empty(ticker: Ticker, interval: Interval) -> Self {
        Self::new(ticker, interval, Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Sum of reported volume; bars without a volume value count as zero.
    pub fn total_volume(&self) -> u64 {
        self.bars
            .iter()
            .filter_map(|bar| bar.volume)
            .fold(0_u64, u64::saturating_add)
    }

    /// Mean over bars that report a volume, `None` when none do.
    pub fn mean_volume(&self) -> Option<f64> {
        let volumes: Vec<u64> = self.bars.iter().filter_map(|bar| bar.volume).collect();
        if volumes.is_empty() {
            return None;
        }
        let total: f64 = volumes.iter().map(|volume| *volume as f64).sum();
        Some(total / volumes.len() as f64)
    }
}

fn validate_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field });
    }
    Ok(())
}

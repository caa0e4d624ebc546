use std::time::Duration;

use crate::ProviderId;

/// Politeness settings for one upstream provider.
///
/// Calls are spaced out to respect the provider's unpublished limits; a failed
/// call is never retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderPolicy {
    pub provider_id: ProviderId,
    /// Minimum spacing between consecutive calls.
    pub min_interval: Duration,
    pub timeout: Duration,
}

impl ProviderPolicy {
    pub fn nasdaq_trader_default() -> Self {
        Self {
            provider_id: ProviderId::NasdaqTrader,
            min_interval: Duration::from_secs(1),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn yahoo_default() -> Self {
        Self {
            provider_id: ProviderId::Yahoo,
            min_interval: Duration::from_millis(200),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn nasdaq_ipo_default() -> Self {
        Self {
            provider_id: ProviderId::NasdaqIpo,
            min_interval: Duration::from_millis(200),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn default_for(provider_id: ProviderId) -> Option<Self> {
        match provider_id {
            ProviderId::NasdaqTrader => Some(Self::nasdaq_trader_default()),
            ProviderId::Yahoo => Some(Self::yahoo_default()),
            ProviderId::NasdaqIpo => Some(Self::nasdaq_ipo_default()),
            ProviderId::Static => None,
        }
    }

    pub fn timeout_ms(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }
}

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Provider identifiers recorded in reports and output envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    NasdaqTrader,
    Yahoo,
    NasdaqIpo,
    Static,
}

impl ProviderId {
    pub const ALL: [Self; 4] = [Self::NasdaqTrader, Self::Yahoo, Self::NasdaqIpo, Self::Static];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NasdaqTrader => "nasdaqtrader",
            Self::Yahoo => "yahoo",
            Self::NasdaqIpo => "nasdaqipo",
            Self::Static => "static",
        }
    }
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "nasdaqtrader" => Ok(Self::NasdaqTrader),
            "yahoo" => Ok(Self::Yahoo),
            "nasdaqipo" => Ok(Self::NasdaqIpo),
            "static" => Ok(Self::Static),
            other => Err(ValidationError::InvalidSource {
                value: other.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_provider_name() {
        for provider in ProviderId::ALL {
            let parsed = ProviderId::from_str(provider.as_str()).expect("known provider");
            assert_eq!(parsed, provider);
        }
    }

    #[test]
    fn rejects_unknown_provider() {
        let err = ProviderId::from_str("polygon").expect_err("must fail");
        assert!(matches!(err, ValidationError::InvalidSource { .. }));
    }
}

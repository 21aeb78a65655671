use std::{fmt, str::FromStr};

use serde::Serialize;

use crate::error::StkvalError;

/// Exchange ticker symbol, normalized to uppercase
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize)]
pub struct Ticker {
    pub symbol: String,
}

impl FromStr for Ticker {
    type Err = StkvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let symbol = s.trim().to_uppercase();

        if symbol.is_empty() || symbol.len() > 10 {
            return Err(StkvalError::Invalid(
                "TICKER_INVALID",
                format!("'{s}' is not a valid ticker symbol"),
            ));
        }

        if !symbol
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
        {
            return Err(StkvalError::Invalid(
                "TICKER_INVALID",
                format!("'{s}' contains characters not allowed in a ticker symbol"),
            ));
        }

        Ok(Self { symbol })
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticker_normalize() {
        let ticker = Ticker::from_str(" aapl ").unwrap();
        assert_eq!(ticker.symbol, "AAPL");

        assert!(Ticker::from_str("BRK-B").is_ok());
        assert!(Ticker::from_str("").is_err());
        assert!(Ticker::from_str("TOO_LONG_SYMBOL").is_err());
        assert!(Ticker::from_str("AA PL").is_err());
    }
}

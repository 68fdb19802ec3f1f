use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

const MAX_STOCK_TICKER_LEN: usize = 10;
const MAX_CRYPTO_TICKER_LEN: usize = 15;

/// Which listing venue a ticker follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetClass {
    /// Exchange tickers as quoted by Alpha Vantage: a leading letter and
    /// optional share class suffix (`BRK.B`, `RDS-A`).
    Stock,
    /// CoinMarketCap listing symbols: plain alphanumerics, digits allowed
    /// up front (`1INCH`).
    Crypto,
}

impl AssetClass {
    fn max_len(self) -> usize {
        match self {
            Self::Stock => MAX_STOCK_TICKER_LEN,
            Self::Crypto => MAX_CRYPTO_TICKER_LEN,
        }
    }
}

/// Uppercased ticker for a stock quote or a crypto market item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    /// Ticker for [`crate::StockQuote`] lookups.
    pub fn stock(input: &str) -> Result<Self, ValidationError> {
        Self::for_class(input, AssetClass::Stock)
    }

    /// Symbol of a [`crate::MarketItem`] listing.
    pub fn crypto(input: &str) -> Result<Self, ValidationError> {
        Self::for_class(input, AssetClass::Crypto)
    }

    /// Accepts anything either asset class accepts. Used where the class is
    /// not known, such as persisted snapshots.
    ///
    /// When both rule sets reject the input the stock error is reported.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        Self::stock(input).or_else(|stock_error| Self::crypto(input).map_err(|_| stock_error))
    }

    pub fn for_class(input: &str, class: AssetClass) -> Result<Self, ValidationError> {
        let ticker = input.trim().to_ascii_uppercase();
        let chars: Vec<char> = ticker.chars().collect();
        let Some(&first) = chars.first() else {
            return Err(ValidationError::EmptySymbol);
        };
        if chars.len() > class.max_len() {
            return Err(ValidationError::SymbolTooLong {
                len: chars.len(),
                max: class.max_len(),
            });
        }

        match class {
            AssetClass::Stock if !first.is_ascii_alphabetic() => {
                return Err(ValidationError::SymbolInvalidStart { ch: first });
            }
            AssetClass::Crypto if !first.is_ascii_alphanumeric() => {
                return Err(ValidationError::SymbolInvalidStart { ch: first });
            }
            _ => {}
        }

        for (index, &ch) in chars.iter().enumerate() {
            if ch.is_ascii_alphanumeric() {
                continue;
            }
            if class == AssetClass::Stock && is_class_separator(ch) {
                let followed_by_alnum = chars
                    .get(index + 1)
                    .is_some_and(|next| next.is_ascii_alphanumeric());
                if !followed_by_alnum {
                    return Err(ValidationError::SymbolMisplacedSeparator { index });
                }
                continue;
            }
            return Err(ValidationError::SymbolInvalidChar { ch, index });
        }

        Ok(Self(ticker))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_class_separator(ch: char) -> bool {
    ch == '.' || ch == '-'
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Symbol {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Symbol> for String {
    fn from(value: Symbol) -> Self {
        value.0
    }
}

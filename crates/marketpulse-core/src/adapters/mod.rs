mod alphavantage;
mod coinmarketcap;
mod flippa;
mod godaddy;

pub use alphavantage::AlphaVantageAdapter;
pub use coinmarketcap::CoinMarketCapAdapter;
pub use flippa::FlippaAdapter;
pub use godaddy::{GoDaddyAdapter, DEFAULT_AVAILABILITY_SEED};

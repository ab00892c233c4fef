//! Technical oscillators over close-price series.

mod rsi;

pub use rsi::{Rsi, RsiConfig};

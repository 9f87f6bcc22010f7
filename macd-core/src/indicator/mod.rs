pub mod ema;
pub mod macd;
pub mod errors;

pub use ema::window_ema;
pub use macd::{midpoints, transform, MacdParams};
pub use errors::IndicatorError;

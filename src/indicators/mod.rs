// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the indicators computed by the
// pipeline.  Series-valued functions return output aligned to their input,
// with `None` marking positions before a look-back window is complete.

pub mod bollinger;
pub mod drawdown;
pub mod ema;
pub mod macd;
pub mod returns;
pub mod rsi;
pub mod sma;
pub mod stats;
pub mod zscore;

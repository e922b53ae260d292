// Price-history providers.  The pipeline never calls these; they only
// produce the `PriceSeries` it consumes.

pub mod yahoo;

pub use yahoo::YahooClient;

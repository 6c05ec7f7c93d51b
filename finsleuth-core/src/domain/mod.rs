//! Domain types for FinSleuth

pub mod bar;
pub mod news;
pub mod series;

pub use bar::PriceBar;
pub use news::NewsItem;
pub use series::{PriceSeries, SeriesError};

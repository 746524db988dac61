//! Cached remote weather summary.

pub mod cache;
pub mod fetch;
pub mod wttr;

pub use cache::{spawn_refresher, SummaryCache, PLACEHOLDER};
pub use fetch::{HttpGet, ReqwestHttp, SummarySource, WeatherSource, DEFAULT_TIMEOUT};
pub use wttr::{summarize, Report};

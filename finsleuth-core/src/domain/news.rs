//! News headlines gathered alongside the price history.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub publisher: Option<String>,
    pub link: Option<String>,
    pub published_at: DateTime<Utc>,
}

impl NewsItem {
    /// True if the item was published within `[now - window_days, now]`.
    pub fn is_within(&self, now: DateTime<Utc>, window_days: u32) -> bool {
        let start = now - Duration::days(i64::from(window_days));
        self.published_at >= start && self.published_at <= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn item_at(ts: DateTime<Utc>) -> NewsItem {
        NewsItem {
            title: "Quarterly results".into(),
            publisher: None,
            link: None,
            published_at: ts,
        }
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let now = Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap();
        assert!(item_at(now).is_within(now, 30));
        assert!(item_at(now - Duration::days(30)).is_within(now, 30));
        assert!(!item_at(now - Duration::days(31)).is_within(now, 30));
        assert!(!item_at(now + Duration::hours(1)).is_within(now, 30));
    }
}

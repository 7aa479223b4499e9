use std::time::Duration;

use chrono::{DateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use chrono_tz::US::Eastern;
use tracing::{debug, info};

/// Orders go in one minute before the closing bell.
pub const ORDER_CUTOFF_HOUR: u32 = 15;
pub const ORDER_CUTOFF_MINUTE: u32 = 59;

/// Time left until today's cutoff in exchange time, `None` once it has passed.
pub fn time_until_cutoff(now: DateTime<Tz>) -> Option<Duration> {
    let cutoff = NaiveTime::from_hms_opt(ORDER_CUTOFF_HOUR, ORDER_CUTOFF_MINUTE, 0)?;
    let target = now
        .timezone()
        .from_local_datetime(&now.date_naive().and_time(cutoff))
        .earliest()?;

    (target - now).to_std().ok().filter(|d| !d.is_zero())
}

/// Blocks until the cutoff. Returns immediately when it is already past.
pub async fn wait_for_market_close(account_id: &str) {
    let now = Utc::now().with_timezone(&Eastern);
    match time_until_cutoff(now) {
        Some(wait) => {
            info!("[{}] Waiting {}s for market close...", account_id, wait.as_secs());
            tokio::time::sleep(wait).await;
        }
        None => debug!("[{}] Past the order cutoff, proceeding now", account_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn waits_until_three_fifty_nine_eastern() {
        let now = Eastern.with_ymd_and_hms(2026, 10, 19, 15, 0, 0).unwrap();
        assert_eq!(time_until_cutoff(now), Some(Duration::from_secs(59 * 60)));
    }

    #[test]
    fn no_wait_after_cutoff() {
        let now = Eastern.with_ymd_and_hms(2026, 10, 19, 15, 59, 0).unwrap();
        assert_eq!(time_until_cutoff(now), None);
        let now = Eastern.with_ymd_and_hms(2026, 10, 19, 18, 30, 0).unwrap();
        assert_eq!(time_until_cutoff(now), None);
    }

    #[test]
    fn dst_change_day_uses_local_wall_clock() {
        // 2026-03-08: clocks jump at 02:00 local
        let now = Eastern.with_ymd_and_hms(2026, 3, 8, 1, 0, 0).unwrap();
        let expected = (13 * 60 + 59) * 60;
        assert_eq!(time_until_cutoff(now), Some(Duration::from_secs(expected)));
    }
}

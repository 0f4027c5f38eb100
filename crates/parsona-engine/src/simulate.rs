//! Synthetic activity batches for users with no connected data source.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use rand::seq::IndexedRandom;
use rand::Rng;
use serde_json::{json, Value};

pub const SIMULATED_ACTIVITY_COUNT: usize = 12;
/// Simulated posts are spread over this many days before `now`.
pub const SIMULATION_WINDOW_DAYS: i64 = 60;

const TOPICS: &[&str] = &[
    "distributed systems",
    "system design",
    "scalability",
    "microservices",
    "javascript",
    "react",
    "high performance computing",
    "cloud native",
];

/// Generate a batch of plausible activity payloads dated within the last
/// [`SIMULATION_WINDOW_DAYS`] days.
///
/// The caller owns the RNG so tests can seed it.
pub fn simulated_activities<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Utc>) -> Vec<Value> {
    (0..SIMULATED_ACTIVITY_COUNT)
        .map(|_| {
            let days_ago = rng.random_range(0..SIMULATION_WINDOW_DAYS);
            let topic = TOPICS.choose(rng).copied().unwrap_or("system design");
            let likes: u64 = rng.random_range(10..60);
            let comments: u64 = rng.random_range(2..12);
            let date = now - Duration::days(days_ago);
            json!({
                "text": format!(
                    "Just finished a deep dive into {topic}. The tradeoff between consistency and availability is always fascinating!"
                ),
                "likes": likes,
                "comments": comments,
                "date": date.to_rfc3339_opts(SecondsFormat::Millis, true),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn generates_twelve_payloads_within_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let batch = simulated_activities(&mut rng, now());
        assert_eq!(batch.len(), SIMULATED_ACTIVITY_COUNT);

        for item in &batch {
            let likes = item["likes"].as_u64().unwrap();
            let comments = item["comments"].as_u64().unwrap();
            assert!((10..60).contains(&likes), "likes {likes}");
            assert!((2..12).contains(&comments), "comments {comments}");

            let date: DateTime<Utc> = item["date"].as_str().unwrap().parse().unwrap();
            assert!(date <= now());
            assert!(date > now() - Duration::days(SIMULATION_WINDOW_DAYS));

            let text = item["text"].as_str().unwrap();
            assert!(TOPICS.iter().any(|t| text.contains(t)), "text {text}");
        }
    }

    #[test]
    fn same_seed_same_batch() {
        let a = simulated_activities(&mut StdRng::seed_from_u64(42), now());
        let b = simulated_activities(&mut StdRng::seed_from_u64(42), now());
        assert_eq!(a, b);
    }
}

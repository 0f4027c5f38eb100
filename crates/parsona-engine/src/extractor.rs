//! Deterministic signal extraction over a user's full activity set.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, NaiveDate, Utc};
use parsona_core::{
    AnalyticsStore, Cadence, Engagement, RawActivity, SignalData, SignalRecord, TopPost, Topic,
    TrendBucket, SIGNAL_VERSION,
};
use uuid::Uuid;

use crate::error::EngineError;

const TOP_TOPICS: usize = 5;
const TOP_POSTS: usize = 5;
const TREND_BUCKETS: usize = 30;
/// Tokens must be longer than this many characters to count as topics.
/// Length is in Unicode scalar values, not UTF-16 units.
const MIN_TOPIC_CHARS: usize = 4;
/// A comment counts this many times more than a like in the quality ratio.
const COMMENT_WEIGHT: f64 = 5.0;
const MS_PER_DAY: f64 = 1000.0 * 60.0 * 60.0 * 24.0;

/// Activity fields in the order extraction reads them.
#[derive(Debug, Clone)]
struct Post<'a> {
    text: &'a str,
    likes: u64,
    comments: u64,
    occurred_at: DateTime<Utc>,
    fingerprint: &'a str,
}

impl Post<'_> {
    fn interactions(&self) -> u64 {
        self.likes.saturating_add(self.comments)
    }
}

/// Compute the signal snapshot for an activity set.
///
/// Input order does not matter: activities are first sorted by effective
/// timestamp, then by content fingerprint, and every sub-analysis runs over
/// that canonical order. Floating-point outputs are rounded to two decimals.
///
/// # Errors
///
/// Returns [`EngineError::EmptyInput`] if `activities` is empty.
pub fn extract_signal(activities: &[RawActivity]) -> Result<SignalData, EngineError> {
    if activities.is_empty() {
        return Err(EngineError::EmptyInput);
    }

    let mut posts: Vec<Post<'_>> = activities
        .iter()
        .map(|activity| {
            let fields = activity.fields();
            Post {
                text: fields.text,
                likes: fields.likes,
                comments: fields.comments,
                occurred_at: fields.occurred_at,
                fingerprint: activity.content_hash.as_str(),
            }
        })
        .collect();
    posts.sort_by(|a, b| {
        a.occurred_at
            .cmp(&b.occurred_at)
            .then_with(|| a.fingerprint.cmp(b.fingerprint))
    });

    Ok(SignalData {
        dataset_size: posts.len(),
        topics: analyze_topics(&posts),
        cadence: analyze_cadence(&posts),
        engagement: analyze_engagement(&posts),
        trends: analyze_trends(&posts),
        top_posts: analyze_top_posts(&posts),
    })
}

/// Extract the signal for `user_id` and upsert it under [`SIGNAL_VERSION`].
///
/// # Errors
///
/// Returns [`EngineError::EmptyInput`] for an empty activity set (nothing is
/// written), or [`EngineError::Store`] if the upsert fails.
pub async fn process<S: AnalyticsStore + ?Sized>(
    store: &S,
    user_id: Uuid,
    activities: &[RawActivity],
) -> Result<SignalRecord, EngineError> {
    let data = extract_signal(activities)?;
    let record = store.upsert_signal(user_id, SIGNAL_VERSION, &data).await?;

    tracing::info!(
        user_id = %user_id,
        signal_id = record.id,
        dataset_size = data.dataset_size,
        "signal recomputed"
    );
    Ok(record)
}

/// Top tokens by count. Ties keep first-encountered order.
fn analyze_topics(posts: &[Post<'_>]) -> Vec<Topic> {
    let corpus = posts
        .iter()
        .map(|p| p.text)
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    let mut counts: Vec<(&str, usize)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut total = 0_usize;

    for word in corpus
        .split_whitespace()
        .filter(|w| w.chars().count() > MIN_TOPIC_CHARS)
    {
        total += 1;
        match index.get(word) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(word, counts.len());
                counts.push((word, 1));
            }
        }
    }

    // sort_by is stable
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    counts
        .into_iter()
        .take(TOP_TOPICS)
        .map(|(name, count)| Topic {
            name: name.to_string(),
            count,
            frequency: round2(ratio(count, total)),
        })
        .collect()
}

/// Mean and population variance of the day gaps between consecutive posts.
fn analyze_cadence(posts: &[Post<'_>]) -> Cadence {
    if posts.len() < 2 {
        return Cadence::default();
    }

    #[allow(clippy::cast_precision_loss)]
    let gaps: Vec<f64> = posts
        .windows(2)
        .map(|w| (w[1].occurred_at - w[0].occurred_at).num_milliseconds() as f64 / MS_PER_DAY)
        .collect();

    #[allow(clippy::cast_precision_loss)]
    let n = gaps.len() as f64;
    let average = gaps.iter().sum::<f64>() / n;
    let variance = gaps.iter().map(|g| (g - average).powi(2)).sum::<f64>() / n;

    Cadence {
        average_gap_days: round2(average),
        variance: round2(variance),
    }
}

fn analyze_engagement(posts: &[Post<'_>]) -> Engagement {
    // Counts come from untrusted payloads and may sit near u64::MAX.
    let total_likes = posts.iter().fold(0_u64, |acc, p| acc.saturating_add(p.likes));
    let total_comments = posts
        .iter()
        .fold(0_u64, |acc, p| acc.saturating_add(p.comments));

    #[allow(clippy::cast_precision_loss)]
    let quality = if total_likes > 0 {
        total_comments as f64 * COMMENT_WEIGHT / total_likes as f64
    } else {
        0.0
    };

    #[allow(clippy::cast_possible_truncation)]
    let n = posts.len() as u64;
    Engagement {
        likes_per_post: round2(ratio_u64(total_likes, n)),
        comments_per_post: round2(ratio_u64(total_comments, n)),
        ratio: round2(quality),
    }
}

/// Per-UTC-day like and comment totals, keeping the newest 30 days.
fn analyze_trends(posts: &[Post<'_>]) -> Vec<TrendBucket> {
    let mut buckets: BTreeMap<NaiveDate, (u64, u64)> = BTreeMap::new();
    for post in posts {
        let entry = buckets.entry(post.occurred_at.date_naive()).or_default();
        entry.0 = entry.0.saturating_add(post.likes);
        entry.1 = entry.1.saturating_add(post.comments);
    }

    let skip = buckets.len().saturating_sub(TREND_BUCKETS);
    buckets
        .into_iter()
        .skip(skip)
        .map(|(date, (likes, comments))| TrendBucket {
            date,
            likes,
            comments,
        })
        .collect()
}

fn analyze_top_posts(posts: &[Post<'_>]) -> Vec<TopPost> {
    let mut ranked: Vec<&Post<'_>> = posts.iter().collect();
    ranked.sort_by_key(|p| std::cmp::Reverse(p.interactions()));
    ranked
        .into_iter()
        .take(TOP_POSTS)
        .map(|p| TopPost {
            text: p.text.to_string(),
            likes: p.likes,
            comments: p.comments,
            date: p.occurred_at,
        })
        .collect()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[allow(clippy::cast_precision_loss)]
fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

#[allow(clippy::cast_precision_loss)]
fn ratio_u64(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use parsona_core::content_fingerprint;
    use serde_json::{json, Value};

    use super::*;

    fn activity(payload: Value) -> RawActivity {
        RawActivity {
            id: 0,
            public_id: Uuid::nil(),
            user_id: Uuid::nil(),
            source_type: "linkedin".to_string(),
            content_hash: content_fingerprint(&payload),
            raw_payload: payload,
            ingested_at: Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap(),
        }
    }

    fn post(day: u32, likes: u64, comments: u64) -> RawActivity {
        activity(json!({
            "text": format!("post number {day}"),
            "likes": likes,
            "comments": comments,
            "date": format!("2025-01-{day:02}T12:00:00Z"),
        }))
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(matches!(extract_signal(&[]), Err(EngineError::EmptyInput)));
    }

    #[test]
    fn single_activity_has_zero_cadence() {
        let data = extract_signal(&[post(1, 5, 1)]).unwrap();
        assert_eq!(data.dataset_size, 1);
        assert_eq!(data.cadence, Cadence::default());
    }

    #[test]
    fn cadence_uses_population_variance() {
        // gaps: 1, 3 -> mean 2, population variance 1 (sample variance would be 2)
        let data = extract_signal(&[post(1, 0, 0), post(2, 0, 0), post(5, 0, 0)]).unwrap();
        assert!((data.cadence.average_gap_days - 2.0).abs() < f64::EPSILON);
        assert!((data.cadence.variance - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn cadence_rounds_to_two_decimals() {
        let a = activity(json!({"date": "2025-01-01T00:00:00Z"}));
        let b = activity(json!({"date": "2025-01-01T08:00:00Z"}));
        let data = extract_signal(&[a, b]).unwrap();
        assert!((data.cadence.average_gap_days - 0.33).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_likes_yields_zero_ratio() {
        let data = extract_signal(&[post(1, 0, 9), post(2, 0, 4)]).unwrap();
        assert!(data.engagement.ratio.abs() < f64::EPSILON);
        assert!(data.engagement.ratio.is_finite());
        assert!((data.engagement.comments_per_post - 6.5).abs() < f64::EPSILON);
    }

    #[test]
    fn quality_ratio_weights_comments() {
        let data = extract_signal(&[post(1, 100, 2)]).unwrap();
        // 2 * 5 / 100
        assert!((data.engagement.ratio - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn topics_skip_short_tokens_and_lowercase() {
        let data = extract_signal(&[activity(json!({
            "text": "Rust rust RUSTY Rusty code shipping shipping shipping"
        }))])
        .unwrap();
        let names: Vec<&str> = data.topics.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["shipping", "rusty"]);
        assert_eq!(data.topics[0].count, 3);
        // 3 of 5 qualifying tokens
        assert!((data.topics[0].frequency - 0.6).abs() < f64::EPSILON);
    }

    #[test]
    fn topics_break_ties_by_first_appearance() {
        let data = extract_signal(&[activity(json!({
            "text": "zebra apple mango zebra apple mango"
        }))])
        .unwrap();
        let names: Vec<&str> = data.topics.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["zebra", "apple", "mango"]);
    }

    #[test]
    fn topics_keep_at_most_five() {
        let data = extract_signal(&[activity(json!({
            "text": "alpha bravo charlie delta echoes foxtrot golfer"
        }))])
        .unwrap();
        assert_eq!(data.topics.len(), 5);
        assert_eq!(data.topics[0].name, "alpha");
    }

    #[test]
    fn missing_text_produces_no_topics() {
        let data = extract_signal(&[post(1, 1, 1)]).unwrap();
        // "post number 1": only "number" qualifies
        assert_eq!(data.topics.len(), 1);
        let data = extract_signal(&[activity(json!({"likes": 3}))]).unwrap();
        assert!(data.topics.is_empty());
    }

    #[test]
    fn trends_bucket_by_utc_date() {
        let late = activity(json!({"likes": 1, "comments": 1, "date": "2025-01-01T23:30:00-02:00"}));
        let next = activity(json!({"likes": 2, "comments": 0, "date": "2025-01-02T08:00:00Z"}));
        let data = extract_signal(&[late, next]).unwrap();
        // 23:30 at -02:00 is 01:30 UTC on Jan 2
        assert_eq!(data.trends.len(), 1);
        assert_eq!(data.trends[0].date, NaiveDate::from_ymd_opt(2025, 1, 2).unwrap());
        assert_eq!(data.trends[0].likes, 3);
        assert_eq!(data.trends[0].comments, 1);
    }

    #[test]
    fn trends_keep_most_recent_thirty_days() {
        let posts: Vec<RawActivity> = (1..=31).map(|d| post(d, 1, 0)).collect();
        let data = extract_signal(&posts).unwrap();
        assert_eq!(data.trends.len(), 30);
        assert_eq!(data.trends[0].date, NaiveDate::from_ymd_opt(2025, 1, 2).unwrap());
        assert_eq!(data.trends[29].date, NaiveDate::from_ymd_opt(2025, 1, 31).unwrap());
    }

    #[test]
    fn top_posts_rank_by_interactions() {
        let posts: Vec<RawActivity> = (1..=7).map(|d| post(d, u64::from(d) * 10, 1)).collect();
        let data = extract_signal(&posts).unwrap();
        assert_eq!(data.top_posts.len(), 5);
        let likes: Vec<u64> = data.top_posts.iter().map(|p| p.likes).collect();
        assert_eq!(likes, vec![70, 60, 50, 40, 30]);
    }

    #[test]
    fn topic_length_counts_characters() {
        let data = extract_signal(&[activity(json!({"text": "\u{1F600}\u{1F600}\u{1F600} café"}))])
            .unwrap();
        assert!(data.topics.is_empty());
    }

    #[test]
    fn huge_counts_saturate_instead_of_overflowing() {
        let data = extract_signal(&[
            activity(json!({"text": "a", "likes": 1e30, "comments": 1, "date": "2025-01-01T00:00:00Z"})),
            activity(json!({"text": "b", "likes": 1e30, "comments": 2, "date": "2025-01-01T06:00:00Z"})),
        ])
        .unwrap();
        assert_eq!(data.trends.len(), 1);
        assert_eq!(data.trends[0].likes, u64::MAX);
        assert_eq!(data.trends[0].comments, 3);
        assert_eq!(data.top_posts.len(), 2);
        assert!(data.engagement.likes_per_post > 1e18);
    }

    #[test]
    fn huge_comment_count_keeps_ratio_finite() {
        let data = extract_signal(&[activity(json!({
            "likes": 1,
            "comments": 4_000_000_000_000_000_000_u64
        }))])
        .unwrap();
        assert!(data.engagement.ratio.is_finite());
        assert!(data.engagement.ratio > 1e19);
        assert_eq!(data.top_posts[0].comments, 4_000_000_000_000_000_000);
    }

    #[test]
    fn output_is_independent_of_input_order() {
        let posts: Vec<RawActivity> = vec![
            post(3, 10, 2),
            post(1, 10, 2),
            post(9, 4, 7),
            activity(json!({"text": "shared words shared words", "likes": 10, "comments": 2, "date": "2025-01-05T00:00:00Z"})),
        ];
        let mut reversed = posts.clone();
        reversed.reverse();

        let a = serde_json::to_string(&extract_signal(&posts).unwrap()).unwrap();
        let b = serde_json::to_string(&extract_signal(&reversed).unwrap()).unwrap();
        assert_eq!(a, b);
    }
}

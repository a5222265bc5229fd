// Score and interests computation with caching

use crate::requests::ScoreArguments;
use rand::seq::IndexedRandom;
use scoring_cache::KvStore;
use scoring_validation::text_of;
use serde_json::Number;
use std::time::Duration;

/// Interests a client may be assigned.
pub const INTERESTS: [&str; 11] = [
    "cars", "pets", "travel", "hi-tech", "sport", "music", "books", "tv", "cinema", "geek", "otus",
];

/// Cache key of a score: `uid:` + md5 of name, phone and birthday.
pub fn score_key(args: &ScoreArguments) -> String {
    let phone = args.phone.as_ref().map(text_of).unwrap_or_default();
    let line = format!(
        "{}{}{}{}",
        args.first_name.as_deref().unwrap_or_default(),
        args.last_name.as_deref().unwrap_or_default(),
        phone,
        args.birthday.as_deref().unwrap_or_default(),
    );

    format!("uid:{:x}", md5::compute(line.as_bytes()))
}

/// Score computed from which contact details are present.
pub fn compute_score(args: &ScoreArguments) -> f64 {
    let present = |value: &Option<String>| value.as_deref().is_some_and(|s| !s.is_empty());
    let has_phone = args
        .phone
        .as_ref()
        .is_some_and(scoring_validation::is_truthy);

    let mut score = 0.0;
    if has_phone {
        score += 1.5;
    }
    if present(&args.email) {
        score += 1.5;
    }
    if present(&args.birthday) && args.gender.is_some_and(|g| g != 0.0) {
        score += 1.5;
    }
    if present(&args.first_name) && present(&args.last_name) {
        score += 0.5;
    }
    score
}

/// Cached score, computing and storing it on a miss.
///
/// A cached value that is not a positive number counts as a miss.
pub async fn get_score(store: &KvStore, args: &ScoreArguments, ttl: Duration) -> f64 {
    let key = score_key(args);

    if let Some(score) = store
        .get(&key)
        .await
        .and_then(|cached| cached.parse::<f64>().ok())
        .filter(|score| *score > 0.0)
    {
        return score;
    }

    let score = compute_score(args);
    store.set(&key, score.to_string(), Some(ttl)).await;
    score
}

/// Cache key of a client's interests.
pub fn interests_key(client_id: &Number) -> String {
    format!("i:{}", client_id)
}

/// Two distinct random interests.
pub fn pick_interests() -> Vec<String> {
    INTERESTS
        .choose_multiple(&mut rand::rng(), 2)
        .map(|interest| interest.to_string())
        .collect()
}

/// Cached interests of a client, picking and storing them on a miss.
pub async fn get_interests(store: &KvStore, client_id: &Number, ttl: Duration) -> Vec<String> {
    let key = interests_key(client_id);

    if let Some(interests) = store
        .get(&key)
        .await
        .and_then(|cached| serde_json::from_str::<Vec<String>>(&cached).ok())
    {
        return interests;
    }

    let interests = pick_interests();
    match serde_json::to_string(&interests) {
        Ok(json) => store.set(&key, json, Some(ttl)).await,
        Err(e) => scoring_log::error!(target: "scoring::cache", "cannot encode interests: {}", e),
    }
    interests
}

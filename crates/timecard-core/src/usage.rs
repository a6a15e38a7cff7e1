//! Ranked usage aggregation for domain visits and application time.

use std::collections::HashMap;

use crate::{UsageEvent, UsageTotal};

struct UsageAccumulator {
    first_seen: usize,
    total: i64,
    events: i32,
}

/// Groups `events` by `key_fn`, sums `value_fn`, and returns the top `n`
/// groups ordered by descending total. Ties keep first-seen key order so
/// repeated runs over the same input rank identically.
pub fn top_n<E, K, V>(events: &[E], mut key_fn: K, mut value_fn: V, n: usize) -> Vec<UsageTotal>
where
    K: FnMut(&E) -> String,
    V: FnMut(&E) -> i64,
{
    let mut totals: HashMap<String, UsageAccumulator> = HashMap::new();

    for (index, event) in events.iter().enumerate() {
        let key = key_fn(event);
        let entry = totals.entry(key).or_insert(UsageAccumulator {
            first_seen: index,
            total: 0,
            events: 0,
        });
        entry.total = entry.total.saturating_add(value_fn(event));
        entry.events = entry.events.saturating_add(1);
    }

    let mut ranked: Vec<(String, UsageAccumulator)> = totals.into_iter().collect();
    ranked.sort_by(|a, b| {
        b.1.total
            .cmp(&a.1.total)
            .then(a.1.first_seen.cmp(&b.1.first_seen))
    });
    ranked.truncate(n);

    ranked
        .into_iter()
        .map(|(key, acc)| UsageTotal {
            key,
            total: acc.total,
            events: acc.events,
        })
        .collect()
}

/// Top `n` visited domains by visit count.
pub fn top_domains(events: &[UsageEvent], n: usize) -> Vec<UsageTotal> {
    top_n(events, |e| e.key.clone(), |_| 1, n)
}

/// Top `n` applications by accumulated foreground seconds.
pub fn top_applications(events: &[UsageEvent], n: usize) -> Vec<UsageTotal> {
    top_n(events, |e| e.key.clone(), |e| e.duration_seconds, n)
}

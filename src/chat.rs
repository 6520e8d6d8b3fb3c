use std::collections::HashMap;

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::models::{ChatLogEntry, DayBucket, Speaker, TranscriptLine};

/// Groups a user's chat entries from the trailing window into per-day
/// buckets, newest day first. Each bucket counts every entry on that day
/// and carries the latest USER-authored message, if any. `now` is the query
/// instant in the reporting timezone; ties on timestamp fall back to the
/// insertion id.
pub fn aggregate_by_day(
    entries: &[ChatLogEntry],
    now: NaiveDateTime,
    window_days: i64,
) -> Vec<DayBucket> {
    let cutoff = now - Duration::days(window_days.max(1));
    let mut buckets: HashMap<NaiveDate, (usize, Option<&ChatLogEntry>)> = HashMap::new();

    for entry in entries {
        if entry.created_at < cutoff {
            continue;
        }

        let bucket = buckets.entry(entry.created_at.date()).or_insert((0, None));
        bucket.0 += 1;

        if entry.speaker == Speaker::User {
            let newer = match bucket.1 {
                Some(current) => {
                    (entry.created_at, entry.id) > (current.created_at, current.id)
                }
                None => true,
            };
            if newer {
                bucket.1 = Some(entry);
            }
        }
    }

    let mut days: Vec<DayBucket> = buckets
        .into_iter()
        .map(|(day, (count, last_user))| DayBucket {
            day,
            count,
            last_user_message: last_user.map(|entry| entry.message.clone()),
        })
        .collect();

    days.sort_by(|a, b| b.day.cmp(&a.day));
    days
}

/// Full transcript for one calendar day, chronological, with the insertion
/// id breaking timestamp ties.
pub fn day_transcript(entries: &[ChatLogEntry], day: NaiveDate) -> Vec<TranscriptLine> {
    let mut on_day: Vec<&ChatLogEntry> = entries
        .iter()
        .filter(|entry| entry.created_at.date() == day)
        .collect();

    on_day.sort_by_key(|entry| (entry.created_at, entry.id));
    on_day
        .into_iter()
        .map(|entry| TranscriptLine {
            speaker: entry.speaker,
            message: entry.message.clone(),
            created_at: entry.created_at,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 10)
            .unwrap()
            .and_hms_opt(18, 0, 0)
            .unwrap()
    }

    fn entry(id: i64, speaker: Speaker, message: &str, hours_ago: i64) -> ChatLogEntry {
        ChatLogEntry {
            id,
            uid: "20230001".to_string(),
            speaker,
            message: message.to_string(),
            created_at: base_now() - Duration::hours(hours_ago),
        }
    }

    #[test]
    fn buckets_count_all_speakers_but_track_latest_user_message() {
        let entries = vec![
            entry(1, Speaker::User, "first question", 8),
            entry(2, Speaker::Bot, "first answer", 7),
            entry(3, Speaker::User, "second question", 6),
            entry(4, Speaker::Bot, "second answer", 5),
            entry(5, Speaker::User, "third question", 4),
            entry(6, Speaker::User, "yesterday", 30),
        ];

        let days = aggregate_by_day(&entries, base_now(), 7);
        assert_eq!(days.len(), 2);

        let today = &days[0];
        assert_eq!(today.count, 5);
        assert_eq!(today.last_user_message.as_deref(), Some("third question"));

        let yesterday = &days[1];
        assert_eq!(yesterday.count, 1);
        assert_eq!(yesterday.last_user_message.as_deref(), Some("yesterday"));
    }

    #[test]
    fn bot_only_day_has_no_user_message() {
        let entries = vec![
            entry(1, Speaker::Bot, "ping", 2),
            entry(2, Speaker::Bot, "pong", 1),
        ];

        let days = aggregate_by_day(&entries, base_now(), 7);
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].count, 2);
        assert!(days[0].last_user_message.is_none());
    }

    #[test]
    fn entries_before_the_window_are_dropped() {
        let entries = vec![
            entry(1, Speaker::User, "recent", 1),
            entry(2, Speaker::User, "ancient", 24 * 10),
        ];

        let days = aggregate_by_day(&entries, base_now(), 7);
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].last_user_message.as_deref(), Some("recent"));
    }

    #[test]
    fn buckets_are_ordered_newest_day_first() {
        let entries = vec![
            entry(1, Speaker::User, "old", 24 * 3),
            entry(2, Speaker::User, "new", 1),
            entry(3, Speaker::User, "middle", 24 * 2),
        ];

        let days = aggregate_by_day(&entries, base_now(), 7);
        assert_eq!(days.len(), 3);
        assert!(days[0].day > days[1].day);
        assert!(days[1].day > days[2].day);
    }

    #[test]
    fn timestamp_ties_resolve_by_insertion_id() {
        let same_instant = base_now() - Duration::hours(2);
        let entries = vec![
            ChatLogEntry {
                id: 7,
                uid: "20230001".to_string(),
                speaker: Speaker::User,
                message: "earlier insert".to_string(),
                created_at: same_instant,
            },
            ChatLogEntry {
                id: 9,
                uid: "20230001".to_string(),
                speaker: Speaker::User,
                message: "later insert".to_string(),
                created_at: same_instant,
            },
        ];

        let days = aggregate_by_day(&entries, base_now(), 7);
        assert_eq!(days[0].last_user_message.as_deref(), Some("later insert"));

        let transcript = day_transcript(&entries, same_instant.date());
        assert_eq!(transcript[0].message, "earlier insert");
        assert_eq!(transcript[1].message, "later insert");
    }

    #[test]
    fn transcript_is_chronological_and_day_scoped() {
        let entries = vec![
            entry(3, Speaker::Bot, "answer", 3),
            entry(2, Speaker::User, "question", 4),
            entry(1, Speaker::User, "other day", 30),
        ];

        let transcript = day_transcript(&entries, base_now().date());
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[0].message, "question");
        assert_eq!(transcript[1].message, "answer");
    }

    #[test]
    fn empty_log_produces_no_buckets() {
        assert!(aggregate_by_day(&[], base_now(), 7).is_empty());
        assert!(day_transcript(&[], base_now().date()).is_empty());
    }
}

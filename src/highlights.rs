/// Highlight extraction.
///
/// Reduces one day's corpus to the digest highlights. Every extractor is a
/// single pass over the messages in corpus order; ties always go to whatever
/// was encountered first, so the result only depends on that order.
use indexmap::IndexMap;

use crate::slack::WorkspaceApi;
use crate::stats::*;

/// Number of channels kept in the "most active" ranking.
pub const ACTIVE_CHANNELS_LIMIT: usize = 2;

/// Busiest thread: largest `reply_count` among messages that carry a thread id.
///
/// The reply count is read from whichever message record carries the thread
/// id; no parent/reply join is attempted.
pub fn top_thread(messages: &[Message]) -> Option<TopThread> {
    let mut threads: IndexMap<&str, TopThread> = IndexMap::new();

    for msg in messages {
        let Some(thread_id) = msg.thread_id.as_deref() else {
            continue;
        };
        if msg.reply_count == 0 {
            continue;
        }

        match threads.get_mut(thread_id) {
            Some(best) if msg.reply_count > best.reply_count => {
                best.text = msg.text.clone();
                best.reply_count = msg.reply_count;
            }
            Some(_) => {}
            None => {
                threads.insert(
                    thread_id,
                    TopThread {
                        text: msg.text.clone(),
                        reply_count: msg.reply_count,
                    },
                );
            }
        }
    }

    first_max_by_key(threads.into_values(), |t| u64::from(t.reply_count))
}

/// Channels ranked by message count, busiest first, at most two.
pub fn most_active_channels(messages: &[Message]) -> Vec<ActiveChannel> {
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for msg in messages {
        *counts.entry(msg.channel_name.as_str()).or_insert(0) += 1;
    }

    let mut ranked: Vec<ActiveChannel> = counts
        .into_iter()
        .map(|(name, message_count)| ActiveChannel {
            name: name.to_string(),
            message_count,
        })
        .collect();
    // Stable sort keeps first-encountered order among equal counts
    ranked.sort_by(|a, b| b.message_count.cmp(&a.message_count));
    ranked.truncate(ACTIVE_CHANNELS_LIMIT);
    ranked
}

/// Author whose messages collected the most reactions, with that total.
///
/// Messages without an author are ignored. Returns `None` when nobody
/// received a single reaction.
pub fn most_reacted_author(messages: &[Message]) -> Option<(String, u64)> {
    let mut totals: IndexMap<&str, u64> = IndexMap::new();
    for msg in messages {
        if let Some(author) = msg.author_id.as_deref() {
            *totals.entry(author).or_insert(0) += msg.reaction_total();
        }
    }

    first_max_by_key(totals.into_iter(), |(_, total)| *total)
        .filter(|(_, total)| *total > 0)
        .map(|(author, total)| (author.to_string(), total))
}

/// Resolves the most reacted-to author to a display name.
///
/// A failed lookup falls back to the raw author id.
pub async fn most_helpful_contributor<A>(
    api: &A,
    messages: &[Message],
) -> Option<HelpfulContributor>
where
    A: WorkspaceApi + ?Sized,
{
    let (author_id, reaction_total) = most_reacted_author(messages)?;

    let display_name = match api.lookup_user_display_name(&author_id).await {
        Ok(name) => name,
        Err(e) => {
            tracing::warn!(author = %author_id, "User lookup failed, using raw id: {}", e);
            author_id.clone()
        }
    };

    Some(HelpfulContributor {
        author_id,
        display_name,
        reaction_total,
    })
}

/// First message asking something that got neither replies nor reactions.
pub fn open_question(messages: &[Message]) -> Option<OpenQuestion> {
    messages
        .iter()
        .find(|msg| msg.text.contains('?') && msg.reply_count == 0 && msg.reactions.is_empty())
        .map(|msg| OpenQuestion {
            text: msg.text.clone(),
        })
}

/// Runs every extractor over the corpus.
pub async fn extract<A>(api: &A, messages: &[Message]) -> Highlights
where
    A: WorkspaceApi + ?Sized,
{
    Highlights {
        top_thread: top_thread(messages),
        active_channels: most_active_channels(messages),
        helpful_contributor: most_helpful_contributor(api, messages).await,
        open_question: open_question(messages),
    }
}

/// Like `Iterator::max_by_key`, but the first maximum wins instead of the last.
fn first_max_by_key<T, I, F>(items: I, key: F) -> Option<T>
where
    I: Iterator<Item = T>,
    F: Fn(&T) -> u64,
{
    let mut best: Option<(u64, T)> = None;
    for item in items {
        let k = key(&item);
        if best.as_ref().is_none_or(|(best_key, _)| k > *best_key) {
            best = Some((k, item));
        }
    }
    best.map(|(_, item)| item)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{msg, FakeWorkspace};

    fn reacted(channel: &str, author: &str, counts: &[u32]) -> Message {
        let mut m = msg(channel, "thanks!");
        m.author_id = Some(author.to_string());
        m.reactions = counts
            .iter()
            .map(|&count| Reaction {
                name: "pray".to_string(),
                count,
            })
            .collect();
        m
    }

    fn threaded(channel: &str, thread_id: &str, replies: u32, text: &str) -> Message {
        let mut m = msg(channel, text);
        m.thread_id = Some(thread_id.to_string());
        m.reply_count = replies;
        m
    }

    #[test]
    fn test_top_thread_picks_global_max() {
        let corpus = vec![
            threaded("general", "t1", 3, "first"),
            threaded("general", "t2", 7, "second"),
            threaded("random", "t3", 5, "third"),
        ];

        let top = top_thread(&corpus).unwrap();
        assert_eq!(top.text, "second");
        assert_eq!(top.reply_count, 7);
    }

    #[test]
    fn test_top_thread_keeps_max_within_group() {
        let corpus = vec![
            threaded("general", "t1", 2, "early snapshot"),
            threaded("general", "t1", 9, "kickoff"),
            threaded("general", "t1", 4, "late snapshot"),
        ];

        let top = top_thread(&corpus).unwrap();
        assert_eq!(top.text, "kickoff");
        assert_eq!(top.reply_count, 9);
    }

    #[test]
    fn test_top_thread_tie_goes_to_first_thread() {
        let corpus = vec![
            threaded("general", "t1", 4, "one"),
            threaded("general", "t2", 4, "two"),
        ];
        assert_eq!(top_thread(&corpus).unwrap().text, "one");
    }

    #[test]
    fn test_top_thread_absent_without_replies() {
        let mut no_thread = msg("general", "has replies but no thread id");
        no_thread.reply_count = 3;
        let corpus = vec![
            no_thread,
            threaded("general", "t1", 0, "reply inside a thread"),
        ];
        assert!(top_thread(&corpus).is_none());
        assert!(top_thread(&[]).is_none());
    }

    #[test]
    fn test_most_active_channels_ranked() {
        let corpus = vec![
            msg("random", "a"),
            msg("general", "b"),
            msg("general", "c"),
            msg("dev", "d"),
            msg("general", "e"),
            msg("dev", "f"),
        ];

        let ranked = most_active_channels(&corpus);
        assert_eq!(
            ranked,
            vec![
                ActiveChannel {
                    name: "general".to_string(),
                    message_count: 3
                },
                ActiveChannel {
                    name: "dev".to_string(),
                    message_count: 2
                },
            ]
        );
    }

    #[test]
    fn test_most_active_channels_ties_by_first_seen() {
        let corpus = vec![
            msg("zeta", "a"),
            msg("alpha", "b"),
            msg("mid", "c"),
            msg("alpha", "d"),
            msg("zeta", "e"),
        ];

        let names: Vec<_> = most_active_channels(&corpus)
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_most_active_channels_bounds() {
        assert!(most_active_channels(&[]).is_empty());

        let corpus: Vec<_> = (0..9)
            .map(|i| msg(&format!("c{}", i % 4), "x"))
            .collect();
        let ranked = most_active_channels(&corpus);
        assert!(ranked.len() <= ACTIVE_CHANNELS_LIMIT);
        assert!(ranked
            .windows(2)
            .all(|w| w[0].message_count >= w[1].message_count));
        assert!(ranked.iter().map(|c| c.message_count).sum::<usize>() <= corpus.len());
    }

    #[test]
    fn test_most_reacted_author_sums_across_messages() {
        let corpus = vec![
            reacted("general", "U1", &[2]),
            reacted("general", "U2", &[4]),
            reacted("random", "U1", &[1, 2]),
        ];
        assert_eq!(most_reacted_author(&corpus), Some(("U1".to_string(), 5)));
    }

    #[test]
    fn test_most_reacted_author_tie_goes_to_first() {
        let corpus = vec![
            reacted("general", "U2", &[3]),
            reacted("general", "U1", &[3]),
        ];
        assert_eq!(most_reacted_author(&corpus), Some(("U2".to_string(), 3)));
    }

    #[test]
    fn test_most_reacted_author_absent_without_reactions() {
        let corpus = vec![reacted("general", "U1", &[]), msg("general", "system")];
        assert_eq!(most_reacted_author(&corpus), None);

        // Reactions on authorless messages cannot be attributed
        let mut system = msg("general", "deploy finished");
        system.reactions = vec![Reaction {
            name: "rocket".to_string(),
            count: 4,
        }];
        assert_eq!(most_reacted_author(&[system]), None);
    }

    #[tokio::test]
    async fn test_contributor_uses_display_name() {
        let api = FakeWorkspace::new().with_user("U1", "alice");
        let corpus = vec![reacted("general", "U1", &[3])];

        let contributor = most_helpful_contributor(&api, &corpus).await.unwrap();
        assert_eq!(contributor.display_name, "alice");
        assert_eq!(contributor.author_id, "U1");
        assert_eq!(contributor.reaction_total, 3);
    }

    #[tokio::test]
    async fn test_contributor_falls_back_to_raw_id() {
        let api = FakeWorkspace::new();
        let corpus = vec![reacted("general", "U404", &[1])];

        let contributor = most_helpful_contributor(&api, &corpus).await.unwrap();
        assert_eq!(contributor.display_name, "U404");
    }

    #[tokio::test]
    async fn test_contributor_skips_lookup_without_reactions() {
        let api = FakeWorkspace::new().with_user("U1", "alice");
        let corpus = vec![msg("general", "hi")];

        assert!(most_helpful_contributor(&api, &corpus).await.is_none());
        assert_eq!(api.lookup_calls(), 0);
    }

    #[test]
    fn test_open_question_first_match() {
        let mut answered = msg("general", "Is prod down?");
        answered.reply_count = 2;
        let mut acknowledged = msg("general", "Lunch at noon?");
        acknowledged.reactions = vec![Reaction {
            name: "+1".to_string(),
            count: 1,
        }];
        let corpus = vec![
            msg("general", "No question here"),
            answered,
            acknowledged,
            msg("random", "Anyone seen the deploy?"),
            msg("random", "Who owns billing?"),
        ];

        assert_eq!(
            open_question(&corpus).unwrap().text,
            "Anyone seen the deploy?"
        );
    }

    #[test]
    fn test_open_question_absent() {
        assert!(open_question(&[]).is_none());
        assert!(open_question(&[msg("general", "all good.")]).is_none());
    }

    #[tokio::test]
    async fn test_extract_is_idempotent() {
        let api = FakeWorkspace::new().with_user("U1", "alice");
        let corpus = vec![
            threaded("general", "t1", 5, "kickoff"),
            reacted("random", "U1", &[3]),
            msg("general", "Anyone seen the deploy?"),
        ];

        let first = extract(&api, &corpus).await;
        let second = extract(&api, &corpus).await;
        assert_eq!(first, second);
        assert!(first.top_thread.is_some());
        assert_eq!(first.active_channels.len(), 2);
    }

    #[test]
    fn test_first_max_by_key() {
        let items = vec![("a", 1), ("b", 3), ("c", 3), ("d", 2)];
        let best = first_max_by_key(items.into_iter(), |(_, k)| *k);
        assert_eq!(best, Some(("b", 3)));
        assert_eq!(first_max_by_key(Vec::<u64>::new().into_iter(), |k| *k), None);
    }
}

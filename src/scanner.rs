//! Queue namespace scanner: walks configured key prefixes and extracts
//! the set of queue names present in the store.

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::error::{BoardError, BoardResult};
use crate::store::KeyLookup;

/// Scans key prefixes and produces a deduplicated queue-name mapping.
pub struct QueueScanner {
    store: Arc<dyn KeyLookup>,
}

impl QueueScanner {
    /// Create a scanner over the given store.
    pub fn new(store: Arc<dyn KeyLookup>) -> Self {
        Self { store }
    }

    /// Walk the prefixes in order and map each discovered queue name to
    /// the prefix under which it was first observed.
    ///
    /// Store lookup failures propagate unmodified. An empty final
    /// mapping fails with `NoQueuesFound`.
    pub async fn scan(&self, prefixes: &[String]) -> BoardResult<IndexMap<String, String>> {
        let mut queues: IndexMap<String, String> = IndexMap::new();

        for prefix in prefixes {
            let pattern = format!("{prefix}:*");
            let keys = self.store.keys(&pattern).await?;
            debug!(prefix = %prefix, keys = keys.len(), "listed queue keys");

            for key in &keys {
                let Some(name) = queue_name(key) else {
                    continue;
                };
                if let Some(owner) = queues.get(name) {
                    if owner != prefix {
                        // First-scanned prefix keeps the name; the later
                        // one is shadowed, which loses any distinct queue
                        // it hosts under that name.
                        warn!(
                            queue = %name,
                            owner = %owner,
                            shadowed = %prefix,
                            "queue name already claimed by an earlier prefix"
                        );
                    }
                    continue;
                }
                queues.insert(name.to_string(), prefix.clone());
            }
        }

        if queues.is_empty() {
            return Err(BoardError::NoQueuesFound);
        }
        Ok(queues)
    }
}

/// Extract the queue name from a store key.
///
/// Keys are `<prefix>:<queueName>:<suffix...>`; anything with fewer than
/// two colon-delimited segments is not a queue key.
fn queue_name(key: &str) -> Option<&str> {
    let mut segments = key.split(':');
    segments.next()?;
    segments.next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use proptest::prelude::*;
    use std::collections::HashMap;

    /// Stub lookup answering each pattern with a canned key listing.
    struct StubLookup {
        responses: HashMap<String, Vec<String>>,
    }

    impl StubLookup {
        fn new(responses: &[(&str, &[&str])]) -> Self {
            Self {
                responses: responses
                    .iter()
                    .map(|(pattern, keys)| {
                        (
                            pattern.to_string(),
                            keys.iter().map(|key| key.to_string()).collect(),
                        )
                    })
                    .collect(),
            }
        }
    }

    #[async_trait]
    impl KeyLookup for StubLookup {
        async fn keys(&self, pattern: &str) -> BoardResult<Vec<String>> {
            Ok(self.responses.get(pattern).cloned().unwrap_or_default())
        }
    }

    fn scanner(responses: &[(&str, &[&str])]) -> QueueScanner {
        QueueScanner::new(Arc::new(StubLookup::new(responses)))
    }

    fn prefixes(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[tokio::test]
    async fn extracts_queue_names_from_compound_keys() {
        let scanner = scanner(&[(
            "bull:*",
            &["bull:queue1:jobs", "bull:queue1:wait", "bull:queue2:jobs"],
        )]);

        let queues = scanner.scan(&prefixes(&["bull"])).await.unwrap();

        assert_eq!(queues.len(), 2);
        assert_eq!(queues.get("queue1"), Some(&"bull".to_string()));
        assert_eq!(queues.get("queue2"), Some(&"bull".to_string()));
    }

    #[tokio::test]
    async fn malformed_keys_are_ignored() {
        let scanner = scanner(&[("bull:*", &["plain", "bull:queue1:jobs"])]);

        let queues = scanner.scan(&prefixes(&["bull"])).await.unwrap();

        assert_eq!(queues.len(), 1);
        assert!(queues.contains_key("queue1"));
    }

    #[tokio::test]
    async fn first_scanned_prefix_wins_on_name_collision() {
        let scanner = scanner(&[
            ("alpha:*", &["alpha:shared:jobs"]),
            ("bull:*", &["bull:shared:jobs", "bull:solo:jobs"]),
        ]);

        let queues = scanner
            .scan(&prefixes(&["alpha", "bull"]))
            .await
            .unwrap();

        assert_eq!(queues.get("shared"), Some(&"alpha".to_string()));
        assert_eq!(queues.get("solo"), Some(&"bull".to_string()));
        // Insertion order follows scan order, not alphabetical order.
        let names: Vec<&str> = queues.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["shared", "solo"]);
    }

    #[tokio::test]
    async fn duplicate_keys_within_a_prefix_collapse_to_one_entry() {
        let scanner = scanner(&[(
            "bull:*",
            &["bull:queue1:jobs", "bull:queue1:jobs", "bull:queue1:active"],
        )]);

        let queues = scanner.scan(&prefixes(&["bull"])).await.unwrap();

        assert_eq!(queues.len(), 1);
    }

    #[tokio::test]
    async fn empty_key_space_fails_with_no_queues_found() {
        let scanner = scanner(&[("bull:*", &[])]);

        let result = scanner.scan(&prefixes(&["bull"])).await;

        assert!(matches!(result, Err(BoardError::NoQueuesFound)));
    }

    proptest! {
        #[test]
        fn keys_without_a_separator_never_yield_a_name(key in "[^:]*") {
            prop_assert!(queue_name(&key).is_none());
        }

        #[test]
        fn second_segment_is_always_the_queue_name(
            prefix in "[^:]+",
            name in "[^:]+",
            suffix in "[^:]*",
        ) {
            let key = format!("{prefix}:{name}:{suffix}");
            prop_assert_eq!(queue_name(&key), Some(name.as_str()));
        }
    }
}

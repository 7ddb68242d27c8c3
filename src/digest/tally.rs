//! Keyword occurrence counts over a fixed vocabulary.

/// Counts for each vocabulary keyword, kept in vocabulary order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordTally {
    counts: Vec<(String, u64)>,
}

impl KeywordTally {
    /// A zeroed tally. The vocabulary is assumed deduplicated.
    pub fn new<I, S>(vocabulary: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            counts: vocabulary.into_iter().map(|k| (k.into(), 0)).collect(),
        }
    }

    /// Count every whitespace-separated token of `content` that exactly
    /// equals a keyword.
    pub fn update(&mut self, content: &str) {
        for token in content.split_whitespace() {
            if let Some((_, count)) = self.counts.iter_mut().find(|(k, _)| k == token) {
                *count += 1;
            }
        }
    }

    pub fn count(&self, keyword: &str) -> u64 {
        self.counts
            .iter()
            .find(|(k, _)| k == keyword)
            .map_or(0, |(_, c)| *c)
    }

    /// Up to `n` keywords with a non-zero count, highest first. Equal counts
    /// keep vocabulary order.
    pub fn top(&self, n: usize) -> Vec<(&str, u64)> {
        let mut ranked: Vec<(&str, u64)> = self
            .counts
            .iter()
            .filter(|(_, c)| *c > 0)
            .map(|(k, c)| (k.as_str(), *c))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(n);
        ranked
    }

    /// Remove the counts recorded in `other`.
    pub fn subtract(&mut self, other: &KeywordTally) {
        for (keyword, count) in &mut self.counts {
            *count = count.saturating_sub(other.count(keyword));
        }
    }

    /// True when every keyword is at zero.
    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|(_, c)| *c == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_token_counts_twice() {
        let mut tally = KeywordTally::new(["BTC"]);
        tally.update("BTC to the moon BTC");
        assert_eq!(tally.count("BTC"), 2);
    }

    #[test]
    fn match_is_exact() {
        let mut tally = KeywordTally::new(["BTC", "AI"]);
        tally.update("btc BTC, #AI AIs BTC");
        assert_eq!(tally.count("BTC"), 1);
        assert_eq!(tally.count("AI"), 0);
    }

    #[test]
    fn empty_input_is_noop() {
        let mut tally = KeywordTally::new(["BTC"]);
        tally.update("");
        tally.update("   \n ");
        assert!(tally.is_empty());
    }

    #[test]
    fn unknown_keyword_counts_zero() {
        let tally = KeywordTally::new(["BTC"]);
        assert_eq!(tally.count("ETH"), 0);
    }

    #[test]
    fn top_breaks_ties_by_vocabulary_order() {
        let mut tally = KeywordTally::new(["AI", "BTC", "ETH"]);
        // BTC reaches 3 first; AI still ranks ahead on the tie.
        tally.update("BTC BTC BTC ETH");
        tally.update("AI AI AI");
        assert_eq!(tally.top(3), vec![("AI", 3), ("BTC", 3), ("ETH", 1)]);
    }

    #[test]
    fn top_sorts_by_count_descending() {
        let mut tally = KeywordTally::new(["AI", "BTC", "ETH", "Layer2"]);
        tally.update("ETH ETH ETH Layer2 AI AI BTC");
        assert_eq!(tally.top(3), vec![("ETH", 3), ("AI", 2), ("BTC", 1)]);
    }

    #[test]
    fn top_omits_zero_counts() {
        let mut tally = KeywordTally::new(["AI", "BTC", "ETH"]);
        tally.update("ETH");
        assert_eq!(tally.top(3), vec![("ETH", 1)]);
        assert!(KeywordTally::new(["AI"]).top(3).is_empty());
    }

    #[test]
    fn subtract_leaves_newer_counts() {
        let mut tally = KeywordTally::new(["AI", "BTC"]);
        tally.update("AI BTC");
        let snapshot = tally.clone();
        tally.update("BTC");

        tally.subtract(&snapshot);
        assert_eq!(tally.count("AI"), 0);
        assert_eq!(tally.count("BTC"), 1);
    }
}

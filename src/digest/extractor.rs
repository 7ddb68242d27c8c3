//! Recognizes forwarded posts of the form `<description> @handle - <url>`.

use std::sync::LazyLock;

use regex::Regex;

/// Number of description tokens kept in a display line's title.
pub const TITLE_MAX_TOKENS: usize = 10;

static FORWARDED_POST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(.+?) (@\w+) - (https?://\S+)").expect("forwarded post pattern is valid")
});

/// A relevant message, reduced to what the digest keeps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardedPost {
    /// `{title} — {handle} 🔗 ({url})`
    pub display_line: String,
    /// The untruncated description.
    pub raw_content: String,
}

/// Extract a forwarded post from `text`, or `None` if the message is not one.
pub fn extract(text: &str) -> Option<ForwardedPost> {
    let caps = FORWARDED_POST.captures(text)?;
    let description = &caps[1];
    let handle = &caps[2];
    let url = &caps[3];

    Some(ForwardedPost {
        display_line: format!("{} — {handle} 🔗 ({url})", title(description)),
        raw_content: description.to_string(),
    })
}

/// First `TITLE_MAX_TOKENS` whitespace-separated tokens, single-space joined.
fn title(description: &str) -> String {
    description
        .split_whitespace()
        .take(TITLE_MAX_TOKENS)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_simple_post() {
        let post = extract("Bitcoin is pumping @cryptoguy - https://x.com/abc").unwrap();
        assert_eq!(
            post.display_line,
            "Bitcoin is pumping — @cryptoguy 🔗 (https://x.com/abc)"
        );
        assert_eq!(post.raw_content, "Bitcoin is pumping");
    }

    #[test]
    fn title_keeps_first_ten_tokens() {
        let description = (1..=15).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ");
        let text = format!("{description} @someone - https://x.com/status/1");
        let post = extract(&text).unwrap();

        assert_eq!(
            post.display_line,
            "w1 w2 w3 w4 w5 w6 w7 w8 w9 w10 — @someone 🔗 (https://x.com/status/1)"
        );
        assert_eq!(post.raw_content, description);
    }

    #[test]
    fn title_collapses_repeated_whitespace() {
        let post = extract("ETH  gas\tis low @gasbot - https://x.com/g").unwrap();
        assert!(post.display_line.starts_with("ETH gas is low — "));
        assert_eq!(post.raw_content, "ETH  gas\tis low");
    }

    #[test]
    fn accepts_http_and_stops_url_at_whitespace() {
        let post = extract("news @feed - http://example.com/a?b=c trailing words").unwrap();
        assert_eq!(post.display_line, "news — @feed 🔗 (http://example.com/a?b=c)");
    }

    #[test]
    fn matches_inside_longer_text() {
        let post = extract("fwd: Layer2 fees drop @l2watch - https://x.com/l2\nsent from phone")
            .unwrap();
        assert_eq!(post.raw_content, "fwd: Layer2 fees drop");
    }

    #[test]
    fn handle_accepts_unicode_word_characters() {
        let post = extract("比特幣 上漲 @幣圈_news - https://x.com/1").unwrap();
        assert_eq!(post.display_line, "比特幣 上漲 — @幣圈_news 🔗 (https://x.com/1)");
    }

    #[test]
    fn non_matching_messages_are_ignored() {
        for text in [
            "",
            "good morning everyone",
            "@cryptoguy - https://x.com/abc",
            "no handle - https://x.com/abc",
            "missing url @cryptoguy - ",
            "wrong scheme @cryptoguy - ftp://x.com/abc",
            "no dash @cryptoguy https://x.com/abc",
            "bare @ handle @ - https://x.com/abc",
        ] {
            assert!(extract(text).is_none(), "unexpected match for {text:?}");
        }
    }
}

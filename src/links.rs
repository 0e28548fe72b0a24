//! Link extraction from raw resume text.
//!
//! Links are pulled out with a regular expression rather than left to the
//! model: the extracted list is authoritative and replaces whatever the model
//! put in the `links` field.
//!
//! A link is the longest run of non-whitespace characters starting at
//! `http://` or `https://`. Matches keep their order of appearance and are
//! not deduplicated or validated. Punctuation glued to the end of a URL
//! (`see https://a.dev.`) is part of the match unless
//! [`LinkPolicy::TrimTrailingPunctuation`] is selected.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static RE_URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://\S+").unwrap());

/// Characters stripped from the end of a link under
/// [`LinkPolicy::TrimTrailingPunctuation`].
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', ')', ']', '}', '\'', '"'];

/// How matched links are post-processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LinkPolicy {
    /// Keep every match exactly as it appears in the text. (default)
    #[default]
    Verbatim,
    /// Strip sentence punctuation glued to the end of each match.
    TrimTrailingPunctuation,
}

/// Every `http://` / `https://` token in `text`, in order, duplicates kept.
pub fn extract_links(text: &str) -> Vec<String> {
    RE_URL
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// [`extract_links`] followed by the given [`LinkPolicy`].
///
/// A match reduced to the bare scheme by trimming (e.g. `https://.`) is kept
/// untrimmed so the list length never depends on the policy.
pub fn extract_links_with(text: &str, policy: LinkPolicy) -> Vec<String> {
    match policy {
        LinkPolicy::Verbatim => extract_links(text),
        LinkPolicy::TrimTrailingPunctuation => RE_URL
            .find_iter(text)
            .map(|m| trim_trailing_punctuation(m.as_str()).to_string())
            .collect(),
    }
}

fn trim_trailing_punctuation(link: &str) -> &str {
    let trimmed = link.trim_end_matches(TRAILING_PUNCTUATION);
    if trimmed.ends_with("://") {
        link
    } else {
        trimmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_schemes_in_order() {
        assert_eq!(
            extract_links("visit https://a.com and http://b.org/x"),
            vec!["https://a.com", "http://b.org/x"]
        );
    }

    #[test]
    fn test_no_links() {
        assert!(extract_links("no links here").is_empty());
        assert!(extract_links("").is_empty());
    }

    #[test]
    fn test_duplicates_preserved() {
        let text = "https://x.dev https://x.dev\nhttps://x.dev";
        assert_eq!(extract_links(text).len(), 3);
    }

    #[test]
    fn test_trailing_period_kept_verbatim() {
        assert_eq!(
            extract_links("My site is https://jane.dev."),
            vec!["https://jane.dev."]
        );
    }

    #[test]
    fn test_match_stops_at_any_whitespace() {
        let text = "a https://a.com/p?q=1\tb http://b.io\nc https://c.net\r\n";
        assert_eq!(
            extract_links(text),
            vec!["https://a.com/p?q=1", "http://b.io", "https://c.net"]
        );
    }

    #[test]
    fn test_scheme_inside_word_still_matches() {
        // The token starts at the scheme, not at the word boundary.
        assert_eq!(
            extract_links("Portfolio:https://jane.dev"),
            vec!["https://jane.dev"]
        );
    }

    #[test]
    fn test_other_schemes_ignored() {
        assert!(extract_links("ftp://a.com mailto:x@y.z www.example.com").is_empty());
        assert!(extract_links("HTTPS://SHOUT.COM").is_empty());
    }

    #[test]
    fn test_every_match_starts_with_scheme_and_occurs_in_text() {
        let samples = [
            "Jane Doe\nContact: jane@x.com\nPortfolio: https://jane.dev",
            "(https://github.com/jane), [http://x.y]",
            "https://https://double",
            "http:// nothing after",
        ];
        for text in samples {
            let mut cursor = 0;
            for link in extract_links(text) {
                assert!(link.starts_with("http://") || link.starts_with("https://"));
                assert!(!link.chars().any(char::is_whitespace));
                let at = text[cursor..].find(&link).expect("link must occur in order");
                cursor += at + link.len();
            }
        }
    }

    #[test]
    fn test_bare_scheme_followed_by_space_is_not_a_link() {
        assert!(extract_links("http:// nothing after").is_empty());
    }

    #[test]
    fn test_trim_policy() {
        let text = "See https://jane.dev. Also (https://github.com/jane), or https://x.io/a?b=1!";
        assert_eq!(
            extract_links_with(text, LinkPolicy::TrimTrailingPunctuation),
            vec!["https://jane.dev", "https://github.com/jane", "https://x.io/a?b=1"]
        );
        assert_eq!(
            extract_links_with(text, LinkPolicy::Verbatim),
            extract_links(text)
        );
    }

    #[test]
    fn test_trim_policy_never_drops_a_match() {
        assert_eq!(
            extract_links_with("odd https://.", LinkPolicy::TrimTrailingPunctuation),
            vec!["https://."]
        );
    }
}

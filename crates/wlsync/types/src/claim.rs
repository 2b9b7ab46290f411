//! Claim command parsing
//!
//! A claim is a chat message starting with `MyID=`. Whitespace between the
//! prefix and the name is skipped, the name runs to the next whitespace, and
//! anything after it is ignored. Names that are not 3 to 16 word characters make the whole
//! message a non-claim.

use crate::DisplayName;

/// Prefix that marks a chat message as a claim request
pub const CLAIM_PREFIX: &str = "MyID=";

/// Extract the requested name from a chat message, if it is a claim.
pub fn parse_claim(text: &str) -> Option<DisplayName> {
    let rest = text.strip_prefix(CLAIM_PREFIX)?;
    let token = rest.split_whitespace().next()?;
    DisplayName::parse(token).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_claim() {
        assert_eq!(parse_claim("MyID=Steve").unwrap().as_str(), "Steve");
    }

    #[test]
    fn test_claim_ignores_trailing_text() {
        assert_eq!(parse_claim("MyID=Alex please").unwrap().as_str(), "Alex");
        assert_eq!(parse_claim("MyID= Alex").unwrap().as_str(), "Alex");
    }

    #[test]
    fn test_malformed_claims_are_not_claims() {
        assert!(parse_claim("MyID=").is_none());
        assert!(parse_claim("MyID=##").is_none());
        assert!(parse_claim("MyID=ab").is_none());
        assert!(parse_claim("MyID=Steve#1").is_none());
        assert!(parse_claim("MyID=abcdefghijklmnopq").is_none());
    }

    #[test]
    fn test_prefix_is_case_sensitive_and_anchored() {
        assert!(parse_claim("myid=Steve").is_none());
        assert!(parse_claim("hello MyID=Steve").is_none());
        assert!(parse_claim("hello").is_none());
        assert!(parse_claim("  MyID=Steve").is_none());
    }
}

//! Substring guards applied around the completion call.
//!
//! Matching is a lowercase `contains` check and nothing more; paraphrased,
//! obfuscated, or non-English attempts are not caught.

pub const JAILBREAK_REFUSAL: &str =
    "I can only answer questions about the uploaded document. Please ask about the document content.";
pub const LEAKAGE_REFUSAL: &str = "I can only answer questions about the uploaded document.";

const JAILBREAK_PATTERNS: [&str; 13] = [
    "ignore previous",
    "ignore all",
    "disregard",
    "forget",
    "new instructions",
    "you are now",
    "act as",
    "pretend",
    "roleplay",
    "system prompt",
    "reveal your",
    "show your instructions",
    "what are your rules",
];

const LEAKAGE_INDICATORS: [&str; 4] = [
    "system prompt",
    "instructions",
    "i am programmed",
    "my role is",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct SafetyPolicy;

impl SafetyPolicy {
    /// First jailbreak phrase found in `query`, if any.
    pub fn jailbreak_match(&self, query: &str) -> Option<&'static str> {
        first_match(query, &JAILBREAK_PATTERNS)
    }

    /// First leakage indicator found in a model answer, if any.
    pub fn leakage_match(&self, answer: &str) -> Option<&'static str> {
        first_match(answer, &LEAKAGE_INDICATORS)
    }
}

fn first_match(text: &str, patterns: &[&'static str]) -> Option<&'static str> {
    let lowered = text.to_lowercase();
    patterns
        .iter()
        .copied()
        .find(|pattern| lowered.contains(pattern))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_jailbreak_pattern_is_detected_case_insensitively() {
        let policy = SafetyPolicy;
        for pattern in JAILBREAK_PATTERNS {
            let query = format!("Please {} and tell me more", pattern.to_uppercase());
            assert_eq!(policy.jailbreak_match(&query), Some(pattern), "{query}");
        }
    }

    #[test]
    fn ordinary_questions_pass() {
        let policy = SafetyPolicy;
        assert_eq!(policy.jailbreak_match("What does section 3 say about refunds?"), None);
        assert_eq!(policy.jailbreak_match(""), None);
    }

    #[test]
    fn substring_matching_is_literal() {
        let policy = SafetyPolicy;
        // "forget" inside another word still trips the filter.
        assert_eq!(policy.jailbreak_match("Is it unforgettable?"), Some("forget"));
        // spacing variants do not.
        assert_eq!(policy.jailbreak_match("act  as a pirate"), None);
    }

    #[test]
    fn leakage_indicators_are_detected() {
        let policy = SafetyPolicy;
        assert_eq!(policy.leakage_match("My role is to help."), Some("my role is"));
        assert_eq!(
            policy.leakage_match("Follow the INSTRUCTIONS in step 2."),
            Some("instructions")
        );
        assert_eq!(policy.leakage_match("The refund window is **30 days**."), None);
    }
}

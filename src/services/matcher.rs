use crate::error::ConfigError;
use crate::models::config::MatchMode;
use regex::{Regex, RegexBuilder};
use std::collections::HashMap;

/// Decides which desired outcomes are present in recognized text.
///
/// Implementations must be pure: the same text and targets always give the
/// same result, reported in `desired` order without duplicates.
pub trait OutcomeMatcher: Send + Sync {
    fn find_matches(&self, text: &str, desired: &[String]) -> Vec<String>;
}

/// Contiguous substring test, case-insensitive unless configured otherwise
pub fn match_outcomes(text: &str, desired: &[String], case_sensitive: bool) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    let haystack = if case_sensitive {
        text.to_string()
    } else {
        text.to_lowercase()
    };

    let mut matches: Vec<String> = Vec::new();
    for item in desired {
        if item.is_empty() || matches.contains(item) {
            continue;
        }
        let found = if case_sensitive {
            haystack.contains(item.as_str())
        } else {
            haystack.contains(&item.to_lowercase())
        };
        if found {
            matches.push(item.clone());
        }
    }
    matches
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SubstringMatcher {
    pub case_sensitive: bool,
}

impl SubstringMatcher {
    pub fn new(case_sensitive: bool) -> Self {
        Self { case_sensitive }
    }
}

impl OutcomeMatcher for SubstringMatcher {
    fn find_matches(&self, text: &str, desired: &[String]) -> Vec<String> {
        match_outcomes(text, desired, self.case_sensitive)
    }
}

/// Treats each desired outcome as a regular expression
#[derive(Debug, Clone)]
pub struct RegexMatcher {
    patterns: HashMap<String, Regex>,
}

impl RegexMatcher {
    /// Compile every pattern up front; an invalid one is a startup error
    pub fn new(desired: &[String], case_sensitive: bool) -> Result<Self, ConfigError> {
        let mut patterns = HashMap::new();
        for pattern in desired {
            let regex = RegexBuilder::new(pattern)
                .case_insensitive(!case_sensitive)
                .build()
                .map_err(|e| ConfigError::InvalidPattern {
                    pattern: pattern.clone(),
                    message: e.to_string(),
                })?;
            patterns.insert(pattern.clone(), regex);
        }
        Ok(Self { patterns })
    }
}

impl OutcomeMatcher for RegexMatcher {
    fn find_matches(&self, text: &str, desired: &[String]) -> Vec<String> {
        let mut matches: Vec<String> = Vec::new();
        for item in desired {
            if matches.contains(item) {
                continue;
            }
            // Targets that were not compiled at startup never match
            if let Some(regex) = self.patterns.get(item) {
                if regex.is_match(text) {
                    matches.push(item.clone());
                }
            }
        }
        matches
    }
}

/// Build the matcher selected by `match_mode`
pub fn build_matcher(
    mode: MatchMode,
    desired: &[String],
    case_sensitive: bool,
) -> Result<Box<dyn OutcomeMatcher>, ConfigError> {
    let matcher: Box<dyn OutcomeMatcher> = match mode {
        MatchMode::Substring => Box::new(SubstringMatcher::new(case_sensitive)),
        MatchMode::Regex => Box::new(RegexMatcher::new(desired, case_sensitive)?),
    };
    Ok(matcher)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn targets(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_match_basic() {
        let desired = targets(&["Chaos Orb"]);
        assert_eq!(
            match_outcomes("Chaos Orb drops here", &desired, false),
            vec!["Chaos Orb"]
        );
        assert!(match_outcomes("nothing relevant", &desired, false).is_empty());
    }

    #[test]
    fn test_match_case_insensitive_by_default() {
        let matcher = SubstringMatcher::default();
        let desired = targets(&["Exalted Orb"]);
        assert_eq!(
            matcher.find_matches("...you receive an exalted orb...", &desired),
            vec!["Exalted Orb"]
        );
        assert_eq!(
            matcher.find_matches("EXALTED ORB", &desired),
            vec!["Exalted Orb"]
        );
    }

    #[test]
    fn test_match_case_sensitive() {
        let matcher = SubstringMatcher::new(true);
        let desired = targets(&["Exalted Orb"]);
        assert!(matcher.find_matches("EXALTED ORB", &desired).is_empty());
        assert_eq!(
            matcher.find_matches("an Exalted Orb", &desired),
            vec!["Exalted Orb"]
        );
    }

    #[test]
    fn test_match_reports_in_priority_order() {
        let desired = targets(&["Divine Orb", "Chaos Orb", "Mirror"]);
        let text = "Chaos Orb\nDivine Orb";
        assert_eq!(
            match_outcomes(text, &desired, false),
            vec!["Divine Orb", "Chaos Orb"]
        );
    }

    #[test]
    fn test_match_skips_empty_and_duplicates() {
        let desired = targets(&["", "Orb", "Orb"]);
        assert_eq!(match_outcomes("Orb", &desired, false), vec!["Orb"]);
        assert!(match_outcomes("", &desired, false).is_empty());
    }

    #[test]
    fn test_match_is_deterministic() {
        let desired = targets(&["+1 to Level", "Quality"]);
        let text = "+1 to Level of all Spell Skill Gems\n20% Quality";
        let first = match_outcomes(text, &desired, false);
        for _ in 0..10 {
            assert_eq!(match_outcomes(text, &desired, false), first);
        }
    }

    #[test]
    fn test_match_spans_line_breaks_only_literally() {
        let desired = targets(&["Chaos Orb"]);
        assert!(match_outcomes("Chaos\nOrb", &desired, false).is_empty());
    }

    #[test]
    fn test_regex_matcher() {
        let desired = targets(&[r"\+\d+ to maximum life", "Exalted"]);
        let matcher = RegexMatcher::new(&desired, false).unwrap();
        assert_eq!(
            matcher.find_matches("+95 To Maximum Life", &desired),
            vec![r"\+\d+ to maximum life"]
        );
        assert!(matcher.find_matches("+ to maximum life", &desired).is_empty());
    }

    #[test]
    fn test_regex_matcher_case_sensitive() {
        let desired = targets(&["Exalted"]);
        let matcher = RegexMatcher::new(&desired, true).unwrap();
        assert!(matcher.find_matches("exalted", &desired).is_empty());
    }

    #[test]
    fn test_regex_matcher_rejects_invalid_pattern() {
        let desired = targets(&["(unclosed"]);
        assert!(matches!(
            RegexMatcher::new(&desired, false),
            Err(ConfigError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_build_matcher_by_mode() {
        let desired = targets(&["Orb of (Alteration|Alchemy)"]);
        let substring = build_matcher(MatchMode::Substring, &desired, false).unwrap();
        assert!(substring.find_matches("Orb of Alchemy", &desired).is_empty());

        let regex = build_matcher(MatchMode::Regex, &desired, false).unwrap();
        assert_eq!(regex.find_matches("orb of alchemy", &desired).len(), 1);

        let invalid = targets(&["[a-"]);
        assert!(build_matcher(MatchMode::Regex, &invalid, false).is_err());
        assert!(build_matcher(MatchMode::Substring, &invalid, false).is_ok());
    }

    #[test]
    fn test_matchers_are_interchangeable() {
        let desired = targets(&["Chaos Orb"]);
        let matchers: Vec<Box<dyn OutcomeMatcher>> = vec![
            Box::new(SubstringMatcher::default()),
            Box::new(RegexMatcher::new(&desired, false).unwrap()),
        ];
        for matcher in matchers {
            assert_eq!(
                matcher.find_matches("a chaos orb", &desired),
                vec!["Chaos Orb"]
            );
        }
    }
}

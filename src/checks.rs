use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

pub const CHECKS_SEP: char = ',';

/// A class of diagnostics cppcheck can be told to enable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckCategory {
    All,
    Information,
    MissingInclude,
    Performance,
    Portability,
    Style,
    UnusedFunction,
    Warning,
}

impl CheckCategory {
    pub const KNOWN: [CheckCategory; 8] = [
        CheckCategory::All,
        CheckCategory::Information,
        CheckCategory::MissingInclude,
        CheckCategory::Performance,
        CheckCategory::Portability,
        CheckCategory::Style,
        CheckCategory::UnusedFunction,
        CheckCategory::Warning,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CheckCategory::All => "all",
            CheckCategory::Information => "information",
            CheckCategory::MissingInclude => "missingInclude",
            CheckCategory::Performance => "performance",
            CheckCategory::Portability => "portability",
            CheckCategory::Style => "style",
            CheckCategory::UnusedFunction => "unusedFunction",
            CheckCategory::Warning => "warning",
        }
    }
}

impl FromStr for CheckCategory {
    type Err = ();

    /// Case-sensitive: `Style` is not `style`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CheckCategory::KNOWN
            .iter()
            .find(|check| check.as_str() == s)
            .copied()
            .ok_or(())
    }
}

impl fmt::Display for CheckCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The normalized set of checks handed to `--enable=`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CheckSelection {
    checks: Vec<CheckCategory>,
}

impl CheckSelection {
    /// Parse a comma separated list of check names.
    ///
    /// Unknown names are dropped without complaint, duplicates collapse, and
    /// `all` wins over everything else. The remaining checks are sorted so the
    /// result does not depend on input order.
    pub fn parse(text: &str) -> Self {
        let known: HashSet<CheckCategory> = split_csv(text)
            .into_iter()
            .filter_map(|token| token.parse().ok())
            .collect();

        let checks = if known.contains(&CheckCategory::All) {
            vec![CheckCategory::All]
        } else {
            let mut checks: Vec<CheckCategory> = known.into_iter().collect();
            checks.sort_by_key(|check| check.as_str());
            checks
        };

        Self { checks }
    }

    /// The `--enable=...` token. An empty selection still yields `--enable=`.
    pub fn to_flag(&self) -> String {
        format!("--enable={}", self)
    }
}

impl fmt::Display for CheckSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .checks
            .iter()
            .map(CheckCategory::as_str)
            .collect::<Vec<_>>()
            .join(&CHECKS_SEP.to_string());
        f.write_str(&joined)
    }
}

fn split_csv(text: &str) -> Vec<&str> {
    if text.contains(CHECKS_SEP) {
        text.split(CHECKS_SEP).map(str::trim).collect()
    } else {
        vec![text.trim()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    impl CheckSelection {
        fn checks(&self) -> &[CheckCategory] {
            &self.checks
        }
    }

    #[test]
    fn test_single_token_is_trimmed() {
        let selection = CheckSelection::parse("  style ");
        assert_eq!(selection.checks(), &[CheckCategory::Style]);
        assert_eq!(selection.to_flag(), "--enable=style");
    }

    #[test]
    fn test_tokens_are_sorted() {
        let selection = CheckSelection::parse("warning, style,performance");
        assert_eq!(selection.to_flag(), "--enable=performance,style,warning");
    }

    #[test]
    fn test_all_supersedes_other_checks() {
        assert_eq!(CheckSelection::parse("all,style").to_flag(), "--enable=all");
        assert_eq!(CheckSelection::parse("style, warning ,all").to_flag(), "--enable=all");
    }

    #[test]
    fn test_unknown_tokens_are_dropped() {
        let selection = CheckSelection::parse("style,bogus,Warning");
        assert_eq!(selection.checks(), &[CheckCategory::Style]);
    }

    #[test]
    fn test_only_unknown_tokens_yield_empty_enable() {
        let selection = CheckSelection::parse("nope,ALL,");
        assert!(selection.checks().is_empty());
        assert_eq!(selection.to_flag(), "--enable=");
        assert_eq!(CheckSelection::parse("").to_flag(), "--enable=");
    }

    #[test]
    fn test_mixed_case_name_is_matched_exactly() {
        let selection = CheckSelection::parse("missingInclude,unusedFunction,information");
        assert_eq!(
            selection.to_flag(),
            "--enable=information,missingInclude,unusedFunction"
        );
    }

    fn known_name() -> impl Strategy<Value = &'static str> {
        prop::sample::select(
            CheckCategory::KNOWN
                .iter()
                .map(CheckCategory::as_str)
                .collect::<Vec<_>>(),
        )
    }

    fn any_name() -> impl Strategy<Value = String> {
        prop_oneof![
            known_name().prop_map(str::to_string),
            "[a-zA-Z]{1,12}",
        ]
    }

    proptest! {
        #[test]
        fn prop_all_wins(mut names in prop::collection::vec(any_name(), 0..8), at in any::<prop::sample::Index>()) {
            let idx = at.index(names.len() + 1);
            names.insert(idx, "all".to_string());
            let selection = CheckSelection::parse(&names.join(","));
            prop_assert_eq!(selection.to_flag(), "--enable=all");
        }

        #[test]
        fn prop_order_and_duplicates_do_not_matter(names in prop::collection::vec(any_name(), 1..8)) {
            let forward = CheckSelection::parse(&names.join(","));

            let mut shuffled = names.clone();
            shuffled.reverse();
            shuffled.extend(names.iter().cloned());
            let doubled = CheckSelection::parse(&shuffled.join(","));

            prop_assert_eq!(forward, doubled);
        }

        #[test]
        fn prop_unknown_only_is_empty(names in prop::collection::vec("[A-Z][a-z]{0,8}", 1..6)) {
            // Known names all start lowercase, so capitalized words never match.
            let selection = CheckSelection::parse(&names.join(","));
            prop_assert_eq!(selection.to_flag(), "--enable=");
        }
    }
}

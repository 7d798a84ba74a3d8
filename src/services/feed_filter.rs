//! Translates sidebar filters and the header search box into feed predicates.

use crate::models::{post, Severity};
use sea_orm::sea_query::{Expr, Func, SimpleExpr};
use sea_orm::{ColumnTrait, Condition};
use serde::{Deserialize, Serialize};

/// Filters chosen in the feed sidebar.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedFilters {
    pub severity: Option<Severity>,
    pub location: Option<String>,
}

/// Predicate set consumed by the post repository.
///
/// Categories combine with AND. `location` matches city OR state, `search`
/// matches title OR description; both case-insensitive substrings. Text
/// terms are stored trimmed and lowercased.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedPredicates {
    pub severity: Option<Severity>,
    pub location: Option<String>,
    pub search: Option<String>,
}

/// Anything the predicates can be evaluated against in memory.
pub trait FeedItem {
    fn severity(&self) -> Severity;
    fn title(&self) -> &str;
    fn description(&self) -> Option<&str>;
    fn city(&self) -> &str;
    fn state(&self) -> &str;
}

pub fn build_predicates(filters: &FeedFilters, search_term: Option<&str>) -> FeedPredicates {
    FeedPredicates {
        severity: filters.severity,
        location: normalize_term(filters.location.as_deref()),
        search: normalize_term(search_term),
    }
}

/// Whitespace-only terms are treated as absent.
fn normalize_term(term: Option<&str>) -> Option<String> {
    term.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

/// Escape LIKE metacharacters so user input is matched literally.
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

/// `lower(col) LIKE pattern`
fn lower_like(column: post::Column, pattern: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(column))).like(pattern.to_owned())
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

impl FeedPredicates {
    pub fn is_empty(&self) -> bool {
        self.severity.is_none() && self.location.is_none() && self.search.is_none()
    }

    pub fn to_condition(&self) -> Condition {
        let mut condition = Condition::all();

        if let Some(severity) = self.severity {
            condition = condition.add(post::Column::Severity.eq(severity));
        }

        if let Some(location) = &self.location {
            let pattern = like_pattern(location);
            condition = condition.add(
                Condition::any()
                    .add(lower_like(post::Column::City, &pattern))
                    .add(lower_like(post::Column::State, &pattern)),
            );
        }

        if let Some(search) = &self.search {
            let pattern = like_pattern(search);
            condition = condition.add(
                Condition::any()
                    .add(lower_like(post::Column::Title, &pattern))
                    .add(lower_like(post::Column::Description, &pattern)),
            );
        }

        condition
    }

    pub fn matches<T: FeedItem>(&self, item: &T) -> bool {
        if let Some(severity) = self.severity {
            if item.severity() != severity {
                return false;
            }
        }

        if let Some(location) = &self.location {
            if !contains_ci(item.city(), location) && !contains_ci(item.state(), location) {
                return false;
            }
        }

        if let Some(search) = &self.search {
            let in_description = item
                .description()
                .map(|d| contains_ci(d, search))
                .unwrap_or(false);
            if !contains_ci(item.title(), search) && !in_description {
                return false;
            }
        }

        true
    }
}

impl FeedItem for post::Model {
    fn severity(&self) -> Severity {
        self.severity
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn city(&self) -> &str {
        &self.city
    }

    fn state(&self) -> &str {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row {
        severity: Severity,
        title: &'static str,
        description: Option<&'static str>,
        city: &'static str,
        state: &'static str,
    }

    impl FeedItem for Row {
        fn severity(&self) -> Severity {
            self.severity
        }
        fn title(&self) -> &str {
            self.title
        }
        fn description(&self) -> Option<&str> {
            self.description
        }
        fn city(&self) -> &str {
            self.city
        }
        fn state(&self) -> &str {
            self.state
        }
    }

    fn pothole() -> Row {
        Row {
            severity: Severity::High,
            title: "Pothole on Main St",
            description: Some("Deep crater near the school crossing"),
            city: "Springfield",
            state: "CA",
        }
    }

    #[test]
    fn build_predicates_table() {
        let cases: Vec<(FeedFilters, Option<&str>, FeedPredicates)> = vec![
            (FeedFilters::default(), None, FeedPredicates::default()),
            (FeedFilters::default(), Some("   "), FeedPredicates::default()),
            (
                FeedFilters {
                    severity: Some(Severity::High),
                    location: Some("  ".to_string()),
                },
                Some(""),
                FeedPredicates {
                    severity: Some(Severity::High),
                    ..Default::default()
                },
            ),
            (
                FeedFilters {
                    severity: None,
                    location: Some(" Springfield ".to_string()),
                },
                Some(" PotHole "),
                FeedPredicates {
                    severity: None,
                    location: Some("springfield".to_string()),
                    search: Some("pothole".to_string()),
                },
            ),
        ];

        for (filters, search, expected) in cases {
            assert_eq!(build_predicates(&filters, search), expected);
        }
    }

    #[test]
    fn whitespace_search_is_no_predicate() {
        let predicates = build_predicates(&FeedFilters::default(), Some("\t \n"));
        assert!(predicates.is_empty());
        assert!(predicates.matches(&pothole()));
    }

    #[test]
    fn location_matches_city_or_state() {
        let by_city = build_predicates(
            &FeedFilters {
                location: Some("spring".to_string()),
                ..Default::default()
            },
            None,
        );
        let by_state = build_predicates(
            &FeedFilters {
                location: Some("ca".to_string()),
                ..Default::default()
            },
            None,
        );
        let neither = build_predicates(
            &FeedFilters {
                location: Some("texas".to_string()),
                ..Default::default()
            },
            None,
        );
        assert!(by_city.matches(&pothole()));
        assert!(by_state.matches(&pothole()));
        assert!(!neither.matches(&pothole()));
    }

    #[test]
    fn search_matches_title_or_description() {
        let f = FeedFilters::default();
        assert!(build_predicates(&f, Some("MAIN")).matches(&pothole()));
        assert!(build_predicates(&f, Some("crater")).matches(&pothole()));
        assert!(!build_predicates(&f, Some("bridge")).matches(&pothole()));

        let mut no_description = pothole();
        no_description.description = None;
        assert!(!build_predicates(&f, Some("crater")).matches(&no_description));
    }

    #[test]
    fn categories_combine_with_and() {
        let predicates = build_predicates(
            &FeedFilters {
                severity: Some(Severity::Low),
                location: Some("springfield".to_string()),
            },
            Some("pothole"),
        );
        // Location and search match, severity does not.
        assert!(!predicates.matches(&pothole()));
    }

    #[test]
    fn like_pattern_escapes_metacharacters() {
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }
}

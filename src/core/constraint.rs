//! Constraint bands and the checker that applies them.
//!
//! The band table is an ordered list of inclusive, contiguous ranges over
//! overall progress. Lower bands forbid a superset of what higher bands
//! forbid; the final band forbids nothing. Checks never fail: pathological
//! text degrades to an empty, valid report.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;

use crate::core::lexicon::{first_match, ConfigError};
use crate::schema::violation::{CheckReport, Violation, ViolationKind};

/// Overall progress below which strong emotional vocabulary is forbidden.
pub const STRONG_EMOTION_GATE: f32 = 50.0;

const KEYWORD_HINT: &str =
    "Remove the flagged term and express the relationship at its current stage instead.";
const TIME_HINT: &str =
    "Shorten the narrative time skip to fit the current stage's limit.";
const EMOTION_HINT_PREFIX: &str = "Prefer milder emotional vocabulary such as: ";

/// Narrative time-skip units, with fixed day-equivalents for comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeUnit {
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl TimeUnit {
    pub fn in_days(&self) -> f32 {
        match self {
            Self::Hour => 1.0 / 24.0,
            Self::Day => 1.0,
            Self::Week => 7.0,
            Self::Month => 30.0,
            Self::Year => 365.0,
        }
    }

    /// Maps a Korean unit token ("시간", "일", "주", "개월"/"달", "년").
    fn from_token(token: &str) -> Option<Self> {
        match token {
            "시간" => Some(Self::Hour),
            "일" => Some(Self::Day),
            "주" => Some(Self::Week),
            "개월" | "달" => Some(Self::Month),
            "년" => Some(Self::Year),
            _ => None,
        }
    }
}

/// A narrative time skip: magnitude plus unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSkip {
    pub amount: u32,
    pub unit: TimeUnit,
}

impl TimeSkip {
    pub fn in_days(&self) -> f32 {
        self.amount as f32 * self.unit.in_days()
    }
}

/// One constraint band: an inclusive progress range with its rule facets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandRule {
    pub lower: u8,
    pub upper: u8,
    pub label: String,
    pub forbidden: Vec<String>,
    pub max_time_skip: TimeSkip,
}

/// The full rule table: ordered bands plus the emotion lexicons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintTable {
    pub bands: Vec<BandRule>,
    pub strong_emotions: Vec<String>,
    pub mild_emotions: Vec<String>,
}

fn band(
    lower: u8,
    upper: u8,
    label: &str,
    forbidden: &[&str],
    max_time_skip: TimeSkip,
) -> BandRule {
    BandRule {
        lower,
        upper,
        label: label.to_string(),
        forbidden: forbidden.iter().map(|t| (*t).to_string()).collect(),
        max_time_skip,
    }
}

impl Default for ConstraintTable {
    fn default() -> Self {
        let day = |amount| TimeSkip {
            amount,
            unit: TimeUnit::Day,
        };
        Self {
            bands: vec![
                band(
                    0,
                    15,
                    "첫 만남",
                    &[
                        "데이트", "포옹", "사랑해", "고백", "키스", "연인 사이", "약혼",
                        "결혼", "프로포즈",
                    ],
                    day(1),
                ),
                band(
                    16,
                    35,
                    "호감의 시작",
                    &["사랑해", "고백", "키스", "연인 사이", "약혼", "결혼", "프로포즈"],
                    day(3),
                ),
                band(
                    36,
                    55,
                    "설렘과 혼란",
                    &["키스", "연인 사이", "약혼", "결혼", "프로포즈"],
                    TimeSkip {
                        amount: 1,
                        unit: TimeUnit::Week,
                    },
                ),
                band(
                    56,
                    75,
                    "연애 초기",
                    &["약혼", "결혼", "프로포즈"],
                    TimeSkip {
                        amount: 1,
                        unit: TimeUnit::Month,
                    },
                ),
                band(
                    76,
                    90,
                    "깊어진 관계",
                    &["결혼", "프로포즈"],
                    TimeSkip {
                        amount: 3,
                        unit: TimeUnit::Month,
                    },
                ),
                band(
                    91,
                    100,
                    "결말",
                    &[],
                    TimeSkip {
                        amount: 1,
                        unit: TimeUnit::Year,
                    },
                ),
            ],
            strong_emotions: ["사랑해", "운명", "영원히", "죽도록", "미치도록"]
                .iter()
                .map(|t| (*t).to_string())
                .collect(),
            mild_emotions: ["설렘", "호감", "관심", "두근거림", "궁금함"]
                .iter()
                .map(|t| (*t).to_string())
                .collect(),
        }
    }
}

// Fallback for a band table with no bands at all: checks degrade to an
// empty-valid result instead of panicking.
fn permissive_band() -> &'static BandRule {
    static RULE: OnceLock<BandRule> = OnceLock::new();
    RULE.get_or_init(|| BandRule {
        lower: 0,
        upper: 100,
        label: "unrestricted".to_string(),
        forbidden: Vec::new(),
        max_time_skip: TimeSkip {
            amount: 1,
            unit: TimeUnit::Year,
        },
    })
}

impl ConstraintTable {
    /// Looks up the band covering `progress`. Bands are ordered by range,
    /// so the first band whose upper bound is not below the value wins;
    /// values beyond the table fall into the last band. A table with no
    /// bands degrades to an all-permissive rule rather than failing.
    pub fn band_for(&self, progress: f32) -> &BandRule {
        let clamped = progress.clamp(0.0, 100.0);
        self.bands
            .iter()
            .find(|b| clamped <= b.upper as f32)
            .or_else(|| self.bands.last())
            .unwrap_or_else(|| permissive_band())
    }

    /// Load a rule table from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<ConstraintTable, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parse a rule table from a RON string. Tables without any band are
    /// rejected here, before they can reach a checker.
    pub fn parse_ron(input: &str) -> Result<ConstraintTable, ConfigError> {
        let table: ConstraintTable = ron::from_str(input)?;
        if table.bands.is_empty() {
            return Err(ConfigError::Invalid(
                "constraint table has no bands".to_string(),
            ));
        }
        Ok(table)
    }
}

fn time_skip_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(\d+)\s*(시간|개월|일|주|달|년)\s*후").expect("time-skip pattern compiles")
    })
}

/// Applies the rule table to chapter text at a given overall progress.
#[derive(Debug, Clone)]
pub struct ConstraintChecker {
    table: ConstraintTable,
}

impl Default for ConstraintChecker {
    fn default() -> Self {
        Self::new(ConstraintTable::default())
    }
}

impl ConstraintChecker {
    pub fn new(table: ConstraintTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &ConstraintTable {
        &self.table
    }

    /// Checks `text` against the band for `overall_progress`. At most one
    /// violation per kind is reported, each carrying its remediation hint.
    pub fn check(&self, text: &str, overall_progress: f32) -> CheckReport {
        let band = self.table.band_for(overall_progress);
        let mut violations = Vec::new();

        // First forbidden term wins; no exhaustive enumeration.
        if let Some(term) = first_match(text, &band.forbidden) {
            debug!(term, stage = %band.label, "forbidden term found");
            violations.push(Violation {
                kind: ViolationKind::Keyword,
                message: format!(
                    "'{}' is not allowed in the '{}' stage ({}-{}% progress)",
                    term, band.label, band.lower, band.upper
                ),
                suggestion: KEYWORD_HINT.to_string(),
            });
        }

        if let Some(violation) = self.check_time_skips(text, band) {
            violations.push(violation);
        }

        if overall_progress < STRONG_EMOTION_GATE {
            if let Some(term) = first_match(text, &self.table.strong_emotions) {
                violations.push(Violation {
                    kind: ViolationKind::Emotion,
                    message: format!(
                        "'{}' is too intense below {}% overall progress",
                        term, STRONG_EMOTION_GATE
                    ),
                    suggestion: format!(
                        "{}{}",
                        EMOTION_HINT_PREFIX,
                        self.table.mild_emotions.join(", ")
                    ),
                });
            }
        }

        CheckReport::from_violations(violations)
    }

    /// Scans every `<n><unit>후` skip in the text and flags the first one
    /// whose day-equivalent exceeds the band's limit.
    fn check_time_skips(&self, text: &str, band: &BandRule) -> Option<Violation> {
        let limit_days = band.max_time_skip.in_days();
        for captures in time_skip_regex().captures_iter(text) {
            // Unparseable magnitudes (e.g. absurdly long digit runs) are
            // skipped rather than failed.
            let Ok(amount) = captures[1].parse::<u32>() else {
                continue;
            };
            let Some(unit) = TimeUnit::from_token(&captures[2]) else {
                continue;
            };
            let skip = TimeSkip { amount, unit };
            if skip.in_days() > limit_days {
                debug!(skip_days = skip.in_days(), limit_days, "time skip exceeds band limit");
                return Some(Violation {
                    kind: ViolationKind::Time,
                    message: format!(
                        "time skip '{}' exceeds the '{}' stage limit of {} day(s)",
                        &captures[0], band.label, limit_days
                    ),
                    suggestion: TIME_HINT.to_string(),
                });
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_progress_value_maps_to_exactly_one_band() {
        let table = ConstraintTable::default();
        for value in 0..=100u8 {
            let covering = table
                .bands
                .iter()
                .filter(|b| value >= b.lower && value <= b.upper)
                .count();
            assert_eq!(covering, 1, "progress {} covered by {} bands", value, covering);
        }
    }

    #[test]
    fn forbidden_sets_form_a_superset_chain() {
        let table = ConstraintTable::default();
        for pair in table.bands.windows(2) {
            for term in &pair[1].forbidden {
                assert!(
                    pair[0].forbidden.contains(term),
                    "'{}' forbidden at [{},{}] but not below",
                    term,
                    pair[1].lower,
                    pair[1].upper
                );
            }
        }
    }

    #[test]
    fn final_band_forbids_nothing() {
        let table = ConstraintTable::default();
        assert!(table.bands.last().unwrap().forbidden.is_empty());
    }

    #[test]
    fn band_lookup_handles_fractional_progress() {
        let table = ConstraintTable::default();
        // 15.5 sits between the integer bounds of the first two bands
        assert_eq!(table.band_for(15.5).lower, 16);
        assert_eq!(table.band_for(15.0).lower, 0);
        assert_eq!(table.band_for(100.0).lower, 91);
        assert_eq!(table.band_for(250.0).lower, 91);
        assert_eq!(table.band_for(-3.0).lower, 0);
    }

    #[test]
    fn time_unit_day_equivalents() {
        assert_eq!(TimeUnit::Year.in_days(), 365.0);
        assert_eq!(TimeUnit::Month.in_days(), 30.0);
        assert_eq!(TimeUnit::Week.in_days(), 7.0);
        assert_eq!(TimeUnit::Day.in_days(), 1.0);
        assert!(TimeUnit::Hour.in_days() < 0.05);
    }

    #[test]
    fn keyword_violation_at_low_progress() {
        let checker = ConstraintChecker::default();
        let report = checker.check("그 순간 키스했다.", 10.0);
        assert!(!report.valid);
        assert_eq!(report.violations[0].kind, ViolationKind::Keyword);
        assert!(report.violations[0].message.contains("키스"));
    }

    #[test]
    fn keyword_stops_at_first_forbidden_term() {
        let checker = ConstraintChecker::default();
        let report = checker.check("고백과 키스와 결혼 이야기", 10.0);
        let keyword_count = report
            .violations
            .iter()
            .filter(|v| v.kind == ViolationKind::Keyword)
            .count();
        assert_eq!(keyword_count, 1);
    }

    #[test]
    fn same_term_is_clean_in_final_band() {
        let checker = ConstraintChecker::default();
        let report = checker.check("그 순간 키스했다.", 95.0);
        assert!(report.valid);
    }

    #[test]
    fn time_skip_within_limit_is_clean() {
        let checker = ConstraintChecker::default();
        // Band [16,35] allows up to 3 days
        let report = checker.check("3일 후, 그들은 또 마주쳤다.", 25.0);
        assert!(report.valid);
    }

    #[test]
    fn time_skip_over_limit_is_flagged() {
        let checker = ConstraintChecker::default();
        let report = checker.check("4일 후, 그들은 또 마주쳤다.", 25.0);
        assert!(!report.valid);
        assert_eq!(report.violations[0].kind, ViolationKind::Time);
    }

    #[test]
    fn all_skips_evaluated_not_just_first() {
        let checker = ConstraintChecker::default();
        // First skip is fine, second exceeds the 3-day limit
        let report = checker.check("1일 후 만났고, 2주 후 다시 만났다.", 25.0);
        assert!(!report.valid);
        assert_eq!(report.violations[0].kind, ViolationKind::Time);
    }

    #[test]
    fn month_tokens_both_convert() {
        let checker = ConstraintChecker::default();
        assert!(!checker.check("1개월 후였다.", 25.0).valid);
        assert!(!checker.check("1달 후였다.", 25.0).valid);
    }

    #[test]
    fn strong_emotion_below_gate_is_flagged() {
        let checker = ConstraintChecker::default();
        let report = checker.check("운명이라고 느꼈다.", 30.0);
        assert!(!report.valid);
        let violation = &report.violations[0];
        assert_eq!(violation.kind, ViolationKind::Emotion);
        assert!(violation.suggestion.contains("설렘"));
    }

    #[test]
    fn strong_emotion_at_gate_is_allowed() {
        let checker = ConstraintChecker::default();
        let report = checker.check("운명이라고 느꼈다.", 50.0);
        assert!(report.valid);
    }

    #[test]
    fn one_suggestion_per_kind() {
        let checker = ConstraintChecker::default();
        let report = checker.check("키스 후 운명처럼, 2주 후에 다시 만났다.", 20.0);
        assert_eq!(report.violations.len(), 3);
        let kinds: Vec<_> = report.violations.iter().map(|v| v.kind).collect();
        assert!(kinds.contains(&ViolationKind::Keyword));
        assert!(kinds.contains(&ViolationKind::Time));
        assert!(kinds.contains(&ViolationKind::Emotion));
    }

    #[test]
    fn empty_text_is_always_clean() {
        let checker = ConstraintChecker::default();
        assert!(checker.check("", 0.0).valid);
        assert!(checker.check("", 100.0).valid);
    }

    #[test]
    fn parse_ron_table() {
        let input = r#"(
            bands: [
                (lower: 0, upper: 50, label: "early", forbidden: ["키스"],
                 max_time_skip: (amount: 2, unit: Day)),
                (lower: 51, upper: 100, label: "late", forbidden: [],
                 max_time_skip: (amount: 1, unit: Year)),
            ],
            strong_emotions: ["운명"],
            mild_emotions: ["호감"],
        )"#;
        let table = ConstraintTable::parse_ron(input).unwrap();
        assert_eq!(table.bands.len(), 2);
        assert_eq!(table.band_for(40.0).label, "early");
        assert_eq!(table.band_for(60.0).label, "late");
    }

    #[test]
    fn parse_ron_error_on_malformed_table() {
        assert!(ConstraintTable::parse_ron("(bands: oops)").is_err());
    }

    #[test]
    fn parse_ron_rejects_table_without_bands() {
        let result = ConstraintTable::parse_ron(
            "(bands: [], strong_emotions: [], mild_emotions: [])",
        );
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn empty_band_table_degrades_to_permissive() {
        let checker = ConstraintChecker::new(ConstraintTable {
            bands: Vec::new(),
            strong_emotions: Vec::new(),
            mild_emotions: Vec::new(),
        });
        assert_eq!(checker.table().band_for(0.0).label, "unrestricted");
        assert!(checker.check("비가 내렸다.", 0.0).valid);
        assert!(checker.check("1년 후의 키스.", 50.0).valid);
    }
}

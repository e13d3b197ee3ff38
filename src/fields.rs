//! Enumerations and field types for task management.
//!
//! This module defines the small value types shared by the CLI, the dashboard
//! and the view pipeline: priority tiers derived from scores, the collapsed
//! completion status, view parameters and context sources.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Score at or above which a task is `High`.
pub const HIGH_THRESHOLD: f64 = 0.8;
/// Score at or above which a task is at least `Medium`.
pub const MEDIUM_THRESHOLD: f64 = 0.5;

/// Three-valued priority bucket derived from a continuous priority score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    High,
    Medium,
    Low,
}

impl Tier {
    /// Derive the tier of a score. Lower bounds are inclusive; anything that
    /// is not at least `MEDIUM_THRESHOLD` (including NaN) is `Low`.
    pub fn from_score(score: f64) -> Self {
        if score >= HIGH_THRESHOLD {
            Tier::High
        } else if score >= MEDIUM_THRESHOLD {
            Tier::Medium
        } else {
            Tier::Low
        }
    }

    /// Score persisted when a human picks this tier in a form.
    pub fn canonical_score(self) -> f64 {
        match self {
            Tier::High => 1.0,
            Tier::Medium => 0.5,
            Tier::Low => 0.1,
        }
    }

    /// Sort rank, higher is more important.
    pub fn rank(self) -> u8 {
        match self {
            Tier::High => 3,
            Tier::Medium => 2,
            Tier::Low => 1,
        }
    }

    /// Parse a tier name as returned by the suggestion service.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "high" => Some(Tier::High),
            "medium" => Some(Tier::Medium),
            "low" => Some(Tier::Low),
            _ => None,
        }
    }

    /// Next tier in selector order (Low → Medium → High → Low).
    pub fn cycle(self, forward: bool) -> Self {
        match (self, forward) {
            (Tier::Low, true) => Tier::Medium,
            (Tier::Medium, true) => Tier::High,
            (Tier::High, true) => Tier::Low,
            (Tier::Low, false) => Tier::High,
            (Tier::Medium, false) => Tier::Low,
            (Tier::High, false) => Tier::Medium,
        }
    }
}

/// Task completion status.
///
/// The service uses four spellings for two states. They are collapsed here,
/// once, when a payload is decoded: `done` and `completed` are finished,
/// every other value (`pending`, `not completed`, null, unknown) is open.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "Option<String>")]
pub enum Status {
    #[default]
    #[serde(rename = "pending")]
    Open,
    #[serde(rename = "done")]
    Done,
}

impl Status {
    /// Normalise a raw status string from the service.
    pub fn from_raw(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "done" | "completed" => Status::Done,
            _ => Status::Open,
        }
    }

    /// Two-state flip used by the "mark done" / "undo" action.
    pub fn toggled(self) -> Self {
        match self {
            Status::Done => Status::Open,
            Status::Open => Status::Done,
        }
    }

    pub fn is_done(self) -> bool {
        self == Status::Done
    }

    /// Wire value sent back to the service.
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Open => "pending",
            Status::Done => "done",
        }
    }
}

impl From<Option<String>> for Status {
    fn from(raw: Option<String>) -> Self {
        raw.as_deref().map(Status::from_raw).unwrap_or_default()
    }
}

/// Priority filter applied by the view pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TierFilter {
    #[default]
    All,
    Only(Tier),
}

impl TierFilter {
    /// Whether a task of the given tier passes the filter.
    pub fn admits(self, tier: Tier) -> bool {
        match self {
            TierFilter::All => true,
            TierFilter::Only(t) => t == tier,
        }
    }

    /// Cycle All → High → Medium → Low → All, matching the dropdown order.
    pub fn next(self) -> Self {
        match self {
            TierFilter::All => TierFilter::Only(Tier::High),
            TierFilter::Only(Tier::High) => TierFilter::Only(Tier::Medium),
            TierFilter::Only(Tier::Medium) => TierFilter::Only(Tier::Low),
            TierFilter::Only(Tier::Low) => TierFilter::All,
        }
    }
}

/// Command-line spelling of [`TierFilter`].
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum PriorityArg {
    All,
    High,
    Medium,
    Low,
}

impl From<PriorityArg> for TierFilter {
    fn from(arg: PriorityArg) -> Self {
        match arg {
            PriorityArg::All => TierFilter::All,
            PriorityArg::High => TierFilter::Only(Tier::High),
            PriorityArg::Medium => TierFilter::Only(Tier::Medium),
            PriorityArg::Low => TierFilter::Only(Tier::Low),
        }
    }
}

/// Available sorting options for the task list.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// Newest first (descending id).
    #[default]
    Latest,
    /// Earliest deadline first, tasks without a deadline last.
    Deadline,
    /// High before medium before low.
    Priority,
}

impl SortMode {
    pub fn next(self) -> Self {
        match self {
            SortMode::Latest => SortMode::Deadline,
            SortMode::Deadline => SortMode::Priority,
            SortMode::Priority => SortMode::Latest,
        }
    }
}

/// Where a context entry came from.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ContextSource {
    #[default]
    Note,
    Whatsapp,
    Email,
}

impl ContextSource {
    pub fn cycle(self) -> Self {
        match self {
            ContextSource::Note => ContextSource::Whatsapp,
            ContextSource::Whatsapp => ContextSource::Email,
            ContextSource::Email => ContextSource::Note,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_tier_boundaries_are_inclusive_at_lower_bound() {
        assert_eq!(Tier::from_score(0.8), Tier::High);
        assert_eq!(Tier::from_score(0.7999), Tier::Medium);
        assert_eq!(Tier::from_score(0.5), Tier::Medium);
        assert_eq!(Tier::from_score(0.4999), Tier::Low);
        assert_eq!(Tier::from_score(1.0), Tier::High);
        assert_eq!(Tier::from_score(0.0), Tier::Low);
        assert_eq!(Tier::from_score(-3.0), Tier::Low);
        assert_eq!(Tier::from_score(f64::NAN), Tier::Low);
    }

    #[test]
    fn test_canonical_scores_round_trip() {
        for tier in [Tier::High, Tier::Medium, Tier::Low] {
            assert_eq!(Tier::from_score(tier.canonical_score()), tier);
        }
        assert_eq!(Tier::Medium.canonical_score(), 0.5);
    }

    #[test]
    fn test_status_normalisation() {
        assert_eq!(Status::from_raw("done"), Status::Done);
        assert_eq!(Status::from_raw("completed"), Status::Done);
        assert_eq!(Status::from_raw(" Completed "), Status::Done);
        assert_eq!(Status::from_raw("pending"), Status::Open);
        assert_eq!(Status::from_raw("not completed"), Status::Open);
        assert_eq!(Status::from_raw("archived"), Status::Open);
        assert_eq!(Status::from(None), Status::Open);
    }

    #[test]
    fn test_status_serde() {
        let s: Status = serde_json::from_str("\"completed\"").unwrap();
        assert_eq!(s, Status::Done);
        let s: Status = serde_json::from_str("null").unwrap();
        assert_eq!(s, Status::Open);
        assert_eq!(serde_json::to_string(&Status::Done).unwrap(), "\"done\"");
        assert_eq!(serde_json::to_string(&Status::Open).unwrap(), "\"pending\"");
    }

    #[test]
    fn test_toggle_is_two_state_flip() {
        assert_eq!(Status::from_raw("completed").toggled(), Status::Open);
        assert_eq!(Status::from_raw("not completed").toggled(), Status::Done);
        assert_eq!(Status::Open.toggled().toggled(), Status::Open);
        assert_eq!(Status::Done.toggled().toggled(), Status::Done);
    }

    #[test]
    fn test_filter_and_sort_cycles() {
        let mut f = TierFilter::All;
        for _ in 0..4 {
            f = f.next();
        }
        assert_eq!(f, TierFilter::All);
        assert_eq!(SortMode::Priority.next(), SortMode::Latest);
        assert_eq!(Tier::parse("HIGH"), Some(Tier::High));
        assert_eq!(Tier::parse("urgent"), None);
    }

    proptest! {
        #[test]
        fn prop_tier_matches_thresholds(s in -10.0f64..10.0) {
            let tier = Tier::from_score(s);
            prop_assert_eq!(tier == Tier::High, s >= 0.8);
            prop_assert_eq!(tier == Tier::Medium, (0.5..0.8).contains(&s));
            prop_assert_eq!(tier == Tier::Low, s < 0.5);
        }
    }
}

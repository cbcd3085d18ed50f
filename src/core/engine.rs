//! The pacing engine — orchestrates tracking, constraint checking, and
//! milestone sequencing over one candidate chapter at a time.
//!
//! `validate_and_update` is the gate: it commits the whole progress
//! subtree on a valid chapter and touches nothing otherwise.
//! `build_constraints_for_next` is intentionally read-only — it derives the
//! payload that biases the next generation attempt, closing the loop.

use std::path::Path;
use tracing::{debug, info};

use crate::core::constraint::{ConstraintChecker, ConstraintTable, TimeSkip};
use crate::core::lexicon::{ConfigError, Lexicon};
use crate::core::milestone::{MilestoneOutcome, MilestoneSequence, SequencerState};
use crate::core::tracker::ProgressTracker;
use crate::schema::dimensions::ProgressDimensions;
use crate::schema::story::{AdvancedProgress, StoryState};
use crate::schema::violation::{Violation, ViolationKind};

/// Everything the caller needs to decide whether to accept a chapter and,
/// if not, what to regenerate.
#[derive(Debug, Clone, PartialEq)]
pub struct PacingResult {
    pub valid: bool,
    pub overall_progress: f32,
    pub dimensions: ProgressDimensions,
    pub violations: Vec<Violation>,
    pub milestone: MilestoneOutcome,
    pub suggestions: Vec<String>,
}

/// Constraint payload handed to the external generator before the next
/// attempt: what the current stage forbids and what it still wants.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConstraints {
    pub stage_label: String,
    pub forbidden_terms: Vec<String>,
    pub max_time_skip: TimeSkip,
    pub current_milestone: Option<String>,
    pub allowed_emotion_tags: Vec<String>,
    pub required_elements: Vec<String>,
}

/// The composed engine. Holds only read-only tables; all mutable story
/// state lives in the caller's `StoryState`.
#[derive(Debug, Clone, Default)]
pub struct PacingEngine {
    tracker: ProgressTracker,
    checker: ConstraintChecker,
    sequence: MilestoneSequence,
}

/// Builder for constructing a `PacingEngine` from direct values or RON files.
#[derive(Debug, Default)]
pub struct PacingEngineBuilder {
    tracker_lexicon: Option<Lexicon>,
    constraint_table: Option<ConstraintTable>,
    milestones: Option<MilestoneSequence>,
    tracker_lexicon_path: Option<String>,
    constraint_table_path: Option<String>,
    milestones_path: Option<String>,
}

impl PacingEngine {
    pub fn builder() -> PacingEngineBuilder {
        PacingEngineBuilder::default()
    }

    /// Validates one candidate chapter against the story so far.
    ///
    /// Runs the tracker, checks constraints at the *new* overall progress,
    /// then evaluates the current milestone. On a valid result the entire
    /// `advanced_progress` subtree is rewritten as one unit; on an invalid
    /// one the story state is left bit-for-bit unchanged.
    pub fn validate_and_update(&self, text: &str, story: &mut StoryState) -> PacingResult {
        let previous = &story.advanced_progress;

        let dimensions = self.tracker.update(text, &previous.dimensions);
        let overall_progress = dimensions.overall();
        debug!(overall_progress, "dimensions updated");

        let report = self.checker.check(text, overall_progress);

        let seq_state = SequencerState {
            completed_milestones: previous.completed_milestones.clone(),
            current_index: previous.current_milestone_index,
        };
        let narrative = story.combined_narrative(text);
        // The candidate counts: the gate asks whether the story may be
        // this many chapters long.
        let chapter_count = story.chapters.len() + 1;
        let (milestone, new_seq) = self.sequence.evaluate(&seq_state, chapter_count, &narrative);

        let valid = report.valid && milestone.can_progress;
        let suggestions =
            self.collect_suggestions(&report.violations, &milestone, &new_seq, overall_progress);

        if valid {
            story.advanced_progress = AdvancedProgress {
                dimensions: dimensions.clone(),
                overall_progress,
                current_milestone_index: new_seq.current_index,
                completed_milestones: new_seq.completed_milestones,
            };
            info!(
                overall_progress,
                milestone_index = story.advanced_progress.current_milestone_index,
                "chapter accepted, progress committed"
            );
        } else {
            info!(
                violations = report.violations.len(),
                milestone_hold = !milestone.can_progress,
                "chapter rejected, story state unchanged"
            );
        }

        PacingResult {
            valid,
            overall_progress,
            dimensions,
            violations: report.violations,
            milestone,
            suggestions,
        }
    }

    /// Derives the constraint payload for the next generation attempt.
    /// Read-only: looks at the committed progress, never at a candidate.
    pub fn build_constraints_for_next(&self, story: &StoryState) -> GenerationConstraints {
        let progress = &story.advanced_progress;
        let band = self.checker.table().band_for(progress.overall_progress);
        let seq_state = SequencerState {
            completed_milestones: progress.completed_milestones.clone(),
            current_index: progress.current_milestone_index,
        };
        let current = self.sequence.current(&seq_state);

        GenerationConstraints {
            stage_label: band.label.clone(),
            forbidden_terms: band.forbidden.clone(),
            max_time_skip: band.max_time_skip,
            current_milestone: current.map(|m| m.name.clone()),
            allowed_emotion_tags: current
                .map(|m| m.allowed_emotion_tags.clone())
                .unwrap_or_default(),
            required_elements: current
                .map(|m| m.required_elements.clone())
                .unwrap_or_default(),
        }
    }

    /// One remediation sentence per violation kind present, plus the
    /// milestone suggestion and the advisory-gate nudge when applicable.
    fn collect_suggestions(
        &self,
        violations: &[Violation],
        milestone: &MilestoneOutcome,
        new_seq: &SequencerState,
        overall_progress: f32,
    ) -> Vec<String> {
        let mut suggestions = Vec::new();
        let mut seen_kinds: Vec<ViolationKind> = Vec::new();
        for violation in violations {
            if !seen_kinds.contains(&violation.kind) {
                seen_kinds.push(violation.kind);
                suggestions.push(violation.suggestion.clone());
            }
        }
        if let Some(suggestion) = &milestone.suggestion {
            suggestions.push(suggestion.clone());
        }
        if !self.sequence.can_progress_to_next(new_seq, overall_progress) {
            suggestions.push(
                "Overall progress lags the milestone position; develop the relationship \
                 before advancing the plot further."
                    .to_string(),
            );
        }
        suggestions
    }
}

impl PacingEngineBuilder {
    /// Provide the tracker cue lexicon directly (for testing without files).
    pub fn with_tracker_lexicon(mut self, lexicon: Lexicon) -> Self {
        self.tracker_lexicon = Some(lexicon);
        self
    }

    /// Provide the constraint table directly (for testing without files).
    pub fn with_constraint_table(mut self, table: ConstraintTable) -> Self {
        self.constraint_table = Some(table);
        self
    }

    /// Provide the milestone sequence directly (for testing without files).
    pub fn with_milestones(mut self, sequence: MilestoneSequence) -> Self {
        self.milestones = Some(sequence);
        self
    }

    pub fn tracker_lexicon_path(mut self, path: &str) -> Self {
        self.tracker_lexicon_path = Some(path.to_string());
        self
    }

    pub fn constraint_table_path(mut self, path: &str) -> Self {
        self.constraint_table_path = Some(path.to_string());
        self
    }

    pub fn milestones_path(mut self, path: &str) -> Self {
        self.milestones_path = Some(path.to_string());
        self
    }

    /// Builds the engine. RON paths, when given, take precedence over
    /// directly provided values; everything else falls back to defaults.
    pub fn build(self) -> Result<PacingEngine, ConfigError> {
        let tracker = if let Some(path) = self.tracker_lexicon_path {
            ProgressTracker::with_lexicon(Lexicon::load_from_ron(Path::new(&path))?)
        } else if let Some(lexicon) = self.tracker_lexicon {
            ProgressTracker::with_lexicon(lexicon)
        } else {
            ProgressTracker::default()
        };

        let table = if let Some(path) = self.constraint_table_path {
            ConstraintTable::load_from_ron(Path::new(&path))?
        } else {
            self.constraint_table.unwrap_or_default()
        };

        let sequence = if let Some(path) = self.milestones_path {
            MilestoneSequence::load_from_ron(Path::new(&path))?
        } else {
            self.milestones.unwrap_or_default()
        };

        Ok(PacingEngine {
            tracker,
            checker: ConstraintChecker::new(table),
            sequence,
        })
    }
}

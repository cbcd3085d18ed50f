//! Milestone sequencer — the ordered narrative-phase state machine.
//!
//! The sequence itself is read-only after construction. Mutable position
//! lives in `SequencerState`, which callers pass in and get back updated;
//! the index only ever advances, one step per evaluation, and is committed
//! by the orchestrator together with the rest of the progress state.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::core::lexicon::{ConfigError, Lexicon};

/// A milestone also asks that overall progress reach this share of its
/// proportional target (`index / sequence length × 100`). Advisory only.
pub const PROPORTIONAL_TARGET_RATIO: f32 = 0.8;

/// A named narrative phase with its advancement gates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub name: String,
    pub minimum_chapter_count: usize,
    pub required_elements: Vec<String>,
    pub allowed_emotion_tags: Vec<String>,
}

/// Mutable sequencer position: which milestones are done and where the
/// cursor sits. The index is monotonically non-decreasing for the lifetime
/// of a story and bounded by the sequence length.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SequencerState {
    pub completed_milestones: Vec<String>,
    pub current_index: usize,
}

/// Outcome of one milestone evaluation.
///
/// `can_progress = false` is the hard chapter-count hold: generation must
/// not proceed. A missed content gate is softer — the milestone stays
/// open (`completed = false`) but the chapter itself may stand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MilestoneOutcome {
    pub completed: bool,
    pub can_progress: bool,
    pub reason: Option<String>,
    pub suggestion: Option<String>,
}

impl MilestoneOutcome {
    /// The current milestone was satisfied and the cursor may advance.
    fn satisfied() -> Self {
        Self {
            completed: true,
            can_progress: true,
            reason: None,
            suggestion: None,
        }
    }

    /// Past the last milestone: same shape as a satisfied outcome, held
    /// forever.
    fn terminal() -> Self {
        Self::satisfied()
    }
}

/// The fixed ordered milestone sequence plus the lexicon resolving each
/// required-element tag to its cue group.
#[derive(Debug, Clone, PartialEq)]
pub struct MilestoneSequence {
    pub milestones: Vec<Milestone>,
    pub elements: Lexicon,
}

fn milestone(
    name: &str,
    minimum_chapter_count: usize,
    required_elements: &[&str],
    allowed_emotion_tags: &[&str],
) -> Milestone {
    Milestone {
        name: name.to_string(),
        minimum_chapter_count,
        required_elements: required_elements.iter().map(|e| (*e).to_string()).collect(),
        allowed_emotion_tags: allowed_emotion_tags
            .iter()
            .map(|t| (*t).to_string())
            .collect(),
    }
}

/// The built-in element lexicon for the default romance sequence.
pub fn default_element_lexicon() -> Lexicon {
    let mut lexicon = Lexicon::new();
    lexicon.insert("meeting", &["처음 만나", "마주쳤", "만나게 되"]);
    lexicon.insert("reunion", &["다시 만나", "재회", "또 마주"]);
    lexicon.insert("interest_hint", &["호감", "자꾸 생각", "눈길이 가"]);
    lexicon.insert("trust_shown", &["믿기 시작", "신뢰", "의지하"]);
    lexicon.insert("inner_thoughts", &["속마음", "털어놓"]);
    lexicon.insert("conflict", &["다퉜", "갈등", "부딪혔"]);
    lexicon.insert("misunderstanding", &["오해", "착각"]);
    lexicon.insert("confession_scene", &["고백", "마음을 전"]);
    lexicon.insert("couple_declared", &["사귀기로", "연인이 되"]);
    lexicon.insert("date", &["데이트", "둘만의 약속"]);
    lexicon
}

impl Default for MilestoneSequence {
    fn default() -> Self {
        Self {
            milestones: vec![
                // Minimums step by one: the chapter-count hold rejects the
                // chapter outright, so a larger jump after an early
                // completion would leave no acceptable next chapter at all.
                milestone("first_meeting", 1, &["meeting"], &["호기심", "어색함"]),
                milestone(
                    "growing_interest",
                    2,
                    &["reunion", "interest_hint"],
                    &["설렘", "호감"],
                ),
                milestone(
                    "building_trust",
                    3,
                    &["trust_shown", "inner_thoughts"],
                    &["편안함", "믿음"],
                ),
                milestone("crisis", 4, &["conflict", "misunderstanding"], &["불안", "그리움"]),
                milestone("confession", 5, &["confession_scene"], &["사랑", "떨림"]),
                milestone("couple", 6, &["couple_declared", "date"], &["사랑", "행복"]),
            ],
            elements: default_element_lexicon(),
        }
    }
}

// RON files carry the milestones plus optional element-lexicon overrides.
#[derive(Debug, Deserialize)]
struct RonSequence {
    milestones: Vec<Milestone>,
    #[serde(default)]
    elements: rustc_hash::FxHashMap<String, Vec<String>>,
}

impl MilestoneSequence {
    pub fn len(&self) -> usize {
        self.milestones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.milestones.is_empty()
    }

    /// The milestone the cursor currently points at, if any remain.
    pub fn current<'a>(&'a self, state: &SequencerState) -> Option<&'a Milestone> {
        self.milestones.get(state.current_index)
    }

    /// Evaluates the current milestone against the story so far.
    ///
    /// Returns the outcome and the (possibly advanced) state. Only the
    /// current milestone is ever consulted; the cursor moves at most one
    /// step, and a cursor past the end is terminal and idempotent.
    pub fn evaluate(
        &self,
        state: &SequencerState,
        chapter_count: usize,
        narrative: &str,
    ) -> (MilestoneOutcome, SequencerState) {
        let next = state.clone();
        let Some(milestone) = self.milestones.get(state.current_index) else {
            return (MilestoneOutcome::terminal(), next);
        };

        if chapter_count < milestone.minimum_chapter_count {
            let outcome = MilestoneOutcome {
                completed: false,
                can_progress: false,
                reason: Some(format!(
                    "milestone '{}' requires at least {} chapters (story has {})",
                    milestone.name, milestone.minimum_chapter_count, chapter_count
                )),
                suggestion: None,
            };
            return (outcome, next);
        }

        let missing: Vec<&str> = milestone
            .required_elements
            .iter()
            .filter(|element| !self.elements.matches(element, narrative))
            .map(String::as_str)
            .collect();

        if missing.is_empty() {
            let mut advanced = next;
            advanced.completed_milestones.push(milestone.name.clone());
            advanced.current_index += 1;
            debug!(milestone = %milestone.name, index = advanced.current_index, "milestone completed");
            (MilestoneOutcome::satisfied(), advanced)
        } else {
            let outcome = MilestoneOutcome {
                completed: false,
                can_progress: true,
                reason: None,
                suggestion: Some(format!(
                    "milestone '{}' still needs: {}",
                    milestone.name,
                    missing.join(", ")
                )),
            };
            (outcome, next)
        }
    }

    /// Advisory secondary gate: overall progress should have reached 80%
    /// of the proportional target implied by the cursor position.
    pub fn can_progress_to_next(&self, state: &SequencerState, overall_progress: f32) -> bool {
        if state.current_index >= self.milestones.len() {
            return true;
        }
        let target = state.current_index as f32 / self.milestones.len() as f32 * 100.0;
        overall_progress >= target * PROPORTIONAL_TARGET_RATIO
    }

    /// Load a milestone sequence from a RON file. Element groups in the
    /// file override the built-in lexicon group-by-group.
    pub fn load_from_ron(path: &Path) -> Result<MilestoneSequence, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parse a milestone sequence from a RON string.
    pub fn parse_ron(input: &str) -> Result<MilestoneSequence, ConfigError> {
        let raw: RonSequence = ron::from_str(input)?;
        let mut elements = default_element_lexicon();
        elements.merge(Lexicon { groups: raw.elements });
        Ok(MilestoneSequence {
            milestones: raw.milestones,
            elements,
        })
    }
}

use serde::{Deserialize, Serialize};

use super::dimensions::ProgressDimensions;

/// One published story unit. The chapter list is append-only and owned by
/// the calling system; the engine only ever reads it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    pub number: u32,
    pub title: String,
    pub summary: String,
    pub content: String,
}

/// The engine-owned subtree of the story record: quantified dimensions,
/// the fused overall scalar, and the milestone cursor. Committed as one
/// unit or not at all.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdvancedProgress {
    pub dimensions: ProgressDimensions,
    pub overall_progress: f32,
    pub current_milestone_index: usize,
    pub completed_milestones: Vec<String>,
}

/// The running story record as supplied by the external store. The engine
/// reads `chapters` and `advanced_progress` and, on a valid chapter,
/// rewrites only `advanced_progress`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoryState {
    pub id: String,
    pub title: String,
    pub chapters: Vec<Chapter>,
    pub advanced_progress: AdvancedProgress,
}

impl StoryState {
    /// Concatenates every prior chapter summary with the candidate text.
    /// This is the haystack milestone required-elements are matched against.
    pub fn combined_narrative(&self, candidate: &str) -> String {
        let mut narrative = String::new();
        for chapter in &self.chapters {
            narrative.push_str(&chapter.summary);
            narrative.push('\n');
        }
        narrative.push_str(candidate);
        narrative
    }
}

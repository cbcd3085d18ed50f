//! Configuration loading tests — RON fixtures for the band table, the
//! milestone sequence, and the tracker cue lexicon.

use std::path::Path;

use pacing_engine::core::constraint::ConstraintTable;
use pacing_engine::core::engine::PacingEngine;
use pacing_engine::core::lexicon::{ConfigError, Lexicon};
use pacing_engine::core::milestone::MilestoneSequence;
use pacing_engine::schema::story::StoryState;

#[test]
fn load_band_table_fixture() {
    let table = ConstraintTable::load_from_ron(Path::new("tests/fixtures/bands.ron")).unwrap();
    assert_eq!(table.bands.len(), 3);
    assert_eq!(table.band_for(30.0).label, "도입");
    assert_eq!(table.band_for(60.0).label, "전개");
    assert_eq!(table.band_for(95.0).label, "절정");
    assert_eq!(table.band_for(30.0).max_time_skip.in_days(), 2.0);
}

#[test]
fn load_milestones_fixture_with_element_overrides() {
    let sequence =
        MilestoneSequence::load_from_ron(Path::new("tests/fixtures/milestones.ron")).unwrap();
    assert_eq!(sequence.len(), 2);
    assert_eq!(sequence.milestones[0].name, "meet");
    // Fixture overrides the "meeting" element group...
    assert!(sequence.elements.matches("meeting", "a chance encounter"));
    // ...while untouched built-in groups remain available
    assert!(sequence.elements.matches("conflict", "크게 다퉜다"));
}

#[test]
fn load_tracker_lexicon_fixture() {
    let lexicon =
        Lexicon::load_from_ron(Path::new("tests/fixtures/tracker_lexicon.ron")).unwrap();
    assert!(lexicon.matches("physical:meeting", "an encounter at dusk"));
    assert!(lexicon.matches("status:friend", "they became friends"));
}

#[test]
fn builder_wires_all_three_paths() {
    let engine = PacingEngine::builder()
        .tracker_lexicon_path("tests/fixtures/tracker_lexicon.ron")
        .constraint_table_path("tests/fixtures/bands.ron")
        .milestones_path("tests/fixtures/milestones.ron")
        .build()
        .unwrap();

    let mut story = StoryState::default();
    let result = engine.validate_and_update("An encounter; they held hands.", &mut story);
    assert!(result.valid);
    assert_eq!(result.dimensions.physical.meetings, 1);
    assert_eq!(result.dimensions.physical.touches, 1);
    // Fixture milestone "meet" satisfied by the overridden element group
    assert!(result.milestone.completed);
    assert_eq!(story.advanced_progress.current_milestone_index, 1);

    let constraints = engine.build_constraints_for_next(&story);
    assert_eq!(constraints.stage_label, "도입");
    assert_eq!(constraints.current_milestone, Some("bond".to_string()));
}

#[test]
fn missing_config_file_surfaces_io_error() {
    let result = PacingEngine::builder()
        .constraint_table_path("tests/fixtures/no_such_table.ron")
        .build();
    assert!(matches!(result, Err(ConfigError::Io(_))));
}

#[test]
fn malformed_config_surfaces_ron_error() {
    let result = ConstraintTable::parse_ron("(bands: [broken");
    assert!(matches!(result, Err(ConfigError::Ron(_))));
}

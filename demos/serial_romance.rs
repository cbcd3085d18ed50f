/// Serial Romance example — the closed feedback loop over a generator.
///
/// Walks a short Korean romance serial through the gate: for each planned
/// chapter, print the constraints a generator would receive, then validate
/// a candidate text. Some candidates are deliberately out of pace.
///
/// Run with: cargo run --example serial_romance

use pacing_engine::core::engine::PacingEngine;
use pacing_engine::schema::story::{Chapter, StoryState};

fn main() {
    let engine = PacingEngine::builder()
        .build()
        .expect("Failed to build pacing engine");

    let mut story = StoryState {
        id: "demo-1".to_string(),
        title: "우산 아래".to_string(),
        chapters: Vec::new(),
        advanced_progress: Default::default(),
    };

    // Candidate chapters a generator might produce. The second one jumps
    // the pacing (forbidden vocabulary for the opening stage).
    let candidates = [
        "비 오는 날, 두 사람은 버스 정류장에서 처음 만나게 되었다.",
        "다음 날 그는 사랑해라고 고백하며 키스했다.",
        "3일 후, 그들은 카페에서 또 마주쳤다. 어색한 인사를 나눴다.",
        "단둘이 공원을 함께 걸었다. 그녀는 자꾸 생각나는 이유를 몰랐다.",
        "그는 속마음을 털어놓았다. 믿을 수 있는 사람이라는 생각이 들었다.",
        "둘만의 비밀이 생긴 뒤로, 서로를 의지하게 되었다.",
    ];

    for candidate in candidates {
        let constraints = engine.build_constraints_for_next(&story);
        println!("── stage: {} ──", constraints.stage_label);
        println!("   forbidden: {:?}", constraints.forbidden_terms);
        println!(
            "   max skip: {} day(s), milestone: {:?}",
            constraints.max_time_skip.in_days(),
            constraints.current_milestone
        );
        println!("   candidate: {}", candidate);

        let result = engine.validate_and_update(candidate, &mut story);
        if result.valid {
            println!(
                "   → accepted (overall {:.1}%, milestone completed: {})",
                result.overall_progress, result.milestone.completed
            );
            story.chapters.push(Chapter {
                number: story.chapters.len() as u32 + 1,
                title: format!("{}화", story.chapters.len() + 1),
                summary: candidate.to_string(),
                content: candidate.to_string(),
            });
        } else {
            println!("   → rejected:");
            for violation in &result.violations {
                println!("     [{}] {}", violation.kind.tag(), violation.message);
            }
            for suggestion in &result.suggestions {
                println!("     hint: {}", suggestion);
            }
        }
        println!();
    }

    println!(
        "final: {} chapters accepted, overall {:.1}%, milestones {:?}",
        story.chapters.len(),
        story.advanced_progress.overall_progress,
        story.advanced_progress.completed_milestones
    );
}

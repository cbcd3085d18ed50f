//! Progress tracker — turns raw chapter text into updated dimension state.
//!
//! Pure: `update` builds a fresh `ProgressDimensions` from its inputs and
//! never mutates the previous state. Detection is cue-driven and only ever
//! increments counters; the absence of a cue changes nothing.

use tracing::debug;

use crate::core::lexicon::Lexicon;
use crate::schema::dimensions::{ProgressDimensions, SocialStatus};

/// Fixed increment applied to the trust level per trust cue, clamped at 100.
pub const TRUST_STEP: f32 = 5.0;

/// Tags of the cue groups the tracker scans for.
pub mod cue_tags {
    pub const MEETING: &str = "physical:meeting";
    pub const PRIVATE_TIME: &str = "physical:private_time";
    pub const TOUCH: &str = "physical:touch";
    pub const TRUST: &str = "emotional:trust";
    pub const VULNERABILITY: &str = "emotional:vulnerability";
    pub const PUBLIC_INTERACTION: &str = "social:public";
    pub const SHARED_GOAL: &str = "plot:shared_goal";
    pub const SHARED_SECRET: &str = "plot:shared_secret";
    pub const SHARED_DANGER: &str = "plot:shared_danger";
}

/// The built-in Korean cue lexicon for dimension tracking.
pub fn default_tracker_lexicon() -> Lexicon {
    let mut lexicon = Lexicon::new();
    lexicon.insert(
        cue_tags::MEETING,
        &["만났", "마주쳤", "처음 만나", "만나게 되"],
    );
    lexicon.insert(
        cue_tags::PRIVATE_TIME,
        &["단둘이", "둘만의 시간", "함께 걸었", "같이 저녁"],
    );
    lexicon.insert(
        cue_tags::TOUCH,
        &["손을 잡", "어깨를 감싸", "손끝이 스치", "안아 주"],
    );
    lexicon.insert(cue_tags::TRUST, &["믿음", "신뢰", "의지하", "믿을 수 있"]);
    lexicon.insert(
        cue_tags::VULNERABILITY,
        &["속마음", "털어놓", "눈물을 보이", "비밀을 말"],
    );
    lexicon.insert(
        cue_tags::PUBLIC_INTERACTION,
        &["사람들 앞에서", "모임에서", "친구들과 함께", "회사에서 마주"],
    );
    lexicon.insert(
        SocialStatus::Acquaintance.tag(),
        &["인사를 나눴", "이름을 알게", "알고 지내"],
    );
    lexicon.insert(SocialStatus::Friend.tag(), &["친구가 되", "친해졌", "편해졌"]);
    lexicon.insert(
        SocialStatus::Interested.tag(),
        &["호감", "자꾸 생각나", "신경이 쓰"],
    );
    lexicon.insert(SocialStatus::Couple.tag(), &["사귀기로", "연인이 되", "커플"]);
    lexicon.insert(
        cue_tags::SHARED_GOAL,
        &["함께 목표", "같은 목표", "힘을 합치", "협력하기로"],
    );
    lexicon.insert(
        cue_tags::SHARED_SECRET,
        &["둘만의 비밀", "비밀을 공유", "아무에게도 말하지 않"],
    );
    lexicon.insert(
        cue_tags::SHARED_DANGER,
        &["위험에 처", "위기를 함께", "구해 주", "함께 맞서"],
    );
    lexicon
}

/// Scans chapter text for progress cues and derives updated dimension state.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    cues: Lexicon,
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self {
            cues: default_tracker_lexicon(),
        }
    }
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a tracker over a custom cue lexicon.
    pub fn with_lexicon(cues: Lexicon) -> Self {
        Self { cues }
    }

    /// Derives the next dimension state from chapter text and the previous
    /// state. Every matching cue group fires independently; counters only
    /// ever increase, and all derived progresses are recomputed before
    /// returning.
    pub fn update(&self, text: &str, previous: &ProgressDimensions) -> ProgressDimensions {
        let mut next = previous.clone();

        if self.cues.matches(cue_tags::MEETING, text) {
            next.physical.meetings += 1;
        }
        if self.cues.matches(cue_tags::PRIVATE_TIME, text) {
            next.physical.private_time += 1;
        }
        if self.cues.matches(cue_tags::TOUCH, text) {
            next.physical.touches += 1;
        }

        if self.cues.matches(cue_tags::TRUST, text) {
            next.emotional.trust_level = (next.emotional.trust_level + TRUST_STEP).min(100.0);
        }
        if self.cues.matches(cue_tags::VULNERABILITY, text) {
            next.emotional.vulnerability_shares += 1;
        }

        if self.cues.matches(cue_tags::PUBLIC_INTERACTION, text) {
            next.social.public_interactions += 1;
        }
        // Status promotes to the highest matched status and never demotes.
        for status in [
            SocialStatus::Couple,
            SocialStatus::Interested,
            SocialStatus::Friend,
            SocialStatus::Acquaintance,
        ] {
            if status > next.social.status && self.cues.matches(status.tag(), text) {
                debug!(from = ?next.social.status, to = ?status, "social status promoted");
                next.social.status = status;
                break;
            }
        }

        if self.cues.matches(cue_tags::SHARED_GOAL, text) {
            next.plot_integration.shared_goals += 1;
        }
        if self.cues.matches(cue_tags::SHARED_SECRET, text) {
            next.plot_integration.shared_secrets += 1;
        }
        if self.cues.matches(cue_tags::SHARED_DANGER, text) {
            next.plot_integration.shared_dangers += 1;
        }

        next.recompute_all();
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meeting_cue_increments_counter() {
        let tracker = ProgressTracker::new();
        let previous = ProgressDimensions::default();
        let next = tracker.update("두 사람은 골목에서 마주쳤다.", &previous);
        assert_eq!(next.physical.meetings, 1);
        assert_eq!(next.physical.progress, 5.0);
    }

    #[test]
    fn previous_state_is_untouched() {
        let tracker = ProgressTracker::new();
        let previous = ProgressDimensions::default();
        let _ = tracker.update("두 사람은 마주쳤다. 손을 잡았다.", &previous);
        assert_eq!(previous, ProgressDimensions::default());
    }

    #[test]
    fn multiple_cue_groups_fire_on_one_text() {
        let tracker = ProgressTracker::new();
        let text = "단둘이 걷다가 손을 잡았다. 그는 속마음을 털어놓았다.";
        let next = tracker.update(text, &ProgressDimensions::default());
        assert_eq!(next.physical.private_time, 1);
        assert_eq!(next.physical.touches, 1);
        assert_eq!(next.emotional.vulnerability_shares, 1);
    }

    #[test]
    fn trust_rises_by_fixed_step() {
        let tracker = ProgressTracker::new();
        let next = tracker.update("조금씩 신뢰가 쌓였다.", &ProgressDimensions::default());
        assert_eq!(next.emotional.trust_level, TRUST_STEP);
    }

    #[test]
    fn trust_clamps_at_100() {
        let tracker = ProgressTracker::new();
        let mut previous = ProgressDimensions::default();
        previous.emotional.trust_level = 98.0;
        let next = tracker.update("신뢰가 더 깊어졌다.", &previous);
        assert_eq!(next.emotional.trust_level, 100.0);
    }

    #[test]
    fn status_promotes_to_highest_match() {
        let tracker = ProgressTracker::new();
        let next = tracker.update(
            "친해졌다고 생각했는데, 어느새 호감이 커지고 있었다.",
            &ProgressDimensions::default(),
        );
        assert_eq!(next.social.status, SocialStatus::Interested);
        assert_eq!(next.social.progress, 60.0);
    }

    #[test]
    fn status_never_demotes() {
        let tracker = ProgressTracker::new();
        let mut previous = ProgressDimensions::default();
        previous.social.status = SocialStatus::Couple;
        previous.recompute_all();
        let next = tracker.update("친구가 된 기분이었다.", &previous);
        assert_eq!(next.social.status, SocialStatus::Couple);
    }

    #[test]
    fn cueless_text_changes_nothing() {
        let tracker = ProgressTracker::new();
        let mut previous = ProgressDimensions::default();
        previous.physical.meetings = 3;
        previous.recompute_all();
        let next = tracker.update("날씨가 흐렸다.", &previous);
        assert_eq!(next, previous);
    }

    #[test]
    fn repeated_updates_are_monotonic() {
        let tracker = ProgressTracker::new();
        let text = "마주쳤다. 손을 잡았다. 둘만의 비밀이 생겼다.";
        let mut dims = ProgressDimensions::default();
        let mut last_overall = dims.overall();
        for _ in 0..10 {
            let next = tracker.update(text, &dims);
            assert!(next.physical.meetings >= dims.physical.meetings);
            assert!(next.overall() >= last_overall);
            assert!(next.overall() <= 100.0);
            last_overall = next.overall();
            dims = next;
        }
    }

    #[test]
    fn custom_lexicon_replaces_defaults() {
        let mut lexicon = Lexicon::new();
        lexicon.insert(cue_tags::MEETING, &["encounter"]);
        let tracker = ProgressTracker::with_lexicon(lexicon);
        let next = tracker.update("An encounter at dusk.", &ProgressDimensions::default());
        assert_eq!(next.physical.meetings, 1);
        // Default cues no longer apply
        let other = tracker.update("마주쳤다.", &ProgressDimensions::default());
        assert_eq!(other.physical.meetings, 0);
    }
}

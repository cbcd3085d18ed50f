use serde::{Deserialize, Serialize};

/// Weight applied to each counted meeting when deriving physical progress.
pub const MEETING_WEIGHT: f32 = 5.0;
/// Weight applied to each private-time scene.
pub const PRIVATE_TIME_WEIGHT: f32 = 10.0;
/// Weight applied to each touch event.
pub const TOUCH_WEIGHT: f32 = 15.0;

/// Weight applied to the trust level when deriving emotional progress.
pub const TRUST_WEIGHT: f32 = 0.7;
/// Weight applied to each vulnerability-sharing scene.
pub const VULNERABILITY_WEIGHT: f32 = 15.0;

/// Weight applied to each shared-goal event.
pub const SHARED_GOAL_WEIGHT: f32 = 15.0;
/// Weight applied to each shared-secret event.
pub const SHARED_SECRET_WEIGHT: f32 = 20.0;
/// Weight applied to each shared-danger event.
pub const SHARED_DANGER_WEIGHT: f32 = 25.0;

/// Credit given to overall progress when only one dimension is nonzero.
/// A single advancing signal family is not corroborated progress.
pub const SINGLE_DIMENSION_CREDIT: f32 = 0.5;

fn clamp_progress(value: f32) -> f32 {
    value.clamp(0.0, 100.0)
}

/// Relationship standing as the story's social world sees it.
/// Ordered; promotion only ever moves toward `Couple`, never back.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum SocialStatus {
    #[default]
    Stranger,
    Acquaintance,
    Friend,
    Interested,
    Couple,
}

impl SocialStatus {
    /// Fixed progress lookup for this status. Looked up, never computed.
    pub fn progress(&self) -> f32 {
        match self {
            Self::Stranger => 0.0,
            Self::Acquaintance => 20.0,
            Self::Friend => 40.0,
            Self::Interested => 60.0,
            Self::Couple => 100.0,
        }
    }

    /// Returns the cue-group tag for this status (e.g., "status:friend").
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Stranger => "status:stranger",
            Self::Acquaintance => "status:acquaintance",
            Self::Friend => "status:friend",
            Self::Interested => "status:interested",
            Self::Couple => "status:couple",
        }
    }
}

/// Bodily proximity signals: meetings, time alone together, touch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhysicalDimension {
    pub meetings: u32,
    pub private_time: u32,
    pub touches: u32,
    pub progress: f32,
}

impl PhysicalDimension {
    pub fn recompute(&mut self) {
        self.progress = clamp_progress(
            self.meetings as f32 * MEETING_WEIGHT
                + self.private_time as f32 * PRIVATE_TIME_WEIGHT
                + self.touches as f32 * TOUCH_WEIGHT,
        );
    }
}

/// Trust and vulnerability signals. Trust rises in bounded steps and
/// never falls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmotionalDimension {
    pub trust_level: f32,
    pub vulnerability_shares: u32,
    pub progress: f32,
}

impl EmotionalDimension {
    pub fn recompute(&mut self) {
        self.progress = clamp_progress(
            self.trust_level * TRUST_WEIGHT
                + self.vulnerability_shares as f32 * VULNERABILITY_WEIGHT,
        );
    }
}

/// Public-facing signals: interactions witnessed by others, plus the
/// enumerated relationship status.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SocialDimension {
    pub public_interactions: u32,
    pub status: SocialStatus,
    pub progress: f32,
}

impl SocialDimension {
    pub fn recompute(&mut self) {
        self.progress = self.status.progress();
    }
}

/// Plot entanglement signals: goals, secrets, and dangers shared by the pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlotDimension {
    pub shared_goals: u32,
    pub shared_secrets: u32,
    pub shared_dangers: u32,
    pub progress: f32,
}

impl PlotDimension {
    pub fn recompute(&mut self) {
        self.progress = clamp_progress(
            self.shared_goals as f32 * SHARED_GOAL_WEIGHT
                + self.shared_secrets as f32 * SHARED_SECRET_WEIGHT
                + self.shared_dangers as f32 * SHARED_DANGER_WEIGHT,
        );
    }
}

/// The four independent signal families that quantify relationship progress.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressDimensions {
    pub physical: PhysicalDimension,
    pub emotional: EmotionalDimension,
    pub social: SocialDimension,
    pub plot_integration: PlotDimension,
}

impl ProgressDimensions {
    /// Fuses the four dimension progresses into one overall scalar.
    ///
    /// Two or more nonzero dimensions: mean of all four (zeros included).
    /// Exactly one nonzero: half its value. None: zero. Always recomputed
    /// from the dimension values; never stored on its own.
    pub fn overall(&self) -> f32 {
        let values = [
            self.physical.progress,
            self.emotional.progress,
            self.social.progress,
            self.plot_integration.progress,
        ];
        let nonzero = values.iter().filter(|p| **p > 0.0).count();
        match nonzero {
            0 => 0.0,
            1 => values.iter().copied().fold(0.0, f32::max) * SINGLE_DIMENSION_CREDIT,
            _ => values.iter().sum::<f32>() / values.len() as f32,
        }
    }

    /// Recomputes every dimension's derived progress from its counters.
    pub fn recompute_all(&mut self) {
        self.physical.recompute();
        self.emotional.recompute();
        self.social.recompute();
        self.plot_integration.recompute();
    }
}

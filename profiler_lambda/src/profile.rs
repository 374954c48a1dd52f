//! Encoding profile selection.
//!
//! A source is matched to one of three output classes by walking a ladder of
//! candidate heights from the largest down. Portrait sources are matched
//! against the long edge of each class instead of the short one.

/// Short edge of each class, largest first.
pub const LANDSCAPE_LADDER: [u32; 3] = [2160, 1080, 720];
/// Long edge of each class, in the same order as [`LANDSCAPE_LADDER`].
pub const PORTRAIT_LADDER: [u32; 3] = [3840, 1920, 1280];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingProfile {
    P2160,
    P1080,
    P720,
}

const PROFILES: [EncodingProfile; 3] = [
    EncodingProfile::P2160,
    EncodingProfile::P1080,
    EncodingProfile::P720,
];

impl EncodingProfile {
    /// Value stored as `encodingProfile`.
    #[must_use]
    pub const fn height(self) -> u32 {
        match self {
            Self::P2160 => 2160,
            Self::P1080 => 1080,
            Self::P720 => 720,
        }
    }

    /// The other edge of the 16:9 frame.
    #[must_use]
    pub const fn width(self) -> u32 {
        match self {
            Self::P2160 => 3840,
            Self::P1080 => 1920,
            Self::P720 => 1280,
        }
    }

    /// Record key holding the job template for this class.
    #[must_use]
    pub const fn template_key(self, rotated: bool) -> &'static str {
        use types::keys;

        match (self, rotated) {
            (Self::P2160, false) => keys::JOB_TEMPLATE_2160P,
            (Self::P1080, false) => keys::JOB_TEMPLATE_1080P,
            (Self::P720, false) => keys::JOB_TEMPLATE_720P,
            (Self::P2160, true) => keys::JOB_TEMPLATE_2160P_PORTRAIT,
            (Self::P1080, true) => keys::JOB_TEMPLATE_1080P_PORTRAIT,
            (Self::P720, true) => keys::JOB_TEMPLATE_720P_PORTRAIT,
        }
    }
}

/// Walks `ladder` in order and returns the index of the accepted candidate.
///
/// A candidate is accepted while its distance to `src_height` does not
/// exceed the distance of the previously accepted one, so ties go to the
/// later candidate. The walk stops at the first strict increase and never
/// looks further down the ladder. An empty ladder yields index 0.
#[must_use]
pub fn walk_ladder(src_height: u32, ladder: &[u32]) -> usize {
    let mut best = 0;
    let mut best_distance: Option<u32> = None;

    for (index, &candidate) in ladder.iter().enumerate() {
        let distance = src_height.abs_diff(candidate);

        if best_distance.is_some_and(|previous| distance > previous) {
            break;
        }

        best = index;
        best_distance = Some(distance);
    }

    best
}

/// Source properties the decision depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Source {
    pub height: u32,
    pub width: u32,
    pub rotation: i64,
    pub input_rotate: Option<types::InputRotate>,
}

impl Source {
    #[must_use]
    pub const fn is_portrait(&self) -> bool {
        self.height > self.width
    }

    /// Whether the output frame ends up taller than wide, either because the
    /// source already is or because a quarter-turn rotation will be applied.
    #[must_use]
    pub fn is_rotated(&self) -> bool {
        let quarter_turn = matches!(self.rotation, 90 | 270);
        let honored = self
            .input_rotate
            .is_some_and(types::InputRotate::honors_quarter_turn);

        self.is_portrait() || (quarter_turn && honored)
    }

    #[must_use]
    pub fn encoding_profile(&self) -> EncodingProfile {
        let ladder: &[u32] = if self.is_portrait() {
            &PORTRAIT_LADDER
        } else {
            &LANDSCAPE_LADDER
        };

        PROFILES[walk_ladder(self.height, ladder)]
    }
}

/// Everything the profiler writes back onto the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileDecision {
    pub profile: EncodingProfile,
    pub rotated: bool,
    /// `(height, width)` of captured frames, when frame capture is on.
    pub frame_capture: Option<(u32, u32)>,
}

#[must_use]
pub fn decide(source: &Source, frame_capture: bool) -> ProfileDecision {
    let profile = source.encoding_profile();
    let rotated = source.is_rotated();

    let frame_capture = frame_capture.then(|| {
        if rotated {
            (profile.width(), profile.height())
        } else {
            (profile.height(), profile.width())
        }
    });

    ProfileDecision {
        profile,
        rotated,
        frame_capture,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::InputRotate;

    fn landscape(height: u32) -> Source {
        Source {
            height,
            width: height * 16 / 9 + 1,
            rotation: 0,
            input_rotate: Some(InputRotate::Degree0),
        }
    }

    fn portrait(height: u32, width: u32) -> Source {
        Source {
            height,
            width,
            rotation: 0,
            input_rotate: Some(InputRotate::Degree0),
        }
    }

    #[test]
    fn test_exact_landscape_heights() {
        for height in LANDSCAPE_LADDER {
            assert_eq!(landscape(height).encoding_profile().height(), height);
        }
    }

    #[test]
    fn test_portrait_is_remapped() {
        let source = portrait(1920, 1080);

        assert_eq!(source.encoding_profile(), EncodingProfile::P1080);
        assert_eq!(source.encoding_profile().height(), 1080);
    }

    #[test]
    fn test_portrait_small_source() {
        assert_eq!(
            portrait(640, 360).encoding_profile(),
            EncodingProfile::P720
        );
    }

    #[test]
    fn test_between_rungs_stops_on_increase() {
        // 2160 -> 1160, 1080 -> 80, 720 -> 280 (increase, stop)
        assert_eq!(landscape(1000).encoding_profile(), EncodingProfile::P1080);
    }

    #[test]
    fn test_small_and_large_sources() {
        assert_eq!(landscape(480).encoding_profile(), EncodingProfile::P720);
        assert_eq!(landscape(4320).encoding_profile(), EncodingProfile::P2160);
    }

    #[test]
    fn test_tie_goes_to_smaller_rung() {
        // 1620 is 540 away from both 2160 and 1080
        assert_eq!(walk_ladder(1620, &LANDSCAPE_LADDER), 1);
        assert_eq!(landscape(1620).encoding_profile(), EncodingProfile::P1080);
    }

    #[test]
    fn test_walk_halts_at_first_increase() {
        // distances 360, 1080, 0: the exact match is never reached
        assert_eq!(walk_ladder(1080, &[720, 2160, 1080]), 0);
    }

    #[test]
    fn test_walk_continues_through_plateau() {
        // distances 100, 100, 50, 60
        assert_eq!(walk_ladder(1000, &[1100, 900, 1050, 1060]), 2);
    }

    #[test]
    fn test_walk_empty_ladder() {
        assert_eq!(walk_ladder(1080, &[]), 0);
    }

    #[test]
    fn test_ladders_pair_up_as_frame_edges() {
        for (index, profile) in PROFILES.iter().enumerate() {
            assert_eq!(profile.height(), LANDSCAPE_LADDER[index]);
            assert_eq!(profile.width(), PORTRAIT_LADDER[index]);
        }
    }

    #[test]
    fn test_frame_capture_landscape() {
        let decision = decide(&landscape(1080), true);

        assert!(!decision.rotated);
        assert_eq!(decision.frame_capture, Some((1080, 1920)));
    }

    #[test]
    fn test_frame_capture_portrait() {
        let decision = decide(&portrait(1920, 1080), true);

        assert!(decision.rotated);
        assert_eq!(decision.frame_capture, Some((1920, 1080)));
    }

    #[test]
    fn test_frame_capture_rotated_landscape() {
        let source = Source {
            height: 1080,
            width: 1920,
            rotation: 90,
            input_rotate: Some(InputRotate::Degree90),
        };

        let decision = decide(&source, true);

        assert!(!source.is_portrait());
        assert!(decision.rotated);
        assert_eq!(decision.profile, EncodingProfile::P1080);
        assert_eq!(decision.frame_capture, Some((1920, 1080)));
    }

    #[test]
    fn test_rotation_ignored_without_matching_input_rotate() {
        let mut source = Source {
            height: 720,
            width: 1280,
            rotation: 270,
            input_rotate: Some(InputRotate::Degree0),
        };
        assert!(!source.is_rotated());

        source.input_rotate = None;
        assert!(!source.is_rotated());

        source.input_rotate = Some(InputRotate::Auto);
        assert!(source.is_rotated());

        source.rotation = 180;
        assert!(!source.is_rotated());
    }

    #[test]
    fn test_no_frame_capture() {
        assert_eq!(decide(&landscape(720), false).frame_capture, None);
    }

    #[test]
    fn test_template_key() {
        assert_eq!(
            EncodingProfile::P1080.template_key(false),
            "jobTemplate_1080p"
        );
        assert_eq!(
            EncodingProfile::P720.template_key(true),
            "jobTemplate_720p_portrait"
        );
    }
}

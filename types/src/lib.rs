//! Shared record schema for the VOD workflow lambdas.
//!
//! The profiler writes keys onto a [`VideoRecord`] that travel through the
//! transcoding workflow and are later read (and partly removed) by the
//! completion notifier. Every key either lambda touches is named in [`keys`].

use std::str::FromStr;

mod record;
pub mod utils;

pub use record::VideoRecord;

pub mod keys {
    pub const GUID: &str = "guid";
    pub const SRC_VIDEO: &str = "srcVideo";
    pub const SRC_MEDIAINFO: &str = "srcMediainfo";
    pub const SRC_HEIGHT: &str = "srcHeight";
    pub const SRC_WIDTH: &str = "srcWidth";
    pub const SRC_ROTATION: &str = "srcRotation";
    pub const INPUT_ROTATE: &str = "inputRotate";

    pub const FRAME_CAPTURE: &str = "frameCapture";
    pub const FRAME_CAPTURE_HEIGHT: &str = "frameCaptureHeight";
    pub const FRAME_CAPTURE_WIDTH: &str = "frameCaptureWidth";

    pub const ENCODING_PROFILE: &str = "encodingProfile";
    pub const JOB_TEMPLATE: &str = "jobTemplate";
    pub const IS_CUSTOM_TEMPLATE: &str = "isCustomTemplate";

    pub const JOB_TEMPLATE_2160P: &str = "jobTemplate_2160p";
    pub const JOB_TEMPLATE_1080P: &str = "jobTemplate_1080p";
    pub const JOB_TEMPLATE_720P: &str = "jobTemplate_720p";
    pub const JOB_TEMPLATE_2160P_PORTRAIT: &str = "jobTemplate_2160p_portrait";
    pub const JOB_TEMPLATE_1080P_PORTRAIT: &str = "jobTemplate_1080p_portrait";
    pub const JOB_TEMPLATE_720P_PORTRAIT: &str = "jobTemplate_720p_portrait";

    pub const ENCODING_JOB: &str = "encodingJob";
    pub const ENCODING_OUTPUT: &str = "encodingOutput";

    pub const WORKFLOW_STATUS: &str = "workflowStatus";
    pub const ENABLE_MEDIA_PACKAGE: &str = "enableMediaPackage";
    pub const VIDEO_TYPE: &str = "videoType";
}

/// Keys that only matter inside the workflow and never leave it.
pub const INTERNAL_FIELDS: [&str; 9] = [
    keys::SRC_MEDIAINFO,
    keys::JOB_TEMPLATE_2160P,
    keys::JOB_TEMPLATE_1080P,
    keys::JOB_TEMPLATE_720P,
    keys::JOB_TEMPLATE_2160P_PORTRAIT,
    keys::JOB_TEMPLATE_1080P_PORTRAIT,
    keys::JOB_TEMPLATE_720P_PORTRAIT,
    keys::ENCODING_JOB,
    keys::ENCODING_OUTPUT,
];

/// Output locations that stay in the table but are dropped from outbound
/// notifications when media packaging is enabled.
pub const MEDIA_PACKAGE_FIELDS: [&str; 12] = [
    "mp4Outputs",
    "mp4Urls",
    "hlsPlaylist",
    "hlsUrl",
    "dashPlaylist",
    "dashUrl",
    "mssPlaylist",
    "mssUrl",
    "cmafDashPlaylist",
    "cmafDashUrl",
    "cmafHlsPlaylist",
    "cmafHlsUrl",
];

/// Rotation requested for the transcoding input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputRotate {
    Auto,
    Degree0,
    Degree90,
    Degree180,
    Degree270,
}

impl InputRotate {
    /// Whether a 90/270 degree source rotation will end up applied to the
    /// output, turning a landscape frame into a portrait one.
    #[must_use]
    pub const fn honors_quarter_turn(self) -> bool {
        matches!(self, Self::Auto | Self::Degree90 | Self::Degree270)
    }
}

impl FromStr for InputRotate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AUTO" => Ok(Self::Auto),
            "DEGREE_0" => Ok(Self::Degree0),
            "DEGREE_90" => Ok(Self::Degree90),
            "DEGREE_180" => Ok(Self::Degree180),
            "DEGREE_270" => Ok(Self::Degree270),
            _ => Err(format!("unknown input rotation: {s}")),
        }
    }
}

/// Workflow state as recorded by the step functions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowStatus {
    Complete,
    Other(String),
}

impl From<&str> for WorkflowStatus {
    fn from(value: &str) -> Self {
        match value {
            "Complete" => Self::Complete,
            other => Self::Other(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_rotate_from_str() {
        assert_eq!("AUTO".parse::<InputRotate>(), Ok(InputRotate::Auto));
        assert_eq!(
            "DEGREE_270".parse::<InputRotate>(),
            Ok(InputRotate::Degree270)
        );
        assert!("DEGREE_45".parse::<InputRotate>().is_err());
    }

    #[test]
    fn test_input_rotate_quarter_turn() {
        assert!(InputRotate::Auto.honors_quarter_turn());
        assert!(InputRotate::Degree90.honors_quarter_turn());
        assert!(InputRotate::Degree270.honors_quarter_turn());
        assert!(!InputRotate::Degree0.honors_quarter_turn());
        assert!(!InputRotate::Degree180.honors_quarter_turn());
    }

    #[test]
    fn test_workflow_status_from_str() {
        assert_eq!(WorkflowStatus::from("Complete"), WorkflowStatus::Complete);
        assert_eq!(
            WorkflowStatus::from("Encoding"),
            WorkflowStatus::Other("Encoding".to_string())
        );
    }

    #[test]
    fn test_field_lists_do_not_overlap() {
        for field in MEDIA_PACKAGE_FIELDS {
            assert!(!INTERNAL_FIELDS.contains(&field));
        }
    }
}

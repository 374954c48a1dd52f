//! Shaping of the outbound notification.

use thiserror::Error;
use types::{INTERNAL_FIELDS, MEDIA_PACKAGE_FIELDS, VideoRecord, keys};

/// Removes everything the external API must not see.
///
/// Packaging outputs are only dropped when media packaging is enabled; they
/// stay available in the table either way.
pub fn scrub(record: &mut VideoRecord) {
    record.remove_all(&INTERNAL_FIELDS);

    if record.get_bool(keys::ENABLE_MEDIA_PACKAGE) {
        record.remove_all(&MEDIA_PACKAGE_FIELDS);
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TargetError {
    #[error("record has no srcVideo")]
    MissingSourceVideo,
    #[error("srcVideo {0:?} does not name a user, video type and video id")]
    InvalidSourceVideo(String),
}

/// Who the notification is sent on behalf of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
    User,
    Organization,
    Unknown,
}

/// Where and for whom a notification is delivered, derived from the
/// source file name `{userId}_{videoType}_{videoId}_{date}.{ext}`, which may
/// be prefixed with `{subdomain}/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryTarget {
    pub subdomain: Option<String>,
    pub user_id: String,
    pub video_type: String,
    pub video_id: String,
}

impl DeliveryTarget {
    pub fn from_src_video(src_video: &str) -> Result<Self, TargetError> {
        let invalid = || TargetError::InvalidSourceVideo(src_video.to_string());

        let (subdomain, filename) = match src_video.split_once('/') {
            Some((subdomain, rest)) => {
                if subdomain.is_empty() {
                    return Err(invalid());
                }
                let filename =
                    rest.split_once('/').map_or(rest, |(first, _)| first);
                (Some(subdomain.to_string()), filename)
            }
            None => (None, src_video),
        };

        let stem = filename.split_once('.').map_or(filename, |(stem, _)| stem);
        let mut parts = stem.split('_');

        let (Some(user_id), Some(video_type), Some(video_id)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };

        if user_id.is_empty() || video_type.is_empty() || video_id.is_empty() {
            return Err(invalid());
        }

        Ok(Self {
            subdomain,
            user_id: user_id.to_string(),
            video_type: video_type.to_string(),
            video_id: video_id.to_string(),
        })
    }

    /// Video types look like `user-vlp`, `org-vlp` or `org-video`.
    #[must_use]
    pub fn owner(&self) -> Owner {
        match self.video_type.split('-').next() {
            Some("user") => Owner::User,
            Some("org") => Owner::Organization,
            _ => Owner::Unknown,
        }
    }
}

/// Scrubs `record` and stamps it with the target's video type.
pub fn prepare(
    record: &mut VideoRecord,
) -> Result<DeliveryTarget, TargetError> {
    scrub(record);

    let target = DeliveryTarget::from_src_video(
        record.src_video().ok_or(TargetError::MissingSourceVideo)?,
    )?;

    record.insert(keys::VIDEO_TYPE, target.video_type.clone());

    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn complete_record(enable_media_package: bool) -> VideoRecord {
        let mut value = json!({
            "guid": "12345678",
            "workflowStatus": "Complete",
            "enableMediaPackage": enable_media_package,
            "srcVideo": "99992_user-vlp_1234_20200513002939.webm",
            "encodingProfile": 720,
            "jobTemplate": "Ott_720p",
            "cloudFront": "d1.example.net",
            "encodeJobId": "1589389574836-8xotiq",
            "encodingJob": { "JobTemplate": "Ott_720p" },
            "encodingOutput": { "detail": { "status": "COMPLETE" } },
        });

        let object = value.as_object_mut().unwrap();
        for field in INTERNAL_FIELDS.iter().chain(MEDIA_PACKAGE_FIELDS.iter()) {
            object
                .entry(field.to_string())
                .or_insert_with(|| Value::String(format!("{field}-value")));
        }

        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_scrub_with_media_package() {
        let mut record = complete_record(true);

        scrub(&mut record);

        for field in INTERNAL_FIELDS.iter().chain(MEDIA_PACKAGE_FIELDS.iter()) {
            assert!(!record.contains_key(field), "{field} was not removed");
        }
        assert_eq!(record.get_str("cloudFront"), Some("d1.example.net"));
        assert_eq!(record.get_str(keys::JOB_TEMPLATE), Some("Ott_720p"));
    }

    #[test]
    fn test_scrub_without_media_package() {
        let mut record = complete_record(false);

        scrub(&mut record);

        for field in INTERNAL_FIELDS {
            assert!(!record.contains_key(field), "{field} was not removed");
        }
        for field in MEDIA_PACKAGE_FIELDS {
            assert!(record.contains_key(field), "{field} was removed");
        }
    }

    #[test]
    fn test_target_from_plain_filename() {
        let target = DeliveryTarget::from_src_video(
            "99992_user-vlp_1234_20200513002939.webm",
        )
        .unwrap();

        assert_eq!(
            target,
            DeliveryTarget {
                subdomain: None,
                user_id: "99992".to_string(),
                video_type: "user-vlp".to_string(),
                video_id: "1234".to_string(),
            }
        );
        assert_eq!(target.owner(), Owner::User);
    }

    #[test]
    fn test_target_with_subdomain() {
        let target =
            DeliveryTarget::from_src_video("dev/77_org-video_55_20210101.mp4")
                .unwrap();

        assert_eq!(target.subdomain.as_deref(), Some("dev"));
        assert_eq!(target.user_id, "77");
        assert_eq!(target.video_id, "55");
        assert_eq!(target.owner(), Owner::Organization);
    }

    #[test]
    fn test_target_extension_cut_at_first_dot() {
        let target =
            DeliveryTarget::from_src_video("1_user-vlp_2.final_3.mp4").unwrap();

        assert_eq!(target.video_id, "2");
    }

    #[test]
    fn test_target_unknown_owner() {
        let target =
            DeliveryTarget::from_src_video("1_guest_2_20200101.mp4").unwrap();

        assert_eq!(target.owner(), Owner::Unknown);
    }

    #[test]
    fn test_target_invalid() {
        for src_video in ["1_user-vlp.mp4", "", "/1_user-vlp_2_3.mp4", "1__2_3"] {
            assert_eq!(
                DeliveryTarget::from_src_video(src_video),
                Err(TargetError::InvalidSourceVideo(src_video.to_string()))
            );
        }
    }

    #[test]
    fn test_prepare_sets_video_type() {
        let mut record = complete_record(false);

        let target = prepare(&mut record).unwrap();

        assert_eq!(target.video_id, "1234");
        assert_eq!(record.get_str(keys::VIDEO_TYPE), Some("user-vlp"));
        assert_eq!(
            record.src_video(),
            Some("99992_user-vlp_1234_20200513002939.webm")
        );
    }

    #[test]
    fn test_prepare_without_src_video() {
        let mut record = complete_record(false);
        record.remove(keys::SRC_VIDEO);

        assert_eq!(prepare(&mut record), Err(TargetError::MissingSourceVideo));
    }
}

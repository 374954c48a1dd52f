use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MediaInfoError {
    #[error("srcMediainfo is missing")]
    Missing,
    #[error("srcMediainfo is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("srcMediainfo has no video track")]
    NoVideoTrack,
    #[error("video track has no usable {0}")]
    InvalidField(&'static str),
}

#[derive(Debug, Deserialize)]
struct MediaInfo {
    #[serde(default)]
    video: Vec<VideoTrack>,
}

#[derive(Debug, Deserialize)]
struct VideoTrack {
    height: Option<Value>,
    width: Option<Value>,
    rotation: Option<Value>,
}

/// Dimensions and rotation of the first video track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoDimensions {
    pub height: u32,
    pub width: u32,
    pub rotation: i64,
}

/// Reads the first video track out of the `srcMediainfo` JSON text.
pub fn parse(
    src_mediainfo: Option<&str>,
) -> Result<VideoDimensions, MediaInfoError> {
    let text = src_mediainfo.ok_or(MediaInfoError::Missing)?;

    let media_info: MediaInfo = serde_json::from_str(text)
        .map_err(|e| MediaInfoError::InvalidJson(e.to_string()))?;

    let track = media_info
        .video
        .into_iter()
        .next()
        .ok_or(MediaInfoError::NoVideoTrack)?;

    let height = track
        .height
        .as_ref()
        .and_then(parse_dimension)
        .ok_or(MediaInfoError::InvalidField("height"))?;
    let width = track
        .width
        .as_ref()
        .and_then(parse_dimension)
        .ok_or(MediaInfoError::InvalidField("width"))?;
    let rotation = track
        .rotation
        .as_ref()
        .and_then(parse_rotation)
        .ok_or(MediaInfoError::InvalidField("rotation"))?;

    Ok(VideoDimensions {
        height,
        width,
        rotation,
    })
}

fn parse_dimension(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Rotation is reported either as a number or as text such as `"90.000"`;
/// only the leading integer part counts.
#[allow(clippy::cast_possible_truncation)]
fn parse_rotation(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)
        }),
        Value::String(s) => leading_integer(s),
        _ => None,
    }
}

fn leading_integer(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let digits_start = usize::from(text.starts_with(['-', '+']));
    let digits_end = text[digits_start..]
        .find(|c: char| !c.is_ascii_digit())
        .map_or(text.len(), |offset| digits_start + offset);

    if digits_end == digits_start {
        return None;
    }

    text[..digits_end].parse().ok()
}

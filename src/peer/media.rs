use crate::error::MediaError;
use crate::peer::api::MediaSource;
use crate::peer::connection::RtcTrack;
use crate::peer::types::MediaConstraints;
use crate::utils::random_id;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;
use webrtc::api::media_engine::{MIME_TYPE_OPUS, MIME_TYPE_VP8};
use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecCapability;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

/// Builds Opus and VP8 sample tracks sharing one stream id.
/// Audio first, matching capture order.
pub fn sample_tracks(constraints: &MediaConstraints) -> Vec<RtcTrack> {
    let stream_id = format!("stream-{}", random_id());
    let mut tracks = Vec::with_capacity(2);

    if constraints.audio {
        tracks.push(RtcTrack::Local(Arc::new(TrackLocalStaticSample::new(
            RTCRtpCodecCapability {
                mime_type: MIME_TYPE_OPUS.to_owned(),
                clock_rate: 48000,
                channels: 2,
                ..Default::default()
            },
            format!("audio-{}", random_id()),
            stream_id.clone(),
        ))));
    }

    if constraints.video.is_some() {
        tracks.push(RtcTrack::Local(Arc::new(TrackLocalStaticSample::new(
            RTCRtpCodecCapability {
                mime_type: MIME_TYPE_VP8.to_owned(),
                clock_rate: 90000,
                ..Default::default()
            },
            format!("video-{}", random_id()),
            stream_id,
        ))));
    }

    tracks
}

/// Media source producing writable sample tracks instead of device capture.
/// The application feeds encoded frames into the returned tracks.
#[derive(Debug, Clone)]
pub struct SampleMediaSource {
    permitted: bool,
}

impl Default for SampleMediaSource {
    fn default() -> Self {
        Self { permitted: true }
    }
}

impl SampleMediaSource {
    /// A source that refuses every request, as a denied capture prompt would
    pub fn denied() -> Self {
        Self { permitted: false }
    }
}

#[async_trait]
impl MediaSource for SampleMediaSource {
    type Track = RtcTrack;

    async fn acquire(&self, constraints: &MediaConstraints) -> Result<Vec<RtcTrack>, MediaError> {
        if !self.permitted {
            return Err(MediaError::PermissionDenied("capture not permitted".into()));
        }
        if constraints.is_empty() {
            return Err(MediaError::NothingRequested);
        }
        let tracks = sample_tracks(constraints);
        debug!(count = tracks.len(), video = ?constraints.video, "sample tracks created");
        Ok(tracks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::peer::types::{MediaTrack, TrackKind};

    #[tokio::test]
    async fn acquires_audio_then_video() {
        let tracks = SampleMediaSource::default()
            .acquire(&MediaConstraints::default())
            .await
            .unwrap();
        let kinds: Vec<_> = tracks.iter().map(|t| t.kind()).collect();
        assert_eq!(kinds, vec![TrackKind::Audio, TrackKind::Video]);
        assert_ne!(tracks[0].id(), tracks[1].id());
    }

    #[tokio::test]
    async fn audio_only_constraints() {
        let tracks = SampleMediaSource::default()
            .acquire(&MediaConstraints::audio_only())
            .await
            .unwrap();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].kind(), TrackKind::Audio);
    }

    #[tokio::test]
    async fn empty_constraints_fail() {
        let err = SampleMediaSource::default()
            .acquire(&MediaConstraints {
                audio: false,
                video: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err, MediaError::NothingRequested);
    }

    #[tokio::test]
    async fn denied_source_fails() {
        let err = SampleMediaSource::denied()
            .acquire(&MediaConstraints::default())
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::PermissionDenied(_)));
    }
}

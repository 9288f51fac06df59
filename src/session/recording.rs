use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CaptureError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeakingPart {
    Part1,
    Part2,
    Part3,
}

impl SpeakingPart {
    pub const ALL: [SpeakingPart; 3] = [SpeakingPart::Part1, SpeakingPart::Part2, SpeakingPart::Part3];

    pub fn key(self) -> &'static str {
        match self {
            SpeakingPart::Part1 => "part1",
            SpeakingPart::Part2 => "part2",
            SpeakingPart::Part3 => "part3",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SpeakingPart::Part1 => "Part 1",
            SpeakingPart::Part2 => "Part 2",
            SpeakingPart::Part3 => "Part 3",
        }
    }
}

impl fmt::Display for SpeakingPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A finished recording. Immutable once produced.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AudioClip {
    pub part: SpeakingPart,
    pub path: PathBuf,
    /// Playback location derived from `path`.
    pub url: String,
    pub mime: String,
    pub bytes: u64,
    pub recorded_at: DateTime<Utc>,
}

impl AudioClip {
    pub fn new(part: SpeakingPart, path: PathBuf, mime: &str, bytes: u64) -> Self {
        Self {
            part,
            url: file_url(&path),
            path,
            mime: mime.to_string(),
            bytes,
            recorded_at: Utc::now(),
        }
    }
}

pub fn file_url(path: &Path) -> String {
    format!("file://{}", path.display())
}

/// Platform microphone access.
pub trait AudioCapture {
    /// Acquire the microphone for `part`. May prompt or fail with
    /// [`CaptureError::PermissionDenied`].
    fn start(&mut self, part: SpeakingPart) -> Result<Box<dyn ActiveCapture>, CaptureError>;
}

impl<C: AudioCapture + ?Sized> AudioCapture for Box<C> {
    fn start(&mut self, part: SpeakingPart) -> Result<Box<dyn ActiveCapture>, CaptureError> {
        (**self).start(part)
    }
}

/// A capture in progress. Consuming it always releases the device.
pub trait ActiveCapture {
    fn finish(self: Box<Self>) -> Result<AudioClip, CaptureError>;
    fn abort(self: Box<Self>);
}

struct ActiveRecording {
    part: SpeakingPart,
    handle: Box<dyn ActiveCapture>,
    started_at: Instant,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RecordingSlot<'a> {
    Empty,
    Recording,
    Finished(&'a AudioClip),
}

/// One slot per speaking part, at most one of them capturing at a time.
pub struct RecordingDeck<C> {
    capture: C,
    active: Option<ActiveRecording>,
    finished: BTreeMap<SpeakingPart, AudioClip>,
}

impl<C: AudioCapture> RecordingDeck<C> {
    pub fn new(capture: C) -> Self {
        Self {
            capture,
            active: None,
            finished: BTreeMap::new(),
        }
    }

    pub fn active_part(&self) -> Option<SpeakingPart> {
        self.active.as_ref().map(|a| a.part)
    }

    pub fn active_elapsed_secs(&self) -> Option<u64> {
        self.active.as_ref().map(|a| a.started_at.elapsed().as_secs())
    }

    pub fn start_recording(&mut self, part: SpeakingPart) -> Result<(), CaptureError> {
        if let Some(active) = self.active_part() {
            return Err(CaptureError::Busy { active });
        }
        match self.capture.start(part) {
            Ok(handle) => {
                tracing::info!(part = part.key(), "recording started");
                self.active = Some(ActiveRecording {
                    part,
                    handle,
                    started_at: Instant::now(),
                });
                Ok(())
            }
            Err(e) => {
                tracing::warn!(part = part.key(), error = %e, "recording failed to start");
                Err(e)
            }
        }
    }

    /// Finalize the active capture of `part`, replacing any earlier clip for it.
    pub fn stop_recording(&mut self, part: SpeakingPart) -> Result<AudioClip, CaptureError> {
        match self.active.take() {
            Some(active) if active.part == part => {
                let clip = active.handle.finish()?;
                tracing::info!(part = part.key(), bytes = clip.bytes, "recording finished");
                self.finished.insert(part, clip.clone());
                Ok(clip)
            }
            other => {
                self.active = other;
                Err(CaptureError::NotRecording(part))
            }
        }
    }

    /// Abort any capture in progress and forget every finished clip.
    pub fn discard_all(&mut self) {
        if let Some(active) = self.active.take() {
            tracing::info!(part = active.part.key(), "recording aborted");
            active.handle.abort();
        }
        self.finished.clear();
    }

    pub fn slot(&self, part: SpeakingPart) -> RecordingSlot<'_> {
        if self.active_part() == Some(part) {
            return RecordingSlot::Recording;
        }
        match self.finished.get(&part) {
            Some(clip) => RecordingSlot::Finished(clip),
            None => RecordingSlot::Empty,
        }
    }

    pub fn clip(&self, part: SpeakingPart) -> Option<&AudioClip> {
        self.finished.get(&part)
    }

    pub fn missing_parts(&self) -> Vec<SpeakingPart> {
        SpeakingPart::ALL
            .into_iter()
            .filter(|p| !self.finished.contains_key(p))
            .collect()
    }
}

impl<C> Drop for RecordingDeck<C> {
    fn drop(&mut self) {
        if let Some(active) = self.active.take() {
            active.handle.abort();
        }
    }
}

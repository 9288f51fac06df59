use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::Duration;

use chrono::Utc;

use crate::error::CaptureError;
use crate::session::recording::{ActiveCapture, AudioCapture, AudioClip, SpeakingPart};

/// How long ffmpeg gets to open the device before we trust it is recording.
const STARTUP_SETTLE: Duration = Duration::from_millis(250);

/// An ffmpeg input: demuxer (`-f`) plus device (`-i`).
#[derive(Clone, Debug, PartialEq, Eq)]
struct MicInput {
    format: String,
    source: String,
}

impl MicInput {
    /// The OS sound backend, pointed at `device` or its default microphone.
    fn for_os(os: &str, device: Option<&str>) -> Option<Self> {
        let (format, default_source) = match os {
            "linux" => ("alsa", "default"),
            "macos" => ("avfoundation", ":0"),
            "windows" => ("dshow", "audio=default"),
            _ => return None,
        };
        Some(Self {
            format: format.to_string(),
            source: device.unwrap_or(default_source).to_string(),
        })
    }
}

/// Microphone capture through an `ffmpeg` child process writing 16 kHz mono WAV.
pub struct FfmpegCapture {
    program: String,
    output_dir: PathBuf,
    device: Option<String>,
    raw_input: (Option<String>, Option<String>),
}

impl FfmpegCapture {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: "ffmpeg".to_string(),
            output_dir: output_dir.into(),
            device: None,
            raw_input: (None, None),
        }
    }

    pub fn with_device(mut self, device: Option<String>) -> Self {
        self.device = device;
        self
    }

    /// Bypass the OS backend with a raw ffmpeg format and source.
    pub fn with_input(mut self, format: Option<String>, source: Option<String>) -> Self {
        self.raw_input = (format, source);
        self
    }

    pub fn with_program(mut self, program: &str) -> Self {
        self.program = program.to_string();
        self
    }

    fn input(&self) -> Result<MicInput, CaptureError> {
        match &self.raw_input {
            (Some(format), Some(source)) => Ok(MicInput {
                format: format.clone(),
                source: source.clone(),
            }),
            (None, None) => MicInput::for_os(std::env::consts::OS, self.device.as_deref())
                .ok_or_else(|| {
                    CaptureError::Unavailable(format!(
                        "no known microphone backend on {}; set mic_ffmpeg_format and mic_ffmpeg_source",
                        std::env::consts::OS
                    ))
                }),
            _ => Err(CaptureError::Unavailable(
                "mic_ffmpeg_format and mic_ffmpeg_source go together".to_string(),
            )),
        }
    }
}

impl AudioCapture for FfmpegCapture {
    fn start(&mut self, part: SpeakingPart) -> Result<Box<dyn ActiveCapture>, CaptureError> {
        let input = self.input()?;
        fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(format!(
            "{}-{}.wav",
            part.key(),
            Utc::now().format("%Y%m%d-%H%M%S")
        ));
        // ffmpeg's diagnostics go to a file so a long take never fills a pipe.
        let log_path = path.with_extension("log");
        let log = File::create(&log_path)?;

        let spawned = Command::new(&self.program)
            .args(["-hide_banner", "-loglevel", "error", "-y", "-f"])
            .arg(&input.format)
            .arg("-i")
            .arg(&input.source)
            .args(["-ac", "1", "-ar", "16000", "-c:a", "pcm_s16le"])
            .arg(&path)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::from(log))
            .spawn();
        let mut child = match spawned {
            Ok(child) => child,
            Err(e) => {
                let _ = fs::remove_file(&log_path);
                return Err(match e.kind() {
                    std::io::ErrorKind::NotFound => {
                        CaptureError::Unavailable(format!("`{}` not found on PATH", self.program))
                    }
                    _ => CaptureError::Io(e),
                });
            }
        };

        // A denied or missing device makes ffmpeg exit right away.
        thread::sleep(STARTUP_SETTLE);
        if let Some(status) = child.try_wait()? {
            let diagnostics = take_log(&log_path);
            let _ = fs::remove_file(&path);
            return Err(CaptureError::PermissionDenied(format!(
                "{}:{} closed with {status}{}",
                input.format,
                input.source,
                stderr_suffix(&diagnostics)
            )));
        }

        Ok(Box::new(FfmpegRecording {
            part,
            child,
            path,
            log_path,
        }))
    }
}

struct FfmpegRecording {
    part: SpeakingPart,
    child: Child,
    path: PathBuf,
    log_path: PathBuf,
}

impl ActiveCapture for FfmpegRecording {
    fn finish(mut self: Box<Self>) -> Result<AudioClip, CaptureError> {
        // `q` asks ffmpeg to finalize the file and exit.
        if let Some(mut stdin) = self.child.stdin.take() {
            let _ = stdin.write_all(b"q\n");
        }
        let status = self.child.wait()?;
        let diagnostics = take_log(&self.log_path);
        let bytes = fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0);
        if bytes == 0 {
            return Err(CaptureError::Unavailable(format!(
                "no audio captured (ffmpeg {status}){}",
                stderr_suffix(&diagnostics)
            )));
        }
        Ok(AudioClip::new(self.part, self.path.clone(), "audio/wav", bytes))
    }

    fn abort(mut self: Box<Self>) {
        let _ = self.child.kill();
        let _ = self.child.wait();
        let _ = fs::remove_file(&self.path);
        let _ = fs::remove_file(&self.log_path);
    }
}

/// Read and delete ffmpeg's diagnostics file.
fn take_log(path: &Path) -> String {
    let text = fs::read_to_string(path).unwrap_or_default();
    let _ = fs::remove_file(path);
    text
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("; stderr: {trimmed}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn raw_input_overrides_the_os_backend() {
        let capture = FfmpegCapture::new("rec")
            .with_device(Some("ignored".into()))
            .with_input(Some("pulse".into()), Some("mic0".into()));
        assert_eq!(
            capture.input().unwrap(),
            MicInput {
                format: "pulse".into(),
                source: "mic0".into(),
            }
        );
    }

    #[test]
    fn half_a_raw_input_is_rejected() {
        let capture = FfmpegCapture::new("rec").with_input(Some("pulse".into()), None);
        assert!(matches!(capture.input(), Err(CaptureError::Unavailable(_))));
    }

    #[test]
    fn os_backends_and_device_override() {
        assert_eq!(MicInput::for_os("linux", None).unwrap().source, "default");
        assert_eq!(MicInput::for_os("linux", Some("hw:1")).unwrap().source, "hw:1");
        assert_eq!(MicInput::for_os("macos", None).unwrap().format, "avfoundation");
        assert_eq!(MicInput::for_os("windows", None).unwrap().source, "audio=default");
        assert_eq!(MicInput::for_os("haiku", None), None);
    }

    #[test]
    fn missing_ffmpeg_is_unavailable_and_leaves_no_files() {
        let dir = TempDir::new().unwrap();
        let mut capture = FfmpegCapture::new(dir.path())
            .with_program("ielts-mock-no-such-ffmpeg")
            .with_input(Some("lavfi".into()), Some("anullsrc".into()));
        let err = capture.start(SpeakingPart::Part1).err().unwrap();
        assert!(matches!(err, CaptureError::Unavailable(_)));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn take_log_reads_then_removes() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("part1.log");
        fs::write(&log, "device busy\n").unwrap();
        assert_eq!(stderr_suffix(&take_log(&log)), "; stderr: device busy");
        assert!(!log.exists());
        assert_eq!(take_log(&log), "");
    }

    #[test]
    fn stderr_suffix_omits_blank_output() {
        assert_eq!(stderr_suffix("  \n"), "");
    }
}

use std::path::PathBuf;

use thiserror::Error;

use crate::bank::Skill;
use crate::session::recording::SpeakingPart;

/// Failure fetching or decoding part of the question bank.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to load `{path}`: server answered {status}")]
    Status { path: String, status: u16 },

    #[error("failed to load `{path}`: {message}")]
    Transport { path: String, message: String },

    #[error("failed to parse `{path}`: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no tests available for {skill}")]
    NoTests { skill: Skill },
}

/// Submission was refused; the message is meant to be shown to the learner as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{message}")]
    MissingAnswer { question_id: String, message: String },

    #[error("answer for {question_id} does not fit the question")]
    MalformedAnswer { question_id: String },

    #[error("Please record: {}", join_parts(parts))]
    MissingRecordings { parts: Vec<SpeakingPart> },

    #[error("Please provide either a typed or handwritten answer.")]
    EmptyWriting,

    #[error("this attempt has already been submitted")]
    AlreadySubmitted,
}

impl ValidationError {
    /// Question the learner has to fix, when the error is about one question.
    pub fn question_id(&self) -> Option<&str> {
        match self {
            ValidationError::MissingAnswer { question_id, .. }
            | ValidationError::MalformedAnswer { question_id } => Some(question_id),
            _ => None,
        }
    }
}

fn join_parts(parts: &[SpeakingPart]) -> String {
    parts
        .iter()
        .map(|p| format!("{} audio", p.label()))
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("microphone access denied: {0}")]
    PermissionDenied(String),

    #[error("audio capture unavailable: {0}")]
    Unavailable(String),

    #[error("{active} is already recording")]
    Busy { active: SpeakingPart },

    #[error("{0} is not recording")]
    NotRecording(SpeakingPart),

    #[error("recordings are locked once the attempt is submitted")]
    Submitted,

    #[error("recording i/o failure: {0}")]
    Io(#[from] std::io::Error),
}

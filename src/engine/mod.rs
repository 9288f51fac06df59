pub mod band;
pub mod question;
pub mod scoring;

pub use band::{Band, BandTable};
pub use question::{Question, QuestionKind, Verdict};
pub use scoring::ScoreResult;

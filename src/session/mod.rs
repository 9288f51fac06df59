pub mod answers;
pub mod attempt;
pub mod capture;
pub mod recording;
pub mod test_session;
pub mod writing;

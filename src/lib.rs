// The binary entry point is main.rs; this file re-declares the module tree so
// integration tests and bench harnesses can import `ielts_mock::session::*`
// and friends. Some items are only reached from the binary, so suppress
// dead_code warnings here.
#![allow(dead_code)]

pub mod app;
pub mod bank;
pub mod config;
pub mod engine;
pub mod error;
pub mod route;
pub mod session;
pub mod store;
pub mod ui;

// Binary-only plumbing, declared so the tree type-checks the same way.
mod event;
mod logging;

//! Support Desk - support-chat orchestration engine
//!
//! This crate turns a free-text support question into either a cached
//! knowledge-base answer, a generated answer from an external language-model
//! provider, or an escalation to a human operator, while tracking
//! ticket/session/message state and knowledge-base usage statistics.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;

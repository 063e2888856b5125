// Library crate shared by the binary and the integration tests.

pub mod alerting;
pub mod config;
pub mod error;
pub mod flags;
pub mod health;
pub mod notify;
pub mod orchestrator;
pub mod pipeline;
pub mod recommend;
pub mod report;
pub mod rollout;
pub mod simulation;
pub mod validator;

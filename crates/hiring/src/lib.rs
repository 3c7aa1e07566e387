//! Candidate intake and admin review for the Dosmicos creative-marketing hiring campaign.

pub mod admin;
pub mod applications;
pub mod config;
pub mod error;
pub mod telemetry;

//! Subsidy matching and application tracking engine for the DynamoPro
//! home-sustainability platform.
//!
//! The crate is organized around four collaborating subsystems: the read-only
//! subsidy [`catalog`], the rule-based eligibility [`matching`] engine, the
//! [`applications`] tracker owning the application lifecycle state machine,
//! and the [`documents`] processing seam that validates uploads against a
//! subsidy's technical conditions. [`summaries`] wraps the external
//! text-generation collaborator behind a bounded-timeout, fallback-first
//! interface.

pub mod applications;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod documents;
pub mod error;
pub mod matching;
pub mod summaries;
pub mod telemetry;

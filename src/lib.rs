//! Emoseum Core - Therapeutic Journey Engine
//!
//! This crate implements the four-stage ACT journey (Moment, Reflection,
//! Defusion, Closure) with progressive personalization: behavioral signals
//! accumulate per user, tier promotion follows configured thresholds, and
//! every generated artifact passes a safety gate before it is shown.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

//! Offcache E2E Testing Support
//!
//! Shared fixtures for the end-to-end scenario tests: a scripted
//! network transport with an offline switch and deterministic
//! deployed-bundle contents.

#![no_std]

extern crate alloc;


pub use fixtures::{bundle_body, deploy, shell_bundle, RouteOutcome, ScriptedNetwork};

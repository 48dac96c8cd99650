//! Shared test utilities for the histmerge workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`fixture`]: [`fixture::FixtureDir`] builder for source trees and manifests
//! - [`hist`]: shorthand constructors for histograms and containers

pub mod fixture;
pub mod hist;

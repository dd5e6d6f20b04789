// Copyright 2026 Aqarscan Contributors
// SPDX-License-Identifier: Apache-2.0

//! Aqarscan library: incremental crawl-and-extract for rendered listing
//! sites.
//!
//! This library crate exposes the core modules for integration testing.

pub mod classify;
pub mod cli;
pub mod crawl;
pub mod export;
pub mod model;
pub mod renderer;
pub mod site;
pub mod snapshot;

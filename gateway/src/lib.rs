// Copyright 2024-2026 KERP Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Gateway runtime: configuration, logging and the typed request surface
//! the RPC layer calls into.

pub mod config;
pub mod logger;
pub mod service;
pub mod types;

pub use self::config::{Config, LogFormat};
pub use self::service::InsuranceService;

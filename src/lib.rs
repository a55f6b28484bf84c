// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Realty Auth - Identity Service & Edge Gateway
//!
//! Cross-service authentication for the realty platform: the identity
//! service signs short-lived tokens, the edge gateway verifies them on its
//! own, and downstream services receive the verified identity as plain
//! headers.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers of the identity service (Axum)
//! - `auth` - Keys, token issuance and verification, extractors
//! - `gateway` - Edge authentication, claim propagation, forwarding
//! - `identity` - Identity records, registration rules, login
//! - `config` - Environment configuration
//! - `server` - Listener and graceful shutdown

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod gateway;
pub mod identity;
pub mod models;
pub mod server;
pub mod state;
pub mod telemetry;

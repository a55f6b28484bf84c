// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Identity service binary.

use std::process::ExitCode;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use realty_auth::api::router;
use realty_auth::config::IdentityConfig;
use realty_auth::state::AppState;
use realty_auth::{server, telemetry};

#[tokio::main]
async fn main() -> ExitCode {
    telemetry::init_tracing();

    let config = match IdentityConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid identity service configuration");
            return ExitCode::FAILURE;
        }
    };

    // Keys are derived before the listener binds.
    let state = match AppState::from_config(&config) {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "token key derivation failed");
            return ExitCode::FAILURE;
        }
    };

    info!(
        issuer = %config.token.issuer,
        token_lifetime_ms = config.token_lifetime_ms,
        "identity service starting"
    );

    let shutdown = CancellationToken::new();
    tokio::spawn(server::shutdown_signal(shutdown.clone()));

    if let Err(e) = server::serve(router(state), config.bind_addr, config.tls.as_ref(), shutdown).await {
        error!(error = %e, "identity service failed");
        return ExitCode::FAILURE;
    }

    info!("identity service stopped");
    ExitCode::SUCCESS
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Edge gateway binary.

use std::process::ExitCode;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use realty_auth::config::GatewayConfig;
use realty_auth::gateway::{self, GatewayState};
use realty_auth::{server, telemetry};

#[tokio::main]
async fn main() -> ExitCode {
    telemetry::init_tracing();

    let config = match GatewayConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid gateway configuration");
            return ExitCode::FAILURE;
        }
    };

    let state = match GatewayState::from_config(&config) {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "gateway failed to start");
            return ExitCode::FAILURE;
        }
    };

    info!(
        downstream = %config.downstream,
        issuer = %config.token.issuer,
        "edge gateway starting"
    );

    let shutdown = CancellationToken::new();
    tokio::spawn(server::shutdown_signal(shutdown.clone()));

    if let Err(e) = server::serve(
        gateway::router(state),
        config.bind_addr,
        config.tls.as_ref(),
        shutdown,
    )
    .await
    {
        error!(error = %e, "edge gateway failed");
        return ExitCode::FAILURE;
    }

    info!("edge gateway stopped");
    ExitCode::SUCCESS
}

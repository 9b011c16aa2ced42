// Copyright 2024-2026 KERP Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::path::PathBuf;

use anyhow::Context;
use tracing::{info, warn};

use kedi_gateway::{logger, Config, InsuranceService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config =
        Config::load(config_path.as_deref()).context("failed to load gateway configuration")?;
    logger::setup(&config);

    info!(
        service = %config.service_name,
        version = %config.service_version,
        environment = %config.environment,
        "starting insurance EDI gateway"
    );

    let service = InsuranceService::from_config(&config)
        .context("failed to initialize insurance providers")?;

    let health = service.health_check().await;
    for (insurance, reachable) in &health.providers {
        if *reachable {
            info!(authority = insurance.name(), "authority reachable");
        } else {
            warn!(authority = insurance.name(), "authority unreachable at startup");
        }
    }

    // The RPC front end attaches here; the gateway itself runs until told
    // to stop.
    info!(
        host = %config.grpc_host,
        port = config.grpc_port,
        "gateway ready"
    );
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;

    info!("shutdown signal received");
    service.shutdown().await;
    Ok(())
}

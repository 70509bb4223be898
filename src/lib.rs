// src/lib.rs

pub mod cli;
pub mod client;
pub mod config;
pub mod constants;
pub mod controller;
pub mod error;
pub mod models;
pub mod poller;
pub mod render;
pub mod selection;
pub mod symbols;
pub mod tabs;
pub mod trigger;
pub mod ui;
pub mod utils;
mod workflows;

use crate::{
    cli::Cli,
    client::ApiClient,
    config::AppConfig,
    controller::Controller,
    error::AppResult,
    render::{ConsoleRenderer, ConsoleStatusView},
    trigger::FileSaver,
};
use log::{debug, info};
use std::sync::Arc;

/// Library entry point, called by `main.rs`.
pub async fn run_from_cli(args: Arc<Cli>) -> AppResult<()> {
    debug!("CLI args: {:?}", args);

    let config = Arc::new(AppConfig::new(&args)?);
    debug!("loaded config: {:?}", config);

    let client = Arc::new(ApiClient::new(config.clone())?);
    let saver = FileSaver::new(client.clone(), config.output_dir.clone());
    info!("completed files go to {}", saver.output_dir().display());

    let mut controller = Controller::new(
        &config,
        client,
        ConsoleRenderer::new(),
        Arc::new(ConsoleStatusView::new()),
        Arc::new(saver),
    );

    if args.interactive {
        workflows::run_interactive(&mut controller).await
    } else if let Some(url) = &args.url {
        workflows::run_single(&mut controller, &args, url).await
    } else if args.status {
        workflows::run_status(&controller).await
    } else if args.pause {
        workflows::run_pause(&controller).await
    } else if let Some(folder) = &args.open_folder {
        workflows::run_open_folder(&controller, folder).await
    } else if args.browse_folder {
        workflows::run_browse_folder(&controller).await
    } else {
        Ok(())
    }
}

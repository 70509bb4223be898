// src/workflows.rs

use crate::{
    cli::{Cli, Platform},
    constants::messages,
    controller::Controller,
    error::{AppError, AppResult},
    poller::Outcome,
    render::{ConsoleRenderer, RenderTarget},
    symbols, ui, utils,
};
use colored::*;
use log::{debug, info, warn};

pub(crate) type ConsoleController = Controller<ConsoleRenderer>;

fn reported(ok: bool) -> AppResult<()> {
    if ok { Ok(()) } else { Err(AppError::Reported) }
}

/// `--status`: one `/get_status` call, printed as a box.
pub(crate) async fn run_status(controller: &ConsoleController) -> AppResult<()> {
    let status = controller.status().await?;
    let state = if status.is_paused {
        "paused".yellow()
    } else if status.is_downloading {
        "downloading".green()
    } else {
        "idle".normal()
    };
    let mut lines = vec![
        format!("State:    {}", state),
        format!("Progress: {:.0}%", status.progress),
        format!("Message:  {}", status.message),
    ];
    if let Some(title) = status.title() {
        lines.push(format!("Title:    {}", title));
    }
    if let Some(file) = status.completed_file() {
        lines.push(format!("File:     {}", file));
    }
    let lines: Vec<&str> = lines.iter().map(String::as_str).collect();
    ui::box_message("Backend status", &lines, |s| s.cyan());
    Ok(())
}

pub(crate) async fn run_pause(controller: &ConsoleController) -> AppResult<()> {
    reported(controller.toggle_pause().await)
}

pub(crate) async fn run_open_folder(controller: &ConsoleController, folder: &str) -> AppResult<()> {
    reported(controller.open_folder(folder).await)
}

pub(crate) async fn run_browse_folder(controller: &ConsoleController) -> AppResult<()> {
    match controller.browse_folder().await {
        Some(path) => {
            println!("{} Download folder set to {}", *symbols::OK, path.green());
            Ok(())
        }
        None => {
            ui::info(messages::NO_FOLDER_SELECTED);
            Ok(())
        }
    }
}

/// `--url`: fetch info, pick items (Instagram), download, wait for the file.
pub(crate) async fn run_single(controller: &mut ConsoleController, args: &Cli, url: &str) -> AppResult<()> {
    let platform = args.resolve_platform().ok_or_else(|| {
        AppError::UserInputError(format!(
            "Could not tell the platform of '{}', please pass --platform.",
            url
        ))
    })?;
    info!("single task: {} on {}", url, platform);
    controller.tabs().open_tab(platform).url = url.to_string();

    if platform == Platform::Instagram {
        if args.direct {
            return reported(controller.start_download(platform).await);
        }
        if !controller.fetch_instagram_media(url).await {
            return Err(AppError::Reported);
        }
        if args.info_only {
            return Ok(());
        }
        let picked = controller.selection_mut().select_from_expression(&args.select);
        debug!("selection '{}' checked {} items", args.select, picked);
        if !controller.download_selected().await {
            return Err(AppError::Reported);
        }
    } else {
        if !controller.fetch_title(platform, url).await {
            return Err(AppError::Reported);
        }
        if args.info_only {
            return Ok(());
        }
        if !controller.start_download(platform).await {
            return Err(AppError::Reported);
        }
    }

    finish(controller).await
}

async fn finish(controller: &ConsoleController) -> AppResult<()> {
    match controller.wait_for_download().await {
        Some(Outcome::Finished) => Ok(()),
        Some(outcome) => {
            warn!("download ended as {:?}", outcome);
            Err(AppError::Reported)
        }
        None => Err(AppError::Other(anyhow::anyhow!("poller shut down"))),
    }
}

/// `-i`: choose a tab, paste a link, pick media, repeat.
pub(crate) async fn run_interactive(controller: &mut ConsoleController) -> AppResult<()> {
    ui::print_header("Interactive mode");
    ui::plain(&format!(
        "Pick a platform, paste a link and follow the prompts. Press {} to quit.",
        *symbols::CTRL_C
    ));

    let options: Vec<String> = Platform::ALL.iter().map(|p| p.to_string()).collect();
    loop {
        let choice = ui::selection_menu(
            &options,
            "Choose a platform",
            "Enter a number (empty input exits)",
            "",
        );
        if choice.is_empty() {
            break;
        }
        let platform = match choice.trim().parse::<usize>() {
            Ok(i) if (1..=options.len()).contains(&i) => Platform::ALL[i - 1],
            _ => {
                ui::warn(&format!("Invalid choice '{}'.", choice));
                continue;
            }
        };
        controller.tabs().open_tab(platform);

        let url = match ui::prompt(&format!("{} link", platform), None) {
            Ok(url) => url,
            Err(_) => return Err(AppError::UserInterrupt),
        };
        if !url.is_empty() && !utils::is_http_url(&url) {
            ui::warn(&format!("'{}' does not look like a link.", url));
            continue;
        }
        controller.tabs().active_controls_mut().url = url.clone();

        let result = if platform == Platform::Instagram {
            interactive_instagram(controller, &url).await
        } else {
            interactive_video(controller, platform, &url).await
        };
        match result {
            Ok(()) | Err(AppError::Reported) => {}
            Err(AppError::UserInterrupt) => return Err(AppError::UserInterrupt),
            Err(e) => {
                log::error!("interactive task '{}' failed: {}", url, e);
                ui::error(&e.to_string());
            }
        }
    }

    ui::info("Leaving interactive mode.");
    Ok(())
}

async fn interactive_video(controller: &mut ConsoleController, platform: Platform, url: &str) -> AppResult<()> {
    if !controller.fetch_title(platform, url).await {
        return Err(AppError::Reported);
    }
    {
        let defaults = controller.tabs().controls(platform).clone();
        let quality = ui::prompt("Quality", Some(&defaults.quality)).map_err(|_| AppError::UserInterrupt)?;
        let mode = ui::prompt("Mode (Video/Audio)", Some(&defaults.mode)).map_err(|_| AppError::UserInterrupt)?;
        let mut tabs = controller.tabs();
        let controls = tabs.controls_mut(platform);
        controls.quality = quality;
        controls.mode = mode;
    }
    if !controller.start_download(platform).await {
        return Err(AppError::Reported);
    }
    finish(controller).await
}

async fn interactive_instagram(controller: &mut ConsoleController, url: &str) -> AppResult<()> {
    if ui::confirm("Download the whole post in one go?", false) {
        if !controller.start_download(Platform::Instagram).await {
            return Err(AppError::Reported);
        }
        return Ok(());
    }

    if !controller.fetch_instagram_media(url).await {
        return Err(AppError::Reported);
    }
    loop {
        let input = ui::prompt(
            "Toggle items (e.g. '1,3-5'), 'all' to download everything, empty to download the checked ones",
            None,
        )
        .map_err(|_| AppError::UserInterrupt)?;
        let ok = match input.trim() {
            "" => controller.download_selected().await,
            "all" => controller.download_all().await,
            expr => {
                let total = controller.selection().len();
                for index in utils::parse_selection_indices(expr, total) {
                    controller.selection_mut().click_tile(index);
                }
                let tiles = controller.selection().tiles();
                controller.selection_mut().target_mut().render(&tiles);
                continue;
            }
        };
        if ok {
            return finish(controller).await;
        }
        // empty selection or a refused request: let the user try again
    }
}

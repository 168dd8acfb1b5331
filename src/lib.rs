//! Mouse Layer - drive the pointer from the keyboard.
//!
//! Holding the activating modifier with a bound key starts a motion session:
//! directional keys move the cursor with acceleration, other keys click and
//! scroll, and the lock key keeps the session alive after the modifier is let go.

pub mod config;
pub mod dispatcher;
pub mod display;
pub mod emitter;
pub mod keymap;
pub mod session;

use anyhow::Context;
use clap::Parser;
use config::Config;
use dispatcher::{install_passive_grabs, Dispatcher};
use display::{DisplayClient, X11Display};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(
    name = "mouse-layer",
    about = "Move, click and scroll the pointer from the keyboard.",
    version
)]
pub struct Cli {
    /// Configuration file; a default one is written if it does not exist.
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Print the default configuration and exit.
    #[arg(long)]
    pub print_default: bool,
}

/// Initialize tracing/logging
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mouse_layer=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Run the daemon until the display connection is lost
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    if cli.print_default {
        print!("{}", Config::with_standard_keymap().to_toml()?);
        return Ok(());
    }

    tracing::info!("Starting mouse-layer v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::load_or_init(&cli.config)
        .with_context(|| format!("loading configuration {}", cli.config.display()))?;

    let display = Arc::new(X11Display::connect().context("connecting to the X11 display")?);
    let modifier = display
        .modifier_mapping()
        .and_then(|mapping| mapping.super_keycode())
        .context("resolving the activating modifier")?;
    tracing::info!("Activating modifier is keycode {}", modifier);

    let registry = Arc::new(config.keymap.registry());

    tracing::info!("Installing passive grabs");
    let failed = install_passive_grabs(display.as_ref(), &registry);
    if failed > 0 {
        tracing::warn!("{} passive grabs failed; those keys cannot start a session", failed);
    }

    let params = config.motion_params(display.screen_size());
    let dispatcher = Dispatcher::new(
        display,
        registry,
        modifier,
        params,
        tokio::runtime::Handle::current(),
    );

    tokio::task::spawn_blocking(move || dispatcher.run())
        .await
        .context("dispatcher thread panicked")?
        .context("lost the display event stream")?;
    Ok(())
}

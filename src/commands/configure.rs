use std::path::Path;

use clap::Parser;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Password, Select};
use reqwest::Url;
use tracing::info;

use crate::commands::Context;
use crate::common::config::{Config, LOG_LEVELS};
use crate::error::{CliError, CliResult};
use crate::utils::style::Palette;
use crate::utils::table::key_values;

#[derive(Debug, Parser)]
pub struct ConfigureOpts {
    /// Base URL of the federation API.
    #[clap(long)]
    pub url: Option<String>,
    /// API key sent as a bearer token. An empty value clears it.
    #[clap(long)]
    pub api_key: Option<String>,
    /// Request timeout in milliseconds (0 disables the timeout).
    #[clap(long)]
    pub timeout: Option<u64>,
    /// Logging level: trace, debug, info, warn or error.
    #[clap(long)]
    pub log_level: Option<String>,
    /// Print the current configuration without changing it.
    #[clap(long)]
    pub show: bool,
    /// Start over from the default configuration.
    #[clap(long)]
    pub reset: bool,
}

impl ConfigureOpts {
    fn has_updates(&self) -> bool {
        self.url.is_some()
            || self.api_key.is_some()
            || self.timeout.is_some()
            || self.log_level.is_some()
    }

    fn apply(&self, config: &mut Config) {
        if let Some(url) = &self.url {
            config.federation_url = url.trim().to_string();
        }
        if let Some(key) = &self.api_key {
            config.api_key = Some(key.trim().to_string()).filter(|k| !k.is_empty());
        }
        if let Some(timeout) = self.timeout {
            config.timeout = timeout;
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.trim().to_ascii_lowercase();
        }
    }
}

pub fn exec(opts: ConfigureOpts, ctx: Context) -> CliResult<()> {
    if opts.show {
        if opts.has_updates() || opts.reset {
            return Err(CliError::invalid_args(
                "--show cannot be combined with settings or --reset",
            ));
        }
        print!("{}", render(&ctx.config, &ctx.config_path, &ctx.palette));
        return Ok(());
    }

    let mut config = if opts.reset {
        Config::default()
    } else {
        ctx.config.clone()
    };

    if opts.has_updates() {
        opts.apply(&mut config);
    } else if !opts.reset {
        if !console::user_attended() {
            info!("no settings given and the terminal is not interactive");
            print!("{}", render(&config, &ctx.config_path, &ctx.palette));
            return Ok(());
        }
        prompt(&mut config)?;
    }

    config.save_to_file(&ctx.config_path)?;
    info!(path = %ctx.config_path.display(), "configuration saved");

    println!(
        "{}",
        ctx.palette.success(&format!(
            "Configuration saved to {}",
            ctx.config_path.display()
        ))
    );
    print!("{}", render(&config, &ctx.config_path, &ctx.palette));
    Ok(())
}

fn prompt(config: &mut Config) -> CliResult<()> {
    let theme = ColorfulTheme::default();

    config.federation_url = Input::with_theme(&theme)
        .with_prompt("Federation URL")
        .default(config.federation_url.clone())
        .validate_with(|input: &String| -> Result<(), String> {
            Url::parse(input).map(|_| ()).map_err(|e| e.to_string())
        })
        .interact_text()?;

    let key: String = Password::with_theme(&theme)
        .with_prompt("API key (leave empty to keep the current one)")
        .allow_empty_password(true)
        .interact()?;
    if !key.trim().is_empty() {
        config.api_key = Some(key.trim().to_string());
    }

    config.timeout = Input::with_theme(&theme)
        .with_prompt("Request timeout (ms)")
        .default(config.timeout)
        .interact_text()?;

    let current = LOG_LEVELS
        .iter()
        .position(|level| level.eq_ignore_ascii_case(&config.log_level))
        .unwrap_or(2);
    let chosen = Select::with_theme(&theme)
        .with_prompt("Log level")
        .items(LOG_LEVELS)
        .default(current)
        .interact()?;
    config.log_level = LOG_LEVELS.get(chosen).unwrap_or(&"info").to_string();

    Ok(())
}

fn render(config: &Config, path: &Path, palette: &Palette) -> String {
    let pairs = vec![
        ("Federation URL".to_string(), config.federation_url.clone()),
        ("API key".to_string(), config.masked_api_key()),
        (
            "Timeout".to_string(),
            match config.timeout {
                0 => "disabled".to_string(),
                ms => format!("{} ms", ms),
            },
        ),
        ("Log level".to_string(), config.log_level.clone()),
        ("Config file".to_string(), palette.muted(&path.display().to_string())),
    ];
    key_values(&pairs)
}

// release-manager: Multi-Repository Release Coordinator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Entry point.
//!
//! ```text
//! cli::parse() --> Config --> Logging --> ReleaseManager::run --> Summary
//!                    |
//!                    '--> --show-config: print options, exit
//! ```

use std::process::ExitCode;
use std::sync::Arc;

use release_manager::cli::{self, Cli};
use release_manager::cli::global::GlobalOptions;
use release_manager::config::loader::ConfigLoader;
use release_manager::config::{Config, ENV_PREFIX, LOCAL_CONFIG_FILE};
use release_manager::error::Result;
use release_manager::git::backend::SystemGit;
use release_manager::logging::{LogConfig, LogGuard, LogLevel, init_logging};
use release_manager::release::ReleaseManager;
use release_manager::release::context::{RunContext, RunFlags};
use release_manager::release::prompt::{AutoConfirm, LineConfirm, PushConfirm};

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = cli::parse();

    let loader = match build_config_loader(&cli.global) {
        Ok(loader) => loader,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    if cli.global.show_config {
        let files = loader.format_loaded_files();
        return match loader.build() {
            Ok(config) => {
                if !files.is_empty() {
                    println!("Loaded configuration files:");
                    for line in &files {
                        println!("  {line}");
                    }
                }
                for line in config.format_options() {
                    println!("{line}");
                }
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Failed to load config: {e:#}");
                ExitCode::FAILURE
            }
        };
    }

    let config = match loader.build() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let _log_guard: LogGuard = match init_logging(&build_log_config(&cli.global, &config)) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            return ExitCode::FAILURE;
        }
    };

    match run_release(&cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "release failed");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn build_log_config(global: &GlobalOptions, config: &Config) -> LogConfig {
    let mut console_level = config.global.output_log_level;
    if global.verbose {
        console_level = console_level.verbose();
    }

    let file_level = global
        .file_log_level
        .and_then(LogLevel::from_u8)
        .unwrap_or(config.global.file_log_level);

    LogConfig::builder()
        .with_console_level(console_level)
        .with_file_level(file_level)
        .with_show_target(global.verbose)
        .maybe_with_log_file(global.log_file.as_ref().map(|p| p.display().to_string()))
        .build()
}

fn build_config_loader(global: &GlobalOptions) -> Result<ConfigLoader> {
    let mut loader = ConfigLoader::new().add_toml_file_optional(LOCAL_CONFIG_FILE);
    for path in &global.configs {
        loader = loader.add_toml_file(path);
    }
    loader = loader.with_env_prefix(ENV_PREFIX);
    for (key, value) in global.to_config_overrides() {
        loader = loader.set(key, value)?;
    }
    Ok(loader)
}

async fn run_release(cli: &Cli, config: Config) -> Result<()> {
    let Some(input) = cli.release.input.clone() else {
        anyhow::bail!("no input document given");
    };
    let flags = cli.release.flags();

    let git = Arc::new(SystemGit::new()?);
    let confirm: Arc<dyn PushConfirm> = if flags.contains(RunFlags::DIAGNOSTIC) {
        Arc::new(LineConfirm::stdio())
    } else {
        Arc::new(AutoConfirm)
    };

    let ctx = RunContext::new(Arc::new(config), git, confirm, flags);
    let summary = ReleaseManager::new(ctx, input).run().await?;
    print!("{summary}");
    Ok(())
}

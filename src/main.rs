use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use strum::IntoEnumIterator;
use tracing::{error, info};

use blogkeeper::cli::{Cli, Commands, ConfigCommands, UserCommands};
use blogkeeper::config::{StaticConfig, get_config, init_config};
use blogkeeper::errors::BlogkeeperError;
use blogkeeper::jobs::{JobKind, JobReport};
use blogkeeper::runtime::{StartupContext, prepare_startup, startup::prepare_storage};
use blogkeeper::services::{UserDisableUpdate, UserRoleUpdate};
use blogkeeper::system::{logging::init_logging, panic_handler::install_panic_hook};

const CRASH_LOG: &str = "crash.log";

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            match e.downcast_ref::<BlogkeeperError>() {
                Some(err) => eprintln!("{}", err.format_colored()),
                None => eprintln!("{} {:#}", "[ERROR]".red().bold(), e),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    // 配置生成不需要日志与数据库
    if let Commands::Config {
        action: ConfigCommands::Generate { output_path, force },
    } = &cli.command
    {
        return generate_config(output_path.as_deref(), *force);
    }

    init_config(cli.config.as_deref());
    let config = get_config();
    let _log_guard = init_logging(&config.logging);
    install_panic_hook(PathBuf::from(CRASH_LOG));

    match cli.command {
        Commands::List => {
            for kind in JobKind::iter() {
                println!("{:<24} {}", kind.to_string().cyan(), kind.description());
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Migrate => {
            let store = prepare_storage(&config).await?;
            info!("Migrations applied on {}", store.backend_name());
            println!("{} migrations applied", "✓".green());
            Ok(ExitCode::SUCCESS)
        }
        Commands::Config {
            action: ConfigCommands::Show,
        } => {
            println!("{}", toml::to_string_pretty(&config.redacted())?);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Config {
            action: ConfigCommands::Generate { output_path, force },
        } => generate_config(output_path.as_deref(), force),
        Commands::Run { jobs } => {
            let ctx = prepare_startup(&config).await?;
            Ok(run_jobs(&ctx, &jobs).await)
        }
        Commands::VisitorCycle => {
            let ctx = prepare_startup(&config).await?;
            let reports = ctx.runner.run_visitor_cycle().await?;
            reports.iter().for_each(print_report);
            Ok(ExitCode::SUCCESS)
        }
        Commands::User { action } => {
            let ctx = prepare_startup(&config).await?;
            run_user_command(&ctx, action).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// 依次执行任务；单个任务失败不影响后续任务，但退出码为失败
async fn run_jobs(ctx: &StartupContext, jobs: &[JobKind]) -> ExitCode {
    let mut failed = 0;
    for kind in jobs {
        match ctx.runner.run(*kind).await {
            Ok(report) => print_report(&report),
            Err(e) => {
                failed += 1;
                eprintln!("{} {}", kind.to_string().red().bold(), e.format_colored());
            }
        }
    }

    if failed > 0 {
        error!("{} of {} jobs failed", failed, jobs.len());
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn print_report(report: &JobReport) {
    println!(
        "{} {} ({}ms): {}",
        "✓".green(),
        report.kind.to_string().bold(),
        (report.finished_at - report.started_at).num_milliseconds(),
        report.outcome.summary()
    );
}

async fn run_user_command(ctx: &StartupContext, action: UserCommands) -> Result<()> {
    let service = &ctx.user_info;
    match action {
        UserCommands::Show { id } => {
            let user = service.get_user_info_by_id(id).await?;
            println!("{}", serde_json::to_string_pretty(&user)?);
        }
        UserCommands::Disable { id } => {
            service
                .update_user_disable(UserDisableUpdate {
                    id,
                    is_disable: true,
                })
                .await?;
            println!("{} user {} disabled", "✓".green(), id);
        }
        UserCommands::Enable { id } => {
            service
                .update_user_disable(UserDisableUpdate {
                    id,
                    is_disable: false,
                })
                .await?;
            println!("{} user {} enabled", "✓".green(), id);
        }
        UserCommands::Roles {
            id,
            nickname,
            roles,
        } => {
            service
                .update_user_role(UserRoleUpdate {
                    user_info_id: id,
                    nickname,
                    role_ids: roles,
                })
                .await?;
            println!("{} user {} roles updated", "✓".green(), id);
        }
    }
    Ok(())
}

fn generate_config(output_path: Option<&str>, force: bool) -> Result<ExitCode> {
    let path = output_path.unwrap_or("config.example.toml");
    if std::path::Path::new(path).exists() && !force {
        eprintln!(
            "{} {} already exists, use --force to overwrite",
            "[ERROR]".red().bold(),
            path
        );
        return Ok(ExitCode::FAILURE);
    }

    std::fs::write(path, StaticConfig::generate_sample_config())
        .with_context(|| format!("Failed to write {}", path))?;
    println!("{} sample configuration written to {}", "✓".green(), path);
    Ok(ExitCode::SUCCESS)
}

mod cli;
mod export;
mod paths;
mod run;

use anyhow::Result;
use cli::{Command, ConfigAction, ExportArgs};
use paths::AppPaths;
use wormconfig::WormholeConfig;

fn main() -> Result<()> {
    let cli = cli::parse();
    run::initialise_tracing();

    match cli.command {
        Some(Command::Sample(args)) => export::print_sample(&args),
        Some(Command::Export(args)) => run_export(&args),
        Some(Command::Config(config_cmd)) => handle_config_command(config_cmd.action),
        None => run::run(cli.run),
    }
}

fn run_export(args: &ExportArgs) -> Result<()> {
    export::ensure_parent(&args.out)?;
    export::export_png(args)?;
    println!("{}", args.out.display());
    Ok(())
}

fn handle_config_command(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Where => run_config_where(),
        ConfigAction::Default => run_config_default(),
    }
}

fn run_config_where() -> Result<()> {
    let paths = AppPaths::discover()?;
    let file = paths.config_file();
    println!("Configuration:");
    println!("  dir:   {}", paths.config_dir().display());
    println!(
        "  file:  {} ({})",
        file.display(),
        if file.exists() { "present" } else { "missing" }
    );
    Ok(())
}

fn run_config_default() -> Result<()> {
    print!("{}", WormholeConfig::default().to_toml_string()?);
    Ok(())
}

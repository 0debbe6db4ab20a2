use std::{error::Error, path::PathBuf};

use clap::Parser;
use gofetch::{
    cli::args::{CliArgs, Command},
    config::GofetchConfig,
    Gofetch,
};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli_args: CliArgs = CliArgs::parse();
    let config = GofetchConfig::load()?;

    let mut builder = Gofetch::builder()
        .module_file_name(&cli_args.module_location)
        .lock_file_name(&cli_args.lockfile_location)
        .output_directory_name(&cli_args.output_directory);

    if let Some(cache_directory) = cli_args
        .cache_directory
        .map(PathBuf::from)
        .or(config.cache_dir)
    {
        builder = builder.cache_directory(cache_directory);
    }
    if let Some(default_vcs) = config.default_vcs {
        builder = builder.default_vcs(default_vcs);
    }

    let gofetch = builder.try_build()?;

    match cli_args.cmd {
        Command::Fetch(args) => gofetch.fetch(args.lock_mode()),
        Command::Lock(args) => gofetch.lock(args.lock_mode()),
        Command::Show(args) => {
            for line in gofetch.show(args.lock_mode())? {
                println!("{line}");
            }
            Ok(())
        }
        Command::ClearCache => gofetch.clear_cache(),
    }
}

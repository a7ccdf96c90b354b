mod cli;
mod driver;
mod stage_config;

use cli::{cli, pack, play};
use log::{error, LevelFilter};
use std::path::PathBuf;

fn main() {
    env_logger::Builder::from_env("LOG")
        .filter_level(LevelFilter::Info)
        .format_module_path(false)
        .format_target(false)
        .init();

    let matches = cli().get_matches();

    let (action, result) = match matches.subcommand() {
        Some(("pack", matches)) => {
            let input = matches.get_one::<PathBuf>("input");
            let output = matches.get_one::<PathBuf>("output");
            ("pack resources", pack(input, output))
        }
        Some(("play", matches)) => {
            let resource = matches.get_one::<PathBuf>("resource");
            let config = matches.get_one::<PathBuf>("config");
            ("play the stage", play(resource, config))
        }
        _ => unreachable!(),
    };

    if let Err(err) = result {
        let mut errors = Vec::new();

        for cause in err.chain() {
            errors.push(format!("- {}", cause));
        }

        error!("failed to {}. error:\n{}", action, errors.join("\n"));
        std::process::exit(1);
    }
}

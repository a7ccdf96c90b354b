mod pack;
mod play;

pub use pack::*;
pub use play::*;

use clap::{builder::ValueParser, Arg, Command};

pub fn cli() -> Command {
    Command::new(env!("CARGO_PKG_NAME"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("pack")
                .about("collects JSON resource descriptions into a resource file")
                .arg(
                    Arg::new("input")
                        .value_parser(ValueParser::path_buf())
                        .required(false),
                )
                .arg(
                    Arg::new("output")
                        .value_parser(ValueParser::path_buf())
                        .required(false),
                ),
        )
        .subcommand(
            Command::new("play")
                .about("plays a stage headlessly and reports its progress")
                .arg(
                    Arg::new("resource")
                        .value_parser(ValueParser::path_buf())
                        .required(true),
                )
                .arg(
                    Arg::new("config")
                        .value_parser(ValueParser::path_buf())
                        .required(true),
                ),
        )
}

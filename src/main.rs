// Copyright 2025 dentsusoken
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use clap::{Parser, Subcommand};
use p2site::commands::analyze::AnalyzeCommand;
use p2site::commands::build::BuildCommand;
use p2site::config::{CONFIG_FILE_NAME, SiteConfig};
use p2site::error::{Result, format_error_with_color, get_exit_code};
use p2site::logging;
use std::io::IsTerminal;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "p2site")]
#[command(author, version, about = "Build OSGi update-site repositories from Maven artifacts", long_about = None)]
struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve, bundle and publish every configured artifact
    Build {
        /// Configuration file
        #[arg(short, long, value_name = "FILE", default_value = CONFIG_FILE_NAME)]
        config: PathBuf,
    },

    /// Show the packages, imports and nested jars of one archive
    Analyze {
        /// Jar file to inspect
        archive: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    logging::setup_logger(cli.verbose);

    let result: Result<()> = (|| match cli.command {
        Commands::Build { config } => {
            let config = SiteConfig::load(&config)?;
            BuildCommand::new(config)?.execute()
        }
        Commands::Analyze { archive, json } => AnalyzeCommand::new()?.execute(&archive, json),
    })();

    if let Err(e) = result {
        eprintln!(
            "{}",
            format_error_with_color(&e, std::io::stderr().is_terminal())
        );
        std::process::exit(get_exit_code(&e));
    }
}

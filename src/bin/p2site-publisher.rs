use clap::{Parser, Subcommand};
use p2site::error::{format_error_with_color, get_exit_code};
use p2site::logging;
use p2site::repository::{GeneratorConfig, RepositoryGenerator};
use std::io::IsTerminal;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "p2site-publisher")]
#[command(about = "Writes repository indexes for a directory of bundles", long_about = None)]
struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Minify JSON indexes
    #[arg(long, global = true)]
    minify: bool,

    /// Repository name recorded in the metadata index
    #[arg(long, global = true, value_name = "NAME")]
    name: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Publish <source>/plugins/*.jar with metadata and artifact indexes
    Bundles {
        /// Directory holding a plugins/ folder of bundles
        #[arg(long)]
        source: PathBuf,

        /// Repository directory to write
        #[arg(long)]
        destination: PathBuf,

        /// Store indexes as single-entry jars
        #[arg(long)]
        compress: bool,
    },

    /// Merge a category definition into a published repository
    Category {
        /// Repository directory containing the metadata index
        #[arg(long = "metadata-repository")]
        metadata_repository: PathBuf,

        /// Category definition (TOML)
        #[arg(long = "category-definition")]
        category_definition: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::setup_logger(cli.verbose);

    let result = match cli.command {
        Commands::Bundles {
            source,
            destination,
            compress,
        } => {
            let config = GeneratorConfig {
                compress,
                minify_json: cli.minify,
                repository_name: cli.name,
            };
            RepositoryGenerator::new(config)
                .publish_bundles(&source, &destination)
                .map(|summary| {
                    println!("Published {} bundle(s)", summary.units);
                })
        }
        Commands::Category {
            metadata_repository,
            category_definition,
        } => {
            let config = GeneratorConfig {
                compress: false,
                minify_json: cli.minify,
                repository_name: cli.name,
            };
            RepositoryGenerator::new(config)
                .merge_categories(&metadata_repository, &category_definition)
                .map(|summary| {
                    if !summary.unmatched.is_empty() {
                        eprintln!(
                            "Warning: {} category pattern(s) matched nothing",
                            summary.unmatched.len()
                        );
                    }
                })
        }
    };

    if let Err(e) = result {
        eprintln!(
            "{}",
            format_error_with_color(&e, std::io::stderr().is_terminal())
        );
        std::process::exit(get_exit_code(&e));
    }
}

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::AtomicBool;

use wxapkg::cli::{run_list, run_unpack, ListOptions, UnpackOptions};
use wxapkg::extract::DEFAULT_WORKERS;

/// Version info from build.rs
const VERSION: &str = env!("WXAPKG_VERSION");
const BUILD: &str = env!("WXAPKG_BUILD");
const PROFILE: &str = env!("WXAPKG_PROFILE");
const GIT_HASH: &str = env!("WXAPKG_GIT_HASH");

/// Combined version string (compile-time concatenation not possible, so we build at runtime)
fn get_version() -> &'static str {
    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();
    VERSION_STRING.get_or_init(|| format!("{} {} build {} ({})", PROFILE, VERSION, BUILD, GIT_HASH))
}

#[derive(Parser)]
#[command(name = "wxapkg")]
#[command(author, about = "WeChat mini-program package decryption and extraction", long_about = None)]
struct Cli {
    /// Print version
    #[arg(short = 'V', long)]
    version: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Decrypt and unpack every package under a directory (or one package file)
    #[command(alias = "x")]
    Unpack {
        /// Directory containing .wxapkg files, or a single package file
        root: PathBuf,

        /// Output directory (shared by the app package and its subpackages)
        #[arg(short, long, default_value = "unpack")]
        output: PathBuf,

        /// wxid of the mini-program (recovered from the path when omitted)
        #[arg(long)]
        wxid: Option<String>,

        /// Worker threads for file materialization
        #[arg(short = 'n', long, default_value_t = DEFAULT_WORKERS)]
        workers: usize,
    },

    /// List the table of contents of one package
    #[command(alias = "l")]
    List {
        /// Package file to inspect
        package: PathBuf,

        /// wxid of the mini-program (recovered from the path when omitted)
        #[arg(long)]
        wxid: Option<String>,

        /// Show size and kind columns
        #[arg(short, long)]
        detailed: bool,

        /// Emit the entry table as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Handle --version flag
    if cli.version {
        println!("wxapkg {}", get_version());
        return ExitCode::SUCCESS;
    }

    // Require a command if not showing version
    let command = match cli.command {
        Some(cmd) => cmd,
        None => {
            // Show help when no command provided
            use clap::CommandFactory;
            Cli::command().print_help().unwrap();
            println!();
            return ExitCode::SUCCESS;
        }
    };

    let result = match command {
        Commands::Unpack {
            root,
            output,
            wxid,
            workers,
        } => {
            let options = UnpackOptions {
                wxid,
                output,
                workers,
            };
            let stop = AtomicBool::new(false);

            match run_unpack(&root, &options, &stop) {
                Ok(summary) => {
                    println!(
                        "Unpacked {} package(s): {} files, {} bytes -> {}",
                        summary.packages_ok,
                        summary.report.files_written,
                        summary.report.bytes_written,
                        options.output.display()
                    );
                    for (kind, count) in &summary.report.by_kind {
                        println!("  {:>6}: {}", kind, count);
                    }
                    for failure in &summary.report.failures {
                        eprintln!("write failed {}: {}", failure.name, failure.error);
                    }
                    for failure in &summary.failed_packages {
                        eprintln!("package failed {}: {}", failure.package, failure.reason);
                    }
                    if summary.packages_failed > 0 {
                        eprintln!(
                            "{} of {} package(s) failed",
                            summary.packages_failed,
                            summary.packages_ok + summary.packages_failed
                        );
                        return ExitCode::FAILURE;
                    }
                    Ok(())
                }
                Err(e) => Err(e),
            }
        }

        Commands::List {
            package,
            wxid,
            detailed,
            json,
        } => {
            let options = ListOptions {
                wxid,
                detailed,
                json,
            };
            run_list(&package, &options).map(|_| ())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

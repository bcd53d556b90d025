use anyhow::Result;
use clap::Parser;
use install_subset::error::exit_code;
use install_subset::install::{InstallOptions, install_subset, restore_project};
use install_subset::runtime::{RealRuntime, Runtime, StreamMode};
use std::path::PathBuf;
use std::process::ExitCode;

/// install-subset - install a named subset of dev dependencies
///
/// Subsets are declared in package.json:
///
///   "subsets": {
///     "test": { "include": ["jest"] },
///     "build": { "exclude": ["jest", "eslint"] }
///   }
///
/// The manifest and lockfiles are restored after the install, even when it fails.
///
/// Examples:
///   install-subset install test
///   install-subset i build --npm -- --no-audit
#[derive(Parser, Debug)]
#[command(author, version = env!("INSTALL_SUBSET_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Project directory containing package.json (defaults to the current directory)
    #[arg(
        long = "cwd",
        env = "INSTALL_SUBSET_CWD",
        value_name = "PATH",
        global = true
    )]
    pub project_dir: Option<PathBuf>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Install a subset defined in package.json
    #[command(visible_alias = "i")]
    Install(InstallArgs),

    /// Restore package.json and lockfiles left backed up by an interrupted run
    Restore,
}

#[derive(clap::Args, Debug)]
pub struct InstallArgs {
    /// Name of the subset declared under "subsets"
    #[arg(value_name = "SUBSET")]
    pub subset: String,

    /// Remove node_modules first
    #[arg(short = 'd', long)]
    pub clean: bool,

    /// Skip pre and post install scripts
    #[arg(long = "ignore-scripts", alias = "ignoreScripts")]
    pub ignore_scripts: bool,

    /// Only install dev dependencies
    #[arg(long = "only-dev", alias = "onlyDev")]
    pub only_dev: bool,

    /// Leave package-lock.json and yarn.lock untouched
    #[arg(long = "preserve-lock-file", alias = "preserveLockFile")]
    pub preserve_lock_file: bool,

    /// Use npm even if yarn is available
    #[arg(long)]
    pub npm: bool,

    /// Stream installer output directly instead of printing it afterwards
    #[arg(long, env = "INSTALL_SUBSET_STREAM")]
    pub stream: bool,

    /// Extra flags passed through to the installer
    #[arg(last = true, value_name = "EXTRA_FLAGS")]
    pub extra_flags: Vec<String>,
}

impl From<InstallArgs> for InstallOptions {
    fn from(args: InstallArgs) -> Self {
        InstallOptions {
            clean: args.clean,
            ignore_scripts: args.ignore_scripts,
            only_dev: args.only_dev,
            preserve_lock_file: args.preserve_lock_file,
            force_standard_installer: args.npm,
            extra_flags: args.extra_flags,
            stream: if args.stream {
                StreamMode::Inherit
            } else {
                StreamMode::Capture
            },
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::from(exit_code(&err))
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let runtime = RealRuntime;
    let project_dir = match cli.project_dir {
        Some(path) => path,
        None => runtime.current_dir()?,
    };

    match cli.command {
        Commands::Install(args) => {
            let subset = args.subset.clone();
            install_subset(&runtime, &project_dir, &subset, &args.into())?;
        }
        Commands::Restore => match restore_project(&runtime, &project_dir) {
            0 => println!("Nothing to restore."),
            n => println!("Restored {} file(s).", n),
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_install_parsing() {
        let cli = Cli::try_parse_from(["install-subset", "install", "test"]).unwrap();
        match cli.command {
            Commands::Install(args) => {
                assert_eq!(args.subset, "test");
                assert!(!args.clean);
                assert!(args.extra_flags.is_empty());
            }
            _ => panic!("Expected Install command"),
        }
        assert_eq!(cli.project_dir, None);
    }

    #[test]
    fn test_cli_alias_and_flags() {
        let cli = Cli::try_parse_from([
            "install-subset",
            "i",
            "build",
            "-d",
            "--ignore-scripts",
            "--only-dev",
            "--preserve-lock-file",
            "--npm",
            "--",
            "--no-audit",
            "--prefer-offline",
        ])
        .unwrap();
        let Commands::Install(args) = cli.command else {
            panic!("Expected Install command");
        };
        let options = InstallOptions::from(args);
        assert_eq!(
            options,
            InstallOptions {
                clean: true,
                ignore_scripts: true,
                only_dev: true,
                preserve_lock_file: true,
                force_standard_installer: true,
                extra_flags: vec!["--no-audit".into(), "--prefer-offline".into()],
                stream: StreamMode::Capture,
            }
        );
    }

    #[test]
    fn test_cli_accepts_camel_case_aliases() {
        let cli = Cli::try_parse_from([
            "install-subset",
            "install",
            "test",
            "--ignoreScripts",
            "--onlyDev",
            "--preserveLockFile",
        ])
        .unwrap();
        let Commands::Install(args) = cli.command else {
            panic!("Expected Install command");
        };
        assert!(args.ignore_scripts && args.only_dev && args.preserve_lock_file);
    }

    #[test]
    fn test_cli_global_cwd_parsing() {
        let cli = Cli::try_parse_from(["install-subset", "--cwd", "/tmp/app", "restore"]).unwrap();
        assert_eq!(cli.project_dir, Some(PathBuf::from("/tmp/app")));
        assert!(matches!(cli.command, Commands::Restore));
    }

    #[test]
    fn test_cli_install_requires_subset() {
        let result = Cli::try_parse_from(["install-subset", "install"]);
        assert!(result.is_err());
    }
}

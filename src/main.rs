use clap::Parser;
use clap::error::ErrorKind;
use tracing_subscriber::EnvFilter;

use rootstrap::cli::{
    Commands, run_fix_sequences, run_init, run_issue_token, run_setup_root, run_verify_namespace,
};

#[derive(Parser)]
#[command(name = "rootstrap")]
#[command(version, about = "Bootstrap and repair a code hosting deployment's database", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

fn main() -> anyhow::Result<()> {
    // stdout carries status lines and issued tokens only
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("rootstrap=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            // Usage errors go to stderr and share exit status 1 with every other failure.
            let _ = e.print();
            std::process::exit(1);
        }
    };

    match cli.command {
        Commands::Init { data_dir } => run_init(data_dir),
        Commands::IssueToken {
            prefix,
            scopes,
            data_dir,
        } => run_issue_token(data_dir, prefix, scopes),
        Commands::FixSequences { data_dir } => run_fix_sequences(data_dir),
        Commands::SetupRoot {
            data_dir,
            password_file,
        } => run_setup_root(data_dir, password_file),
        Commands::VerifyNamespace { data_dir } => run_verify_namespace(data_dir),
    }
}

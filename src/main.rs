// Entrypoint for the CLI application.
// - Parses arguments, loads configuration and hands off to the UI layer.
// - Exit status is non-zero when any file failed or setup went wrong.

use cat_tree::api::UploadClient;
use cat_tree::config::Config;
use cat_tree::report::Reporter;
use cat_tree::ui::{self, Options, Plan};
use cat_tree::UploadError;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Never prompt; upload the given files with the given flags
    #[arg(long)]
    non_interactive: bool,

    /// Upload to Litterbox (temporary) instead of Catbox
    #[arg(short, long)]
    litterbox: bool,

    /// Litterbox expiration in hours: 1, 12, 24 or 72 (0 = service default)
    #[arg(short, long, value_name = "HOURS")]
    expire: Option<String>,

    /// Do not raise desktop/mobile notifications
    #[arg(long)]
    no_notify: bool,

    /// Files to upload
    files: Vec<PathBuf>,
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cat_tree=warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let cli = Cli::parse();
    let reporter = Reporter::new(!cli.no_notify);

    match run(cli, &reporter) {
        Ok(0) => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(err) => {
            match err.downcast_ref::<UploadError>() {
                Some(upload_err) => reporter.upload_error(upload_err),
                None => reporter.error(&format!("{:#}", err), ""),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, reporter: &Reporter) -> anyhow::Result<usize> {
    let config = Config::from_env();
    let plan = Plan::resolve(Options {
        interactive: !cli.non_interactive,
        litterbox: cli.litterbox,
        expire: cli.expire,
        files: cli.files,
    })?;
    let client = UploadClient::new(config.endpoints)?;
    Ok(ui::upload_all(&client, reporter, &plan, config.account_token.as_deref()))
}

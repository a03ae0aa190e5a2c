use std::path::PathBuf;

use clap::{ArgMatches, Args, CommandFactory, FromArgMatches, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use encrypty::config::ClientConfig;
use encrypty::manifest::ManifestStore;
use encrypty::models::Action;
use encrypty::render::render_selection;
use encrypty::selection::{self, LocalInput};
use encrypty::submit::ProcessorClient;

#[derive(Parser)]
#[command(name = "encrypty")]
#[command(about = "Collect files and folders and send them for encryption or decryption")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the manifest and print it without submitting
    List {
        #[command(flatten)]
        selection: SelectionArgs,
    },
    /// Build the manifest and submit it to the processor
    Submit {
        #[command(flatten)]
        selection: SelectionArgs,

        /// What the processor should do (defaults to the configured action)
        #[arg(short, long, value_enum)]
        action: Option<Action>,

        /// Password passed to the processor
        #[arg(short, long, env = "ENCRYPTY_PASSWORD", default_value = "", hide_env_values = true)]
        password: String,

        /// Processor endpoint (overrides config and ENCRYPTY_URL)
        #[arg(long)]
        url: Option<String>,

        /// Open the resulting page in the browser
        #[arg(long)]
        open: bool,
    },
}

#[derive(Args)]
struct SelectionArgs {
    /// Files or directories to add, as if dropped (directories are walked).
    /// Paths and folders are added in the order they appear on the command line
    paths: Vec<PathBuf>,

    /// Add every file under a directory, as if chosen with a folder picker
    #[arg(short, long = "folder")]
    folders: Vec<PathBuf>,

    /// Remove the item at this index after selecting (repeatable, applied in order)
    #[arg(short, long = "remove")]
    removals: Vec<usize>,
}

/// Initialize tracing on stderr so stdout only carries results.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "encrypty=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Positional paths and `--folder` values, in command-line order.
fn ordered_inputs(args: &SelectionArgs, matches: Option<&ArgMatches>) -> Vec<LocalInput> {
    let positions = |id: &str| -> Vec<usize> {
        matches
            .and_then(|m| m.indices_of(id))
            .map(|indices| indices.collect())
            .unwrap_or_default()
    };
    let drop_positions = positions("paths");
    let folder_positions = positions("folders");

    let mut inputs: Vec<(usize, LocalInput)> = Vec::new();
    for (i, path) in args.paths.iter().enumerate() {
        let position = drop_positions.get(i).copied().unwrap_or(usize::MAX);
        inputs.push((position, LocalInput::Drop(path.clone())));
    }
    for (i, path) in args.folders.iter().enumerate() {
        let position = folder_positions.get(i).copied().unwrap_or(usize::MAX);
        inputs.push((position, LocalInput::Folder(path.clone())));
    }
    inputs.sort_by_key(|(position, _)| *position);
    inputs.into_iter().map(|(_, input)| input).collect()
}

/// Turn command-line inputs into a manifest.
async fn build_manifest(
    args: &SelectionArgs,
    matches: Option<&ArgMatches>,
    config: &ClientConfig,
) -> ManifestStore {
    let mut store = ManifestStore::new();

    let inputs = ordered_inputs(args, matches);
    let report = selection::apply_local(&mut store, inputs, config.page_size).await;
    tracing::info!(
        files = report.files,
        directories = report.directories,
        skipped = report.skipped.len(),
        "Selection complete"
    );

    for &index in &args.removals {
        if let Err(e) = store.remove_at(index) {
            tracing::warn!(error = %e, "Ignoring removal");
        }
    }

    store
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());
    let sub_matches = matches.subcommand().map(|(_, m)| m);
    init_tracing();

    let config = ClientConfig::load();

    match cli.command {
        Commands::List { selection } => {
            let store = build_manifest(&selection, sub_matches, &config).await;
            print!("{}", render_selection(store.snapshot()));
        }
        Commands::Submit {
            selection,
            action,
            password,
            url,
            open,
        } => {
            let store = build_manifest(&selection, sub_matches, &config).await;
            print!("{}", render_selection(store.snapshot()));

            let endpoint = url.unwrap_or_else(|| config.endpoint.clone());
            let client = ProcessorClient::new(&endpoint)?;
            let action = action.unwrap_or(config.action);

            let target = match client.submit(&store, action, &password).await {
                Ok(target) => target,
                Err(e) => {
                    eprintln!("{}", e.user_message());
                    return Err(e.into());
                }
            };

            let destination = target.resolve(client.endpoint())?;
            println!("{}", destination);

            if open {
                if let Err(e) = open::that(destination.as_str()) {
                    tracing::warn!(error = %e, "Could not open browser");
                }
            }
        }
    }

    Ok(())
}

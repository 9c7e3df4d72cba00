//! CLI entry point for `inboxdump`.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};

use inboxdump::config::{self, Config};
use inboxdump::export::json;
use inboxdump::harvest::{self, HarvestSummary};
use inboxdump::mailbox::eml_dir::EmlDirectory;
use inboxdump::mailbox::imap::ImapMailbox;
use inboxdump::mailbox::Mailbox;
use inboxdump::normalize::normalize_message;
use inboxdump::parser::eml;
use inboxdump::store::attachments::{AttachmentErrorPolicy, DirectoryStore, MemoryStore};

#[derive(Parser)]
#[command(
    name = "inboxdump",
    version,
    about = "Download a mailbox, clean every message body, save attachments and write a JSON summary"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch every matching message from an IMAP server
    Fetch {
        /// IMAP server host
        #[arg(long)]
        host: Option<String>,
        /// IMAP server port (implicit TLS)
        #[arg(long)]
        port: Option<u16>,
        /// Login name
        #[arg(short, long)]
        user: Option<String>,
        /// Login password
        #[arg(long, env = "INBOXDUMP_PASSWORD", hide_env_values = true)]
        password: Option<String>,
        /// Folder to select
        #[arg(long)]
        folder: Option<String>,
        /// IMAP SEARCH criteria
        #[arg(long)]
        search: Option<String>,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Run the same pipeline over a directory of .eml files
    Local {
        /// Directory containing .eml files
        dir: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Print the normalized record of a single .eml file
    Show {
        file: PathBuf,
    },
    /// Write the current configuration to the config file
    InitConfig,
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate a man page
    Manpage,
}

#[derive(clap::Args)]
struct OutputArgs {
    /// JSON output file
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Directory for attachment files
    #[arg(short, long)]
    attachments: Option<PathBuf>,
    /// What to do when an attachment cannot be written
    #[arg(long, value_enum)]
    on_attachment_error: Option<PolicyArg>,
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    Skip,
    DropMessage,
}

impl From<PolicyArg> for AttachmentErrorPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Skip => AttachmentErrorPolicy::Skip,
            PolicyArg::DropMessage => AttachmentErrorPolicy::DropMessage,
        }
    }
}

impl OutputArgs {
    fn apply(self, config: &mut Config) {
        if let Some(output) = self.output {
            config.output.json_path = output;
        }
        if let Some(dir) = self.attachments {
            config.output.attachment_dir = dir;
        }
        if let Some(policy) = self.on_attachment_error {
            config.output.on_attachment_error = policy.into();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = config::load_config();

    // Configure logging: stderr + optional log file
    let log_level = match cli.verbose {
        0 => config.general.log_level.clone(),
        1 => "info".to_string(),
        2 => "debug".to_string(),
        _ => "trace".to_string(),
    };
    setup_logging(&log_level, &config);

    match cli.command {
        Commands::Fetch {
            host,
            port,
            user,
            password,
            folder,
            search,
            output,
        } => {
            let imap = &mut config.imap;
            if let Some(host) = host {
                imap.host = host;
            }
            if let Some(port) = port {
                imap.port = port;
            }
            if let Some(user) = user {
                imap.username = user;
            }
            if let Some(password) = password {
                imap.password = password;
            }
            if let Some(folder) = folder {
                imap.folder = folder;
            }
            if let Some(search) = search {
                imap.search = search;
            }
            output.apply(&mut config);
            cmd_fetch(&config)
        }
        Commands::Local { dir, output } => {
            output.apply(&mut config);
            cmd_local(&dir, &config)
        }
        Commands::Show { file } => cmd_show(&file),
        Commands::InitConfig => cmd_init_config(&config),
        Commands::Completions { shell } => cmd_completions(shell),
        Commands::Manpage => cmd_manpage(),
    }
}

/// Set up tracing with stderr output and optional file logging.
fn setup_logging(level: &str, config: &Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    // Try to set up file logging
    let log_path = config::log_file_path(config);
    let log_dir = log_path.parent().unwrap_or(Path::new("."));
    let log_name = log_path
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("inboxdump.log"));

    if std::fs::create_dir_all(log_dir).is_ok() {
        let file_appender = tracing_appender::rolling::never(log_dir, log_name);
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
    } else {
        // Fall back to stderr only
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
    }
}

/// Fetch from IMAP, normalize, and write the JSON summary.
fn cmd_fetch(config: &Config) -> anyhow::Result<()> {
    if config.imap.username.is_empty() {
        anyhow::bail!("No IMAP username configured (use --user or the [imap] config section)");
    }

    let mut mailbox = match ImapMailbox::connect(&config.imap) {
        Ok(mailbox) => mailbox,
        Err(e) => {
            tracing::error!(error = %e, "Login or fetch failed");
            print_failure();
            return Err(e.into());
        }
    };

    run_and_save(&mut mailbox, config, "Fetching")
}

/// Run the pipeline over a directory of `.eml` files.
fn cmd_local(dir: &Path, config: &Config) -> anyhow::Result<()> {
    let mut mailbox = EmlDirectory::open(dir)?;
    run_and_save(&mut mailbox, config, "Processing")
}

fn run_and_save(mailbox: &mut dyn Mailbox, config: &Config, verb: &str) -> anyhow::Result<()> {
    let mut store = DirectoryStore::create(&config.output.attachment_dir)?;

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(&format!(
                "{{spinner:.green}} {verb} [{{bar:40.cyan/blue}}] {{pos}}/{{len}}"
            ))
            .expect("valid template")
            .progress_chars("#>-"),
    );

    let start = Instant::now();
    let result = harvest::run(
        mailbox,
        &mut store,
        config.output.on_attachment_error,
        Some(&|current, total| {
            pb.set_length(total as u64);
            pb.set_position(current as u64);
        }),
    );
    pb.finish_and_clear();

    let summary = match result {
        Ok(summary) => summary,
        Err(e) => {
            tracing::error!(error = %e, "Login or fetch failed");
            print_failure();
            return Err(e.into());
        }
    };

    if summary.records.is_empty() {
        print_failure();
        return Ok(());
    }

    json::export_json(&summary.records, &config.output.json_path)?;
    print_summary(&summary, &store, &config.output.json_path, start.elapsed());
    Ok(())
}

fn print_summary(
    summary: &HarvestSummary,
    store: &DirectoryStore,
    json_path: &Path,
    elapsed: std::time::Duration,
) {
    tracing::info!(
        listed = summary.listed,
        skipped = summary.skipped,
        dropped = summary.dropped,
        elapsed = ?elapsed,
        "Run complete"
    );
    let attachments = if store.files_written() > 0 {
        format!(
            " ({} attachment(s), {} in {})",
            store.files_written(),
            humansize::format_size(store.bytes_written(), humansize::BINARY),
            store.dir().display()
        )
    } else {
        String::new()
    };
    println!(
        "Saved {} emails to {}{attachments}",
        summary.records.len(),
        json_path.display()
    );
}

fn print_failure() {
    println!("No emails found or failed to fetch.");
}

/// Print one normalized record without touching the attachment directory.
fn cmd_show(file: &Path) -> anyhow::Result<()> {
    let msg = eml::parse_eml(file)?;
    let id = eml::message_id_for(file);
    let mut store = MemoryStore::default();
    let record = normalize_message(&msg, &id, &mut store, AttachmentErrorPolicy::Skip)?;
    println!("{}", json::records_to_string(std::slice::from_ref(&record))?);
    if !store.files.is_empty() {
        let names: Vec<&str> = store.files.keys().map(String::as_str).collect();
        eprintln!("Attachments (not saved): {}", names.join(", "));
    }
    Ok(())
}

fn cmd_init_config(config: &Config) -> anyhow::Result<()> {
    let path = config::save_config(config)?;
    println!("Wrote {}", path.display());
    Ok(())
}

/// Generate shell completions and print to stdout.
fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "inboxdump", &mut std::io::stdout());
    Ok(())
}

/// Generate a man page and print to stdout.
fn cmd_manpage() -> anyhow::Result<()> {
    let cmd = Cli::command();
    let man = clap_mangen::Man::new(cmd);
    let mut buf = Vec::new();
    man.render(&mut buf)?;
    std::io::Write::write_all(&mut std::io::stdout(), &buf)?;
    Ok(())
}

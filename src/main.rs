use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use gbooks::books::annotations::{self, AnnotationsListOptions};
use gbooks::books::auth;
use gbooks::books::client::{format_api_error, BooksClient};
use gbooks::books::shelves::{self, ShelvesListOptions};
use gbooks::books::volumes::{self, VolumesListOptions};
use gbooks::config::Config;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Google Books API demo client
#[derive(Parser, Debug)]
#[command(name = "gbooks", version, about, long_about = None)]
struct Args {
    /// Service account email (JWT issuer)
    #[arg(long)]
    client_email: Option<String>,

    /// User email to impersonate (domain-wide delegation subject)
    #[arg(long)]
    subject: Option<String>,

    /// Path to the PEM private key file
    #[arg(short, long)]
    key_file: Option<PathBuf>,

    /// OAuth2 token endpoint override
    #[arg(long)]
    token_url: Option<String>,

    /// Books API base URL override
    #[arg(long)]
    api_url: Option<String>,

    /// Persist the resolved identity to the config file
    #[arg(long)]
    save_config: bool,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the bookshelves in your library
    Shelves {
        /// Partial-response field mask
        #[arg(long)]
        fields: Option<String>,
    },
    /// List the volumes on a bookshelf
    Volumes {
        /// Bookshelf id
        #[arg(default_value = "1")]
        shelf_id: String,

        /// Partial-response field mask
        #[arg(long)]
        fields: Option<String>,

        #[arg(long)]
        max_results: Option<u32>,
    },
    /// List your notes and highlights
    Annotations {
        /// Restrict to annotations on this volume
        #[arg(long)]
        volume_id: Option<String>,

        /// Content version the annotations were made against
        #[arg(long)]
        content_version: Option<String>,

        /// Annotation layer, e.g. "notes"
        #[arg(long)]
        layer_id: Option<String>,

        /// Client identification tag
        #[arg(long)]
        source: Option<String>,

        #[arg(long)]
        max_results: Option<u32>,

        /// Partial-response field mask
        #[arg(long)]
        fields: Option<String>,
    },
    /// Run all three list demos
    All,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return None;
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .expect("Failed to open log file");

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("gbooks started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("gbooks").join("gbooks.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".gbooks").join("gbooks.log");
    }
    PathBuf::from("gbooks.log")
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level);

    if let Err(err) = run(args).await {
        tracing::error!("{:#}", err);
        eprintln!("Error: {}", format_api_error(&err));
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let mut config = Config::load();

    let client_email = args
        .client_email
        .clone()
        .or_else(|| config.effective_client_email())
        .context("No service account email configured. Use --client-email or GBOOKS_CLIENT_EMAIL")?;
    let subject = args.subject.clone().or_else(|| config.effective_subject());
    let key_file = args
        .key_file
        .clone()
        .unwrap_or_else(|| config.effective_key_file());

    tracing::info!("Using service account: {}", client_email);

    let private_key = auth::read_private_key(&key_file)?;

    let mut jwt_config = auth::JwtConfig::new(client_email.clone(), private_key);
    if let Some(subject) = subject.clone() {
        jwt_config = jwt_config.with_subject(subject);
    }
    if let Some(token_url) = args.token_url.clone() {
        jwt_config = jwt_config.with_token_uri(token_url);
    }

    let mut client = BooksClient::new(jwt_config)?;
    if let Some(api_url) = args.api_url.clone() {
        client = client.with_base_url(api_url);
    }

    if args.save_config {
        config.client_email = Some(client_email);
        config.subject = subject;
        config.key_file = Some(key_file);
        config.save().context("Failed to save config")?;
    }

    match args.command.unwrap_or(Command::All) {
        Command::Shelves { fields } => {
            let opts = ShelvesListOptions {
                fields,
                ..Default::default()
            };
            list_shelves(&client, &opts).await
        }
        Command::Volumes {
            shelf_id,
            fields,
            max_results,
        } => {
            let opts = VolumesListOptions {
                fields,
                max_results,
                ..Default::default()
            };
            list_volumes(&client, &shelf_id, &opts).await
        }
        Command::Annotations {
            volume_id,
            content_version,
            layer_id,
            source,
            max_results,
            fields,
        } => {
            let opts = AnnotationsListOptions {
                volume_id,
                content_version,
                layer_id,
                source,
                max_results,
                fields,
                ..Default::default()
            };
            list_annotations(&client, &opts).await
        }
        Command::All => {
            let annotation_opts = AnnotationsListOptions {
                layer_id: Some("notes".to_string()),
                max_results: Some(1),
                fields: Some("items(layerId,selectedText,volumeId),totalItems,nextPageToken".to_string()),
                ..Default::default()
            };
            list_annotations(&client, &annotation_opts).await?;

            let volume_opts = VolumesListOptions {
                fields: Some(
                    "items(id,volumeInfo(contentVersion,title,imageLinks)),totalItems".to_string(),
                ),
                max_results: Some(1),
                ..Default::default()
            };
            list_volumes(&client, "1", &volume_opts).await?;

            list_shelves(&client, &ShelvesListOptions::default()).await
        }
    }
}

async fn list_shelves(client: &BooksClient, opts: &ShelvesListOptions) -> Result<()> {
    let page = shelves::list(client, opts).await?;

    for shelf in &page.items {
        let id = shelf
            .id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("Id: {}, Title: {}", id, shelf.title.as_deref().unwrap_or("-"));
    }

    Ok(())
}

async fn list_volumes(
    client: &BooksClient,
    shelf_id: &str,
    opts: &VolumesListOptions,
) -> Result<()> {
    let page = volumes::list(client, shelf_id, opts).await?;

    for volume in &page.items {
        let info = volume.info.as_ref();
        println!(
            "VolumeId: {}, Title: {}, ContentVersion: {}",
            volume.id.as_deref().unwrap_or("-"),
            info.and_then(|i| i.title.as_deref()).unwrap_or("-"),
            info.and_then(|i| i.content_version.as_deref())
                .unwrap_or("-"),
        );

        if let Some(links) = info.and_then(|i| i.image_links.as_ref()) {
            if let Some(small) = &links.small_thumbnail {
                println!("{}", small);
            }
            if let Some(thumbnail) = &links.thumbnail {
                println!("{}", thumbnail);
            }
        }
    }

    Ok(())
}

async fn list_annotations(client: &BooksClient, opts: &AnnotationsListOptions) -> Result<()> {
    let page = annotations::list(client, opts).await?;

    if let Some(next_page) = &page.next_page_token {
        println!("Next page Token :{}", next_page);
    }

    for (idx, note) in page.items.iter().enumerate() {
        println!("{} - {}\n", idx, note.selected_text.as_deref().unwrap_or("-"));
    }

    Ok(())
}

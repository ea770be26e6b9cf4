use clap::{Parser, Subcommand};
use sitedesk::config::{self, CmsConfig};
use sitedesk::index::{self, IndexKind};
use sitedesk::output;
use sitedesk::pages::{self, PageTemplate};
use sitedesk::server::{self, AppState};
use sitedesk::store::ContentStore;
use sitedesk::sync::{self, SyncOptions, TranslationMarker};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "sitedesk")]
#[command(about = "Content desk for multi-language JSON sites")]
#[command(long_about = "\
Content desk for multi-language JSON sites

The content directory is the database. Each language is a directory of JSON
(or Markdown) files; the master language defines the structure every
translation must follow.

Content structure:

  site/
  ├── sitedesk.toml                # Project config (optional)
  └── public/
      ├── data/
      │   ├── zh/                  # Master language
      │   │   ├── home.json        # Page with a `blocks` list
      │   │   ├── products.json    # Index document (rebuilt from products/)
      │   │   └── products/
      │   │       └── d501.json    # Detail file, one per id
      │   └── en/                  # Translation, synced from the master
      └── images/                  # Image library

Run 'sitedesk serve' and open /admin to edit content in the browser.
Run 'sitedesk gen-config' to generate a documented sitedesk.toml.")]
#[command(version)]
struct Cli {
    /// Project root containing sitedesk.toml
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Forward-fill missing structure from the master into target languages
    Sync {
        /// Target language (repeatable; default: every non-master language)
        #[arg(long = "lang")]
        languages: Vec<String>,
        /// Report what would change without writing
        #[arg(long)]
        dry_run: bool,
    },
    /// Rebuild collection index documents from their detail files
    RebuildIndex {
        /// Collection to rebuild: products, solutions or all
        #[arg(long = "type", default_value = "all")]
        kind: String,
        /// Language to rebuild (default: the master language)
        #[arg(long)]
        lang: Option<String>,
    },
    /// Report master structure missing from target languages
    Check {
        /// Target language (repeatable; default: every non-master language)
        #[arg(long = "lang")]
        languages: Vec<String>,
    },
    /// List, add or remove languages
    Languages {
        #[command(subcommand)]
        action: LanguageAction,
    },
    /// Create a page from a template (product, solution, blank)
    NewPage {
        template: String,
        name: String,
        /// Language to create the page in (default: the master language)
        #[arg(long)]
        lang: Option<String>,
    },
    /// Serve the file API and the visual editor
    Serve {
        /// Address to listen on (default: server.bind from config)
        #[arg(long)]
        bind: Option<SocketAddr>,
    },
    /// Print a stock sitedesk.toml with all options documented
    GenConfig,
}

#[derive(Subcommand)]
enum LanguageAction {
    /// List languages, marking the master
    List,
    /// Create a language as a copy of the master
    Add { code: String },
    /// Delete a language and all its content
    Remove { code: String },
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "sitedesk=info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn open_store(root: &Path, config: &CmsConfig) -> ContentStore {
    ContentStore::new(config.data_root(root), config.languages.master.clone())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
            Ok(())
        }
        command => run(&cli.root, command),
    }
}

fn run(root: &Path, command: Command) -> Result<(), Box<dyn std::error::Error>> {
    let config = config::load_config(root)?;
    let store = open_store(root, &config);

    match command {
        Command::Sync { languages, dry_run } => {
            let options = SyncOptions {
                marker: TranslationMarker::from(&config.sync),
                dry_run,
            };
            let report = if languages.is_empty() {
                sync::sync_all(&store, &options)?
            } else {
                sync::sync_languages(&store, &languages, &options)
            };
            output::print_sync_report(&report);
        }
        Command::RebuildIndex { kind, lang } => {
            let kinds = if kind == "all" {
                config.index_kinds()
            } else {
                let kind = IndexKind::parse(&kind)
                    .ok_or_else(|| format!("unknown collection type: {kind}"))?;
                vec![kind]
            };
            let language = lang.unwrap_or_else(|| store.master().to_string());
            for kind in kinds {
                let report = index::rebuild_index(&store, &language, kind)?;
                output::print_rebuild_report(&report);
            }
        }
        Command::Check { languages } => {
            let languages = if languages.is_empty() {
                store.target_languages()?
            } else {
                languages
            };
            for language in &languages {
                let drift = sync::check_language(&store, language)?;
                output::print_drift(language, &drift);
            }
        }
        Command::Languages { action } => match action {
            LanguageAction::List => output::print_languages(&store.languages()?),
            LanguageAction::Add { code } => {
                store.create_language(&code)?;
                println!("Created {code} from {}", store.master());
            }
            LanguageAction::Remove { code } => {
                store.delete_language(&code)?;
                println!("Removed {code}");
            }
        },
        Command::NewPage {
            template,
            name,
            lang,
        } => {
            let template = PageTemplate::parse(&template)?;
            let language = lang.unwrap_or_else(|| store.master().to_string());
            let path = pages::create_page(&store, &language, template, &name)?;
            println!("Created {path}");
        }
        Command::Serve { bind } => {
            let addr = match bind {
                Some(addr) => addr,
                None => config.server.bind.parse()?,
            };
            let state = Arc::new(AppState::new(root, config));
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(server::serve(state, addr))?;
        }
        Command::GenConfig => print!("{}", config::stock_config_toml()),
    }

    Ok(())
}

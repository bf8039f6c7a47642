use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use newsly_core::{Article, DefaultNewsService, NewsConfig, NewsError, create_service};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "newsly")]
#[command(about = "Read top headlines and keep bookmarks for later")]
struct Cli {
    /// Bookmark database location
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show today's top headlines
    Headlines,
    /// Search articles by keyword
    Search {
        /// Keywords to search for
        query: Vec<String>,
    },
    /// Bookmark or un-bookmark the n-th listed article
    Toggle {
        /// 1-based position in the listing
        index: usize,
        /// Pick from search results instead of headlines
        #[arg(short, long)]
        query: Option<String>,
    },
    /// List saved articles, newest first
    Bookmarks,
    /// Remove a saved article by id
    Remove {
        /// Article id as shown by `bookmarks`
        id: String,
    },
}

impl Commands {
    fn needs_feed(&self) -> bool {
        matches!(
            self,
            Commands::Headlines | Commands::Search { .. } | Commands::Toggle { .. }
        )
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("newsly_core=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<NewsError>() {
                Some(news_err) if news_err.is_offline() => {
                    eprintln!("No connectivity: check your network connection and try again.");
                }
                _ => eprintln!("Error: {err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> Result<NewsConfig> {
    let mut config = if cli.command.needs_feed() {
        NewsConfig::from_env().context("Failed to load feed configuration")?
    } else {
        // Bookmark-only commands work without an API key.
        NewsConfig::from_env().unwrap_or_default()
    };

    if let Some(database_url) = &cli.database_url {
        config.database_url = database_url.clone();
    }
    debug!(database_url = %config.database_url, base_url = %config.base_url, "Loaded configuration");
    Ok(config)
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    let service = create_service(&config)?;

    match cli.command {
        Commands::Headlines => {
            let articles = service.fetch_top_headlines().await?;
            print_articles(&articles);
        }
        Commands::Search { query } => {
            let articles = service.search(&query.join(" ")).await?;
            print_articles(&articles);
        }
        Commands::Toggle { index, query } => {
            toggle(&service, index, query.as_deref()).await?;
        }
        Commands::Bookmarks => {
            let articles = service.bookmarks().await?;
            if articles.is_empty() {
                println!("No bookmarks yet.");
            }
            for article in &articles {
                println!("{}  {}", article.id, article.title);
                println!("    {}", article.url);
            }
        }
        Commands::Remove { id } => {
            if service.remove_bookmark(&id).await? {
                println!("Bookmark removed");
            } else {
                println!("No bookmark with id {id}");
            }
        }
    }

    Ok(())
}

async fn toggle(service: &DefaultNewsService, index: usize, query: Option<&str>) -> Result<()> {
    let articles = match query {
        Some(query) => service.search(query).await?,
        None => service.fetch_top_headlines().await?,
    };

    let Some(article) = index.checked_sub(1).and_then(|i| articles.get(i)) else {
        bail!("No article at position {index} ({} listed)", articles.len());
    };

    if service.toggle_bookmark(article).await? {
        println!("Bookmarked: {}", article.title);
    } else {
        println!("Bookmark removed: {}", article.title);
    }
    Ok(())
}

fn print_articles(articles: &[Article]) {
    if articles.is_empty() {
        println!("No articles found.");
        return;
    }

    for (i, article) in articles.iter().enumerate() {
        let marker = if article.is_bookmarked { "*" } else { " " };
        println!("{:>3}. [{marker}] {}", i + 1, article.title);

        let date = article.published_at.get(..10).unwrap_or(&article.published_at);
        if article.author.is_empty() {
            println!("        {} {date}", article.source_name);
        } else {
            println!("        {}, {} {date}", article.source_name, article.author);
        }
        println!("        {}", article.url);
    }
}

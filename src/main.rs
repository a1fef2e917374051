mod config;
mod error;
mod fetcher;
mod models;
mod parser;
mod render;
mod search;
mod server;
mod strategy;

use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use crate::config::MarketplaceConfig;
use crate::fetcher::{HttpFetcher, PageSource};
use crate::models::ProductRecord;
use crate::parser::Extractor;
use crate::search::Searcher;

/// Scrape product cards from a marketplace search-results page.
#[derive(Parser)]
#[command(name = "marketplace-scraper", version)]
struct Cli {
    /// Storefront preset.
    #[arg(long, value_enum, default_value_t = Marketplace::Br, global = true)]
    marketplace: Marketplace,

    /// Override the storefront host, e.g. `amazon.com.mx`.
    #[arg(long, global = true)]
    domain: Option<String>,

    /// Override the Accept-Language header.
    #[arg(long, global = true)]
    language: Option<String>,

    /// Skip price extraction.
    #[arg(long, global = true)]
    no_price: bool,

    #[arg(long, global = true)]
    user_agent: Option<String>,

    /// Request timeout, at least one second.
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    timeout_secs: Option<u64>,

    /// Used when RUST_LOG is unset.
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Marketplace {
    Br,
    Us,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Cards,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the scrape endpoint over HTTP.
    Serve {
        #[arg(long, default_value_t = 3000)]
        port: u16,
        #[arg(long, default_value = "127.0.0.1")]
        bind: IpAddr,
    },

    /// Fetch one search page and print its products.
    Search {
        keyword: String,
        /// Also write the fetched page to this file.
        #[arg(long)]
        save_html: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },

    /// Extract products from a saved search page.
    Extract {
        file: PathBuf,
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },
}

impl Cli {
    fn marketplace_config(&self) -> MarketplaceConfig {
        let mut config = match self.marketplace {
            Marketplace::Br => MarketplaceConfig::amazon_br(),
            Marketplace::Us => MarketplaceConfig::amazon_us(),
        };
        if let Some(domain) = &self.domain {
            config = config.with_domain(domain);
        }
        if let Some(language) = &self.language {
            config = config.with_language(language);
        }
        if self.no_price {
            config = config.with_price(false);
        }
        if let Some(user_agent) = &self.user_agent {
            config = config.with_user_agent(user_agent);
        }
        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout(secs);
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.marketplace_config();
    let extractor = Extractor::new(&config)?;

    match cli.command {
        Commands::Serve { port, bind } => {
            let fetcher = HttpFetcher::new(&config)?;
            server::start(bind, port, Searcher::new(Arc::new(fetcher), extractor)).await?;
        }
        Commands::Search {
            keyword,
            save_html,
            format,
        } => {
            let fetcher = HttpFetcher::new(&config)?;
            let html = fetcher.fetch_search_page(&keyword).await?;

            if let Some(path) = save_html {
                std::fs::write(&path, &html)
                    .with_context(|| format!("failed to write {}", path.display()))?;
            }

            let products = extractor.extract(&html)?;
            print_products(&products, format)?;
        }
        Commands::Extract { file, format } => {
            let html = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let products = extractor.extract(&html)?;
            print_products(&products, format)?;
        }
    }
    Ok(())
}

fn print_products(products: &[ProductRecord], format: Format) -> Result<()> {
    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(products)?),
        Format::Cards => println!("{}", render::render_cards(products)),
    }
    Ok(())
}

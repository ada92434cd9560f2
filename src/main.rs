// src/main.rs - Command line entry point

use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, Parser, Subcommand};

use storefront_facets::catalog::CatalogDocument;
use storefront_facets::config::{ConfigManager, StorefrontConfig, DEFAULT_ENV_PREFIX};
use storefront_facets::error::{Result, ResultExt};
use storefront_facets::filter::{FilterState, PriceRange};
use storefront_facets::logging::LoggingManager;
use storefront_facets::mock::generate_catalog;
use storefront_facets::query::{QueryMode, QueryRequest};
use storefront_facets::service::StorefrontService;
use storefront_facets::source::source_from_config;

#[derive(Parser)]
#[command(
    name = "storefront",
    version = storefront_facets::VERSION,
    about = "Filter, facet and paginate a product catalog",
    long_about = None
)]
struct Cli {
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a query and print the response as JSON
    Query(QueryArgs),
    /// Write a deterministic mock catalog
    Generate {
        #[arg(long, default_value_t = 100)]
        count: usize,

        #[arg(long, default_value_t = 42)]
        seed: u64,

        #[arg(short, long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Validate configuration
    ValidateConfig,
}

#[derive(Args)]
struct QueryArgs {
    /// Catalog file; overrides catalog.path from the configuration
    #[arg(long, value_name = "FILE")]
    catalog: Option<PathBuf>,

    #[arg(long)]
    category: Option<String>,

    #[arg(long = "brand")]
    brands: Vec<String>,

    #[arg(long = "color")]
    colors: Vec<String>,

    #[arg(long = "size")]
    sizes: Vec<String>,

    #[arg(long = "type")]
    types: Vec<String>,

    #[arg(long = "style")]
    styles: Vec<String>,

    #[arg(long = "occasion")]
    occasions: Vec<String>,

    #[arg(long, requires = "max_price")]
    min_price: Option<f64>,

    #[arg(long, requires = "min_price")]
    max_price: Option<f64>,

    /// Filter in query-string form, e.g. "brands=Nike,Zara&priceRange=20-80"
    #[arg(long, value_name = "QUERY")]
    filter: Option<String>,

    #[arg(long, default_value_t = 1)]
    page: usize,

    #[arg(long)]
    page_size: Option<usize>,

    #[arg(long, default_value = "combined")]
    mode: QueryMode,
}

impl QueryArgs {
    fn filter_state(&self) -> Result<FilterState> {
        let mut filter = match &self.filter {
            Some(qs) => FilterState::from_query_string(qs)?,
            None => FilterState::new(),
        };

        if self.category.is_some() {
            filter.category = self.category.clone();
        }
        filter.brands.extend(self.brands.iter().cloned());
        filter.colors.extend(self.colors.iter().cloned());
        filter.sizes.extend(self.sizes.iter().cloned());
        filter.types.extend(self.types.iter().cloned());
        filter.styles.extend(self.styles.iter().cloned());
        filter.occasions.extend(self.occasions.iter().cloned());
        if let (Some(min), Some(max)) = (self.min_price, self.max_price) {
            filter.price_range = Some(PriceRange::new(min, max));
        }

        Ok(filter)
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("error: {}", e.message);
        if let Some(field) = e.field() {
            eprintln!("  field: {}", field);
        }
        for cause in &e.causes {
            eprintln!("  caused by: {}", cause);
        }
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;

    let mut logging_config = config.logging.clone();
    if cli.verbose {
        logging_config.level = "debug".to_string();
    }
    let mut logging = LoggingManager::new(logging_config);
    logging.initialize()?;

    match cli.command {
        Commands::Query(args) => run_query(config, args).await,
        Commands::Generate { count, seed, out } => generate(count, seed, out.as_deref()),
        Commands::ValidateConfig => {
            println!("Configuration is valid");
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<StorefrontConfig> {
    let mut manager = match path {
        Some(path) => ConfigManager::with_config_file(path)?,
        None => {
            let mut manager = ConfigManager::new();
            manager.add_env_layer("env", DEFAULT_ENV_PREFIX, 100);
            manager
        }
    };
    manager.load()
}

async fn run_query(mut config: StorefrontConfig, args: QueryArgs) -> Result<()> {
    if let Some(catalog) = &args.catalog {
        config.catalog.path = Some(catalog.clone());
    }

    let request = QueryRequest::new(args.filter_state()?)
        .page(args.page)
        .page_size(args.page_size.unwrap_or(config.query.default_page_size))
        .mode(args.mode);

    let source = source_from_config(&config.catalog)?;
    let service = StorefrontService::from_config(source, &config);
    let response = service.handle(&request).await?;

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

fn generate(count: usize, seed: u64, out: Option<&Path>) -> Result<()> {
    let document = CatalogDocument {
        products: generate_catalog(count, seed),
    };
    let content = serde_json::to_string_pretty(&document)?;

    match out {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write catalog to {}", path.display()))?;
            tracing::info!(count, seed, path = %path.display(), "mock catalog written");
        }
        None => println!("{}", content),
    }
    Ok(())
}

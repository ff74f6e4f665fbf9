mod catalog;
mod discover;
mod extract;
mod listing;
mod session;
mod store;

use std::collections::HashSet;
use std::path::Path;
use std::time::Instant;

use clap::{Parser, Subcommand};

use crate::session::Session;

#[derive(Parser)]
#[command(name = "jumbo_scraper", about = "Jumbo grocery catalog scraper via WebDriver")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover the category tree and write categories.json
    Categories,
    /// Visit every leaf category page and write products.json
    Products {
        /// Max leaf pages to visit (default: all)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Categories + products in one browser session
    Run {
        /// Max leaf pages to visit (default: all)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Show counts from the JSON files
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Categories => run_categories().await,
        Commands::Products { limit } => run_products(limit).await,
        Commands::Run { limit } => run_pipeline(limit).await,
        Commands::Stats => show_stats(),
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

async fn run_categories() -> anyhow::Result<()> {
    let session = Session::connect().await?;
    let outcome = discover::discover_catalog(&session).await;
    let quit = session.quit().await;
    let tree = outcome?;
    quit?;

    store::save_categories(Path::new(store::CATEGORIES_FILE), &tree)?;
    println!(
        "Saved {} general categories ({} leaf pages) to {}",
        tree.general_categories.len(),
        tree.leaves().len(),
        store::CATEGORIES_FILE
    );
    Ok(())
}

async fn run_products(limit: Option<usize>) -> anyhow::Result<()> {
    let tree = store::load_categories(Path::new(store::CATEGORIES_FILE))?;
    let leaves = tree.leaves().len();
    if leaves == 0 {
        println!(
            "No leaf pages in {}. Run 'categories' first.",
            store::CATEGORIES_FILE
        );
        return Ok(());
    }
    println!(
        "Extracting products from {} leaf pages (checkpointing to {})...",
        limit.map_or(leaves, |n| n.min(leaves)),
        store::PRODUCTS_FILE
    );

    let mut session = Session::connect().await?;
    let outcome = listing::extract_catalog(
        &mut session,
        &tree,
        Path::new(store::PRODUCTS_FILE),
        limit,
    )
    .await;
    let quit = session.quit().await;
    let (_, stats) = outcome?;
    quit?;

    print_extract_summary(&stats);
    Ok(())
}

async fn run_pipeline(limit: Option<usize>) -> anyhow::Result<()> {
    let mut session = Session::connect().await?;
    let outcome = pipeline(&mut session, limit).await;
    let quit = session.quit().await;
    let stats = outcome?;
    quit?;

    print_extract_summary(&stats);
    Ok(())
}

/// Both stages against one browser session.
async fn pipeline(
    session: &mut Session,
    limit: Option<usize>,
) -> anyhow::Result<listing::ExtractStats> {
    let tree = discover::discover_catalog(session).await?;
    store::save_categories(Path::new(store::CATEGORIES_FILE), &tree)?;
    println!(
        "Saved {} general categories ({} leaf pages) to {}",
        tree.general_categories.len(),
        tree.leaves().len(),
        store::CATEGORIES_FILE
    );

    let (_, stats) = listing::extract_catalog(
        session,
        &tree,
        Path::new(store::PRODUCTS_FILE),
        limit,
    )
    .await?;
    Ok(stats)
}

fn print_extract_summary(stats: &listing::ExtractStats) {
    println!(
        "Done: {} pages visited ({} failed to load), {} products saved, {} cards skipped.",
        stats.pages, stats.pages_failed, stats.products, stats.cards_skipped
    );
}

fn show_stats() -> anyhow::Result<()> {
    let categories_path = Path::new(store::CATEGORIES_FILE);
    if categories_path.exists() {
        let tree = store::load_categories(categories_path)?;
        let categories: usize = tree
            .general_categories
            .iter()
            .map(|g| g.categories.len())
            .sum();
        let subcategories: usize = tree
            .general_categories
            .iter()
            .flat_map(|g| &g.categories)
            .map(|c| c.subcategories.len())
            .sum();
        println!("General categories: {}", tree.general_categories.len());
        println!("Categories:         {}", categories);
        println!("Subcategories:      {}", subcategories);
        println!("Leaf pages:         {}", tree.leaves().len());
    } else {
        println!(
            "{} not found. Run 'categories' first.",
            store::CATEGORIES_FILE
        );
    }

    let products_path = Path::new(store::PRODUCTS_FILE);
    if products_path.exists() {
        let collection = store::load_products(products_path)?;
        let discounted = collection
            .products
            .iter()
            .filter(|p| p.final_price < p.list_price)
            .count();
        let unpriced = collection
            .products
            .iter()
            .filter(|p| p.final_price == 0.0)
            .count();
        let distinct_urls = collection
            .products
            .iter()
            .map(|p| p.url.as_str())
            .collect::<HashSet<_>>()
            .len();
        println!("Products:           {}", collection.products.len());
        println!("  discounted:       {}", discounted);
        println!("  unpriced:         {}", unpriced);
        println!("  distinct URLs:    {}", distinct_urls);
    } else {
        println!("{} not found. Run 'products' first.", store::PRODUCTS_FILE);
    }

    Ok(())
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

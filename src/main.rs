// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (tracing, to stderr so JSON on stdout stays clean)
// 3. Dispatch to the appropriate subcommand handler
// 4. Exit with proper code (0 = menus found, 1 = none found, 2 = error)
// =============================================================================

mod cli;      // src/cli.rs - command-line parsing
mod config;   // src/config.rs - crawler / detector settings
mod crawl;    // src/crawl/ - website crawling for menu links
mod menu;     // src/menu/ - menu classification (URLs and photos)

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use crawl::MenuCrawler;
use menu::{MenuDetectionResult, MenuDetector, TesseractRecognizer};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
}

// Returns:
//   Ok(0) = at least one menu found
//   Ok(1) = nothing found
//   Err   = bad arguments or an unusable setup
async fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Crawl { website_url, options, json } => {
            handle_crawl(&website_url, &options, json).await
        }
        Commands::Detect { paths, options, menus_only, json } => {
            handle_detect(&paths, &options, menus_only, json).await
        }
        Commands::Scan { dir, options } => handle_scan(&dir, &options).await,
    }
}

async fn handle_crawl(website_url: &str, options: &cli::CrawlArgs, json: bool) -> Result<i32> {
    let config = options.to_config();
    config.validate()?;

    info!("Crawling {} (max {} pages)", website_url, config.max_pages);

    let mut crawler = MenuCrawler::new(&config).context("Failed to create HTTP client")?;
    let menu_urls = crawler.crawl_for_menus(website_url, config.max_pages).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&menu_urls)?);
    } else if menu_urls.is_empty() {
        println!("No menu URLs found on {}", website_url);
    } else {
        for url in &menu_urls {
            println!("{}", url);
        }
    }

    Ok(if menu_urls.is_empty() { 1 } else { 0 })
}

async fn handle_detect(
    paths: &[PathBuf],
    options: &cli::DetectArgs,
    menus_only: bool,
    json: bool,
) -> Result<i32> {
    let detector = build_detector(options).await;
    let photos = expand_paths(paths)?;

    if photos.is_empty() {
        println!("No images found");
        return Ok(1);
    }

    info!("Analyzing {} photo(s)", photos.len());

    if menus_only {
        let menus = detector.filter_menu_photos(&photos).await;
        if json {
            println!("{}", serde_json::to_string_pretty(&menus)?);
        } else {
            for path in &menus {
                println!("{}", path.display());
            }
        }
        return Ok(if menus.is_empty() { 1 } else { 0 });
    }

    let results = detector.analyze_photos(&photos).await;
    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        print_table(&results);
    }

    Ok(if results.iter().any(|r| r.is_menu) { 0 } else { 1 })
}

async fn handle_scan(dir: &std::path::Path, options: &cli::DetectArgs) -> Result<i32> {
    let detector = build_detector(options).await;
    let scan = detector
        .detect_menus_in_directory(dir)
        .await
        .with_context(|| format!("Failed to read directory {}", dir.display()))?;

    println!("{}", serde_json::to_string_pretty(&scan)?);
    Ok(if scan.menu_photos.is_empty() { 1 } else { 0 })
}

async fn build_detector(options: &cli::DetectArgs) -> MenuDetector<TesseractRecognizer> {
    let config = options.to_config();
    let recognizer = TesseractRecognizer::new(&config);

    // Keep going without OCR; photos then only score on their shape
    match recognizer.version().await {
        Ok(version) => info!("Tesseract OCR available: {}", version),
        Err(e) => warn!("Tesseract not available: {}. Install tesseract and its language data", e),
    }

    MenuDetector::new(recognizer, &config)
}

// Files are kept as given; directories are replaced by the images inside them
fn expand_paths(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut photos = Vec::new();
    for path in paths {
        if path.is_dir() {
            let images = menu::list_images(path)
                .with_context(|| format!("Failed to read directory {}", path.display()))?;
            photos.extend(images);
        } else {
            photos.push(path.clone());
        }
    }
    Ok(photos)
}

fn print_table(results: &[MenuDetectionResult]) {
    println!("{:<50} {:<8} {:<7} {:<40}", "PHOTO", "MENU", "SCORE", "REASONS");
    println!("{}", "=".repeat(105));

    for result in results {
        let path = result.path.display().to_string();
        // Truncate long paths from the left, the file name matters most
        let len = path.chars().count();
        let path_display = if len > 47 {
            format!("...{}", path.chars().skip(len - 46).collect::<String>())
        } else {
            path
        };

        println!(
            "{:<50} {:<8} {:<7} {:<40}",
            path_display,
            if result.is_menu { "yes" } else { "no" },
            format!("{}/5", result.score),
            result.reasons.join("; ")
        );
    }

    println!();

    let menu_count = results.iter().filter(|r| r.is_menu).count();
    println!("Summary:");
    println!("   Menus: {}", menu_count);
    println!("   Other: {}", results.len() - menu_count);
    println!("   Total: {}", results.len());
}

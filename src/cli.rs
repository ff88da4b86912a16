// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
//
// Subcommands:
// - crawl:  look for menu pages / PDFs on a restaurant website
// - detect: check photos for menus with OCR
// - scan:   split a photo directory into menus and everything else
// =============================================================================

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{CrawlerConfig, DetectorConfig, DEFAULT_USER_AGENT};

#[derive(Parser, Debug)]
#[command(
    name = "menu-scout",
    version,
    about = "Find restaurant menus on websites and in photos",
    long_about = "menu-scout crawls restaurant websites for menu pages and PDFs, politely \
                  (robots.txt, rate limiting, same domain only), and screens photos for \
                  menus using OCR heuristics."
)]
pub struct Cli {
    /// Log debug output (RUST_LOG takes precedence when set)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl a website for menu URLs
    ///
    /// Example: menu-scout crawl https://bistro.example --max-pages 20
    Crawl {
        /// Website URL (https:// is assumed when no scheme is given)
        website_url: String,

        #[command(flatten)]
        options: CrawlArgs,

        /// Output results in JSON format instead of a list
        #[arg(long)]
        json: bool,
    },

    /// Check photos for menus
    ///
    /// Example: menu-scout detect photos/ extra.jpg --save-ocr
    Detect {
        /// Image files, or directories of jpg/jpeg/png images
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        #[command(flatten)]
        options: DetectArgs,

        /// Print only the paths judged to be menus
        #[arg(long)]
        menus_only: bool,

        /// Output results in JSON format instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Split a directory of photos into menus and other photos (JSON)
    Scan {
        /// Directory holding jpg/jpeg/png images
        dir: PathBuf,

        #[command(flatten)]
        options: DetectArgs,
    },
}

#[derive(Args, Debug)]
pub struct CrawlArgs {
    /// Maximum number of pages to visit
    #[arg(long, default_value_t = 10)]
    pub max_pages: usize,

    /// Maximum requests per second (0 disables throttling)
    #[arg(long, default_value_t = 8.0)]
    pub rate_limit: f64,

    /// User agent for HTTP requests and robots.txt matching
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// HTTP request timeout in seconds
    #[arg(long, default_value_t = 10)]
    pub timeout: u64,

    /// Retries for 500/502/503/504 responses
    #[arg(long, default_value_t = 2)]
    pub retries: u32,
}

impl CrawlArgs {
    pub fn to_config(&self) -> CrawlerConfig {
        CrawlerConfig {
            user_agent: self.user_agent.clone(),
            timeout_secs: self.timeout,
            rate_limit_qps: self.rate_limit,
            max_pages: self.max_pages,
            max_retries: self.retries,
            ..CrawlerConfig::default()
        }
    }
}

#[derive(Args, Debug)]
pub struct DetectArgs {
    /// Tesseract language codes
    #[arg(long, default_value = "eng+fra")]
    pub lang: String,

    /// Tesseract executable
    #[arg(long, default_value = "tesseract")]
    pub tesseract: String,

    /// Save the OCR text of detected menus next to the image (.txt)
    #[arg(long)]
    pub save_ocr: bool,
}

impl DetectArgs {
    pub fn to_config(&self) -> DetectorConfig {
        DetectorConfig {
            ocr_lang: self.lang.clone(),
            tesseract_bin: self.tesseract.clone(),
            save_ocr: self.save_ocr,
        }
    }
}

// src/crawl/queue.rs
// =============================================================================
// This module implements menu discovery on one website, breadth-first.
//
// How it works:
// 1. Fetch robots.txt once; if that fails we don't crawl the site at all
// 2. Start with the site URL in a queue (the "frontier")
// 3. Pop a URL, skip it if seen or blocked by robots.txt, fetch it
// 4. Note it if the URL itself looks like a menu
// 5. Extract links from HTML pages; keep same-domain ones, note the
//    menu-looking ones (PDFs only after a HEAD check), queue the new ones
// 6. Repeat until the queue is empty or the page budget is used up
//
// Politeness:
// - Every request goes through the crawler's RateLimiter
// - robots.txt Disallow rules for our user agent are honoured
// - Only the starting site's domain is crawled
//
// Failure policy:
// - robots.txt unavailable -> whole site skipped (warn)
// - a page fails -> only that page skipped (debug)
// - crawl_for_menus() itself never returns an error
// =============================================================================

use std::collections::{BTreeSet, HashSet, VecDeque};

use tracing::{debug, info, warn};

use super::fetch::{FetchError, Fetcher, HttpFetcher, PageFetchResult};
use super::links::extract_links;
use super::normalize::{normalize, path_of, same_domain, site_root};
use super::rate_limit::RateLimiter;
use super::robots::RobotsPolicy;
use crate::config::CrawlerConfig;
use crate::menu::{is_menu_candidate, is_pdf_link};

/// Finds menu pages and menu PDFs on restaurant websites
///
/// One crawler can crawl many sites one after another; its rate limiter
/// spaces out requests across all of them.
pub struct MenuCrawler<F = HttpFetcher> {
    fetcher: F,
    limiter: RateLimiter,
    user_agent: String,
}

// Per-call state, dropped when crawl_for_menus returns
struct CrawlSession {
    base: String,
    robots: RobotsPolicy,
    frontier: VecDeque<String>,
    // normalized URLs ever pushed onto the frontier
    queued: HashSet<String>,
    visited: HashSet<String>,
    menu_urls: BTreeSet<String>,
}

impl CrawlSession {
    fn new(start: String, base: String, robots: RobotsPolicy) -> Self {
        let mut session = Self {
            base,
            robots,
            frontier: VecDeque::new(),
            queued: HashSet::new(),
            visited: HashSet::new(),
            menu_urls: BTreeSet::new(),
        };
        session.enqueue(start);
        session
    }

    // Queues a URL unless it was visited or queued before
    fn enqueue(&mut self, url: String) {
        let key = normalize(&url, "");
        if self.visited.contains(&key) || !self.queued.insert(key) {
            return;
        }
        self.frontier.push_back(url);
    }
}

impl MenuCrawler<HttpFetcher> {
    /// Builds a crawler that talks HTTP with reqwest
    pub fn new(config: &CrawlerConfig) -> Result<Self, FetchError> {
        let fetcher = HttpFetcher::new(config)?;
        Ok(Self::with_fetcher(fetcher, config))
    }
}

impl<F: Fetcher> MenuCrawler<F> {
    pub fn with_fetcher(fetcher: F, config: &CrawlerConfig) -> Self {
        let limiter = RateLimiter::new(config.rate_limit_qps);
        debug!("Minimum delay between requests: {:?}", limiter.min_interval());

        Self {
            fetcher,
            limiter,
            user_agent: config.user_agent.clone(),
        }
    }

    /// Crawls a site and returns its menu URLs, sorted and deduplicated
    ///
    /// Never fails: a site we can't crawl just yields an empty list.
    pub async fn crawl_for_menus(&mut self, site_url: &str, max_pages: usize) -> Vec<String> {
        let Some((start, base)) = site_root(site_url) else {
            if !site_url.trim().is_empty() {
                warn!("Not a crawlable URL, skipping: {}", site_url);
            }
            return Vec::new();
        };

        debug!("Starting crawl of {}", start);

        let Some(robots) = self.fetch_robots(&base).await else {
            warn!("Could not access robots.txt, skipping {}", start);
            return Vec::new();
        };

        let mut session = CrawlSession::new(start.clone(), base, robots);

        while session.visited.len() < max_pages {
            let Some(next) = session.frontier.pop_front() else {
                break;
            };
            self.visit(&mut session, &next).await;
        }

        let menu_urls: Vec<String> = session.menu_urls.into_iter().collect();
        info!(
            "Found {} menu URLs on {} ({} pages visited)",
            menu_urls.len(),
            start,
            session.visited.len()
        );
        menu_urls
    }

    // None means "don't crawl this site"
    async fn fetch_robots(&mut self, base: &str) -> Option<RobotsPolicy> {
        let robots_url = normalize("/robots.txt", base);

        match self.get(&robots_url).await {
            Ok(page) if page.status == 200 => {
                let policy = RobotsPolicy::parse(&page.body, &self.user_agent);
                debug!(
                    "robots.txt for {} disallows {} prefixes",
                    base,
                    policy.disallowed_count()
                );
                Some(policy)
            }
            // No robots.txt means everything is allowed
            Ok(page) if page.status == 404 => Some(RobotsPolicy::allow_all()),
            Ok(page) => {
                warn!("robots.txt returned status {} for {}", page.status, base);
                None
            }
            Err(e) => {
                warn!("Failed to fetch robots.txt for {}: {}", base, e);
                None
            }
        }
    }

    // Handles one frontier entry
    async fn visit(&mut self, session: &mut CrawlSession, url: &str) {
        let current = normalize(url, "");
        if !session.visited.insert(current.clone()) {
            return;
        }

        if !session.robots.is_allowed(&path_of(&current)) {
            debug!("Blocked by robots.txt: {}", current);
            return;
        }

        let page = match self.get(&current).await {
            Ok(page) if page.is_success() => page,
            Ok(page) => {
                debug!("Failed to fetch {}: {}", current, FetchError::Status(page.status));
                return;
            }
            Err(e) => {
                debug!("Failed to fetch {}: {}", current, e);
                return;
            }
        };

        if is_menu_candidate(&current) {
            session.menu_urls.insert(current.clone());
        }

        if !page.is_html() {
            return;
        }

        let links = extract_links(&page.body);
        debug!("{} links on {}", links.len(), current);

        for link in links {
            let absolute = normalize(&link, &current);

            // Only follow same-domain links
            if !same_domain(&absolute, &session.base) {
                continue;
            }

            // Links robots.txt keeps us out of are not reported either
            if is_menu_candidate(&absolute)
                && !session.menu_urls.contains(&absolute)
                && session.robots.is_allowed(&path_of(&absolute))
            {
                if !is_pdf_link(&absolute) || self.verify_pdf(&absolute).await {
                    session.menu_urls.insert(absolute.clone());
                }
            }

            session.enqueue(absolute);
        }
    }

    // HEAD check for .pdf links; any failure just means "not a PDF"
    async fn verify_pdf(&mut self, url: &str) -> bool {
        match self.head(url).await {
            Ok(response) => response.is_pdf(),
            Err(e) => {
                debug!("PDF verification failed for {}: {}", url, e);
                false
            }
        }
    }

    async fn get(&mut self, url: &str) -> Result<PageFetchResult, FetchError> {
        self.limiter.wait().await;
        let result = self.fetcher.get(url).await;
        self.limiter.mark();
        result
    }

    async fn head(&mut self, url: &str) -> Result<PageFetchResult, FetchError> {
        self.limiter.wait().await;
        let result = self.fetcher.head(url).await;
        self.limiter.mark();
        result
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why a generic `F = HttpFetcher`?
//    - Production code writes `MenuCrawler` and gets the reqwest version
//    - Tests plug in their own Fetcher to count calls without a network
//
// 2. Why both `queued` and `visited`?
//    - `visited` is what the page budget counts
//    - `queued` stops the same link (found on many pages) from being
//      pushed onto the frontier again and again
//
// 3. Why BTreeSet for menu_urls?
//    - It keeps entries sorted and unique, which is exactly the output
//      format, so no sort/dedup step is needed at the end
//
// 4. What is `let ... else`?
//    - Bind a pattern or leave the function early:
//      `let Some(x) = maybe else { return ...; };`
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config() -> CrawlerConfig {
        CrawlerConfig {
            rate_limit_qps: 0.0,
            max_retries: 0,
            timeout_secs: 5,
            ..CrawlerConfig::default()
        }
    }

    fn crawler() -> MenuCrawler {
        MenuCrawler::new(&test_config()).unwrap()
    }

    fn html(body: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/html; charset=utf-8")
    }

    async fn mount_get(server: &MockServer, route: &str, response: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(response)
            .mount(server)
            .await;
    }

    // Fetcher that counts calls and answers everything with a 404
    #[derive(Clone, Default)]
    struct CountingFetcher {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Fetcher for CountingFetcher {
        async fn get(&self, _url: &str) -> Result<PageFetchResult, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(PageFetchResult {
                status: 404,
                content_type: String::new(),
                body: String::new(),
            })
        }

        async fn head(&self, _url: &str) -> Result<PageFetchResult, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(FetchError::Timeout)
        }
    }

    // Fetcher with canned GET pages (anything else is a 404) that logs
    // every call as (method, url, time)
    #[derive(Clone, Default)]
    struct ScriptedFetcher {
        pages: HashMap<String, String>,
        pdf_head: bool,
        log: Arc<Mutex<Vec<(&'static str, String, Instant)>>>,
    }

    impl ScriptedFetcher {
        fn page(mut self, url: &str, body: &str) -> Self {
            self.pages.insert(url.to_string(), body.to_string());
            self
        }

        fn record(&self, method: &'static str, url: &str) {
            self.log
                .lock()
                .unwrap()
                .push((method, url.to_string(), Instant::now()));
        }
    }

    #[async_trait]
    impl Fetcher for ScriptedFetcher {
        async fn get(&self, url: &str) -> Result<PageFetchResult, FetchError> {
            self.record("GET", url);
            Ok(match self.pages.get(url) {
                Some(body) => PageFetchResult {
                    status: 200,
                    content_type: "text/html".to_string(),
                    body: body.clone(),
                },
                None => PageFetchResult {
                    status: 404,
                    content_type: String::new(),
                    body: String::new(),
                },
            })
        }

        async fn head(&self, url: &str) -> Result<PageFetchResult, FetchError> {
            self.record("HEAD", url);
            if self.pdf_head {
                Ok(PageFetchResult {
                    status: 200,
                    content_type: "application/pdf".to_string(),
                    body: String::new(),
                })
            } else {
                Err(FetchError::Timeout)
            }
        }
    }

    #[tokio::test]
    async fn test_empty_url_makes_no_requests() {
        let fetcher = CountingFetcher::default();
        let calls = fetcher.calls.clone();
        let mut crawler = MenuCrawler::with_fetcher(fetcher, &test_config());

        assert!(crawler.crawl_for_menus("", 10).await.is_empty());
        assert!(crawler.crawl_for_menus("   ", 10).await.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_finds_menu_page_and_verified_pdf() {
        let server = MockServer::start().await;
        let root = format!(
            r#"<a href="/menu">Menu</a>
               <a href="/about">About</a>
               <a href="{}/menu.pdf">PDF</a>"#,
            server.uri()
        );
        mount_get(&server, "/", html(&root)).await;
        mount_get(&server, "/menu", html("<p>Our dishes</p>")).await;
        mount_get(&server, "/about", html("<p>Since 1987</p>")).await;
        mount_get(
            &server,
            "/menu.pdf",
            ResponseTemplate::new(200).set_body_raw(b"%PDF-1.4".to_vec(), "application/pdf"),
        )
        .await;
        Mock::given(method("HEAD"))
            .and(path("/menu.pdf"))
            .respond_with(
                ResponseTemplate::new(200).insert_header("Content-Type", "application/pdf"),
            )
            .mount(&server)
            .await;

        let found = crawler().crawl_for_menus(&server.uri(), 10).await;
        assert_eq!(
            found,
            vec![
                format!("{}/menu", server.uri()),
                format!("{}/menu.pdf", server.uri()),
            ]
        );
    }

    #[tokio::test]
    async fn test_unverified_pdf_link_not_recorded() {
        let server = MockServer::start().await;
        mount_get(&server, "/", html(r#"<a href="/flyer.pdf">Flyer</a>"#)).await;
        Mock::given(method("HEAD"))
            .and(path("/flyer.pdf"))
            .respond_with(ResponseTemplate::new(200).insert_header("Content-Type", "text/html"))
            .mount(&server)
            .await;

        // The GET for /flyer.pdf falls through to wiremock's 404
        let found = crawler().crawl_for_menus(&server.uri(), 10).await;
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_pdf_head_failure_skips_only_the_pdf() {
        let fetcher = ScriptedFetcher::default().page(
            "https://bistro.example/",
            r#"<a href="/menu.pdf">PDF</a><a href="/carte">Carte</a>"#,
        );
        let log = fetcher.log.clone();
        let mut crawler = MenuCrawler::with_fetcher(fetcher, &test_config());

        let found = crawler.crawl_for_menus("https://bistro.example", 10).await;
        assert_eq!(found, vec!["https://bistro.example/carte".to_string()]);

        // The HEAD timed out once and the crawl went on to both links
        let log = log.lock().unwrap();
        let heads: Vec<&str> = log
            .iter()
            .filter(|(method, _, _)| *method == "HEAD")
            .map(|(_, url, _)| url.as_str())
            .collect();
        assert_eq!(heads, vec!["https://bistro.example/menu.pdf"]);
        assert!(log.iter().any(|(m, url, _)| *m == "GET" && url.ends_with("/carte")));
    }

    #[tokio::test]
    async fn test_every_request_is_rate_limited() {
        let fetcher = ScriptedFetcher {
            pdf_head: true,
            ..ScriptedFetcher::default()
        }
        .page("https://bistro.example/", r#"<a href="/menu.pdf">PDF</a>"#);
        let log = fetcher.log.clone();

        let config = CrawlerConfig {
            rate_limit_qps: 10.0,
            ..test_config()
        };
        let mut crawler = MenuCrawler::with_fetcher(fetcher, &config);

        let found = crawler.crawl_for_menus("https://bistro.example", 10).await;
        assert_eq!(found, vec!["https://bistro.example/menu.pdf".to_string()]);

        // robots.txt, the root page, the PDF HEAD check, then the PDF itself
        let log = log.lock().unwrap();
        let calls: Vec<(&str, &str)> = log
            .iter()
            .map(|(method, url, _)| (*method, url.as_str()))
            .collect();
        assert_eq!(
            calls,
            vec![
                ("GET", "https://bistro.example/robots.txt"),
                ("GET", "https://bistro.example/"),
                ("HEAD", "https://bistro.example/menu.pdf"),
                ("GET", "https://bistro.example/menu.pdf"),
            ]
        );

        for pair in log.windows(2) {
            let gap = pair[1].2.duration_since(pair[0].2);
            assert!(gap >= Duration::from_millis(100), "gap was {:?}", gap);
        }
    }

    #[tokio::test]
    async fn test_robots_disallow_hides_menu() {
        let server = MockServer::start().await;
        mount_get(
            &server,
            "/robots.txt",
            ResponseTemplate::new(200).set_body_raw("User-agent: *\nDisallow: /menu\n", "text/plain"),
        )
        .await;
        mount_get(
            &server,
            "/",
            html(r#"<a href="/menu">Menu</a><a href="/menu.pdf">PDF</a>"#),
        )
        .await;
        mount_get(&server, "/menu", html("<p>dishes</p>")).await;

        let found = crawler().crawl_for_menus(&server.uri(), 10).await;
        assert!(found.is_empty());

        // Neither the page nor the PDF check ever reaches the server
        let requests = server.received_requests().await.unwrap();
        assert!(!requests.iter().any(|r| r.url.path().starts_with("/menu")));
    }

    #[tokio::test]
    async fn test_robots_error_aborts_site() {
        let server = MockServer::start().await;
        mount_get(&server, "/robots.txt", ResponseTemplate::new(403)).await;
        mount_get(&server, "/", html(r#"<a href="/menu">Menu</a>"#)).await;

        let found = crawler().crawl_for_menus(&server.uri(), 10).await;
        assert!(found.is_empty());

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url.path(), "/robots.txt");
    }

    #[tokio::test]
    async fn test_unreachable_site_returns_empty() {
        let found = crawler().crawl_for_menus("http://127.0.0.1:9/", 10).await;
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_external_links_ignored() {
        let server = MockServer::start().await;
        mount_get(
            &server,
            "/",
            html(r#"<a href="https://elsewhere.example/menu">Partner menu</a>"#),
        )
        .await;

        let found = crawler().crawl_for_menus(&server.uri(), 10).await;
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_page_budget_respected() {
        let server = MockServer::start().await;
        let links: String = (0..20)
            .map(|i| format!(r#"<a href="/page/{}">p</a>"#, i))
            .collect();
        mount_get(&server, "/", html(&links)).await;

        let max_pages = 3;
        crawler().crawl_for_menus(&server.uri(), max_pages).await;

        let requests = server.received_requests().await.unwrap();
        let page_requests = requests
            .iter()
            .filter(|r| r.url.path() != "/robots.txt")
            .count();
        assert_eq!(page_requests, max_pages);
    }

    #[tokio::test]
    async fn test_non_html_pages_not_parsed() {
        let server = MockServer::start().await;
        mount_get(
            &server,
            "/",
            ResponseTemplate::new(200).set_body_raw(r#"<a href="/menu">Menu</a>"#, "text/plain"),
        )
        .await;

        let found = crawler().crawl_for_menus(&server.uri(), 10).await;
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_image_links_are_candidates() {
        let server = MockServer::start().await;
        mount_get(&server, "/", html(r#"<img src="/img/carte-du-soir.jpg#x">"#)).await;

        let found = crawler().crawl_for_menus(&server.uri(), 10).await;
        assert_eq!(found, vec![format!("{}/img/carte-du-soir.jpg", server.uri())]);
    }

    #[tokio::test]
    async fn test_each_page_fetched_once() {
        let server = MockServer::start().await;
        mount_get(
            &server,
            "/",
            html(r##"<a href="/food">Food</a><a href="/food#top">Top</a><a href="/">Home</a>"##),
        )
        .await;
        mount_get(&server, "/food", html(r#"<a href="/">Home</a><a href="/food">Again</a>"#)).await;

        let found = crawler().crawl_for_menus(&server.uri(), 10).await;
        assert_eq!(found, vec![format!("{}/food", server.uri())]);

        let requests = server.received_requests().await.unwrap();
        let food_hits = requests.iter().filter(|r| r.url.path() == "/food").count();
        let root_hits = requests.iter().filter(|r| r.url.path() == "/").count();
        assert_eq!(food_hits, 1);
        assert_eq!(root_hits, 1);
    }

    #[test]
    fn test_session_never_requeues() {
        let mut session = CrawlSession::new(
            "https://a.com/".to_string(),
            "https://a.com".to_string(),
            RobotsPolicy::allow_all(),
        );
        session.enqueue("https://a.com/#top".to_string());
        session.enqueue("https://a.com/menu".to_string());
        session.enqueue("https://a.com/menu".to_string());
        assert_eq!(session.frontier.len(), 2);

        session.visited.insert("https://a.com/x".to_string());
        session.enqueue("https://a.com/x".to_string());
        assert_eq!(session.frontier.len(), 2);
    }
}

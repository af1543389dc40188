//! Integration tests for the harvester
//!
//! These tests use wiremock to serve a fake archive and run the full
//! top index → year → topic-month → article walk end-to-end.

use sitemap_harvest::config::{
    ArchiveConfig, Config, CrawlerConfig, FilterConfig, OutputConfig, SelectorConfig,
    UserAgentConfig,
};
use sitemap_harvest::crawler::{FetchError, PageFetcher};
use sitemap_harvest::output::{write_outputs, HEADER};
use sitemap_harvest::{CrawlFilter, ErrorStage, TraversalEngine, Validity};
use std::collections::HashSet;
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock archive
fn create_test_config(base_url: &str, filter: FilterConfig, output_dir: &str) -> Config {
    Config {
        archive: ArchiveConfig {
            base_url: base_url.to_string(),
            top_index_url: format!("{}/sitemap.html", base_url),
            publisher: "CNN".to_string(),
            bias: 0,
        },
        filter,
        crawler: CrawlerConfig {
            concurrency: Some(2),
            timeout_secs: 5,
            connect_timeout_secs: 2,
            ..CrawlerConfig::default()
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        selectors: SelectorConfig::default(),
        output: OutputConfig {
            directory: output_dir.to_string(),
            file_prefix: "articles".to_string(),
            drop_empty: true,
            database_path: None,
        },
    }
}

fn filter(years: &[&str], topics: &[&str], stride: usize) -> FilterConfig {
    FilterConfig {
        years: years.iter().map(|s| s.to_string()).collect(),
        topics: topics.iter().map(|s| s.to_string()).collect(),
        sampling_stride: stride,
        ..FilterConfig::default()
    }
}

fn top_index(years: &[&str]) -> String {
    let items: String = years
        .iter()
        .map(|y| format!(r#"<li class="date"><a href="/article/sitemap-{0}.html">{0}</a></li>"#, y))
        .collect();
    format!(
        r#"<html><body><ul class="sitemap-year">{}</ul></body></html>"#,
        items
    )
}

/// Year page listing (topic, href) sections
fn year_index(sections: &[(&str, &str)]) -> String {
    let items: String = sections
        .iter()
        .map(|(topic, href)| format!(r#"<li class="section"><a href="{}">{}</a></li>"#, href, topic))
        .collect();
    format!(r#"<html><body><ul>{}</ul></body></html>"#, items)
}

/// Topic-month page; the first container lists months and is ignored
fn topic_month(links: &[&str], dates: &[&str]) -> String {
    let links: String = links
        .iter()
        .map(|href| format!(r#"<span class="sitemap-link"><a href="{}">story</a></span>"#, href))
        .collect();
    let dates: String = dates
        .iter()
        .map(|d| format!(r#"<span class="date">{}</span>"#, d))
        .collect();
    format!(
        r#"<html><body>
        <div class="sitemap-entry"><a href="/politics/article/sitemap-2016-2.html">February</a></div>
        <div class="sitemap-entry">{}{}</div>
        </body></html>"#,
        links, dates
    )
}

fn article(title: &str, body: &str) -> String {
    format!(
        r#"<html><body><h1>{}</h1><span class="byline__name">Staff</span>
        <div><p class="paragraph inline-placeholder">{}</p></div></body></html>"#,
        title, body
    )
}

async fn mount_page(server: &MockServer, page: &str, body: String, calls: u64) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .expect(calls)
        .mount(server)
        .await;
}

async fn mount_status(server: &MockServer, page: &str, status: u16, calls: u64) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(ResponseTemplate::new(status))
        .expect(calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_harvest_keeps_every_outcome() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/sitemap.html", top_index(&["2016", "2017"]), 1).await;
    mount_page(
        &server,
        "/article/sitemap-2016.html",
        year_index(&[("Politics", "/politics/article/sitemap-2016-1.html")]),
        1,
    )
    .await;
    // Filtered out by year
    mount_page(&server, "/article/sitemap-2017.html", year_index(&[]), 0).await;

    mount_page(
        &server,
        "/politics/article/sitemap-2016-1.html",
        topic_month(
            &["/2016/01/05/politics/a", "/2016/01/04/politics/b", "/2016/01/03/politics/c"],
            &["2016-01-05", "2016-01-04", "2016-01-03"],
        ),
        1,
    )
    .await;
    mount_page(
        &server,
        "/2016/01/05/politics/a",
        article("Senate passes bill", "The Senate passed the bill on Tuesday."),
        1,
    )
    .await;
    mount_page(
        &server,
        "/2016/01/04/politics/b",
        "<html><body><p class=\"paragraph inline-placeholder\">No headline here at all.</p></body></html>".to_string(),
        1,
    )
    .await;
    mount_status(&server, "/2016/01/03/politics/c", 404, 1).await;

    let config = create_test_config(&base, filter(&["2016"], &[], 1), "unused");
    let engine = TraversalEngine::new(&config).expect("Failed to create engine");
    let report = engine.run(&CrawlFilter::from_config(&config.filter)).await;

    assert!(!report.aborted);
    assert_eq!(report.years_visited, 1);
    assert_eq!(report.topic_months_visited, 1);
    assert_eq!(report.articles_dispatched, 3);
    assert_eq!(report.articles_skipped, 0);

    // Every dispatched article yields exactly one record or one error
    assert_eq!(report.records.len() + report.errors.len(), 3);
    assert_eq!(report.records.len(), 1);

    let record = &report.records[0];
    assert_eq!(record.url, format!("{}/2016/01/05/politics/a", base));
    assert_eq!(record.title, "\"Senate passes bill\"");
    assert_eq!(record.author.as_deref(), Some("Staff"));
    assert_eq!(record.topic, "Politics");
    assert_eq!(record.year, "2016");
    assert_eq!(record.month, "01");
    assert_eq!(record.day, "05");
    assert_eq!(record.publisher, "CNN");
    assert_eq!(record.validity, Validity::Ok);
    assert!(record.sequence_number >= 1);

    let parse_error = report
        .errors
        .iter()
        .find(|e| e.stage == ErrorStage::Parse)
        .expect("missing PARSE error");
    assert_eq!(parse_error.url, format!("{}/2016/01/04/politics/b", base));
    assert_eq!(parse_error.message, "Missing title");

    let fetch_error = report
        .errors
        .iter()
        .find(|e| e.stage == ErrorStage::Fetch)
        .expect("missing FETCH error");
    assert_eq!(fetch_error.url, format!("{}/2016/01/03/politics/c", base));
    assert_eq!(fetch_error.message, FetchError::HttpStatus(404).to_string());
}

#[tokio::test]
async fn test_count_mismatch_is_structural_and_siblings_continue() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/sitemap.html", top_index(&["2016"]), 1).await;
    mount_page(
        &server,
        "/article/sitemap-2016.html",
        year_index(&[
            ("Politics", "/politics/article/sitemap-2016-1.html"),
            ("US", "/us/article/sitemap-2016-1.html"),
        ]),
        1,
    )
    .await;

    // Two links but three dates
    mount_page(
        &server,
        "/politics/article/sitemap-2016-1.html",
        topic_month(
            &["/2016/01/02/politics/x", "/2016/01/01/politics/y"],
            &["2016-01-02", "2016-01-01", "2016-01-01"],
        ),
        1,
    )
    .await;
    mount_page(&server, "/2016/01/02/politics/x", article("X", "Never fetched at all."), 0).await;
    mount_page(&server, "/2016/01/01/politics/y", article("Y", "Never fetched at all."), 0).await;

    mount_page(
        &server,
        "/us/article/sitemap-2016-1.html",
        topic_month(&["/2016/01/09/us/z"], &["2016-01-09"]),
        1,
    )
    .await;
    mount_page(&server, "/2016/01/09/us/z", article("Z", "A perfectly ordinary story."), 1).await;

    let config = create_test_config(&base, filter(&[], &[], 1), "unused");
    let engine = TraversalEngine::new(&config).unwrap();
    let report = engine.run(&CrawlFilter::accept_all()).await;

    assert_eq!(report.errors.len(), 1);
    let error = &report.errors[0];
    assert_eq!(error.stage, ErrorStage::Structural);
    assert_eq!(
        error.url,
        format!("{}/politics/article/sitemap-2016-1.html", base)
    );

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].topic, "US");
    assert_eq!(report.topic_months_visited, 2);
}

#[tokio::test]
async fn test_malformed_date_only_rejects_its_entry() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/sitemap.html", top_index(&["2016"]), 1).await;
    mount_page(
        &server,
        "/article/sitemap-2016.html",
        year_index(&[("Politics", "/politics/article/sitemap-2016-1.html")]),
        1,
    )
    .await;
    mount_page(
        &server,
        "/politics/article/sitemap-2016-1.html",
        topic_month(&["/d/a", "/d/b", "/d/c"], &["2016-01-01", "TBD", "2016-01-03"]),
        1,
    )
    .await;
    mount_page(&server, "/d/a", article("A", "First story of the month."), 1).await;
    mount_page(&server, "/d/b", article("B", "Never fetched at all."), 0).await;
    mount_page(&server, "/d/c", article("C", "Third story of the month."), 1).await;

    let config = create_test_config(&base, filter(&[], &[], 1), "unused");
    let engine = TraversalEngine::new(&config).unwrap();
    let report = engine.run(&CrawlFilter::accept_all()).await;

    assert_eq!(report.records.len(), 2);
    let days: HashSet<&str> = report.records.iter().map(|r| r.day.as_str()).collect();
    assert_eq!(days, HashSet::from(["01", "03"]));

    assert_eq!(report.errors.len(), 1);
    let error = &report.errors[0];
    assert_eq!(error.stage, ErrorStage::Parse);
    assert_eq!(error.url, format!("{}/d/b", base));
    assert_eq!(error.message, "Entry 1 has malformed date 'TBD'");
}

#[tokio::test]
async fn test_article_fetches_bounded_by_concurrency() {
    let server = MockServer::start().await;
    let base = server.uri();
    let delay = Duration::from_millis(200);

    mount_page(&server, "/sitemap.html", top_index(&["2016"]), 1).await;
    mount_page(
        &server,
        "/article/sitemap-2016.html",
        year_index(&[("World", "/world/article/sitemap-2016-7.html")]),
        1,
    )
    .await;

    let links = ["/s/0", "/s/1", "/s/2", "/s/3", "/s/4", "/s/5"];
    let dates = ["2016-07-06", "2016-07-05", "2016-07-04", "2016-07-03", "2016-07-02", "2016-07-01"];
    mount_page(
        &server,
        "/world/article/sitemap-2016-7.html",
        topic_month(&links, &dates),
        1,
    )
    .await;
    for link in links {
        Mock::given(method("GET"))
            .and(path(link))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(article("S", "A slow story from the desk."))
                    .set_delay(delay),
            )
            .expect(1)
            .mount(&server)
            .await;
    }

    // Two workers over six delayed pages need at least three rounds
    let config = create_test_config(&base, filter(&[], &[], 1), "unused");
    let engine = TraversalEngine::new(&config).unwrap();
    let start = Instant::now();
    let report = engine.run(&CrawlFilter::accept_all()).await;
    let elapsed = start.elapsed();

    assert!(report.errors.is_empty());
    assert_eq!(report.records.len(), 6);
    assert!(
        elapsed >= delay * 3,
        "six fetches finished in {:?} with two workers",
        elapsed
    );
}

#[tokio::test]
async fn test_topic_filter_never_fetches_other_topics() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/sitemap.html", top_index(&["2016"]), 1).await;
    mount_page(
        &server,
        "/article/sitemap-2016.html",
        year_index(&[
            ("Politics", "/politics/article/sitemap-2016-3.html"),
            ("Entertainment", "/entertainment/article/sitemap-2016-3.html"),
        ]),
        1,
    )
    .await;
    mount_page(
        &server,
        "/politics/article/sitemap-2016-3.html",
        topic_month(&["/2016/03/01/politics/p"], &["2016-03-01"]),
        1,
    )
    .await;
    mount_page(&server, "/2016/03/01/politics/p", article("P", "Policy news of the day."), 1).await;
    mount_page(
        &server,
        "/entertainment/article/sitemap-2016-3.html",
        topic_month(&[], &[]),
        0,
    )
    .await;

    let config = create_test_config(&base, filter(&[], &["Politics"], 1), "unused");
    let engine = TraversalEngine::new(&config).unwrap();
    let report = engine.run(&CrawlFilter::from_config(&config.filter)).await;

    assert!(report.errors.is_empty());
    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].month, "03");
    assert_eq!(report.topic_months_visited, 1);
}

#[tokio::test]
async fn test_sampling_stride_skips_without_fetching() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/sitemap.html", top_index(&["2016"]), 1).await;
    mount_page(
        &server,
        "/article/sitemap-2016.html",
        year_index(&[("World", "/world/article/sitemap-2016-6.html")]),
        1,
    )
    .await;

    let links = ["/w/0", "/w/1", "/w/2", "/w/3", "/w/4"];
    let dates = ["2016-06-05", "2016-06-04", "2016-06-03", "2016-06-02", "2016-06-01"];
    mount_page(
        &server,
        "/world/article/sitemap-2016-6.html",
        topic_month(&links, &dates),
        1,
    )
    .await;

    for (ordinal, link) in links.iter().enumerate() {
        let calls = if ordinal % 2 == 0 { 1 } else { 0 };
        mount_page(&server, link, article("W", "World news from the desk."), calls).await;
    }

    let config = create_test_config(&base, filter(&[], &[], 2), "unused");
    let engine = TraversalEngine::new(&config).unwrap();
    let report = engine.run(&CrawlFilter::from_config(&config.filter)).await;

    assert!(report.errors.is_empty());
    assert_eq!(report.records.len(), 3);
    assert_eq!(report.articles_dispatched, 3);
    assert_eq!(report.articles_skipped, 2);

    let days: HashSet<&str> = report.records.iter().map(|r| r.day.as_str()).collect();
    assert_eq!(days, HashSet::from(["05", "03", "01"]));

    let sequence_numbers: HashSet<u64> =
        report.records.iter().map(|r| r.sequence_number).collect();
    assert_eq!(sequence_numbers.len(), 3);
}

#[tokio::test]
async fn test_day_filter_skips_without_fetching() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/sitemap.html", top_index(&["2016"]), 1).await;
    mount_page(
        &server,
        "/article/sitemap-2016.html",
        year_index(&[("Tech", "/tech/article/sitemap-2016-2.html")]),
        1,
    )
    .await;
    mount_page(
        &server,
        "/tech/article/sitemap-2016-2.html",
        topic_month(&["/t/a", "/t/b"], &["2016-02-14", "2016-02-15"]),
        1,
    )
    .await;
    mount_page(&server, "/t/a", article("A", "Valentine's day gadgets."), 0).await;
    mount_page(&server, "/t/b", article("B", "The day after Valentine's."), 1).await;

    let mut filter_config = filter(&[], &[], 1);
    filter_config.days = vec!["15".to_string()];
    let config = create_test_config(&base, filter_config, "unused");
    let engine = TraversalEngine::new(&config).unwrap();
    let report = engine.run(&CrawlFilter::from_config(&config.filter)).await;

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].day, "15");
    assert_eq!(report.articles_skipped, 1);
}

#[tokio::test]
async fn test_top_index_failure_aborts_run() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_status(&server, "/sitemap.html", 500, 1).await;
    mount_page(&server, "/article/sitemap-2016.html", year_index(&[]), 0).await;

    let config = create_test_config(&base, filter(&[], &[], 1), "unused");
    let engine = TraversalEngine::new(&config).unwrap();
    let report = engine.run(&CrawlFilter::accept_all()).await;

    assert!(report.aborted);
    assert!(report.records.is_empty());
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].stage, ErrorStage::Fetch);
    assert_eq!(report.errors[0].url, format!("{}/sitemap.html", base));
}

#[tokio::test]
async fn test_top_index_without_year_list_aborts_run() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/sitemap.html",
        "<html><body><p>Maintenance</p></body></html>".to_string(),
        1,
    )
    .await;

    let config = create_test_config(&base, filter(&[], &[], 1), "unused");
    let engine = TraversalEngine::new(&config).unwrap();
    let report = engine.run(&CrawlFilter::accept_all()).await;

    assert!(report.aborted);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].stage, ErrorStage::Parse);
}

#[tokio::test]
async fn test_year_failure_continues_with_next_year() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/sitemap.html", top_index(&["2016", "2017"]), 1).await;
    mount_status(&server, "/article/sitemap-2016.html", 503, 1).await;
    mount_page(
        &server,
        "/article/sitemap-2017.html",
        year_index(&[("Health", "/health/article/sitemap-2017-4.html")]),
        1,
    )
    .await;
    mount_page(
        &server,
        "/health/article/sitemap-2017-4.html",
        topic_month(&["/h/1"], &["2017-04-20"]),
        1,
    )
    .await;
    mount_page(&server, "/h/1", article("H", "Health news for the week."), 1).await;

    let config = create_test_config(&base, filter(&[], &[], 1), "unused");
    let engine = TraversalEngine::new(&config).unwrap();
    let report = engine.run(&CrawlFilter::accept_all()).await;

    assert!(!report.aborted);
    assert_eq!(report.years_visited, 2);

    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].stage, ErrorStage::Fetch);
    assert_eq!(
        report.errors[0].url,
        format!("{}/article/sitemap-2016.html", base)
    );

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].year, "2017");
    assert_eq!(report.records[0].month, "04");
}

#[tokio::test]
async fn test_fetcher_status_and_body() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/ok", "<html>fine</html>".to_string(), 1).await;
    mount_status(&server, "/gone", 404, 1).await;

    let config = create_test_config(&base, filter(&[], &[], 1), "unused");
    let fetcher = PageFetcher::from_config(&config.user_agent, &config.crawler).unwrap();

    let body = fetcher.fetch(&format!("{}/ok", base)).await.unwrap();
    assert_eq!(body, "<html>fine</html>");

    let error = fetcher.fetch(&format!("{}/gone", base)).await.unwrap_err();
    assert_eq!(error, FetchError::HttpStatus(404));
}

#[tokio::test]
async fn test_outputs_written_with_empty_records_dropped() {
    let server = MockServer::start().await;
    let base = server.uri();
    let temp_dir = tempfile::tempdir().unwrap();

    mount_page(&server, "/sitemap.html", top_index(&["2016"]), 1).await;
    mount_page(
        &server,
        "/article/sitemap-2016.html",
        year_index(&[("Politics", "/politics/article/sitemap-2016-1.html")]),
        1,
    )
    .await;
    mount_page(
        &server,
        "/politics/article/sitemap-2016-1.html",
        topic_month(
            &["/p/text", "/p/video", "/p/missing"],
            &["2016-01-03", "2016-01-02", "2016-01-01"],
        ),
        1,
    )
    .await;
    mount_page(
        &server,
        "/p/text",
        article("A \"quoted\" headline", "A full text story, with commas."),
        1,
    )
    .await;
    mount_page(&server, "/p/video", article("Video", "Watch"), 1).await;
    mount_status(&server, "/p/missing", 404, 1).await;

    let output_dir = temp_dir.path().join("out");
    let config = create_test_config(
        &base,
        filter(&["2016"], &[], 1),
        output_dir.to_str().unwrap(),
    );
    let filter = CrawlFilter::from_config(&config.filter);
    let report = TraversalEngine::new(&config).unwrap().run(&filter).await;

    let (paths, summary) =
        write_outputs(&report, &config, "test-hash", &filter.years_label()).unwrap();

    let file_name = paths.records.file_name().unwrap().to_str().unwrap();
    assert!(file_name.starts_with("articles-2016-"));
    assert!(file_name.ends_with(".csv"));

    let csv = std::fs::read_to_string(&paths.records).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], HEADER);
    assert_eq!(
        lines[1],
        format!(
            "0,{}/p/text,\"A \"\"quoted\"\" headline\",\"A full text story, with commas.\",CNN,0,Politics,2016,01,03,31,",
            base
        )
    );

    let errors = std::fs::read_to_string(&paths.errors).unwrap();
    assert_eq!(
        errors,
        format!("FETCH error at {}/p/missing: HTTP 404\n", base)
    );

    assert_eq!(summary.total_records(), 2);
    assert_eq!(summary.validity_count(Validity::Empty), 1);
    assert_eq!(summary.records_written, 1);
    assert_eq!(summary.dropped_empty, 1);
    assert_eq!(summary.config_hash, "test-hash");
}

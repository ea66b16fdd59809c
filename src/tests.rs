use std::time::Duration;

use crate::test_server::{refused_url, Reply, TestServer};
use crate::*;

const DOCUMENT: &str = include_str!("text/testdata/client_golang.txt");

#[test]
fn test_parse_gauge_scenario() {
    let server = TestServer::start(vec![Reply::ok("metric_a{l=\"x\"} 5\n# TYPE metric_b gauge\nmetric_b 1\n")]);

    let flattened = parse(&server.url()).unwrap();

    assert_eq!(flattened["metric_a"], vec!["x", "5"]);
    assert_eq!(flattened["metric_b"], vec!["1"]);
}

#[test]
fn test_parse_full_document() {
    let server = TestServer::start(vec![Reply::ok(DOCUMENT)]);

    let flattened = parse(&server.url()).unwrap();

    assert_eq!(flattened["go_gc_duration_seconds"], vec!["0.012484631"]);
    assert_eq!(flattened["go_goroutines"], vec!["37"]);
    assert_eq!(flattened["process_start_time_seconds"], vec!["1698739260"]);
    assert!(!flattened.contains_key("http_request_duration_seconds"));
    assert_eq!(flattened.len(), 3);
}

#[test]
fn test_parse_server_error() {
    let server = TestServer::start(vec![Reply::status(500, "metric_a 1\n")]);

    match parse(&server.url()) {
        Err(Error::Network(err)) => {
            assert_eq!(err.reason(), "status");
            assert_eq!(err.code(), Some(500));
        }
        other => panic!("expected a status error, got {:?}", other),
    }
}

#[test]
fn test_parse_unreachable() {
    match parse(&refused_url()) {
        Err(Error::Network(err)) => assert_eq!(err.reason(), "transport"),
        other => panic!("expected a transport error, got {:?}", other),
    }
}

#[test]
fn test_parse_empty_document() {
    let server = TestServer::start(vec![Reply::ok("")]);

    assert!(matches!(parse(&server.url()), Err(Error::EmptyResult(_))));
}

#[test]
fn test_parse_only_histograms() {
    let server = TestServer::start(vec![Reply::ok(
        "# TYPE h histogram\nh_bucket{le=\"+Inf\"} 1\nh_sum 2\nh_count 1\n",
    )]);

    assert!(matches!(parse(&server.url()), Err(Error::EmptyResult(_))));
}

#[test]
fn test_parse_malformed_document() {
    let server = TestServer::start(vec![Reply::ok("metric_a{l=\"x} 5\n")]);

    assert!(matches!(parse(&server.url()), Err(Error::Parse(_))));
}

#[test]
fn test_parse_unknown_type() {
    let server = TestServer::start(vec![Reply::ok("# TYPE odd info\nodd 1\n")]);

    match parse(&server.url()) {
        Err(Error::UnknownType(err)) => assert_eq!(err.type_tag, "info"),
        other => panic!("expected an unknown type error, got {:?}", other),
    }
}

#[test]
fn test_parse_is_idempotent() {
    let server = TestServer::start(vec![Reply::ok(DOCUMENT), Reply::ok(DOCUMENT)]);
    let scraper = Scraper::new().unwrap();

    let first = scraper.parse(&server.url()).unwrap();
    let second = scraper.parse(&server.url()).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_scraper_families() {
    let server = TestServer::start(vec![Reply::ok(DOCUMENT)]);
    let scraper = Scraper::with_config(FetchConfig {
        timeout: Some(Duration::from_secs(5)),
        ..FetchConfig::default()
    })
    .unwrap();

    let families = scraper.families(&server.url()).unwrap();

    let types: Vec<MetricType> = families.iter().map(|f| f.family_type).collect();
    assert_eq!(
        types,
        vec![
            MetricType::Summary,
            MetricType::Gauge,
            MetricType::Histogram,
            MetricType::Gauge
        ]
    );
    match &families[2].metrics[0] {
        MetricValue::Histogram(histogram) => {
            assert_eq!(histogram.sum, "53423");
            assert_eq!(histogram.count, "144320");
            assert_eq!(histogram.buckets["+Inf"], "144320");
        }
        other => panic!("expected a histogram, got {:?}", other),
    }
}

#[test]
fn test_scraper_timeout_cancels() {
    let server = TestServer::start(vec![Reply::ok(DOCUMENT).delayed(Duration::from_secs(2))]);
    let scraper = Scraper::with_config(FetchConfig {
        timeout: Some(Duration::from_millis(200)),
        ..FetchConfig::default()
    })
    .unwrap();

    match scraper.parse(&server.url()) {
        Err(Error::Network(err)) => assert_eq!(err.reason(), "cancelled"),
        other => panic!("expected a cancelled scrape, got {:?}", other),
    }
}

#[test]
fn test_parse_exposition_without_network() {
    let flattened = parse_exposition(DOCUMENT).unwrap();

    assert_eq!(flattened["go_goroutines"], vec!["37"]);
    assert!(matches!(parse_exposition("# nothing\n"), Err(Error::EmptyResult(_))));
}

#[test]
fn test_concurrent_scrapes_share_nothing() {
    let scraper = Scraper::new().unwrap();
    let servers: Vec<TestServer> = (0..4)
        .map(|i| TestServer::start(vec![Reply::ok(&format!("worker {}\n", i))]))
        .collect();

    let handles: Vec<_> = servers
        .iter()
        .map(|server| {
            let scraper = scraper.clone();
            let url = server.url();
            std::thread::spawn(move || scraper.parse(&url).unwrap())
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let flattened = handle.join().unwrap();
        assert_eq!(flattened["worker"], vec![i.to_string()]);
    }
}

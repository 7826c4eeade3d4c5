use rfetch::{
    error::WrongVariantError, middleware::Middleware, outcome::Variant, ConfigError,
    FetchConfig, Fetcher, Outcome, PageFailure, PageOutcome, Target,
};
use std::{
    io,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    thread,
    time::Duration,
};
use tools::{Expected, FakeConnector, Script, TestCaseBuilder};


#[test]
fn test_success_returns_body_unchanged() -> anyhow::Result<()> {
    let outcome = TestCaseBuilder::new(Some("https://www.example.com"))
        .name("example.com")
        .reply(200, "hello")
        .expect(Expected::Success("hello".into()))
        .connects(1)
        .run()?;

    assert!(outcome.eval());
    assert_eq!(outcome.unwrap()?, "hello");

    TestCaseBuilder::new(Some("https://www.example.com/created"))
        .name("201 with unicode body")
        .reply(201, "zażółć\r\n\tgęślą")
        .expect(Expected::Success("zażółć\r\n\tgęślą".into()))
        .run()?;

    TestCaseBuilder::new(Some("https://www.example.com/empty"))
        .name("upper bound of success range")
        .reply(299, "")
        .expect(Expected::Success(String::new()))
        .run()?;

    Ok(())
}

#[test]
fn test_non_success_status_is_failure_value() -> anyhow::Result<()> {
    let outcome = TestCaseBuilder::new(Some("https://www.example.com/nosuchpage"))
        .name("404")
        .reply(404, "<h1>Not Found</h1>")
        .expect(Expected::Value(PageFailure::Status(404)))
        .connects(1)
        .run()?;

    assert!(!outcome.eval());
    assert_eq!(outcome.failure().and_then(PageFailure::status), Some(404));
    assert_eq!(
        outcome.unwrap().unwrap_err(),
        WrongVariantError::new(Variant::FailureValue)
    );

    for status in [100, 199, 304, 500, 503] {
        TestCaseBuilder::new(Some("https://www.example.com/"))
            .name(status)
            .reply(status, "body is dropped")
            .expect(Expected::Value(PageFailure::Status(status)))
            .run()?;
    }

    Ok(())
}

#[test]
fn test_transport_faults_are_captured() -> anyhow::Result<()> {
    let outcome = TestCaseBuilder::new(Some("https://www.cannotfindthisdomain.com"))
        .name("dns failure")
        .script(Script::FailConnect(
            io::ErrorKind::NotFound,
            "failed to lookup address information",
        ))
        .expect(Expected::Exception(io::ErrorKind::NotFound))
        .connects(0)
        .run()?;

    match &outcome {
        Outcome::FailureException(fe) => {
            let message = format!("{:#}", fe.cause());
            assert!(message.contains("could not connect to https://www.cannotfindthisdomain.com/"));
            assert!(message.contains("failed to lookup address information"));
        }
        Outcome::Success(_) | Outcome::FailureValue(_) => panic!("expected a fault"),
    }
    assert_eq!(
        outcome.unwrap().unwrap_err().found(),
        Variant::FailureException
    );

    TestCaseBuilder::new(Some("https://www.example.com/slow"))
        .name("timeout mid exchange")
        .script(Script::FailGet(io::ErrorKind::TimedOut, "read timed out"))
        .expect(Expected::Exception(io::ErrorKind::TimedOut))
        .connects(1)
        .run()?;

    TestCaseBuilder::new(Some("https://www.example.com/reset"))
        .name("reset mid exchange")
        .script(Script::FailGet(io::ErrorKind::ConnectionReset, "reset by peer"))
        .expect(Expected::Exception(io::ErrorKind::ConnectionReset))
        .connects(1)
        .run()?;

    Ok(())
}

#[test]
fn test_missing_url_is_rejected_before_io() -> anyhow::Result<()> {
    for (name, url) in [("none", None), ("empty", Some("")), ("blank", Some("  \t"))] {
        TestCaseBuilder::new(url)
            .name(name)
            .expect(Expected::Value(PageFailure::MissingUrl))
            .connects(0)
            .run()?;
    }
    Ok(())
}

#[test]
fn test_invalid_url_is_rejected_before_io() -> anyhow::Result<()> {
    let outcome = TestCaseBuilder::new(Some("www.example.com"))
        .name("no scheme")
        .connects(0)
        .run()?;

    match outcome.failure() {
        Some(PageFailure::InvalidUrl { url, .. }) => assert_eq!(url, "www.example.com"),
        other => panic!("expected invalid url, got {:?}", other),
    }

    TestCaseBuilder::new(Some("https://exa mple.com"))
        .name("space in host")
        .connects(0)
        .run()
        .map(|outcome| assert!(outcome.is_failure_value()))
}

#[test]
fn test_disallowed_scheme_is_rejected_before_io() -> anyhow::Result<()> {
    TestCaseBuilder::new(Some("http://www.example.com"))
        .name("plain http")
        .expect(Expected::Value(PageFailure::DisallowedScheme("http".into())))
        .connects(0)
        .run()?;

    TestCaseBuilder::new(Some("HTTP://www.example.com"))
        .name("plain http, upper case")
        .expect(Expected::Value(PageFailure::DisallowedScheme("http".into())))
        .connects(0)
        .run()?;

    TestCaseBuilder::new(Some("ftp://files.example.com/a"))
        .name("configured scheme")
        .config(FetchConfig::default().disallow_scheme("FTP"))
        .expect(Expected::Value(PageFailure::DisallowedScheme("ftp".into())))
        .connects(0)
        .run()?;

    TestCaseBuilder::new(Some("http://www.example.com"))
        .name("http allowed by config")
        .config(FetchConfig::default().allow_scheme("http"))
        .reply(200, "plain")
        .expect(Expected::Success("plain".into()))
        .connects(1)
        .run()?;

    Ok(())
}

#[test]
fn test_connector_receives_validated_target() -> anyhow::Result<()> {
    let connector = FakeConnector::new(Script::Respond(200, "ok".into()));
    let counters = connector.counters();
    let fetcher = Fetcher::with_connector(connector);

    fetcher.get_page(Some("  https://Example.com:8443/a/b?q=1  "));

    let targets = counters.targets.lock().map_err(|_| anyhow::anyhow!("poisoned"))?;
    assert_eq!(*targets, vec!["https://example.com:8443/a/b?q=1".to_string()]);
    Ok(())
}

#[derive(Clone, Default)]
struct Recorder {
    requests: Arc<Mutex<Vec<String>>>,
    outcomes: Arc<Mutex<Vec<Variant>>>,
    refuse: bool,
}

impl Middleware for Recorder {
    fn on_request(&self, target: &Target) -> anyhow::Result<()> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(target.host().to_string());
        }
        if self.refuse {
            anyhow::bail!("blocked host {}", target.host());
        }
        Ok(())
    }

    fn on_outcome(&self, outcome: &PageOutcome) {
        if let Ok(mut outcomes) = self.outcomes.lock() {
            outcomes.push(outcome.variant());
        }
    }
}

#[test]
fn test_middleware_sees_every_outcome() {
    tools::init_logger();

    let recorder = Recorder::default();
    let fetcher = Fetcher::with_connector(FakeConnector::new(Script::Respond(404, "".into())))
        .middleware(rfetch::middleware::LogMiddleware {})
        .middleware(recorder.clone());

    fetcher.get_page(None);
    fetcher.get_page(Some("http://www.example.com"));
    fetcher.get_page(Some("https://www.example.com/nosuchpage"));

    assert_eq!(
        *recorder.requests.lock().expect("lock"),
        vec!["www.example.com".to_string()]
    );
    assert_eq!(
        *recorder.outcomes.lock().expect("lock"),
        vec![
            Variant::FailureValue,
            Variant::FailureValue,
            Variant::FailureValue
        ]
    );
}

#[test]
fn test_refusing_middleware_prevents_connect() {
    tools::init_logger();

    let connector = FakeConnector::new(Script::Respond(200, "never".into()));
    let counters = connector.counters();
    let recorder = Recorder {
        refuse: true,
        ..Default::default()
    };
    let fetcher = Fetcher::with_connector(connector).middleware(recorder.clone());

    let outcome = fetcher.get_page(Some("https://www.example.com"));

    match outcome {
        Outcome::FailureException(fe) => {
            assert_eq!(fe.cause().to_string(), "blocked host www.example.com")
        }
        Outcome::Success(_) | Outcome::FailureValue(_) => panic!("expected a fault"),
    }
    assert_eq!(counters.connects(), 0);
    assert_eq!(
        *recorder.outcomes.lock().expect("lock"),
        vec![Variant::FailureException]
    );
}

#[test]
fn test_fetcher_is_shared_across_threads() {
    tools::init_logger();

    let connector = FakeConnector::new(Script::Respond(200, "shared".into()));
    let counters = connector.counters();
    let fetcher = Arc::new(Fetcher::with_connector(connector));
    let successes = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let fetcher = fetcher.clone();
            let successes = successes.clone();
            thread::spawn(move || {
                if fetcher.get_page(Some("https://www.example.com")).eval() {
                    successes.fetch_add(1, Ordering::SeqCst);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("thread panicked");
    }

    assert_eq!(successes.load(Ordering::SeqCst), 8);
    assert_eq!(counters.connects(), 8);
    assert_eq!(counters.releases(), 8);
}

#[test]
fn test_invalid_config_is_refused_before_fetching() {
    let connector = FakeConnector::new(Script::Respond(200, "unused".into()));
    let counters = connector.counters();

    let refused = Fetcher::with_connector(connector)
        .config(FetchConfig::default().request_timeout(Duration::ZERO))
        .err();
    assert!(matches!(
        refused,
        Some(ConfigError::ZeroTimeout("request_timeout_ms"))
    ));
    assert_eq!(counters.connects(), 0);

    let err = TestCaseBuilder::new(Some("https://www.example.com"))
        .name("zero connect timeout")
        .config(FetchConfig::default().connect_timeout(Duration::from_micros(10)))
        .run()
        .err()
        .expect("builder path validates the config");
    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::ZeroTimeout("connect_timeout_ms"))
    ));
}

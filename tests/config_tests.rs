use std::sync::Arc;

use http::Response;
use routekit::router::{
    DataGenerator, DispatchData, ParsedRoute, RadixGenerator, RadixMatcher, StdParser,
};
use routekit::runtime_config::RoutingSettings;
use routekit::{handler, Fallthrough, Routing, RoutingConfig, RoutingError};

mod common;
use common::builder;

fn assert_configuration_error<T: std::fmt::Debug>(result: Result<T, RoutingError>, needle: &str) {
    match result {
        Err(RoutingError::Configuration(msg)) => {
            assert!(msg.contains(needle), "'{msg}' should mention '{needle}'")
        }
        other => panic!("expected Configuration error, got {other:?}"),
    }
}

#[test]
fn test_each_missing_collaborator_is_named() {
    let collection = |r: &mut routekit::RouteCollector<String>| {
        r.get("/", "ControllerStub:handleRequest");
    };

    assert_configuration_error(
        RoutingConfig::<String>::builder()
            .parser(Arc::new(StdParser::new()))
            .generator(Arc::new(RadixGenerator::new()))
            .dispatcher(|_data| None)
            .build(),
        "collection",
    );
    assert_configuration_error(
        RoutingConfig::builder()
            .collection(collection)
            .generator(Arc::new(RadixGenerator::new()))
            .dispatcher(|_data| None)
            .build(),
        "parser",
    );
    assert_configuration_error(
        RoutingConfig::builder()
            .collection(collection)
            .parser(Arc::new(StdParser::new()))
            .dispatcher(|_data| None)
            .build(),
        "generator",
    );
    assert_configuration_error(
        RoutingConfig::builder()
            .collection(collection)
            .parser(Arc::new(StdParser::new()))
            .generator(Arc::new(RadixGenerator::new()))
            .build(),
        "dispatcher",
    );
}

#[test]
fn test_cache_enabled_without_driver_is_rejected() {
    assert_configuration_error(
        builder(|r| {
            r.get("/", "ControllerStub:handleRequest");
        })
        .cache(true)
        .build(),
        "cache driver",
    );
}

#[test]
fn test_dispatcher_factory_without_matcher_fails_construction() {
    let config = builder(|r| {
        r.get("/", "ControllerStub:handleRequest");
    })
    .dispatcher(|_data| None)
    .build()
    .unwrap();

    assert_configuration_error(Routing::new(config), "no matcher");
}

struct ForeignGenerator;

impl DataGenerator for ForeignGenerator {
    fn generate(&self, _routes: &[ParsedRoute]) -> Result<DispatchData, RoutingError> {
        Ok(DispatchData {
            generator: "group-count/v1".to_string(),
            payload: serde_json::json!([]),
        })
    }
}

#[test]
fn test_radix_factory_rejects_foreign_dispatch_data() {
    let config = builder(|r| {
        r.get("/", "ControllerStub:handleRequest");
    })
    .generator(Arc::new(ForeignGenerator))
    .dispatcher_factory(RadixMatcher::factory())
    .build()
    .unwrap();

    assert_configuration_error(Routing::new(config), "group-count/v1");
}

#[test]
fn test_rejected_registrations_fail_construction() {
    let config = builder(|r| {
        r.get("/ok", "ControllerStub:handleRequest");
        r.get("/bad", "no-separator");
        r.add_route("not a method", "/x", "ControllerStub:handleRequest");
        r.add_route(Vec::<&str>::new(), "/y", "ControllerStub:handleRequest");
    })
    .build()
    .unwrap();

    let err = Routing::new(config).unwrap_err();
    match err {
        RoutingError::Configuration(msg) => {
            assert!(msg.contains("/bad"), "{msg}");
            assert!(msg.contains("/x"), "{msg}");
            assert!(msg.contains("/y"), "{msg}");
        }
        other => panic!("expected Configuration error, got {other:?}"),
    }
}

#[test]
fn test_invalid_pattern_is_compile_error() {
    let config = builder(|r| {
        r.get("/users/{id:(}", handler(|_req, res: Response<String>, _params| res));
    })
    .build()
    .unwrap();

    assert!(matches!(Routing::new(config), Err(RoutingError::Compile(_))));
}

#[test]
fn test_settings_are_applied_to_builder() {
    let dir = tempfile::tempdir().unwrap();
    let yaml = format!(
        "cache: true\ncache_dir: {}\ncache_key: app.routes\nfallthrough: delegate\n",
        dir.path().display()
    );
    let settings = RoutingSettings::from_yaml_str(&yaml).unwrap();

    let config = builder(|r| {
        r.get("/", "ControllerStub:handleRequest");
    })
    .settings(&settings)
    .build()
    .unwrap();
    assert!(config.cache_enabled());
    assert_eq!(config.fallthrough(), Fallthrough::Delegate);

    let routing = Routing::new(config).unwrap();
    let entry = dir
        .path()
        .read_dir()
        .unwrap()
        .filter_map(Result::ok)
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .find(|name| name.ends_with(".cache"))
        .expect("cache entry written");
    assert!(entry.contains(routing.fingerprint()), "{entry}");
}

#[test]
fn test_empty_cache_key_prefix_is_rejected() {
    assert_configuration_error(
        builder(|r| {
            r.get("/", "ControllerStub:handleRequest");
        })
        .cache(true)
        .cache_driver(Arc::new(routekit::cache::MemoryCache::new()))
        .cache_key("  ")
        .build(),
        "prefix",
    );
}

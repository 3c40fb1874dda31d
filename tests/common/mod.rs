#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use http::{Method, Request, Response, StatusCode};
use routekit::collector::RouteCollector;
use routekit::handlers::{ActionTable, Controller, ControllerRegistry, Reply};
use routekit::router::{DataGenerator, DispatchData, ParsedRoute, RadixGenerator};
use routekit::{Routing, RoutingConfig, RoutingConfigBuilder, RoutingError};

/// Controller used by the deferred-handler scenarios
#[derive(Default)]
pub struct ControllerStub;

impl Controller<String> for ControllerStub {
    fn actions() -> ActionTable<Self, String> {
        ActionTable::new()
            .action("handleRequest", |_c, _req, mut res, _params| {
                *res.status_mut() = StatusCode::OK;
                Reply::Response(res)
            })
            .action("invalidReturnHandler", |_c, _req, _res, _params| {
                Reply::Value(serde_json::json!({"not": "a response"}))
            })
            .action("echoParams", |_c, _req, mut res, params| {
                *res.body_mut() = params
                    .iter()
                    .map(|(k, v)| format!("{k}={v}"))
                    .collect::<Vec<_>>()
                    .join("&");
                Reply::Response(res)
            })
    }
}

/// Controller whose factory always fails
pub struct UnavailableController;

impl Controller<String> for UnavailableController {
    fn actions() -> ActionTable<Self, String> {
        ActionTable::new().action("handleRequest", |_c, _req, res, _params| Reply::Response(res))
    }
}

pub fn controllers() -> ControllerRegistry<String> {
    let mut registry = ControllerRegistry::new();
    registry.register::<ControllerStub>("ControllerStub");
    registry.register_with("UnavailableController", || -> anyhow::Result<UnavailableController> {
        anyhow::bail!("backing service is down")
    });
    registry
}

/// Generator that counts how often it runs
#[derive(Default)]
pub struct CountingGenerator {
    inner: RadixGenerator,
    calls: AtomicUsize,
}

impl CountingGenerator {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DataGenerator for CountingGenerator {
    fn generate(&self, routes: &[ParsedRoute]) -> Result<DispatchData, RoutingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.generate(routes)
    }
}

/// Standard builder over `collection` with the stub controllers registered
pub fn builder<F>(collection: F) -> RoutingConfigBuilder<String>
where
    F: FnOnce(&mut RouteCollector<String>) + Send + 'static,
{
    RoutingConfig::standard(collection).controllers(controllers())
}

pub fn routing<F>(collection: F) -> Routing<String>
where
    F: FnOnce(&mut RouteCollector<String>) + Send + 'static,
{
    Routing::new(builder(collection).build().expect("valid configuration"))
        .expect("routing builds")
}

pub fn request(method: Method, path: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(path)
        .body(String::new())
        .expect("valid request")
}

pub fn response() -> Response<String> {
    Response::new(String::new())
}

pub fn counting_generator() -> Arc<CountingGenerator> {
    Arc::new(CountingGenerator::default())
}

//! Route table compilation.
//!
//! Runs every collected pattern through the configured [`RouteParser`] and
//! hands the parsed routes to the configured [`DataGenerator`]. Pure: the
//! same route set always compiles to the same [`DispatchData`].

use std::sync::Arc;

use tracing::{debug, info};

use crate::collector::RouteSet;
use crate::error::RoutingError;
use crate::router::{DataGenerator, DispatchData, ParsedRoute, RouteParser};

/// Parser + generator pair that turns a [`RouteSet`] into dispatch data.
#[derive(Clone)]
pub struct Compiler {
    parser: Arc<dyn RouteParser>,
    generator: Arc<dyn DataGenerator>,
}

impl Compiler {
    /// Create a compiler from its two collaborators
    pub fn new(parser: Arc<dyn RouteParser>, generator: Arc<dyn DataGenerator>) -> Self {
        Self { parser, generator }
    }

    /// Compile a route set.
    ///
    /// # Errors
    ///
    /// [`RoutingError::Compile`] when a pattern does not parse or the
    /// generator rejects the table (duplicate routes and the like).
    pub fn compile<B>(&self, routes: &RouteSet<B>) -> Result<DispatchData, RoutingError> {
        let start = std::time::Instant::now();
        let mut parsed = Vec::with_capacity(routes.len());

        for entry in routes.routes() {
            let variants = self.parser.parse(&entry.pattern)?;
            debug!(
                method = %entry.method,
                pattern = %entry.pattern,
                variants = variants.len(),
                "Route pattern parsed"
            );
            parsed.extend(variants.into_iter().map(|segments| ParsedRoute {
                method: entry.method.clone(),
                pattern: entry.pattern.clone(),
                segments,
                handler: entry.handler.clone(),
            }));
        }

        let data = self.generator.generate(&parsed)?;

        info!(
            routes_count = routes.len(),
            variants_count = parsed.len(),
            generator = %data.generator,
            duration_us = start.elapsed().as_micros() as u64,
            "Route table compiled"
        );
        Ok(data)
    }
}

impl std::fmt::Debug for Compiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compiler").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::RouteCollector;
    use crate::router::{RadixGenerator, StdParser};

    fn compiler() -> Compiler {
        Compiler::new(Arc::new(StdParser::new()), Arc::new(RadixGenerator::new()))
    }

    fn route_set(f: impl FnOnce(&mut RouteCollector<String>)) -> RouteSet<String> {
        let mut c = RouteCollector::new();
        f(&mut c);
        c.into_route_set().unwrap()
    }

    #[test]
    fn test_compile_is_deterministic() {
        let build = || {
            route_set(|c| {
                c.get("/", "Home:index");
                c.add_route(["GET", "POST"], "/users[/{id:\\d+}]", "Users:handle");
            })
        };
        let a = compiler().compile(&build()).unwrap();
        let b = compiler().compile(&build()).unwrap();
        assert_eq!(a.to_bytes().unwrap(), b.to_bytes().unwrap());
    }

    #[test]
    fn test_parse_errors_are_compile_errors() {
        let set = route_set(|c| {
            c.get("/users/{id", "Users:show");
        });
        assert!(matches!(
            compiler().compile(&set),
            Err(RoutingError::Compile(_))
        ));
    }

    #[test]
    fn test_duplicate_routes_are_compile_errors() {
        let set = route_set(|c| {
            c.get("/users/{id}", "Users:show");
            c.get("/users/{id}", "Users:other");
        });
        assert!(matches!(
            compiler().compile(&set),
            Err(RoutingError::Compile(_))
        ));
    }
}

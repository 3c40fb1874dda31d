use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use http::{Request, Response};
use tracing::debug;

use super::types::{HandlerFn, Reply};
use crate::error::RoutingError;
use crate::router::ParamVec;

/// A named controller action.
pub type Action<C, B> = fn(&C, &Request<B>, Response<B>, &ParamVec) -> Reply<B>;

/// Map from action names to controller methods.
///
/// ```rust
/// use routekit::handlers::{ActionTable, Controller, Reply};
///
/// #[derive(Default)]
/// struct Health;
///
/// impl Controller<String> for Health {
///     fn actions() -> ActionTable<Self, String> {
///         ActionTable::new().action("check", |_c, _req, res, _params| Reply::Response(res))
///     }
/// }
///
/// assert!(Health::actions().get("check").is_some());
/// ```
pub struct ActionTable<C, B> {
    actions: HashMap<String, Action<C, B>>,
}

impl<C, B> ActionTable<C, B> {
    /// Create an empty table
    #[must_use]
    pub fn new() -> Self {
        Self {
            actions: HashMap::new(),
        }
    }

    /// Add an action, replacing one with the same name
    #[must_use]
    pub fn action(mut self, name: &str, action: Action<C, B>) -> Self {
        self.actions.insert(name.to_string(), action);
        self
    }

    /// Look up an action by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Action<C, B>> {
        self.actions.get(name).copied()
    }

    /// Action names, sorted
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.actions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl<C, B> Default for ActionTable<C, B> {
    fn default() -> Self {
        Self::new()
    }
}

/// A type whose instances handle deferred `Class:method` routes.
pub trait Controller<B>: Send + Sync + Sized + 'static {
    /// The actions this controller publishes
    fn actions() -> ActionTable<Self, B>;
}

/// Builds a handler for one action of a registered controller
type Binder<B> = Arc<dyn Fn(&str) -> Result<HandlerFn<B>, String> + Send + Sync>;

/// Lookup table from controller names to typed factories, populated at
/// startup and read at dispatch time.
pub struct ControllerRegistry<B> {
    controllers: HashMap<String, Binder<B>>,
}

impl<B: 'static> ControllerRegistry<B> {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            controllers: HashMap::new(),
        }
    }

    /// Register a controller constructed with `Default` on every dispatch
    pub fn register<C>(&mut self, name: &str) -> &mut Self
    where
        C: Controller<B> + Default,
    {
        self.register_with(name, || Ok(C::default()))
    }

    /// Register a controller built by a fallible factory on every dispatch.
    ///
    /// A factory error surfaces as [`RoutingError::HandlerResolution`] for the
    /// request being dispatched.
    pub fn register_with<C, F>(&mut self, name: &str, factory: F) -> &mut Self
    where
        C: Controller<B>,
        F: Fn() -> anyhow::Result<C> + Send + Sync + 'static,
    {
        let actions = Arc::new(C::actions());
        debug!(controller = %name, actions = ?actions.names(), "Controller registered");

        let controller = name.to_string();
        let binder: Binder<B> = Arc::new(move |method: &str| {
            let action = actions
                .get(method)
                .ok_or_else(|| format!("controller '{controller}' has no action '{method}'"))?;
            let instance = factory()
                .map_err(|e| format!("controller '{controller}' could not be created: {e:#}"))?;
            let handler: HandlerFn<B> =
                Arc::new(move |req: &Request<B>, res: Response<B>, params: &ParamVec| {
                    action(&instance, req, res, params)
                });
            Ok(handler)
        });
        self.controllers.insert(name.to_string(), binder);
        self
    }

    /// Whether a controller is registered under `name`
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.controllers.contains_key(name)
    }

    /// Registered controller names, sorted
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.controllers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Create a fresh controller instance and bind `method` on it.
    ///
    /// # Errors
    ///
    /// [`RoutingError::HandlerResolution`] for an unknown class, an unknown
    /// action or a failing factory.
    pub fn bind(&self, class: &str, method: &str) -> Result<HandlerFn<B>, RoutingError> {
        let resolution_error = |reason: String| RoutingError::HandlerResolution {
            handler: format!("{class}:{method}"),
            reason,
        };
        let binder = self
            .controllers
            .get(class)
            .ok_or_else(|| resolution_error(format!("no controller registered as '{class}'")))?;
        binder(method).map_err(resolution_error)
    }
}

impl<B: 'static> Default for ControllerRegistry<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B> fmt::Debug for ControllerRegistry<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.controllers.keys().collect();
        names.sort_unstable();
        f.debug_struct("ControllerRegistry")
            .field("controllers", &names)
            .finish()
    }
}

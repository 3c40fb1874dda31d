use http::{Method, Response, StatusCode};
use routekit::{handler, Reply, RoutingError};

mod common;
use common::{request, response, routing};

#[test]
fn test_get_root_returns_handler_response() {
    let routing = routing(|r| {
        r.get(
            "/",
            handler(|_req, mut res: Response<String>, _params| {
                *res.body_mut() = "root".to_string();
                res
            }),
        );
    });

    let res = routing.dispatch(&request(Method::GET, "/"), response()).unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.body(), "root");
}

#[test]
fn test_unknown_path_is_route_not_found() {
    let routing = routing(|r| {
        r.get("/", handler(|_req, res: Response<String>, _params| res));
    });

    let err = routing
        .dispatch(&request(Method::GET, "/home"), response())
        .unwrap_err();
    match &err {
        RoutingError::RouteNotFound { method, path } => {
            assert_eq!(method, Method::GET);
            assert_eq!(path, "/home");
        }
        other => panic!("expected RouteNotFound, got {other:?}"),
    }
    assert_eq!(err.status(), StatusCode::NOT_FOUND);
}

#[test]
fn test_wrong_method_is_method_not_allowed() {
    let routing = routing(|r| {
        r.get("/", handler(|_req, res: Response<String>, _params| res));
    });

    let err = routing
        .dispatch(&request(Method::POST, "/"), response())
        .unwrap_err();
    match &err {
        RoutingError::MethodNotAllowed { allowed, .. } => assert_eq!(allowed, &[Method::GET]),
        other => panic!("expected MethodNotAllowed, got {other:?}"),
    }
    assert_eq!(err.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(err.allow_header().as_deref(), Some("GET"));
}

#[test]
fn test_deferred_handler_resolves_and_runs() {
    let routing = routing(|r| {
        r.get("/", "ControllerStub:handleRequest");
    });

    let res = routing.dispatch(&request(Method::GET, "/"), response()).unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[test]
fn test_unresolvable_handlers_fail_at_dispatch_not_construction() {
    // Construction succeeds: deferred references are only resolved per request
    let routing = routing(|r| {
        r.get("/", "ControllerStub:missingMethod");
        r.get("/class", "MissingClass:anything");
        r.get("/down", "UnavailableController:handleRequest");
    });

    for path in ["/", "/class", "/down"] {
        let err = routing
            .dispatch(&request(Method::GET, path), response())
            .unwrap_err();
        assert!(
            matches!(err, RoutingError::HandlerResolution { .. }),
            "{path}: {err:?}"
        );
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

#[test]
fn test_invalid_handler_return_is_invalid_response() {
    let routing = routing(|r| {
        r.get("/", "ControllerStub:invalidReturnHandler");
        r.get("/inline", handler(|_req, _res: Response<String>, _params| Reply::Empty));
    });

    for path in ["/", "/inline"] {
        let err = routing
            .dispatch(&request(Method::GET, path), response())
            .unwrap_err();
        assert!(matches!(err, RoutingError::InvalidResponse { .. }), "{path}: {err:?}");
    }
}

#[test]
fn test_path_params_are_decoded_and_normalized() {
    let routing = routing(|r| {
        r.add_group("/users", |users| {
            users.get("/{id:\\d+}/posts/{slug}", "ControllerStub:echoParams");
        });
    });

    let res = routing
        .dispatch(
            &request(Method::GET, "//users/42//posts/hello%20world?page=2"),
            response(),
        )
        .unwrap();
    assert_eq!(res.body(), "id=42&slug=hello world");

    let err = routing
        .dispatch(&request(Method::GET, "/users/abc/posts/x"), response())
        .unwrap_err();
    assert!(matches!(err, RoutingError::RouteNotFound { .. }));
}

#[test]
fn test_head_uses_get_route_and_optional_segments_match() {
    let routing = routing(|r| {
        r.get("/archive[/{year:\\d{4}}[/{month:\\d{2}}]]", "ControllerStub:echoParams");
    });

    for (path, body) in [
        ("/archive", ""),
        ("/archive/2024", "year=2024"),
        ("/archive/2024/05", "year=2024&month=05"),
    ] {
        let res = routing.dispatch(&request(Method::GET, path), response()).unwrap();
        assert_eq!(res.body(), body);
    }

    let res = routing
        .dispatch(&request(Method::HEAD, "/archive"), response())
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[test]
fn test_dispatch_is_idempotent() {
    let routing = routing(|r| {
        r.get("/", handler(|_req, res: Response<String>, _params| res));
    });

    for _ in 0..5 {
        assert!(routing.dispatch(&request(Method::GET, "/"), response()).is_ok());
        assert!(matches!(
            routing.dispatch(&request(Method::GET, "/home"), response()),
            Err(RoutingError::RouteNotFound { .. })
        ));
        assert!(matches!(
            routing.dispatch(&request(Method::POST, "/"), response()),
            Err(RoutingError::MethodNotAllowed { .. })
        ));
    }
}

#[test]
fn test_multi_method_registration_lists_all_allowed_methods() {
    let routing = routing(|r| {
        r.add_route(["get", "put", "delete"], "/items/{id}", "ControllerStub:handleRequest");
    });

    for method in [Method::GET, Method::PUT, Method::DELETE] {
        assert!(routing.dispatch(&request(method, "/items/1"), response()).is_ok());
    }
    let err = routing
        .dispatch(&request(Method::POST, "/items/1"), response())
        .unwrap_err();
    assert_eq!(err.allow_header().as_deref(), Some("DELETE, GET, PUT"));
}

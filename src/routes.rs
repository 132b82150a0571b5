//! Front controller: the route table and the 404 diagnostics for paths
//! that miss it.
//!
//! URLs follow `/{controller}/{action}/{params...}`. `index` is the default
//! action and `home` the default controller, so `/` is `home/index` and
//! `/mypage` is `mypage/index`.

use std::fmt;

use axum::{
    extract::{Request, State},
    response::{IntoResponse, Response},
    routing::{get, post, MethodRouter},
    Router,
};
use tower::ServiceExt;
use tracing::debug;

use crate::{
    controllers::{home, login, mypage},
    error::AppError,
    state::AppState,
};

pub const DEFAULT_CONTROLLER: &str = "home";
pub const DEFAULT_ACTION: &str = "index";

#[derive(Debug)]
pub struct Route {
    /// First path segment, e.g. `login`.
    pub controller: &'static str,
    pub action: &'static str,
    pub handler: fn() -> MethodRouter<AppState>,
}

pub static ROUTES: &[Route] = &[
    Route {
        controller: "home",
        action: "index",
        handler: || get(home::index),
    },
    Route {
        controller: "login",
        action: "index",
        handler: || get(login::index).post(login::index),
    },
    Route {
        controller: "login",
        action: "authenticate",
        handler: || post(login::authenticate),
    },
    Route {
        controller: "login",
        action: "logout",
        handler: || post(login::logout),
    },
    Route {
        controller: "mypage",
        action: "index",
        handler: || get(mypage::index),
    },
    Route {
        controller: "mypage",
        action: "profile",
        handler: || get(mypage::profile),
    },
];

impl Route {
    /// Every URL this action answers on. Trailing params are accepted and
    /// ignored since no action takes any.
    fn paths(&self) -> Vec<String> {
        let mut paths = Vec::with_capacity(4);
        if self.action == DEFAULT_ACTION {
            if self.controller == DEFAULT_CONTROLLER {
                paths.push("/".to_string());
            }
            paths.push(format!("/{}", self.controller));
        }
        paths.push(format!("/{}/{}", self.controller, self.action));
        paths.push(format!("/{}/{}/*params", self.controller, self.action));
        paths
    }
}

/// `login` -> `LoginController`.
pub fn controller_name(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => format!("{}{}Controller", first.to_uppercase(), chars.as_str()),
        None => "Controller".to_string(),
    }
}

/// A request path split into its routing parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePath {
    pub controller: String,
    pub action: String,
    pub params: Vec<String>,
}

impl RoutePath {
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or("");
        let mut segments = path.trim_matches('/').split('/');
        let controller = segments
            .next()
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_CONTROLLER)
            .to_string();
        let action = segments
            .next()
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_ACTION)
            .to_string();
        Self {
            controller,
            action,
            params: segments.map(str::to_string).collect(),
        }
    }

    pub fn controller_name(&self) -> String {
        controller_name(&self.controller)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteMiss {
    Controller { controller: String },
    Action { controller: String, action: String },
}

impl fmt::Display for RouteMiss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteMiss::Controller { controller } => {
                write!(f, "404 Not Found - Controller '{controller}' not found")
            }
            RouteMiss::Action { controller, action } => {
                write!(f, "404 Not Found - Action '{action}' not found in {controller}")
            }
        }
    }
}

/// Looks the path up in [`ROUTES`]. Controllers match on their class name,
/// so `/Login` and `/login` both reach `LoginController`; actions match
/// exactly.
pub fn resolve(path: &str) -> Result<(&'static Route, RoutePath), RouteMiss> {
    let parsed = RoutePath::parse(path);
    let wanted = parsed.controller_name();
    let mut candidates = ROUTES
        .iter()
        .filter(|r| controller_name(r.controller) == wanted)
        .peekable();
    if candidates.peek().is_none() {
        return Err(RouteMiss::Controller {
            controller: parsed.controller_name(),
        });
    }
    match candidates.find(|r| r.action == parsed.action) {
        Some(route) => Ok((route, parsed)),
        None => Err(RouteMiss::Action {
            controller: parsed.controller_name(),
            action: parsed.action.clone(),
        }),
    }
}

/// Mounts every table entry on its URLs.
pub fn router() -> Router<AppState> {
    ROUTES
        .iter()
        .fold(Router::new(), |router, route| {
            route
                .paths()
                .iter()
                .fold(router, |router, path| router.route(path, (route.handler)()))
        })
        .fallback(front_controller)
}

/// Paths the mounted table doesn't match verbatim. Spellings that still
/// resolve (`/Login`, `//mypage`) are dispatched to their action; the rest
/// get the diagnostic 404.
async fn front_controller(State(state): State<AppState>, req: Request) -> Response {
    let path = req.uri().path().to_owned();
    match resolve(&path) {
        Ok((route, _)) => {
            debug!(
                path = %path,
                controller = route.controller,
                action = route.action,
                "dispatching unmounted spelling"
            );
            let method_router = (route.handler)().with_state::<()>(state);
            match method_router.oneshot(req).await {
                Ok(res) => res,
                Err(never) => match never {},
            }
        }
        Err(miss) => {
            debug!(path = %path, "unresolved route");
            AppError::RouteNotFound(miss.to_string()).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_defaults_to_home_index() {
        let parsed = RoutePath::parse("/");
        assert_eq!(parsed.controller_name(), "HomeController");
        assert_eq!(parsed.action, "index");
        assert!(parsed.params.is_empty());
        assert_eq!(RoutePath::parse(""), parsed);
    }

    #[test]
    fn parse_splits_controller_action_params() {
        let parsed = RoutePath::parse("/login/authenticate/a/b?x=1");
        assert_eq!(parsed.controller_name(), "LoginController");
        assert_eq!(parsed.action, "authenticate");
        assert_eq!(parsed.params, ["a", "b"]);

        let parsed = RoutePath::parse("/mypage/");
        assert_eq!(parsed.controller_name(), "MypageController");
        assert_eq!(parsed.action, "index");
    }

    #[test]
    fn resolve_known_routes() {
        let (route, _) = resolve("/").unwrap();
        assert_eq!((route.controller, route.action), ("home", "index"));

        let (route, _) = resolve("/mypage").unwrap();
        assert_eq!((route.controller, route.action), ("mypage", "index"));

        let (route, parsed) = resolve("/login/logout/extra").unwrap();
        assert_eq!((route.controller, route.action), ("login", "logout"));
        assert_eq!(parsed.params, ["extra"]);
    }

    #[test]
    fn resolve_reports_missing_controller() {
        let miss = resolve("/nosuchthing").unwrap_err();
        assert_eq!(
            miss,
            RouteMiss::Controller {
                controller: "NosuchthingController".into()
            }
        );
        assert_eq!(
            miss.to_string(),
            "404 Not Found - Controller 'NosuchthingController' not found"
        );
    }

    #[test]
    fn resolve_matches_capitalised_controller() {
        let (route, parsed) = resolve("/Login").unwrap();
        assert_eq!((route.controller, route.action), ("login", "index"));
        assert_eq!(parsed.controller_name(), "LoginController");

        let (route, _) = resolve("/Mypage/profile").unwrap();
        assert_eq!((route.controller, route.action), ("mypage", "profile"));

        // only the first letter is folded
        assert_eq!(
            resolve("/LOGIN").unwrap_err().to_string(),
            "404 Not Found - Controller 'LOGINController' not found"
        );
    }

    #[test]
    fn resolve_reports_missing_action() {
        let miss = resolve("/mypage/delete").unwrap_err();
        assert_eq!(
            miss.to_string(),
            "404 Not Found - Action 'delete' not found in MypageController"
        );
    }

    #[test]
    fn index_routes_mount_short_paths() {
        let home = &ROUTES[0];
        assert_eq!(
            home.paths(),
            ["/", "/home", "/home/index", "/home/index/*params"]
        );
        let logout = ROUTES.iter().find(|r| r.action == "logout").unwrap();
        assert_eq!(logout.paths(), ["/login/logout", "/login/logout/*params"]);
    }

    #[test]
    fn controller_name_capitalizes_first_letter() {
        assert_eq!(controller_name("login"), "LoginController");
        assert_eq!(controller_name("myPage"), "MyPageController");
    }
}

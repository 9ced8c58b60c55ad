//! Comment-driven fan-out of a proto file to backend and frontend services.
//!
//! The first leading detached comment of a file may carry directives:
//!
//! ```proto
//! // backend-services=orders,billing
//! // frontend-services=web
//!
//! syntax = "proto3";
//! ```

use prost_types::FileDescriptorProto;

use crate::service::{Service, ServiceRegistry};

pub const BACKEND_DIRECTIVE: &str = "backend-services=";
pub const FRONTEND_DIRECTIVE: &str = "frontend-services=";

/// Target names as written in a routing comment.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RoutingDirectives {
    pub backend: Vec<String>,
    pub frontend: Vec<String>,
}

impl RoutingDirectives {
    /// Only the first line carrying each directive counts.
    pub fn parse(comment: &str) -> Self {
        let lines: Vec<&str> = comment
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        Self {
            backend: directive_names(&lines, BACKEND_DIRECTIVE),
            frontend: directive_names(&lines, FRONTEND_DIRECTIVE),
        }
    }
}

fn directive_names(lines: &[&str], prefix: &str) -> Vec<String> {
    lines
        .iter()
        .find_map(|line| line.strip_prefix(prefix))
        .map(|list| {
            list.split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Services a file's artifacts go to, each side in registry order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Routing<'a> {
    pub backend: Vec<&'a Service>,
    pub frontend: Vec<&'a Service>,
}

impl<'a> Routing<'a> {
    pub fn is_empty(&self) -> bool {
        self.backend.is_empty() && self.frontend.is_empty()
    }

    /// Backend then frontend services, each service once.
    pub fn targets(&self) -> Vec<&'a Service> {
        let mut targets: Vec<&'a Service> = Vec::new();
        for service in self.backend.iter().chain(&self.frontend) {
            if !targets.iter().any(|known| known.name == service.name) {
                targets.push(service);
            }
        }
        targets
    }
}

/// First leading detached comment across the file's source locations.
pub fn first_detached_comment(file: &FileDescriptorProto) -> Option<&str> {
    file.source_code_info
        .as_ref()?
        .location
        .iter()
        .flat_map(|location| &location.leading_detached_comments)
        .map(String::as_str)
        .next()
}

/// Resolve a file's routing against the configured services.
///
/// Names missing from the registry are skipped. A file without any detached
/// comment routes nowhere.
pub fn determine_services<'a>(
    services: &'a ServiceRegistry,
    file: &FileDescriptorProto,
) -> Routing<'a> {
    let Some(comment) = first_detached_comment(file) else {
        return Routing::default();
    };
    let directives = RoutingDirectives::parse(comment);

    let select = |names: &[String]| -> Vec<&'a Service> {
        services
            .iter()
            .filter(|service| names.iter().any(|name| *name == service.name))
            .collect()
    };
    for name in directives.backend.iter().chain(&directives.frontend) {
        if services.get(name).is_none() {
            tracing::debug!(file = file.name(), service = %name, "ignoring unknown service");
        }
    }

    Routing {
        backend: select(&directives.backend),
        frontend: select(&directives.frontend),
    }
}

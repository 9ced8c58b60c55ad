//! NestJS microservice contracts from protobuf descriptors.
//!
//! The input is a compiler request (a flat list of parsed `.proto` files);
//! the output is a set of TypeScript files per configured service:
//!
//! - `<package>/<stem>.types.ts`: message interfaces and enums
//! - `<package>/<stem>.backend.ts`: controller interfaces and their gRPC
//!   registration decorators
//! - `<package>/<stem>.frontend.ts`: client connection options and client
//!   interfaces
//! - `backend-microservice-options.ts`: transport options covering every file
//!   routed to a backend service
//!
//! Which services receive a file is decided by a directive comment at the top
//! of the file:
//!
//! ```proto
//! // backend-services=orders
//! // frontend-services=web,admin
//!
//! syntax = "proto3";
//! ```
//!
//! Generation runs in two passes. [`registry::TypeRegistry`] indexes every
//! top-level message and enum of the request, then each artifact is composed
//! as a [`fragment::Code`] whose type references stay symbolic until the
//! output path is known and imports can be computed.

pub mod assemble;
pub mod backend;
pub mod compose;
pub mod error;
pub mod fragment;
pub mod frontend;
pub mod paths;
pub mod plugin;
pub mod registry;
pub mod routing;
pub mod service;
pub mod translate;

pub use assemble::{generate_files, generate_with_services, GeneratedFile};
pub use error::{CodegenError, Result};
pub use fragment::{Code, Symbol};
pub use plugin::{generate, generate_from_bytes, PluginParameters};
pub use registry::{TypeEntry, TypeRegistry};
pub use routing::{determine_services, Routing};
pub use service::{Service, ServiceRegistry};

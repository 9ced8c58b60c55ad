//! Server-side artifacts: controller contracts and the per-service
//! `getBackendMicroserviceOptions` aggregate.

use prost_types::{FileDescriptorProto, ServiceDescriptorProto};

use crate::code;
use crate::compose::{self, DECLARATION_SEPARATOR};
use crate::error::{CodegenError, Result};
use crate::fragment::{Code, Symbol};
use crate::paths;
use crate::registry::TypeRegistry;
use crate::translate;

/// File name of the aggregate, directly below a generated directory.
pub const MICROSERVICE_OPTIONS_FILE: &str = "backend-microservice-options.ts";

const NEST_MICROSERVICES: &str = "@nestjs/microservices";

fn grpc_method() -> Symbol {
    Symbol::package("GrpcMethod", NEST_MICROSERVICES)
}

fn grpc_options() -> Symbol {
    Symbol::package("GrpcOptions", NEST_MICROSERVICES)
}

pub(crate) fn transport() -> Symbol {
    Symbol::package("Transport", NEST_MICROSERVICES)
}

pub(crate) fn quote(value: &str) -> String {
    format!("'{value}'")
}

/// Interface members for every method of a service, one indented line each.
pub(crate) fn method_members(
    service: &ServiceDescriptorProto,
    registry: &TypeRegistry,
) -> Result<Vec<Code>> {
    service
        .method
        .iter()
        .map(|method| Ok(code!["  ", translate::method_signature(method, registry)?, ";"]))
        .collect()
}

pub(crate) fn service_name(service: &ServiceDescriptorProto) -> Result<&str> {
    service
        .name
        .as_deref()
        .ok_or_else(|| CodegenError::invalid("service has no name"))
}

/// Method names a controller decorator binds to the gRPC server, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationTable {
    pub service: String,
    pub methods: Vec<String>,
}

impl RegistrationTable {
    pub fn of(service: &ServiceDescriptorProto) -> Result<Self> {
        let methods = service
            .method
            .iter()
            .map(|method| {
                method
                    .name
                    .clone()
                    .ok_or_else(|| CodegenError::invalid("method has no name"))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            service: service_name(service)?.to_string(),
            methods,
        })
    }

    /// Body of the decorator function; empty when there is nothing to register.
    fn decorator_body(&self) -> Code {
        if self.methods.is_empty() {
            return Code::empty();
        }
        let names: Vec<String> = self.methods.iter().map(|m| quote(m)).collect();
        code![
            format!("    const grpcMethods: string[] = [{}];\n", names.join(", ")),
            "    for (const method of grpcMethods) {\n",
            "      const descriptor: any = Reflect.getOwnPropertyDescriptor(constructor.prototype, method);\n",
            "      ",
            grpc_method(),
            format!(
                "({}, method)(constructor.prototype[method], method, descriptor);\n",
                quote(&self.service)
            ),
            "    }\n",
        ]
    }

    /// `export function <Svc>ControllerMethods()` returning the class decorator.
    pub fn to_code(&self) -> Code {
        let head = code![
            "export function ",
            Code::declaration(format!("{}ControllerMethods", self.service)),
            "() {\n  return function (constructor: Function) {"
        ];
        let body = self.decorator_body();
        if body.is_empty() {
            return code![head, "};\n}"];
        }
        code![head, "\n", body, "  };\n}"]
    }
}

/// Controller interface plus its registration decorator.
pub fn controller(service: &ServiceDescriptorProto, registry: &TypeRegistry) -> Result<Code> {
    let name = service_name(service)?;
    let members = method_members(service, registry)?;
    let table = RegistrationTable::of(service)?;
    Ok(code![
        compose::interface(&format!("{name}Controller"), members),
        DECLARATION_SEPARATOR,
        table.to_code()
    ])
}

pub fn backend_content(file: &FileDescriptorProto, registry: &TypeRegistry) -> Result<Code> {
    let controllers = file
        .service
        .iter()
        .map(|service| controller(service, registry))
        .collect::<Result<Vec<_>>>()?;
    Ok(Code::join(controllers, DECLARATION_SEPARATOR))
}

/// Transport sources of every file routed to one backend service.
///
/// Packages are deduplicated, proto paths are not: several files may share a
/// package yet each is its own source for the gRPC loader.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MicroserviceOptions {
    pub packages: Vec<String>,
    pub proto_paths: Vec<String>,
}

impl MicroserviceOptions {
    pub fn add(&mut self, file: &FileDescriptorProto) -> Result<()> {
        let name = file
            .name
            .as_deref()
            .ok_or_else(|| CodegenError::invalid("file descriptor has no name"))?;
        let package = file.package();
        if !self.packages.iter().any(|known| known == package) {
            self.packages.push(package.to_string());
        }
        self.proto_paths.push(paths::proto_path(name));
        Ok(())
    }

    fn list(values: &[String]) -> String {
        let quoted: Vec<String> = values.iter().map(|v| quote(v)).collect();
        format!("[{}]", quoted.join(", "))
    }

    pub fn to_code(&self) -> Code {
        code![
            "export function ",
            Code::declaration("getBackendMicroserviceOptions"),
            "(url: string): ",
            grpc_options(),
            " {\n  return {\n    transport: ",
            transport(),
            ".GRPC,\n    options: {\n",
            format!("      package: {},\n", Self::list(&self.packages)),
            format!("      protoPath: {},\n", Self::list(&self.proto_paths)),
            "      url,\n    },\n  };\n}"
        ]
    }
}

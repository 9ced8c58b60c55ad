//! Client-side artifact: connection options and a typed client contract per service.

use prost_types::{FileDescriptorProto, ServiceDescriptorProto};

use crate::backend::{method_members, quote, service_name, transport};
use crate::code;
use crate::compose::{self, DECLARATION_SEPARATOR};
use crate::error::{CodegenError, Result};
use crate::fragment::{Code, Symbol};
use crate::paths;
use crate::registry::TypeRegistry;

fn client_provider_options() -> Symbol {
    Symbol::package("ClientProviderOptions", "@nestjs/microservices")
}

pub fn client(
    file: &FileDescriptorProto,
    service: &ServiceDescriptorProto,
    registry: &TypeRegistry,
) -> Result<Code> {
    let file_name = file
        .name
        .as_deref()
        .ok_or_else(|| CodegenError::invalid("file descriptor has no name"))?;
    let name = service_name(service)?;
    let members = method_members(service, registry)?;

    let options = code![
        "export const ",
        Code::declaration(format!("{name}ClientProviderOptions")),
        ": ",
        client_provider_options(),
        " = {\n",
        format!("  name: {},\n", quote(name)),
        "  transport: ",
        transport(),
        ".GRPC,\n  options: {\n",
        format!("    package: {},\n", quote(file.package())),
        format!("    protoPath: {},\n", quote(&paths::proto_path(file_name))),
        "  },\n};"
    ];
    Ok(code![
        options,
        DECLARATION_SEPARATOR,
        compose::interface(&format!("{name}Client"), members)
    ])
}

pub fn frontend_content(file: &FileDescriptorProto, registry: &TypeRegistry) -> Result<Code> {
    let clients = file
        .service
        .iter()
        .map(|service| client(file, service, registry))
        .collect::<Result<Vec<_>>>()?;
    Ok(Code::join(clients, DECLARATION_SEPARATOR))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::TypeEntry;
    use prost_types::MethodDescriptorProto;

    fn registry() -> TypeRegistry {
        [(".foo.Foo", "Foo", "foo/Foo"), (".bar.Bar", "Bar", "bar/Bar")]
            .into_iter()
            .map(|(key, name, module)| {
                (
                    key.to_string(),
                    TypeEntry {
                        name: name.to_string(),
                        module: module.to_string(),
                    },
                )
            })
            .collect()
    }

    fn bar_service(methods: &[&str]) -> ServiceDescriptorProto {
        ServiceDescriptorProto {
            name: Some("Bar".to_string()),
            method: methods
                .iter()
                .map(|name| MethodDescriptorProto {
                    name: Some(name.to_string()),
                    input_type: Some(".foo.Foo".to_string()),
                    output_type: Some(".bar.Bar".to_string()),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }
    }

    fn foo_file(services: Vec<ServiceDescriptorProto>) -> FileDescriptorProto {
        FileDescriptorProto {
            name: Some("foo.proto".to_string()),
            package: Some("foo".to_string()),
            service: services,
            ..Default::default()
        }
    }

    #[test]
    fn client_options_and_interface() {
        let rendered = frontend_content(&foo_file(vec![bar_service(&["bar1"])]), &registry())
            .unwrap()
            .render("foo/foo.frontend.ts");
        assert_eq!(
            rendered,
            "/* eslint-disable */\n\
import { ClientProviderOptions, Transport } from '@nestjs/microservices';\n\
import { Foo } from '../foo/Foo';\n\
import { Bar } from '../bar/Bar';\n\
import { Observable } from 'rxjs';\n\
\n\
export const BarClientProviderOptions: ClientProviderOptions = {\n\
\x20 name: 'Bar',\n\
\x20 transport: Transport.GRPC,\n\
\x20 options: {\n\
\x20   package: 'foo',\n\
\x20   protoPath: '../protos/foo.proto',\n\
\x20 },\n\
};\n\
\n\
export interface BarClient {\n\
\x20 bar1(request: Foo): Bar | Promise<Bar> | Observable<Bar>;\n\
}\n"
        );
    }

    #[test]
    fn message_named_like_the_client_is_imported_under_an_alias() {
        let mut registry = registry();
        registry.insert(".bar.BarClient".to_string(), "BarClient", "bar/Bar");
        let mut service = bar_service(&["bar1"]);
        service.method[0].output_type = Some(".bar.BarClient".to_string());

        let rendered = frontend_content(&foo_file(vec![service]), &registry)
            .unwrap()
            .render("foo/foo.frontend.ts");

        assert!(
            rendered.contains("import { BarClient as BarClient1 } from '../bar/Bar';"),
            "{rendered}"
        );
        assert!(rendered.contains("export interface BarClient {\n"), "{rendered}");
        assert!(
            rendered.contains(
                "bar1(request: Foo): BarClient1 | Promise<BarClient1> | Observable<BarClient1>;"
            ),
            "{rendered}"
        );
    }

    #[test]
    fn service_without_methods_has_an_empty_client() {
        let body = frontend_content(&foo_file(vec![bar_service(&[])]), &registry())
            .unwrap()
            .to_string();
        assert!(body.ends_with("export interface BarClient {}"), "{body}");
    }

    #[test]
    fn proto_path_keeps_directories_of_the_file_name() {
        let mut file = foo_file(vec![bar_service(&[])]);
        file.name = Some("./nested/foo.proto".to_string());
        let body = frontend_content(&file, &registry()).unwrap().to_string();
        assert!(body.contains("protoPath: '../protos/nested/foo.proto',"), "{body}");
    }

    #[test]
    fn file_without_services_has_an_empty_body() {
        assert!(frontend_content(&foo_file(Vec::new()), &registry())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn unresolved_method_type_fails() {
        let mut service = bar_service(&["bar1"]);
        service.method[0].output_type = Some(".nope.Nope".to_string());
        let err = frontend_content(&foo_file(vec![service]), &registry()).unwrap_err();
        assert!(matches!(err, CodegenError::UnresolvedType(name) if name == ".nope.Nope"));
    }
}

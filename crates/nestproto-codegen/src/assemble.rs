//! Drives registry, routing and composers over a whole descriptor set.

use std::fs;
use std::path::{Path, PathBuf};

use prost_types::compiler::code_generator_response;
use prost_types::FileDescriptorProto;

use crate::backend::{self, MicroserviceOptions, MICROSERVICE_OPTIONS_FILE};
use crate::compose;
use crate::error::{CodegenError, Result};
use crate::fragment::Code;
use crate::frontend;
use crate::paths::{self, ArtifactKind};
use crate::registry::TypeRegistry;
use crate::routing;
use crate::service::{Service, ServiceRegistry};

/// One output file: a normalized path and its final contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub name: String,
    pub content: String,
}

impl GeneratedFile {
    /// Write the file to disk, creating parent directories as needed.
    pub fn write(&self) -> Result<PathBuf> {
        let path = PathBuf::from(&self.name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| CodegenError::io(parent, e))?;
        }
        fs::write(&path, &self.content).map_err(|e| CodegenError::io(&path, e))?;
        Ok(path)
    }
}

impl From<GeneratedFile> for code_generator_response::File {
    fn from(file: GeneratedFile) -> Self {
        Self {
            name: Some(file.name),
            content: Some(file.content),
            ..Default::default()
        }
    }
}

fn per_file_artifact(
    service: &Service,
    file: &FileDescriptorProto,
    kind: ArtifactKind,
    code: Code,
) -> Result<GeneratedFile> {
    let relative = paths::relative_output_path(file, kind)?;
    let generated = GeneratedFile {
        name: paths::output_file_name(&service.generated_dir, &relative),
        content: code.render(&relative),
    };
    tracing::debug!(service = %service.name, file = %generated.name, %kind, "generated artifact");
    Ok(generated)
}

fn copy_source(service: &Service, protos_dir: &Path, file: &FileDescriptorProto) -> Result<()> {
    let name = file
        .name
        .as_deref()
        .ok_or_else(|| CodegenError::invalid("file descriptor has no name"))?;
    service.copy_proto(protos_dir, name)?;
    Ok(())
}

/// Load the services file, then generate every artifact for `files`.
pub fn generate_files(
    files: &[FileDescriptorProto],
    services_file: &Path,
    protos_dir: &Path,
) -> Result<Vec<GeneratedFile>> {
    let services = ServiceRegistry::load(services_file)?;
    generate_with_services(files, &services, protos_dir)
}

/// Generate against an already loaded service registry.
///
/// Per input file, in input order: one types artifact per routed service,
/// then the backend artifacts, then the frontend artifacts. One aggregate
/// per backend service follows, in the order services were first routed to.
/// The first failure aborts the run.
pub fn generate_with_services(
    files: &[FileDescriptorProto],
    services: &ServiceRegistry,
    protos_dir: &Path,
) -> Result<Vec<GeneratedFile>> {
    let registry = TypeRegistry::build(files)?;
    let mut generated = Vec::new();
    let mut aggregates: Vec<(&Service, MicroserviceOptions)> = Vec::new();

    for file in files {
        let routing = routing::determine_services(services, file);
        tracing::debug!(
            file = file.name(),
            backend = routing.backend.len(),
            frontend = routing.frontend.len(),
            "routing decided"
        );

        for service in routing.targets() {
            let types = compose::types_content(file, &registry)?;
            generated.push(per_file_artifact(service, file, ArtifactKind::Types, types)?);
        }

        for &service in &routing.backend {
            copy_source(service, protos_dir, file)?;
            let code = backend::backend_content(file, &registry)?;
            generated.push(per_file_artifact(service, file, ArtifactKind::Backend, code)?);

            match aggregates.iter_mut().find(|(known, _)| known.name == service.name) {
                Some((_, options)) => options.add(file)?,
                None => {
                    let mut options = MicroserviceOptions::default();
                    options.add(file)?;
                    aggregates.push((service, options));
                }
            }
        }

        for &service in &routing.frontend {
            copy_source(service, protos_dir, file)?;
            let code = frontend::frontend_content(file, &registry)?;
            generated.push(per_file_artifact(service, file, ArtifactKind::Frontend, code)?);
        }
    }

    for (service, options) in aggregates {
        let name = paths::output_file_name(&service.generated_dir, MICROSERVICE_OPTIONS_FILE);
        tracing::debug!(
            service = %service.name,
            packages = options.packages.len(),
            protos = options.proto_paths.len(),
            "generated microservice options"
        );
        generated.push(GeneratedFile {
            name,
            content: options.to_code().render(MICROSERVICE_OPTIONS_FILE),
        });
    }

    tracing::info!(files = files.len(), generated = generated.len(), "generation finished");
    Ok(generated)
}

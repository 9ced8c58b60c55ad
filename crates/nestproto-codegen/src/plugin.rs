//! protoc plugin protocol: request decoding, parameters and response encoding.

use std::path::PathBuf;

use prost::Message;
use prost_types::compiler::{code_generator_response, CodeGeneratorRequest, CodeGeneratorResponse};

use crate::assemble;
use crate::error::{CodegenError, Result};

const SERVICES_FILE: &str = "services_file";
const PROTOS_DIR: &str = "protos_dir";

/// Options passed through `--nestjs-microservice_opt` (or `--ts_proto_opt`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginParameters {
    pub services_file: PathBuf,
    pub protos_dir: PathBuf,
}

impl PluginParameters {
    /// Parse `key=value,key=value`; both keys are required and non-empty.
    pub fn parse(parameter: Option<&str>) -> Result<Self> {
        let mut services_file = None;
        let mut protos_dir = None;

        let entries = parameter
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty());
        for entry in entries {
            let (key, value) = entry.split_once('=').unwrap_or((entry, ""));
            let value = value.trim();
            match key.trim() {
                SERVICES_FILE if !value.is_empty() => services_file = Some(PathBuf::from(value)),
                PROTOS_DIR if !value.is_empty() => protos_dir = Some(PathBuf::from(value)),
                other => tracing::debug!(parameter = other, "ignoring plugin parameter"),
            }
        }

        let services_file = services_file.ok_or(CodegenError::MissingParameter {
            key: SERVICES_FILE,
            example: "services.json",
        })?;
        let protos_dir = protos_dir.ok_or(CodegenError::MissingParameter {
            key: PROTOS_DIR,
            example: "../protos",
        })?;
        Ok(Self {
            services_file,
            protos_dir,
        })
    }
}

pub fn decode_request(bytes: &[u8]) -> Result<CodeGeneratorRequest> {
    Ok(CodeGeneratorRequest::decode(bytes)?)
}

/// Run one compiler request to completion.
pub fn generate(request: &CodeGeneratorRequest) -> Result<CodeGeneratorResponse> {
    let parameters = PluginParameters::parse(request.parameter.as_deref())?;
    tracing::debug!(
        services_file = %parameters.services_file.display(),
        protos_dir = %parameters.protos_dir.display(),
        files = request.proto_file.len(),
        "handling compiler request"
    );
    let files = assemble::generate_files(
        &request.proto_file,
        &parameters.services_file,
        &parameters.protos_dir,
    )?;
    Ok(CodeGeneratorResponse {
        file: files.into_iter().map(Into::into).collect(),
        supported_features: Some(code_generator_response::Feature::Proto3Optional as u64),
        ..Default::default()
    })
}

/// Encoded request in, encoded response out.
pub fn generate_from_bytes(bytes: &[u8]) -> Result<Vec<u8>> {
    let response = generate(&decode_request(bytes)?)?;
    let mut out = Vec::with_capacity(response.encoded_len());
    response.encode(&mut out)?;
    Ok(out)
}

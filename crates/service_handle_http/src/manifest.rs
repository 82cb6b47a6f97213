use std::fs;
use std::path::Path;

use serde::Deserialize;
use service_handle::MethodSignature;

use crate::error::HttpServiceError;

/// Service catalog for one package.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceManifest {
    #[serde(default)]
    pub package: String,
    pub services: Vec<ServiceDecl>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceDecl {
    pub name: String,
    #[serde(default)]
    pub methods: Vec<MethodDecl>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MethodDecl {
    pub name: String,
    pub request: String,
    pub response: String,
}

impl MethodDecl {
    pub fn signature(&self) -> MethodSignature {
        MethodSignature::new(&self.name, &self.request, &self.response)
    }
}

impl ServiceDecl {
    pub fn signatures(&self) -> Vec<MethodSignature> {
        self.methods.iter().map(MethodDecl::signature).collect()
    }
}

impl ServiceManifest {
    pub fn load(path: &Path) -> Result<Self, HttpServiceError> {
        let raw = fs::read_to_string(path).map_err(|source| HttpServiceError::ManifestRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| HttpServiceError::ManifestParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn service_names(&self) -> Vec<String> {
        self.services.iter().map(|service| service.name.clone()).collect()
    }

    /// The named service, or the only one when no name is given.
    pub fn select(&self, name: Option<&str>) -> Result<&ServiceDecl, HttpServiceError> {
        match name {
            Some(name) => self
                .services
                .iter()
                .find(|service| service.name == name)
                .ok_or_else(|| HttpServiceError::UnknownService {
                    name: name.to_string(),
                    available: self.service_names(),
                }),
            None => match self.services.as_slice() {
                [] => Err(HttpServiceError::NoServices),
                [only] => Ok(only),
                _ => Err(HttpServiceError::AmbiguousService {
                    available: self.service_names(),
                }),
            },
        }
    }

    /// Path segment identifying `service`: `package.Service`, or just
    /// `Service` without a package.
    pub fn qualified_name(&self, service: &ServiceDecl) -> String {
        if self.package.is_empty() {
            service.name.clone()
        } else {
            format!("{}.{}", self.package, service.name)
        }
    }
}

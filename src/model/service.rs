// src/model/service.rs

use std::collections::BTreeMap;

/// Output name to value, as copied into the host node's runtime properties.
pub type ServiceOutputs = BTreeMap<String, String>;

/// A running instantiation of a service template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Service {
    pub id: String,
    pub name: String,
    /// Name of the template the service was created from.
    pub service_template_name: String,
    /// Output values published by the service once installed.
    pub outputs: ServiceOutputs,
}

impl Service {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        service_template_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            service_template_name: service_template_name.into(),
            outputs: ServiceOutputs::new(),
        }
    }

    pub fn with_output(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.outputs.insert(key.into(), value.into());
        self
    }
}

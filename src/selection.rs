use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::form::DeploymentForm;

pub const DEFAULT_API_URL: &str = "http://localhost:9090";

/// Choices written after a successful deployment and offered as defaults next time.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub namespace: Option<String>,
    pub container_image: String,
    pub api_url: String,
}
impl Selection {
    pub fn from_form(form: &DeploymentForm, api_url: &str) -> Self {
        Self {
            namespace: form.namespace().map(String::from),
            container_image: form.container_image.to_owned(),
            api_url: api_url.to_owned(),
        }
    }

    pub fn save<P: AsRef<Path>>(&self, filename: &P) -> io::Result<()> {
        let data = serde_json::to_string_pretty(self).map_err(io::Error::other)?;
        File::create(filename)?.write_all(data.as_bytes())
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct DefaultSelections {
    pub namespace: Option<String>,
    pub container_image: Option<String>,
    pub api_url: Option<String>,
}
impl DefaultSelections {
    pub fn read<P: AsRef<Path>>(filename: &P) -> Option<Self> {
        let file = File::open(filename).ok()?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader).ok()
    }
}

/// Explicit URL first, then the remembered one, then the local default.
pub fn resolve_api_url(explicit: Option<String>, defaults: &Option<DefaultSelections>) -> String {
    explicit
        .or_else(|| defaults.as_ref().and_then(|d| d.api_url.clone()))
        .unwrap_or_else(|| DEFAULT_API_URL.to_string())
}

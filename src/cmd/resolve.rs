//! `patmux resolve` - show which route a request would hit.
//!
//! Mounts the config on a private [`ServeMux`] and runs the same lookup
//! the server performs, after canonicalizing the path.

use crate::cli::{OutputFormat, ResolveArgs};
use crate::error::PatmuxError;
use crate::mux::{clean_path, ServeMux};
use crate::routes;

use super::run::load_config;

pub async fn execute(args: &ResolveArgs) -> Result<(), PatmuxError> {
    let (config, _) = load_config(args.config.as_deref()).await?;
    let mux = ServeMux::new();
    routes::mount(&mux, &config)?;

    let report = describe(&mux, &args.host, &args.path);
    match args.format {
        OutputFormat::Text => println!("{}", report.to_text()),
        OutputFormat::Json => println!("{}", serde_json::to_value(&report).unwrap_or_default()),
    }
    Ok(())
}

#[derive(Debug, serde::Serialize)]
pub struct Report {
    pub path: String,
    /// Set when the server would first redirect to a canonical path.
    pub canonical: Option<String>,
    pub pattern: Option<String>,
    pub params: Vec<(String, String)>,
}

impl Report {
    fn to_text(&self) -> String {
        let mut lines = Vec::new();
        if let Some(ref canonical) = self.canonical {
            lines.push(format!("{} -> 301 {canonical}", self.path));
        }
        match self.pattern {
            Some(ref pattern) => {
                let path = self.canonical.as_deref().unwrap_or(&self.path);
                lines.push(format!("{path} => {pattern}"));
                for (name, value) in &self.params {
                    lines.push(format!("  {name} = {value}"));
                }
            }
            None => lines.push(format!("{} => no route (404)", self.path)),
        }
        lines.join("\n")
    }
}

#[must_use]
pub fn describe(mux: &ServeMux, host: &str, path: &str) -> Report {
    let cleaned = clean_path(path);
    let canonical = (cleaned != path).then(|| cleaned.clone());

    let resolved = mux.resolve(host, &cleaned);
    let params = resolved
        .as_ref()
        .and_then(|r| r.params.as_ref())
        .map(|p| {
            p.iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect()
        })
        .unwrap_or_default();

    Report {
        path: path.to_string(),
        canonical,
        pattern: resolved.map(|r| r.pattern),
        params,
    }
}

//! CLI command implementations

use crate::catalog::{filter_by_title, summarize, SciSource, UNKNOWN_SITE};
use crate::config::AppConfig;
use crate::model::{Sci, Site};
use crate::render::{render_document, DocumentView, ViewMode};
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Fetch the site summary
pub async fn sites(source: &dyn SciSource) -> Result<Vec<Site>> {
    let sites = source
        .summarize_sites()
        .await
        .context("Failed to fetch sites")?;
    info!("Fetched {} sites", sites.len());
    Ok(sites)
}

/// Fetch the SCIs of a site, narrowed by an optional title search
pub async fn list(source: &dyn SciSource, site_id: &str, search: Option<&str>) -> Result<Vec<Sci>> {
    let documents = source
        .fetch_documents(Some(site_id))
        .await
        .with_context(|| format!("Failed to fetch SCIs for site {}", site_id))?;

    let term = search.unwrap_or("");
    Ok(filter_by_title(&documents, term).into_iter().cloned().collect())
}

/// Render one SCI of a site
///
/// The site name is the one the site summary shows: the first name found
/// among the site's title-sorted SCIs.
pub async fn show(
    source: &dyn SciSource,
    site_id: &str,
    doc_id: &str,
    mode: ViewMode,
) -> Result<DocumentView> {
    let documents = source
        .fetch_documents(Some(site_id))
        .await
        .with_context(|| format!("Failed to fetch SCIs for site {}", site_id))?;

    let sci = documents
        .iter()
        .find(|sci| sci.id == doc_id)
        .with_context(|| format!("SCI {} not found in site {}", doc_id, site_id))?;

    let sites = summarize(&documents);
    let site_name = sites
        .iter()
        .find(|site| site.id == sci.site_id)
        .map_or(UNKNOWN_SITE, |site| site.name.as_str());
    Ok(render_document(sci, site_name, mode))
}

/// Print a value as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// Print the site summary as text
pub fn print_sites_text(sites: &[Site]) {
    if sites.is_empty() {
        println!("No sites found.");
        return;
    }

    println!("Sites");
    println!("=====\n");

    for site in sites {
        println!("{:<40} {:>4} SCIs   ({})", site.name, site.count, site.id);
    }
}

/// Print a document list as text
pub fn print_documents_text(documents: &[Sci]) {
    if documents.is_empty() {
        println!("No SCIs found.");
        return;
    }

    for sci in documents {
        println!("{}", sci.title());
        println!("   ID: {}", sci.id);
        if !sci.display_id().is_empty() {
            println!("   Document: {}", sci.display_id());
        }
        println!("   Steps: {}", sci.step_count());
        println!();
    }
}

/// Show, locate or initialize the configuration file
///
/// `config` is the effective configuration; `stored` is what the file (or
/// the defaults) hold, without command-line and environment overrides.
/// Only `stored` is ever written back.
pub fn handle_config(
    config: &AppConfig,
    stored: &AppConfig,
    path: Option<&Path>,
    show: bool,
    print_path: bool,
    init: bool,
) -> Result<()> {
    let config_path = path.map(Path::to_path_buf).or_else(AppConfig::default_path);

    if print_path {
        match config_path {
            Some(ref p) => println!("{}", p.display()),
            None => println!("No configuration directory available"),
        }
    }

    if init {
        let p = config_path
            .as_ref()
            .context("No configuration directory available")?;
        stored.save(p)?;
        println!("✓ Wrote configuration to {:?}", p);
    }

    if show || (!print_path && !init) {
        println!("SCI Viewer Configuration");
        println!("========================\n");

        println!("Tenant: {}", config.tenant_id);
        println!("Default mode: {}", config.default_mode);
        if let Some(ref log_file) = config.log_file {
            println!("Log file: {:?}", log_file);
        }

        println!("\nStore endpoint: {}", config.store.endpoint);
        println!("Project: {}", config.store.project_id);
        println!(
            "API key: {}",
            if config.store.api_key.is_some() { "set" } else { "not set" }
        );
    }

    Ok(())
}

//! SCI catalog: the data access layer
//!
//! This module turns raw store documents into SCIs and derives:
//! - Title-sorted document lists, optionally scoped to one site
//! - Site summaries with per-site document counts
//! - In-memory title search over fetched documents

use crate::model::{non_empty, Sci, Site};
use crate::store::{CollectionPath, DocumentStore, FieldFilter, StoreError};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Collection holding SCIs under each company document
pub const SCI_COLLECTION: &str = "standard_cleaning_instructions";

/// Field linking an SCI to its site
pub const SITE_ID_FIELD: &str = "siteId";

/// Name used for sites without a denormalized display name
pub const UNKNOWN_SITE: &str = "Unknown Site";

/// Source of SCIs and site summaries
#[async_trait::async_trait]
pub trait SciSource: Send + Sync {
    /// Fetch SCIs sorted by title, scoped to `site_id` when given
    async fn fetch_documents(&self, site_id: Option<&str>) -> Result<Vec<Sci>, StoreError>;

    /// Summarize every site that has SCIs
    ///
    /// The default downloads every document and aggregates client-side.
    /// Implementations backed by a store with server-side aggregation
    /// should override it.
    async fn summarize_sites(&self) -> Result<Vec<Site>, StoreError> {
        let documents = self.fetch_documents(None).await?;
        Ok(summarize(&documents))
    }
}

/// SCI catalog for one tenant, backed by a document store
pub struct SciCatalog {
    store: Arc<dyn DocumentStore>,
    collection: CollectionPath,
}

impl SciCatalog {
    /// Create a catalog reading the tenant's SCI collection
    pub fn new(store: Arc<dyn DocumentStore>, tenant_id: &str) -> Result<Self, StoreError> {
        let collection =
            CollectionPath::parse(&format!("companies/{}/{}", tenant_id, SCI_COLLECTION))?;
        Ok(Self { store, collection })
    }

    /// Path of the collection this catalog reads
    pub fn collection(&self) -> &CollectionPath {
        &self.collection
    }
}

#[async_trait::async_trait]
impl SciSource for SciCatalog {
    async fn fetch_documents(&self, site_id: Option<&str>) -> Result<Vec<Sci>, StoreError> {
        let filter = non_empty(site_id).map(|id| FieldFilter::equals(SITE_ID_FIELD, id));

        let stored = self.store.query(&self.collection, filter.as_ref()).await?;
        debug!(
            "{} returned {} documents for site {:?}",
            self.store.backend_name(),
            stored.len(),
            site_id
        );

        let mut documents: Vec<Sci> = stored
            .iter()
            .filter_map(|doc| match Sci::from_record(&doc.id, &doc.data) {
                Ok(sci) => Some(sci),
                Err(e) => {
                    warn!("Skipping malformed SCI {}: {}", doc.id, e);
                    None
                }
            })
            .collect();

        sort_by_title(&mut documents);
        Ok(documents)
    }
}

/// Sort SCIs by case-insensitive title; missing titles sort first
pub fn sort_by_title(documents: &mut [Sci]) {
    documents.sort_by_cached_key(|sci| sci.title().to_lowercase());
}

/// Group SCIs by site, counting documents per site
///
/// The first document seen for a site provides its name. The result is
/// sorted by case-insensitive site name.
pub fn summarize(documents: &[Sci]) -> Vec<Site> {
    let mut sites: Vec<Site> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for sci in documents {
        match index.get(sci.site_id.as_str()) {
            Some(&i) => sites[i].count += 1,
            None => {
                index.insert(&sci.site_id, sites.len());
                sites.push(Site {
                    id: sci.site_id.clone(),
                    name: non_empty(Some(sci.site_name.as_str()))
                        .unwrap_or(UNKNOWN_SITE)
                        .to_string(),
                    count: 1,
                });
            }
        }
    }

    sites.sort_by_cached_key(|site| site.name.to_lowercase());
    sites
}

/// SCIs whose title contains `term`, ignoring case
pub fn filter_by_title<'a>(documents: &'a [Sci], term: &str) -> Vec<&'a Sci> {
    let term = term.to_lowercase();
    documents
        .iter()
        .filter(|sci| sci.title().to_lowercase().contains(&term))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    const TENANT: &str = "tenant-1";
    const PATH: &str = "companies/tenant-1/standard_cleaning_instructions";

    fn sci(id: &str, site_id: &str, site_name: &str, title: Option<&str>) -> Sci {
        let mut sci = Sci {
            id: id.to_string(),
            site_id: site_id.to_string(),
            site_name: site_name.to_string(),
            ..Default::default()
        };
        sci.section.title = title.map(str::to_string);
        sci
    }

    fn store() -> MemoryStore {
        MemoryStore::new()
            .with_document(PATH, "1", json!({ "siteId": "S1", "siteName": "Plant One", "section": { "title": "Banana Line" } }))
            .with_document(PATH, "2", json!({ "siteId": "S1", "siteName": "Plant One", "section": { "title": "Apple Line" } }))
            .with_document(PATH, "3", json!({ "siteId": "S1", "siteName": "Plant One", "section": { "title": "Cherry Line" } }))
            .with_document(PATH, "4", json!({ "siteId": "S2", "siteName": "abattoir", "section": { "title": "Hooks" } }))
            .with_document(PATH, "5", json!({ "siteId": "S3", "section": { "title": "Chiller" } }))
    }

    #[test]
    fn test_sort_by_title_case_insensitive() {
        let mut docs = vec![
            sci("1", "S", "", Some("beta")),
            sci("2", "S", "", Some("Alpha")),
            sci("3", "S", "", None),
            sci("4", "S", "", Some("ALPHA")),
        ];
        sort_by_title(&mut docs);

        let ids: Vec<_> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "2", "4", "1"]);
    }

    #[test]
    fn test_summarize_counts_and_names() {
        let docs = vec![
            sci("1", "S1", "Zeta Plant", Some("a")),
            sci("2", "S2", "", Some("b")),
            sci("3", "S1", "Renamed", Some("c")),
            sci("4", "S3", "alpha plant", Some("d")),
            sci("5", "S1", "Zeta Plant", Some("e")),
        ];

        let sites = summarize(&docs);
        assert_eq!(
            sites,
            vec![
                Site { id: "S3".to_string(), name: "alpha plant".to_string(), count: 1 },
                Site { id: "S2".to_string(), name: UNKNOWN_SITE.to_string(), count: 1 },
                Site { id: "S1".to_string(), name: "Zeta Plant".to_string(), count: 3 },
            ]
        );

        let total: usize = sites.iter().map(|s| s.count).sum();
        assert_eq!(total, docs.len());
    }

    #[test]
    fn test_filter_by_title() {
        let docs = vec![
            sci("1", "S1", "", Some("Apple Line")),
            sci("2", "S1", "", Some("Banana Line")),
            sci("3", "S1", "", None),
        ];

        let matched: Vec<_> = filter_by_title(&docs, "AN").into_iter().map(|d| d.id.as_str()).collect();
        assert_eq!(matched, vec!["2"]);

        assert_eq!(filter_by_title(&docs, "").len(), 3);
        assert!(filter_by_title(&docs, "zzz").is_empty());
    }

    #[tokio::test]
    async fn test_fetch_documents_for_site_sorted() {
        let catalog = SciCatalog::new(Arc::new(store()), TENANT).unwrap();

        let docs = catalog.fetch_documents(Some("S1")).await.unwrap();
        let titles: Vec<_> = docs.iter().map(|d| d.title()).collect();
        assert_eq!(titles, vec!["Apple Line", "Banana Line", "Cherry Line"]);

        let found = filter_by_title(&docs, "an");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title(), "Banana Line");
    }

    #[tokio::test]
    async fn test_fetch_documents_empty_site_means_all() {
        let catalog = SciCatalog::new(Arc::new(store()), TENANT).unwrap();

        assert_eq!(catalog.fetch_documents(None).await.unwrap().len(), 5);
        assert_eq!(catalog.fetch_documents(Some("")).await.unwrap().len(), 5);
        assert!(catalog.fetch_documents(Some("nope")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_summarize_sites_uses_one_query() {
        let store = Arc::new(store());
        let catalog = SciCatalog::new(store.clone(), TENANT).unwrap();

        let sites = catalog.summarize_sites().await.unwrap();
        let names: Vec<_> = sites.iter().map(|s| (s.name.as_str(), s.count)).collect();
        assert_eq!(names, vec![("abattoir", 1), ("Plant One", 3), (UNKNOWN_SITE, 1)]);
        assert_eq!(store.query_calls(), 1);
    }

    #[tokio::test]
    async fn test_mistyped_fields_keep_document_and_count() {
        let store = store()
            .with_document(PATH, "6", json!({ "siteId": "S1", "section": "oops" }))
            .with_document(
                PATH,
                "7",
                json!({
                    "siteId": "S1",
                    "siteName": "Plant One",
                    "section": {
                        "title": "Dicer",
                        "images": [{ "url": "https://img/1.png", "pageNumber": 2.5 }],
                        "stepGroups": [{ "title": "Wash", "steps": [{ "action": "Rinse", "notes": "Use hot water" }] }]
                    }
                }),
            );
        let catalog = SciCatalog::new(Arc::new(store), TENANT).unwrap();

        let docs = catalog.fetch_documents(Some("S1")).await.unwrap();
        assert_eq!(docs.len(), 5);
        let dicer = docs.iter().find(|d| d.id == "7").unwrap();
        assert_eq!(dicer.step_count(), 1);

        let sites = catalog.summarize_sites().await.unwrap();
        let plant = sites.iter().find(|s| s.id == "S1").unwrap();
        assert_eq!(plant.count, 5);
    }

    #[tokio::test]
    async fn test_store_error_propagates() {
        let catalog =
            SciCatalog::new(Arc::new(MemoryStore::new().failing("permission denied")), TENANT)
                .unwrap();

        assert!(catalog.fetch_documents(None).await.is_err());
        assert!(catalog.summarize_sites().await.is_err());
    }

    #[test]
    fn test_invalid_tenant_rejected() {
        assert!(SciCatalog::new(Arc::new(MemoryStore::new()), "a/b").is_err());
    }
}

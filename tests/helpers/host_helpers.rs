//! Helpers for setting up analysis hosts.

use bitbake_ls::ide::{AnalysisHost, CompletionItem};
use url::Url;

pub fn file_uri(path: &str) -> Url {
    Url::parse(&format!("file://{path}")).expect("valid uri")
}

/// Creates an AnalysisHost with a single analyzed document.
pub fn host_with(path: &str, text: &str) -> (AnalysisHost, Url) {
    let mut host = AnalysisHost::new();
    let uri = file_uri(path);
    host.analyze(&uri, text, 1, true);
    (host, uri)
}

pub fn labels(items: &[CompletionItem]) -> Vec<&str> {
    items.iter().map(|item| item.label.as_ref()).collect()
}

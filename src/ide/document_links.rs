//! Document links for local files of `SRC_URI`.

use std::path::Path;

use url::Url;

use crate::analyzer::Analyzer;
use crate::base::Span;

/// A document link target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentLink {
    /// The span of the `file://` path in the recipe.
    pub span: Span,
    /// The local file it resolves to.
    pub target: Url,
}

/// Links for every `file://` entry of `SRC_URI` that matches one of the
/// recipe's local files. Nothing is linked until the client has supplied
/// the local file list.
pub fn document_links(analyzer: &Analyzer, uri: &Url) -> Vec<DocumentLink> {
    let (Some(document), Some(local_files)) = (analyzer.document(uri), analyzer.recipe_local_files(uri)) else {
        return Vec::new();
    };

    document
        .source_file_references()
        .into_iter()
        .filter_map(|reference| {
            let file = local_files.iter().find(|file| {
                let path = Path::new(file.as_str());
                path.ends_with(reference.name.as_str())
            })?;
            let target = Url::from_file_path(file).ok()?;
            Some(DocumentLink {
                span: reference.span,
                target,
            })
        })
        .collect()
}

//! LSP transport: the `tower-lsp` backend and the custom BitBake methods.
//!
//! Handlers stay thin. They convert LSP types, call into [`crate::ide`] and
//! convert back.

mod backend;
mod convert;
pub mod protocol;

pub use backend::Backend;

use tower_lsp::{ClientSocket, LspService};

/// The service with every custom method registered.
pub fn build_service() -> (LspService<Backend>, ClientSocket) {
    LspService::build(Backend::new)
        .custom_method(protocol::SCAN_COMPLETE, Backend::scan_complete)
        .custom_method(protocol::RESCAN_PROJECT, Backend::rescan_project)
        .custom_method(protocol::PROCESS_RECIPE_SCAN_RESULTS, Backend::process_recipe_scan_results)
        .custom_method(protocol::GET_VAR, Backend::get_var)
        .custom_method(protocol::GET_ALL_VAR, Backend::get_all_var)
        .custom_method(protocol::REMOVE_SCAN_RESULT, Backend::remove_scan_result)
        .custom_method(protocol::EMBEDDED_LANGUAGE_TYPE_ON_POSITION, Backend::embedded_language_type_on_position)
        .custom_method(protocol::EMBEDDED_LANGUAGE_DOC_INFOS, Backend::embedded_language_doc_infos)
        .custom_method(protocol::FILENAME_CHANGED, Backend::filename_changed)
        .custom_method(protocol::GET_LINKS_IN_DOCUMENT, Backend::links_in_document)
        .finish()
}

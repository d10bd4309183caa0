//! Custom protocol methods shared with the editor extension.

use serde::{Deserialize, Serialize};
use tower_lsp::lsp_types::notification::Notification;
use tower_lsp::lsp_types::request::Request;
use tower_lsp::lsp_types::{Position, Url};

use crate::embedded::EmbeddedLanguage;
use crate::project::ProjectSnapshot;

pub const SCAN_COMPLETE: &str = "bitbake/scanReady";
pub const RESCAN_PROJECT: &str = "bitbake/rescanProject";
pub const PROCESS_RECIPE_SCAN_RESULTS: &str = "bitbake/ProcessRecipeScanResults";
pub const GET_VAR: &str = "bitbake/getVar";
pub const GET_ALL_VAR: &str = "bitbake/getAllVar";
pub const REMOVE_SCAN_RESULT: &str = "bitbake/RemoveScanResult";
pub const EMBEDDED_LANGUAGE_TYPE_ON_POSITION: &str = "bitbake/EmbeddedLanguageTypeOnPosition";
pub const EMBEDDED_LANGUAGE_DOC_INFOS: &str = "bitbake/EmbeddedLanguageDocInfos";
pub const FILENAME_CHANGED: &str = "bitbake/FilenameChanged";
pub const GET_LINKS_IN_DOCUMENT: &str = "bitbake/getLinksInDocument";

/// Client to server: a scan finished on the client side.
pub type ScanCompleteParams = ProjectSnapshot;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessRecipeScanResultsParams {
    /// Raw `bitbake -e` output for the recipe
    pub scan_results: String,
    pub chosen_recipe: String,
    pub uri: Url,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetVarParams {
    pub recipe: String,
    pub variable: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetAllVarParams {
    pub recipe: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableValue {
    pub name: String,
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveScanResultParams {
    pub recipe_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddedLanguageTypeOnPositionParams {
    pub uri_string: Url,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddedLanguageDocInfosParams {
    pub uri_string: Url,
    pub embedded_language_type: EmbeddedLanguage,
}

/// Where the client finds the synthetic view of a recipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddedLanguageDocInfo {
    pub original_uri: Url,
    pub embedded_language_type: EmbeddedLanguage,
    pub uri: Url,
    pub line_offset: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilenameChangedParams {
    pub old_uri: Url,
    pub new_uri: Url,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetLinksInDocumentParams {
    pub document_uri: Url,
}

/// Server to client: synthetic documents were regenerated.
#[derive(Debug)]
pub enum EmbeddedLanguageDocs {}

impl Notification for EmbeddedLanguageDocs {
    type Params = Vec<EmbeddedLanguageDocInfo>;
    const METHOD: &'static str = "bitbake/EmbeddedLanguageDocs";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeLocalFilesParams {
    /// Recipe file path, without scheme
    pub uri: String,
}

/// Server to client: local files available to a recipe's `SRC_URI`.
#[derive(Debug)]
pub enum GetRecipeLocalFiles {}

impl Request for GetRecipeLocalFiles {
    type Params = RecipeLocalFilesParams;
    type Result = Vec<String>;
    const METHOD: &'static str = "bitbake/getRecipeLocalFiles";
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_params_use_camel_case() {
        let params: ProcessRecipeScanResultsParams = serde_json::from_value(json!({
            "scanResults": "FOO=\"1\"",
            "chosenRecipe": "busybox",
            "uri": "file:///layer/busybox.bb"
        }))
        .expect("valid params");
        assert_eq!(params.chosen_recipe, "busybox");

        let info = EmbeddedLanguageDocInfo {
            original_uri: Url::parse("file:///layer/foo.bb").expect("valid uri"),
            embedded_language_type: EmbeddedLanguage::Python,
            uri: Url::parse("file:///tmp/x.py").expect("valid uri"),
            line_offset: 1,
        };
        let value = serde_json::to_value(&info).expect("serializable");
        assert_eq!(value["embeddedLanguageType"], "python");
        assert_eq!(value["lineOffset"], 1);
    }

    #[test]
    fn test_scan_complete_payload() {
        let snapshot: ScanCompleteParams = serde_json::from_value(json!({
            "_layers": [{ "name": "core", "path": "/poky/meta", "priority": 5 }],
            "_overrides": ["class-target"]
        }))
        .expect("valid snapshot");
        assert_eq!(snapshot.layers.len(), 1);
        assert_eq!(snapshot.overrides, vec!["class-target"]);
        assert!(snapshot.recipes.is_empty());
    }
}

//! Final variable values of a recipe, as printed by `bitbake -e`.

use url::Url;

use super::symbols::{Symbol, SymbolTable, extract_symbols};
use crate::base::LineIndex;
use crate::parser::{AstNode, Recipe, parse};

/// Resolved symbols of one recipe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeScanResult {
    pub recipe: String,
    pub symbols: SymbolTable,
}

impl RecipeScanResult {
    /// Parse the environment dump of `recipe`. Locations point into the
    /// dump, attributed to `uri`.
    pub fn from_output(uri: &Url, recipe: &str, output: &str) -> Self {
        let root = parse(output).syntax();
        let line_index = LineIndex::new(output);
        let mut symbols = extract_symbols(&root, output, &line_index, uri);

        if let Some(dump) = Recipe::cast(root) {
            for assignment in dump.assignments() {
                if let (Some(name), Some(value)) = (assignment.variable_name(), assignment.value()) {
                    if let Some(symbol) = symbols.get_mut(&name) {
                        symbol.final_value = Some(value.content());
                    }
                }
            }
        }

        Self {
            recipe: recipe.to_string(),
            symbols,
        }
    }

    pub fn symbol(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    /// Final value of `name`
    pub fn value(&self, name: &str) -> Option<&str> {
        self.symbol(name).and_then(|s| s.final_value.as_deref())
    }

    /// Every symbol with its final value, in dump order
    pub fn values(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.symbols
            .values()
            .map(|s| (s.name.as_str(), s.final_value.as_deref()))
    }
}

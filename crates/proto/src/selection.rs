use serde::{Deserialize, Serialize};

/// Snapshot of a resolved skill selection, as reported to users and tooling.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Selection {
    /// Directory holding the root config, when the selection came from a root load.
    pub base_directory: Option<String>,
    /// Imported paths in sorted order.
    pub imports: Vec<String>,
    /// `true` when no import is declared, meaning every path is in scope.
    pub unrestricted: bool,
}

impl Selection {
    /// Renders the selection as plain text, one import per line.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        if let Some(base) = &self.base_directory {
            out.push_str(&format!("base: {base}\n"));
        }
        if self.unrestricted {
            out.push_str("imports: (everything)\n");
            return out;
        }
        out.push_str("imports:\n");
        for import in &self.imports {
            out.push_str(&format!("  - {import}\n"));
        }
        out
    }
}

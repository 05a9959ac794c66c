use serde::{Deserialize, Serialize};

/// A generated file, relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Output {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imports: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prepend: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl Output {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: Some(content.into()),
            ..Default::default()
        }
    }

    pub fn with_imports(mut self, imports: impl Into<String>) -> Self {
        self.imports = Some(imports.into());
        self
    }

    pub fn with_prepend(mut self, prepend: impl Into<String>) -> Self {
        self.prepend = Some(prepend.into());
        self
    }

    /// File text: non-empty segments among imports, prepend and content, separated by a blank line.
    pub fn render(&self) -> String {
        [&self.imports, &self.prepend, &self.content]
            .into_iter()
            .filter_map(|segment| segment.as_deref())
            .filter(|segment| !segment.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

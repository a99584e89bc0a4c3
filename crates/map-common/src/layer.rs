//! Layer definitions and manifest entries.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Unique identifier for a layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerId(pub String);

impl LayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derive an id from a file reference ("pollution_age.json" -> "pollution_age").
    pub fn from_file(file: &str) -> Self {
        let stem = Path::new(file)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(file);
        Self(stem.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One selectable data source.
///
/// The file reference is fixed at construction; only the label may change
/// (through label overrides).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layer {
    id: LayerId,
    label: String,
    file: String,
}

impl Layer {
    pub fn new(id: LayerId, label: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            file: file.into(),
        }
    }

    pub fn id(&self) -> &LayerId {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    /// Return a copy of this layer carrying a different display label.
    pub fn relabeled(&self, label: impl Into<String>) -> Self {
        Self {
            id: self.id.clone(),
            label: label.into(),
            file: self.file.clone(),
        }
    }

    /// Check whether `key` names this layer by file reference or id.
    pub fn matches(&self, key: &str) -> bool {
        self.file == key || self.id.0 == key
    }
}

/// One entry of `manifest.json`: a bare filename or a `{file, label}` object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ManifestEntry {
    File(String),
    Described {
        file: String,
        #[serde(default)]
        label: Option<String>,
        #[serde(default)]
        id: Option<String>,
    },
}

impl ManifestEntry {
    pub fn file(&self) -> &str {
        match self {
            ManifestEntry::File(file) => file,
            ManifestEntry::Described { file, .. } => file,
        }
    }

    /// Normalize into a layer, synthesizing the label when none is supplied.
    pub fn into_layer(self) -> Layer {
        match self {
            ManifestEntry::File(file) => {
                let label = tidy_label(&file);
                Layer::new(LayerId::from_file(&file), label, file)
            }
            ManifestEntry::Described { file, label, id } => {
                let label = label
                    .filter(|l| !l.is_empty())
                    .unwrap_or_else(|| tidy_label(&file));
                let id = id.map(LayerId::new).unwrap_or_else(|| LayerId::from_file(&file));
                Layer::new(id, label, file)
            }
        }
    }
}

/// Build a display label from a filename.
///
/// Strips a trailing `.json` (any case), turns each run of `_`/`-` into a
/// single space and capitalizes the first letter of every word.
pub fn tidy_label(filename: &str) -> String {
    if filename.is_empty() {
        return String::new();
    }

    let name = match filename.len().checked_sub(5) {
        Some(cut)
            if filename.is_char_boundary(cut) && filename[cut..].eq_ignore_ascii_case(".json") =>
        {
            &filename[..cut]
        }
        _ => filename,
    };

    let mut spaced = String::with_capacity(name.len());
    let mut in_separator = false;
    for c in name.chars() {
        if c == '_' || c == '-' {
            if !in_separator {
                spaced.push(' ');
            }
            in_separator = true;
        } else {
            spaced.push(c);
            in_separator = false;
        }
    }

    spaced
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Layers used when no manifest can be loaded.
pub fn fallback_layers() -> Vec<Layer> {
    [
        ("economic", "Economic Status", "pollution_income.json"),
        ("race", "Race", "pollution_race.json"),
        ("age", "Age", "pollution_age.json"),
        ("pollution", "PM2.5", "pollution_pm25.json"),
    ]
    .into_iter()
    .map(|(id, label, file)| Layer::new(LayerId::new(id), label, file))
    .collect()
}

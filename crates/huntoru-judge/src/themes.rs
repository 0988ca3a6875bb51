//! Read-only theme catalog with random selection by difficulty.

use std::path::Path;

use rand::seq::SliceRandom;
use serde::Deserialize;

use crate::error::{JudgeError, JudgeResult};
use crate::types::{Difficulty, Theme};

/// Upper bound on themes returned by one pick.
pub const MAX_PICK: usize = 10;

/// Theme lookup used by the game's theme screen.
pub trait ThemeCatalog: Send + Sync {
    /// Up to `limit` distinct themes of `difficulty`, in random order.
    fn pick(&self, difficulty: Difficulty, limit: usize) -> Vec<Theme>;

    /// Total number of themes.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Deserialize)]
struct ThemeEntry {
    difficulty: Difficulty,
    theme: String,
}

const SEED: &[(Difficulty, &str)] = &[
    (Difficulty::Easy, "何か四角いもの"),
    (Difficulty::Easy, "何か丸いもの"),
    (Difficulty::Easy, "何か食べ物"),
    (Difficulty::Easy, "何か飲み物"),
    (Difficulty::Easy, "何か植物"),
    (Difficulty::Easy, "何か布製のもの"),
    (Difficulty::Easy, "何か光るもの"),
    (Difficulty::Normal, "本"),
    (Difficulty::Normal, "コップ"),
    (Difficulty::Normal, "時計"),
    (Difficulty::Normal, "鍵"),
    (Difficulty::Normal, "椅子"),
    (Difficulty::Normal, "ペン"),
    (Difficulty::Normal, "リモコン"),
    (Difficulty::Hard, "白い皿"),
    (Difficulty::Hard, "黒いリモコン"),
    (Difficulty::Hard, "茶色い椅子"),
    (Difficulty::Hard, "青い本"),
    (Difficulty::Hard, "緑の植物"),
    (Difficulty::Hard, "銀色のスプーン"),
    (Difficulty::Hard, "透明なコップ"),
];

/// Catalog held in memory. Ids follow insertion order starting at 1.
#[derive(Debug, Clone)]
pub struct InMemoryCatalog {
    themes: Vec<Theme>,
}

impl InMemoryCatalog {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (Difficulty, S)>,
        S: Into<String>,
    {
        let themes = entries
            .into_iter()
            .zip(1..)
            .map(|((difficulty, theme), id)| Theme {
                id,
                difficulty,
                theme: theme.into(),
            })
            .collect();
        Self { themes }
    }

    /// The built-in seed themes.
    pub fn builtin() -> Self {
        Self::new(SEED.iter().copied())
    }

    /// Parse a YAML list of `{ difficulty, theme }` entries.
    pub fn from_yaml(content: &str) -> JudgeResult<Self> {
        let entries: Vec<ThemeEntry> = serde_yaml::from_str(content)
            .map_err(|e| JudgeError::config(format!("invalid theme catalog: {e}")))?;
        if let Some(blank) = entries.iter().position(|e| e.theme.trim().is_empty()) {
            return Err(JudgeError::config(format!(
                "invalid theme catalog: entry {} has an empty theme",
                blank + 1
            )));
        }
        Ok(Self::new(entries.into_iter().map(|e| (e.difficulty, e.theme))))
    }

    pub fn load(path: &Path) -> JudgeResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            JudgeError::config(format!("failed to read {}: {e}", path.display()))
        })?;
        let catalog = Self::from_yaml(&content)?;
        tracing::info!(path = %path.display(), themes = catalog.len(), "loaded theme catalog");
        Ok(catalog)
    }
}

impl ThemeCatalog for InMemoryCatalog {
    fn pick(&self, difficulty: Difficulty, limit: usize) -> Vec<Theme> {
        let matching: Vec<&Theme> = self
            .themes
            .iter()
            .filter(|t| t.difficulty == difficulty)
            .collect();
        matching
            .choose_multiple(&mut rand::thread_rng(), limit.min(MAX_PICK))
            .map(|t| (*t).clone())
            .collect()
    }

    fn len(&self) -> usize {
        self.themes.len()
    }
}

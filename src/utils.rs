// src/utils.rs

use crate::{constants, error::*};
use anyhow::Context;
use regex::Regex;
use std::{
    collections::BTreeSet,
    path::{Component, Path, PathBuf},
    sync::LazyLock,
};

static UNSAFE_CHARS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[\\/*?:"<>|\x00-\x1f]"#).unwrap());
static SPACES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

const RESERVED_STEMS: [&str; 22] = [
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

pub fn is_http_url(text: &str) -> bool {
    url::Url::parse(text).is_ok_and(|u| matches!(u.scheme(), "http" | "https"))
}

/// Turns a server-side file name into something safe to create locally.
pub fn sanitize_filename(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return "unknown".to_string();
    }

    let cleaned = UNSAFE_CHARS_RE.replace_all(trimmed, " ");
    let cleaned = SPACES_RE.replace_all(&cleaned, " ");
    let mut cleaned = cleaned
        .trim_matches(|c: char| c == '.' || c.is_whitespace())
        .to_string();
    if cleaned.is_empty() {
        return "unnamed".to_string();
    }

    let stem = Path::new(&cleaned)
        .file_stem()
        .map(|s| s.to_string_lossy().to_uppercase())
        .unwrap_or_default();
    if RESERVED_STEMS.contains(&stem.as_str()) {
        cleaned.insert(0, '_');
    }

    if cleaned.len() <= constants::MAX_FILENAME_BYTES {
        return cleaned;
    }
    // keep the extension, shorten the stem
    match cleaned.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && ext.len() < 16 => {
            let budget = constants::MAX_FILENAME_BYTES.saturating_sub(ext.len() + 1);
            format!("{}.{}", truncate_utf8(stem, budget), ext)
        }
        _ => truncate_utf8(&cleaned, constants::MAX_FILENAME_BYTES).to_string(),
    }
}

fn truncate_utf8(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Shortens text for one terminal line; wide characters count double.
pub fn truncate_text(text: &str, max_width: usize) -> String {
    let mut width = 0;
    for (i, c) in text.char_indices() {
        width += if c.is_ascii() { 1 } else { 2 };
        if width > max_width.saturating_sub(3) {
            return format!("{}...", &text[..i]);
        }
    }
    text.to_string()
}

/// Parses "1,3,5-7" or "all" into sorted zero-based indices; junk and out-of-range entries are dropped.
pub fn parse_selection_indices(selection: &str, total_items: usize) -> Vec<usize> {
    if selection.trim().eq_ignore_ascii_case("all") {
        return (0..total_items).collect();
    }
    let in_range = |n: usize| n >= 1 && n <= total_items;
    let mut indices = BTreeSet::new();
    for part in selection.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match part.split_once('-') {
            Some((a, b)) => {
                let (Ok(a), Ok(b)) = (a.trim().parse::<usize>(), b.trim().parse::<usize>()) else {
                    continue;
                };
                if a == 0 || b == 0 {
                    continue;
                }
                indices.extend((a.min(b)..=a.max(b)).filter(|n| in_range(*n)).map(|n| n - 1));
            }
            None => {
                if let Ok(n) = part.parse::<usize>()
                    && in_range(n)
                {
                    indices.insert(n - 1);
                }
            }
        }
    }
    indices.into_iter().collect()
}

/// Joins `relative` under `base_dir`, refusing anything that would escape it.
pub fn secure_join_path(base_dir: &Path, relative: &Path) -> AppResult<PathBuf> {
    let base = dunce::canonicalize(base_dir)
        .with_context(|| format!("output directory {:?} does not exist or is not accessible", base_dir))?;
    let mut joined = base.clone();
    for component in relative.components() {
        match component {
            Component::Normal(part) => joined.push(part),
            Component::ParentDir => {
                return Err(AppError::UserInputError(format!(
                    "refusing path containing '..': {:?}",
                    relative
                )));
            }
            _ => continue,
        }
    }
    if !joined.starts_with(&base) {
        return Err(AppError::UserInputError(format!(
            "path escapes the output directory: {:?}",
            relative
        )));
    }
    Ok(joined)
}

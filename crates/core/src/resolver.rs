//! Fuzzy canonicalization of map identifiers.
//!
//! Telemetry sources deliver map names in many shapes: full filesystem
//! paths, workshop paths with numeric IDs, version-suffixed names, stray
//! file extensions, mixed casing. [`MapCatalog::resolve`] normalizes an
//! arbitrary identifier and matches it against a small fixed catalog of
//! known maps by generating a set of candidate spellings for both sides
//! and intersecting them.
//!
//! Matching is heuristic and order-sensitive: the catalog is scanned in
//! declared order and the first entry that matches wins.

use std::collections::HashSet;
use std::fmt;

/// Map type prefixes that may precede the canonical name
/// (`de_ancient_v2` matches `de_ancient` via the `de_` remainder).
const KNOWN_MAP_PREFIXES: &[&str] = &["cs", "de", "ar", "gg", "aim", "awp", "fy", "dz"];

/// The fixed catalog of maps the radar ships assets for, in match
/// priority order.
const KNOWN_MAPS: &[&str] = &[
    "cs_agency",
    "cs_italy",
    "cs_office",
    "de_ancient",
    "de_anubis",
    "de_dust2",
    "de_grail",
    "de_inferno",
    "de_jura",
    "de_mills",
    "de_mirage",
    "de_nuke",
    "de_overpass",
    "de_thera",
    "de_train",
    "de_vertigo",
];

/// Separator-delimited tokens this short are too ambiguous to count as
/// match evidence on their own (`de`, `cs`, `v2`, ...).
const MIN_TOKEN_LEN: usize = 4;

/// Result of resolving a raw map identifier.
///
/// Invariant: `Known` values are always members of the catalog that
/// produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedMap {
    Known(String),
    Invalid,
}

impl ResolvedMap {
    /// Canonical name, or the `"invalid"` sentinel.
    pub fn as_str(&self) -> &str {
        match self {
            ResolvedMap::Known(name) => name,
            ResolvedMap::Invalid => "invalid",
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, ResolvedMap::Known(_))
    }
}

impl fmt::Display for ResolvedMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered catalog of known maps plus the prefix list used for
/// remainder matching. Catalog order is semantic: earlier entries win
/// ties.
#[derive(Debug, Clone)]
pub struct MapCatalog {
    maps: Vec<String>,
    prefixes: Vec<String>,
}

impl Default for MapCatalog {
    fn default() -> Self {
        Self::new(
            KNOWN_MAPS.iter().map(|s| s.to_string()),
            KNOWN_MAP_PREFIXES.iter().map(|s| s.to_string()),
        )
    }
}

impl MapCatalog {
    pub fn new(
        maps: impl IntoIterator<Item = String>,
        prefixes: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            maps: maps.into_iter().collect(),
            prefixes: prefixes.into_iter().collect(),
        }
    }

    /// Canonical map names in match priority order.
    pub fn maps(&self) -> &[String] {
        &self.maps
    }

    /// Resolves a raw identifier to a catalog entry, or
    /// [`ResolvedMap::Invalid`] when nothing matches.
    pub fn resolve(&self, raw: Option<&str>) -> ResolvedMap {
        let base = base_name(raw);
        if base.is_empty() || base == "invalid" {
            return ResolvedMap::Invalid;
        }

        // Exact-match fast path.
        if self.maps.iter().any(|m| *m == base) {
            return ResolvedMap::Known(base);
        }

        let candidates = self.candidates(&base);
        for canonical in &self.maps {
            if candidates.contains(canonical.as_str()) {
                return ResolvedMap::Known(canonical.clone());
            }
            // Bidirectional fuzzy match: the canonical name's own variants
            // may intersect the input's.
            let canonical_candidates = self.candidates(canonical);
            if !canonical_candidates.is_disjoint(&candidates) {
                return ResolvedMap::Known(canonical.clone());
            }
        }

        ResolvedMap::Invalid
    }

    /// Candidate spellings for an already-normalized base name.
    ///
    /// Includes the value itself, sanitized and digit-stripped forms,
    /// separator-delimited sub-tokens (recursively), the pre-underscore
    /// head when long enough, and the variants of the remainder after
    /// any known map-type prefix.
    pub fn candidates(&self, base: &str) -> HashSet<String> {
        let mut variants = HashSet::new();
        let mut processed = HashSet::new();

        collect_variants(base, &mut variants, &mut processed);

        for prefix in &self.prefixes {
            if let Some(rest) = base.strip_prefix(prefix.as_str()) {
                if let Some(rest) = rest.strip_prefix('_') {
                    collect_variants(rest, &mut variants, &mut processed);
                }
            }
        }

        variants
    }
}

/// Normalizes a raw identifier: lowercase, last path segment, extension
/// stripped. Empty string for absent input.
pub fn base_name(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return String::new();
    };

    let normalized = raw.to_lowercase();
    let last_segment = normalized
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    last_segment
        .split('.')
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Removes everything outside `[a-z0-9]`; optionally digits too.
fn sanitize(value: &str, remove_digits: bool) -> String {
    value
        .chars()
        .filter(|c| {
            c.is_ascii_lowercase() || (!remove_digits && c.is_ascii_digit())
        })
        .collect()
}

/// Adds the variants of `value` to the output set. The `processed` set
/// guards against revisiting a value, so recursion is bounded by the
/// number of distinct separator-delimited tokens in the input.
fn collect_variants(value: &str, variants: &mut HashSet<String>, processed: &mut HashSet<String>) {
    let value = value.trim();
    if value.is_empty() || processed.contains(value) {
        return;
    }
    processed.insert(value.to_string());
    variants.insert(value.to_string());

    let sanitized = sanitize(value, false);
    if !sanitized.is_empty() {
        variants.insert(sanitized);
        let no_digits = sanitize(value, true);
        if !no_digits.is_empty() {
            variants.insert(no_digits);
        }
    }

    // Sub-tokens become candidates in their own right, but only when long
    // enough to identify a map: `mirage` in `de_mirage_final` is evidence,
    // `de` or `v2` is not.
    for token in value.split(|c: char| !c.is_ascii_alphanumeric()) {
        if token != value && token.len() >= MIN_TOKEN_LEN {
            collect_variants(token, variants, processed);
        }
    }

    // The head before the first underscore, when it is a real name rather
    // than a short type prefix.
    if let Some((head, _)) = value.split_once('_') {
        if head.len() > 3 {
            variants.insert(head.to_string());
            let head_sanitized = sanitize(head, false);
            if !head_sanitized.is_empty() {
                variants.insert(head_sanitized);
                let head_no_digits = sanitize(head, true);
                if !head_no_digits.is_empty() {
                    variants.insert(head_no_digits);
                }
            }
        }
    }
}

//! List filtering, ordering, and pagination helpers.
//!
//! Lives in `core` so both the repository layer and the API query parsing
//! share one whitelist of sortable columns per entity.

// ---------------------------------------------------------------------------
// Pagination defaults
// ---------------------------------------------------------------------------

/// Default page size for list endpoints.
pub const DEFAULT_LIST_LIMIT: i64 = 50;

/// Maximum page size for list endpoints.
pub const MAX_LIST_LIMIT: i64 = 500;

/// Clamp a user-provided limit to valid bounds.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).max(1).min(max)
}

/// Clamp a user-provided offset to non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

/// Sortable project columns (`?ordering=-spi`).
pub const PROJECT_ORDERING_FIELDS: &[&str] =
    &["name", "status", "completion_percentage", "spi", "start_date", "created_at"];
pub const PROJECT_DEFAULT_ORDERING: &str = "created_at DESC";

pub const RISK_ORDERING_FIELDS: &[&str] = &["severity", "probability", "identified_date"];
/// Severity is text, so "most severe first" is expressed with an explicit rank.
pub const RISK_DEFAULT_ORDERING: &str =
    "CASE severity WHEN 'critical' THEN 4 WHEN 'high' THEN 3 WHEN 'medium' THEN 2 ELSE 1 END DESC, probability DESC";

pub const TASK_ORDERING_FIELDS: &[&str] = &["due_date", "status", "completion_percentage"];
pub const TASK_DEFAULT_ORDERING: &str = "due_date ASC";

pub const RESOURCE_ORDERING_FIELDS: &[&str] = &["name", "role", "allocation_percentage"];
pub const RESOURCE_DEFAULT_ORDERING: &str = "name ASC";

pub const MILESTONE_ORDERING_FIELDS: &[&str] = &["planned_date", "status"];
pub const MILESTONE_DEFAULT_ORDERING: &str = "planned_date ASC";

pub const ISSUE_ORDERING_FIELDS: &[&str] = &["reported_date", "severity", "status"];
pub const ISSUE_DEFAULT_ORDERING: &str = "reported_date DESC";

/// Turn a `?ordering=` value into a safe `ORDER BY` fragment.
///
/// A leading `-` sorts descending. Fields not in `allowed` fall back to
/// `default`, so the result can be interpolated into SQL directly.
pub fn resolve_ordering(requested: Option<&str>, allowed: &[&str], default: &str) -> String {
    let Some(raw) = requested.map(str::trim).filter(|s| !s.is_empty()) else {
        return default.to_string();
    };
    let (field, direction) = match raw.strip_prefix('-') {
        Some(field) => (field, "DESC"),
        None => (raw, "ASC"),
    };
    if allowed.contains(&field) {
        format!("{field} {direction}, id ASC")
    } else {
        default.to_string()
    }
}

/// Wrap a free-text search term for an `ILIKE` match.
///
/// Escapes the LIKE wildcards so user input is matched literally.
pub fn like_pattern(term: &str) -> String {
    let escaped = term
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_limit_applies_default_and_bounds() {
        assert_eq!(clamp_limit(None, 50, 500), 50);
        assert_eq!(clamp_limit(Some(0), 50, 500), 1);
        assert_eq!(clamp_limit(Some(10_000), 50, 500), 500);
    }

    #[test]
    fn clamp_offset_is_non_negative() {
        assert_eq!(clamp_offset(Some(-5)), 0);
        assert_eq!(clamp_offset(None), 0);
        assert_eq!(clamp_offset(Some(20)), 20);
    }

    #[test]
    fn ordering_handles_direction_prefix() {
        let o = resolve_ordering(Some("-spi"), PROJECT_ORDERING_FIELDS, PROJECT_DEFAULT_ORDERING);
        assert_eq!(o, "spi DESC, id ASC");
        let o = resolve_ordering(Some("name"), PROJECT_ORDERING_FIELDS, PROJECT_DEFAULT_ORDERING);
        assert_eq!(o, "name ASC, id ASC");
    }

    #[test]
    fn unknown_ordering_falls_back_to_default() {
        let o = resolve_ordering(
            Some("budget; DROP TABLE projects"),
            PROJECT_ORDERING_FIELDS,
            PROJECT_DEFAULT_ORDERING,
        );
        assert_eq!(o, PROJECT_DEFAULT_ORDERING);
        assert_eq!(
            resolve_ordering(None, TASK_ORDERING_FIELDS, TASK_DEFAULT_ORDERING),
            TASK_DEFAULT_ORDERING
        );
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("ERP"), "%ERP%");
        assert_eq!(like_pattern("50%_done"), "%50\\%\\_done%");
    }
}

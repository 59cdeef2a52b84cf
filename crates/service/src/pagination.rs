//! Pagination utilities for service layer
//!
//! `Window` is the `start`/`max` pair of a list request, both optional.

use sea_orm::QuerySelect;

/// Stand-in limit when only an offset is requested; SQLite rejects `OFFSET` without `LIMIT`.
const UNBOUNDED: u64 = i64::MAX as u64;

/// Zero-based offset and maximum row count of a list request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Window {
    /// rows to skip; `None` means 0
    pub start: Option<u64>,
    /// rows to return; `None` means no limit
    pub max: Option<u64>,
}

impl Window {
    pub fn new(start: Option<u64>, max: Option<u64>) -> Self { Self { start, max } }

    /// Apply offset and limit to a select, leaving ordering to the caller.
    /// Values above `i64::MAX` are clamped; the SQL drivers bind them as signed.
    pub fn apply<Q: QuerySelect>(self, mut query: Q) -> Q {
        let offset = self.start.filter(|s| *s > 0).map(|s| s.min(UNBOUNDED));
        if let Some(start) = offset {
            query = query.offset(start);
        }
        match (self.max.map(|m| m.min(UNBOUNDED)), offset) {
            (Some(max), _) => query.limit(max),
            (None, Some(_)) => query.limit(UNBOUNDED),
            (None, None) => query,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Window;
    use models::category;
    use sea_orm::{DbBackend, EntityTrait, QueryTrait};

    fn sql(w: Window) -> String {
        w.apply(category::Entity::find()).build(DbBackend::Sqlite).to_string()
    }

    #[test]
    fn default_window_adds_no_clause() {
        let s = sql(Window::default());
        assert!(!s.contains("LIMIT"));
        assert!(!s.contains("OFFSET"));
    }

    #[test]
    fn offset_only_gets_an_unbounded_limit() {
        let s = sql(Window::new(Some(3), None));
        assert!(s.contains("OFFSET 3"), "{s}");
        assert!(s.contains(&format!("LIMIT {}", i64::MAX)), "{s}");
    }

    #[test]
    fn start_and_max_map_to_offset_and_limit() {
        let s = sql(Window::new(Some(2), Some(1)));
        assert!(s.contains("LIMIT 1"), "{s}");
        assert!(s.contains("OFFSET 2"), "{s}");
    }

    #[test]
    fn huge_values_are_clamped_to_signed_range() {
        let s = sql(Window::new(Some(u64::MAX), Some(u64::MAX)));
        assert!(s.contains(&format!("OFFSET {}", i64::MAX)), "{s}");
        assert!(s.contains(&format!("LIMIT {}", i64::MAX)), "{s}");
        assert!(!s.contains(&u64::MAX.to_string()), "{s}");
    }

    #[test]
    fn zero_start_is_no_offset() {
        let s = sql(Window::new(Some(0), Some(5)));
        assert!(s.contains("LIMIT 5"), "{s}");
        assert!(!s.contains("OFFSET"), "{s}");
    }
}

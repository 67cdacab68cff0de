//! Listing query construction
//!
//! Translates raw query-string values into a typed [`TaskQuery`]. Parsing is
//! deliberately lenient: an unrecognised value means "filter absent" rather
//! than an error, matching the observed behaviour of the HTTP surface.

use chrono::{DateTime, NaiveDate, Utc};

use super::model::Task;

/// Field a task listing may be sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Date,
    Completed,
    Description,
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "date" => Some(Self::Date),
            "completed" => Some(Self::Completed),
            "description" => Some(Self::Description),
            "createdAt" => Some(Self::CreatedAt),
            "updatedAt" => Some(Self::UpdatedAt),
            _ => None,
        }
    }
}

/// Sort order parsed from a `"<field>:<direction>"` value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub field: SortField,
    pub descending: bool,
}

impl SortSpec {
    /// Parse a `sortBy` value.
    ///
    /// Direction `"desc"` sorts descending; anything else (including a
    /// missing direction) sorts ascending. An unrecognised field yields
    /// `None`, leaving the store's default order in effect.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.splitn(2, ':');
        let field = SortField::parse(parts.next().unwrap_or_default())?;
        let descending = parts.next() == Some("desc");
        Some(Self { field, descending })
    }

    /// Total order on tasks for this spec
    pub fn compare(&self, a: &Task, b: &Task) -> std::cmp::Ordering {
        let ordering = match self.field {
            SortField::Date => a.date.cmp(&b.date),
            SortField::Completed => a.completed.cmp(&b.completed),
            SortField::Description => a.description.cmp(&b.description),
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        };
        if self.descending {
            ordering.reverse()
        } else {
            ordering
        }
    }
}

/// Filter, sort and pagination parameters for a task listing.
///
/// The owner scope is not part of the query; it is a separate, mandatory
/// argument to the repository so it can never be forgotten.
#[derive(Debug, Clone, Default)]
pub struct TaskQuery {
    pub completed: Option<bool>,
    pub from_date: Option<DateTime<Utc>>,
    pub to_date: Option<DateTime<Utc>>,
    pub sort: Option<SortSpec>,
    pub limit: Option<usize>,
    pub skip: Option<usize>,
}

impl TaskQuery {
    /// Build a query from raw query-string values.
    pub fn from_raw(
        completed: Option<&str>,
        from_date: Option<&str>,
        to_date: Option<&str>,
        sort_by: Option<&str>,
        limit: Option<&str>,
        skip: Option<&str>,
    ) -> Self {
        Self {
            completed: completed.and_then(parse_completed),
            from_date: from_date.and_then(parse_date),
            to_date: to_date.and_then(parse_date),
            sort: sort_by.and_then(SortSpec::parse),
            limit: limit.and_then(parse_index),
            skip: skip.and_then(parse_index),
        }
    }

    /// True when the task passes every filter in this query
    pub fn matches(&self, task: &Task) -> bool {
        if let Some(completed) = self.completed {
            if task.completed != completed {
                return false;
            }
        }
        if let Some(from) = self.from_date {
            if task.date < from {
                return false;
            }
        }
        if let Some(to) = self.to_date {
            if task.date > to {
                return false;
            }
        }
        true
    }
}

/// Parse a textual `completed` filter. Only the exact strings `"true"` and
/// `"false"` count; anything else means the filter is absent.
fn parse_completed(raw: &str) -> Option<bool> {
    match raw {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// Parse a date value, accepting RFC 3339 or a bare `YYYY-MM-DD` (taken as
/// midnight UTC). Unparseable values are treated as absent.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    raw.parse::<NaiveDate>()
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Parse a `limit`/`skip` value; absent or unparseable means no bound.
fn parse_index(raw: &str) -> Option<usize> {
    raw.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_completed_filter() {
        let query = TaskQuery::from_raw(Some("true"), None, None, None, None, None);
        assert_eq!(query.completed, Some(true));

        let query = TaskQuery::from_raw(Some("false"), None, None, None, None, None);
        assert_eq!(query.completed, Some(false));

        // Anything else behaves as filter-absent
        let query = TaskQuery::from_raw(Some("yes"), None, None, None, None, None);
        assert_eq!(query.completed, None);
    }

    #[test]
    fn test_parse_sort_by() {
        let sort = SortSpec::parse("date:desc").unwrap();
        assert_eq!(sort.field, SortField::Date);
        assert!(sort.descending);

        let sort = SortSpec::parse("createdAt").unwrap();
        assert_eq!(sort.field, SortField::CreatedAt);
        assert!(!sort.descending);

        // Any direction other than "desc" sorts ascending
        let sort = SortSpec::parse("date:backwards").unwrap();
        assert!(!sort.descending);

        assert!(SortSpec::parse("favouriteColour:desc").is_none());
    }

    #[test]
    fn test_parse_dates() {
        let query = TaskQuery::from_raw(
            None,
            Some("2024-03-01"),
            Some("2024-03-31T23:59:59Z"),
            None,
            None,
            None,
        );
        assert_eq!(
            query.from_date,
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(
            query.to_date,
            Some(Utc.with_ymd_and_hms(2024, 3, 31, 23, 59, 59).unwrap())
        );

        let query = TaskQuery::from_raw(None, Some("not-a-date"), None, None, None, None);
        assert_eq!(query.from_date, None);
    }

    #[test]
    fn test_lenient_limit_and_skip() {
        let query = TaskQuery::from_raw(None, None, None, None, Some("10"), Some("20"));
        assert_eq!(query.limit, Some(10));
        assert_eq!(query.skip, Some(20));

        let query = TaskQuery::from_raw(None, None, None, None, Some("lots"), Some("-1"));
        assert_eq!(query.limit, None);
        assert_eq!(query.skip, None);
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let date = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
        let task = crate::task::Task::new("u", "bounds").unwrap().with_date(date);

        let query = TaskQuery {
            from_date: Some(date),
            to_date: Some(date),
            ..Default::default()
        };
        assert!(query.matches(&task));

        let query = TaskQuery {
            from_date: Some(date + chrono::Duration::seconds(1)),
            ..Default::default()
        };
        assert!(!query.matches(&task));
    }
}

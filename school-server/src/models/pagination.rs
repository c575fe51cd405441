//! Paging and sorting for collection endpoints

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ValidationError;

/// Default cap on items per page
pub const MAX_PAGE_SIZE: u32 = 100;

/// Default items per page
pub const DEFAULT_PAGE_SIZE: u32 = 3;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    /// Apply this direction to an ascending comparison.
    pub fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }
}

/// Student properties that can be sorted on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StudentSortField {
    #[default]
    Id,
    Name,
    Email,
}

impl StudentSortField {
    /// Column name; only ever one of a fixed set, safe to splice into SQL.
    pub fn column(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Email => "email",
        }
    }
}

/// Parsed `sort` query parameter: `property[,asc|desc]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sort {
    pub field: StudentSortField,
    pub direction: Direction,
}

impl FromStr for Sort {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(',').map(str::trim);

        let field = match parts.next() {
            None | Some("") => {
                return Err(ValidationError::InvalidFormat {
                    field: "sort",
                    reason: "expected property[,asc|desc]",
                })
            }
            Some(p) => match p.to_lowercase().as_str() {
                "id" => StudentSortField::Id,
                "name" => StudentSortField::Name,
                "email" => StudentSortField::Email,
                _ => {
                    return Err(ValidationError::InvalidVariant {
                        field: "sort",
                        value: p.to_owned(),
                    })
                }
            },
        };

        let direction = match parts.next() {
            None => Direction::Asc,
            Some(d) => match d.to_lowercase().as_str() {
                "asc" => Direction::Asc,
                "desc" => Direction::Desc,
                _ => {
                    return Err(ValidationError::InvalidVariant {
                        field: "sort direction",
                        value: d.to_owned(),
                    })
                }
            },
        };

        if parts.next().is_some() {
            return Err(ValidationError::InvalidFormat {
                field: "sort",
                reason: "expected property[,asc|desc]",
            });
        }

        Ok(Self { field, direction })
    }
}

/// Page request (zero-indexed)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Page number, starting at 0
    pub page: u32,
    /// Items per page
    pub size: u32,
    pub sort: Sort,
}

impl PageRequest {
    /// Create a page request with the default size cap.
    pub fn new(page: u32, size: u32) -> Self {
        Self::capped(page, size, MAX_PAGE_SIZE)
    }

    /// Create a page request, clamping size to `1..=max_size`.
    pub fn capped(page: u32, size: u32, max_size: u32) -> Self {
        Self {
            page,
            size: size.clamp(1, max_size.max(1)),
            sort: Sort::default(),
        }
    }

    pub fn sorted(mut self, sort: Sort) -> Self {
        self.sort = sort;
        self
    }

    /// SQL OFFSET value.
    pub fn offset(&self) -> u64 {
        self.page as u64 * self.size as u64
    }

    /// SQL LIMIT value.
    pub fn limit(&self) -> u32 {
        self.size
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(0, DEFAULT_PAGE_SIZE)
    }
}

/// One page of a collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Total count across all pages
    pub total: i64,
    /// Current page number (zero-indexed)
    pub page: u32,
    pub size: u32,
}

impl<T> Page<T> {
    pub fn empty(request: PageRequest) -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page: request.page,
            size: request.size,
        }
    }

    /// Total number of pages; an empty collection still has one (empty) page.
    pub fn total_pages(&self) -> u32 {
        if self.total <= 0 || self.size == 0 {
            1
        } else {
            (self.total as u64).div_ceil(self.size as u64) as u32
        }
    }

    pub fn has_next(&self) -> bool {
        self.page + 1 < self.total_pages()
    }

    pub fn has_prev(&self) -> bool {
        self.page > 0
    }
}

/// Query parameters for paged listings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub sort: Option<String>,
}

impl PageParams {
    /// Resolve into a page request, applying defaults and the size cap.
    pub fn into_request(self, max_size: u32) -> Result<PageRequest, ValidationError> {
        let sort = match self.sort.as_deref() {
            Some(s) => s.parse()?,
            None => Sort::default(),
        };

        Ok(PageRequest::capped(
            self.page.unwrap_or(0),
            self.size.unwrap_or(DEFAULT_PAGE_SIZE),
            max_size,
        )
        .sorted(sort))
    }
}

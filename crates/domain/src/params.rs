use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortField {
    #[default]
    #[serde(rename = "createdAt")]
    CreatedAt,
    #[serde(rename = "rating")]
    Rating,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "ASC")]
    Asc,
    #[default]
    #[serde(rename = "DESC")]
    Desc,
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreatedAt => write!(f, "createdAt"),
            Self::Rating => write!(f, "rating"),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc => write!(f, "ASC"),
            Self::Desc => write!(f, "DESC"),
        }
    }
}

/// Query parameters of the review listing. Unset fields are left out of the query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_field: Option<SortField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
}

impl ReviewParams {
    pub const DEFAULT_PAGE_SIZE: u32 = 5;

    pub fn with_page_size(size: u32) -> Self {
        Self {
            size: Some(size),
            ..Self::default()
        }
    }

    pub fn sorted(self, field: SortField, direction: Direction) -> Self {
        Self {
            sort_field: Some(field),
            direction: Some(direction),
            page: Some(0),
            ..self
        }
    }

    pub fn at_page(self, page: u32) -> Self {
        Self {
            page: Some(page),
            ..self
        }
    }

    /// `field.DIRECTION` form used by sort selectors.
    pub fn sort_value(&self) -> String {
        format!(
            "{}.{}",
            self.sort_field.unwrap_or_default(),
            self.direction.unwrap_or_default()
        )
    }
}

impl Default for ReviewParams {
    fn default() -> Self {
        Self {
            sort_field: Some(SortField::CreatedAt),
            direction: Some(Direction::Desc),
            page: Some(0),
            size: Some(Self::DEFAULT_PAGE_SIZE),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOption {
    pub label: &'static str,
    pub field: SortField,
    pub direction: Direction,
}

impl SortOption {
    pub fn value(&self) -> String {
        format!("{}.{}", self.field, self.direction)
    }
}

pub const SORT_OPTIONS: [SortOption; 4] = [
    SortOption {
        label: "Most recent",
        field: SortField::CreatedAt,
        direction: Direction::Desc,
    },
    SortOption {
        label: "Oldest",
        field: SortField::CreatedAt,
        direction: Direction::Asc,
    },
    SortOption {
        label: "Highest rating",
        field: SortField::Rating,
        direction: Direction::Desc,
    },
    SortOption {
        label: "Lowest rating",
        field: SortField::Rating,
        direction: Direction::Asc,
    },
];

impl FromStr for SortOption {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SORT_OPTIONS
            .iter()
            .find(|o| o.value() == s)
            .copied()
            .ok_or_else(|| DomainError::InvalidSortOption(s.to_string()))
    }
}

/// Page numbers to show around `current`: 3 in compact layouts, 5 otherwise.
pub fn page_window(current: u32, total_pages: u32, compact: bool) -> Vec<u32> {
    let window = if compact { 3 } else { 5 };
    if total_pages <= window {
        return (0..total_pages).collect();
    }
    let start = current
        .saturating_sub(window / 2)
        .min(total_pages - window);
    (start..start + window).collect()
}

//! Pagination request and response envelope.
//!
//! The envelope serializes as
//! `{content, totalElements, totalPages, number, size}`.

use crate::model::validation::ValidationError;
use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Zero-based page index plus a positive page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    page: u32,
    size: u32,
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Result<Self, ValidationError> {
        if size == 0 {
            return Err(ValidationError::InvalidPageSize(size));
        }
        Ok(Self { page, size })
    }

    pub fn first(size: u32) -> Result<Self, ValidationError> {
        Self::new(0, size)
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Rows to skip; computed in 64 bits so large page indexes cannot wrap.
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of results plus totals for the whole result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u64,
    pub number: u32,
    pub size: u32,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, total_elements: u64, request: PageRequest) -> Self {
        Self {
            content,
            total_elements,
            total_pages: total_elements.div_ceil(u64::from(request.size)),
            number: request.page,
            size: request.size,
        }
    }

    /// Converts every element, keeping totals and page coordinates.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            total_elements: self.total_elements,
            total_pages: self.total_pages,
            number: self.number,
            size: self.size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Page, PageRequest};
    use crate::model::validation::ValidationError;

    #[test]
    fn zero_size_is_rejected() {
        assert_eq!(
            PageRequest::new(0, 0),
            Err(ValidationError::InvalidPageSize(0))
        );
    }

    #[test]
    fn total_pages_is_ceiling_division() {
        let request = PageRequest::new(2, 4).unwrap();
        assert_eq!(Page::new(vec![9, 10], 10, request).total_pages, 3);
        assert_eq!(Page::<u8>::new(vec![], 0, request).total_pages, 0);
        assert_eq!(Page::<u8>::new(vec![], 8, request).total_pages, 2);
    }

    #[test]
    fn offset_does_not_overflow_u32() {
        let request = PageRequest::new(u32::MAX, 1000).unwrap();
        assert_eq!(request.offset(), u64::from(u32::MAX) * 1000);
    }

    #[test]
    fn envelope_uses_external_field_names() {
        let page = Page::new(vec!["a"], 1, PageRequest::default());
        let value = serde_json::to_value(&page).unwrap();
        assert_eq!(value["content"][0], "a");
        assert_eq!(value["totalElements"], 1);
        assert_eq!(value["totalPages"], 1);
        assert_eq!(value["number"], 0);
        assert_eq!(value["size"], 10);
    }
}

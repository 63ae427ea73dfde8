/// Where a paginated `find_by` reads its bounds and reports the total.
pub trait Pagination {
    fn page_size(&self) -> u64;

    /// Records skipped before the current page
    fn offset(&self) -> u64;

    /// Called with the number of records matching the criteria, before the
    /// page is fetched.
    fn set_total_records(&mut self, total: u64);

    fn total_records(&self) -> Option<u64>;
}

/// Fixed-size pages numbered from 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paginator {
    page_size: u64,
    page: u64,
    total_records: Option<u64>,
}

impl Paginator {
    pub fn new(page_size: u64, page: u64) -> Self {
        Self {
            page_size: page_size.max(1),
            page: page.max(1),
            total_records: None,
        }
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    /// Number of pages, once the total is known.
    pub fn page_count(&self) -> Option<u64> {
        self.total_records
            .map(|total| total.div_ceil(self.page_size).max(1))
    }

    pub fn has_next(&self) -> bool {
        self.page_count().is_some_and(|count| self.page < count)
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Move to `page`, keeping the total.
    pub fn set_page(&mut self, page: u64) {
        self.page = page.max(1);
    }
}

impl Pagination for Paginator {
    fn page_size(&self) -> u64 {
        self.page_size
    }

    fn offset(&self) -> u64 {
        (self.page - 1) * self.page_size
    }

    fn set_total_records(&mut self, total: u64) {
        self.total_records = Some(total);

        // Stay within the last page when the total shrinks
        if let Some(count) = self.page_count() {
            self.page = self.page.min(count);
        }
    }

    fn total_records(&self) -> Option<u64> {
        self.total_records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets() {
        assert_eq!(Paginator::new(10, 1).offset(), 0);
        assert_eq!(Paginator::new(10, 3).offset(), 20);
        assert_eq!(Paginator::new(0, 0).offset(), 0);
    }

    #[test]
    fn totals() {
        let mut page = Paginator::new(10, 2);
        assert_eq!(page.page_count(), None);
        assert!(!page.has_next());

        page.set_total_records(25);
        assert_eq!(page.page_count(), Some(3));
        assert!(page.has_next());
        assert!(page.has_prev());
    }

    #[test]
    fn page_is_clamped_to_the_total() {
        let mut page = Paginator::new(10, 9);
        page.set_total_records(12);
        assert_eq!(page.page(), 2);
        assert_eq!(page.offset(), 10);

        page.set_total_records(0);
        assert_eq!(page.page(), 1);
    }
}

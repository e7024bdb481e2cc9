//! Fixed-size paging over an ordered list.

/// Number of rows shown per page unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: usize = 15;

/// Fixed-size windows over an already sorted list. Pages are 1-based.
#[derive(Debug, Clone, PartialEq)]
pub struct Paginator<T> {
    items: Vec<T>,
    page_size: usize,
    current: usize,
}

impl<T> Paginator<T> {
    pub fn new(items: Vec<T>, page_size: usize) -> Self {
        Self {
            items,
            page_size: page_size.max(1),
            current: 1,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn current_page(&self) -> usize {
        self.current
    }

    /// Always at least one, so an empty list still has a (blank) first page.
    pub fn total_pages(&self) -> usize {
        self.items.len().div_ceil(self.page_size).max(1)
    }

    pub fn total_items(&self) -> usize {
        self.items.len()
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn page_items(&self) -> &[T] {
        let start = (self.current - 1) * self.page_size;
        let end = (start + self.page_size).min(self.items.len());
        self.items.get(start..end).unwrap_or(&[])
    }

    /// Moves to `page`, clamped into `1..=total_pages`.
    pub fn go_to(&mut self, page: usize) {
        self.current = page.clamp(1, self.total_pages());
    }

    /// Returns `false` when already on the last page.
    pub fn next(&mut self) -> bool {
        if self.current < self.total_pages() {
            self.current += 1;
            true
        } else {
            false
        }
    }

    /// Returns `false` when already on the first page.
    pub fn previous(&mut self) -> bool {
        if self.current > 1 {
            self.current -= 1;
            true
        } else {
            false
        }
    }

    pub fn has_next(&self) -> bool {
        self.current < self.total_pages()
    }

    pub fn has_previous(&self) -> bool {
        self.current > 1
    }

    /// Iterates over all pages in order.
    pub fn pages(&self) -> impl Iterator<Item = &[T]> {
        self.items.chunks(self.page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navigation_is_clamped() {
        let mut p = Paginator::new((0..32).collect::<Vec<_>>(), 15);
        assert_eq!(p.total_pages(), 3);
        assert!(!p.previous());
        assert!(p.next());
        assert!(p.next());
        assert!(!p.next());
        assert_eq!(p.page_items(), &[30, 31]);
        p.go_to(99);
        assert_eq!(p.current_page(), 3);
        p.go_to(0);
        assert_eq!(p.current_page(), 1);
    }

    #[test]
    fn empty_list_has_one_blank_page() {
        let p: Paginator<u8> = Paginator::new(Vec::new(), DEFAULT_PAGE_SIZE);
        assert_eq!(p.total_pages(), 1);
        assert!(p.page_items().is_empty());
        assert_eq!(p.pages().count(), 0);
    }

    #[test]
    fn zero_page_size_is_treated_as_one() {
        let p = Paginator::new(vec![1, 2], 0);
        assert_eq!(p.page_size(), 1);
        assert_eq!(p.total_pages(), 2);
    }
}

//! Page navigation.

/// Current page of a paginated document. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    current: usize,
    count: usize,
}

impl Pager {
    /// A pager on page 1 of `count` pages. An empty document still reports
    /// page 1 so that every move is a no-op.
    pub fn new(count: usize) -> Self {
        Self {
            current: 1,
            count: count.max(1),
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// 0-based index of the current page.
    pub fn index(&self) -> usize {
        self.current - 1
    }

    /// Move to `page`. Out-of-range pages and the current page are no-ops.
    /// Returns whether the page changed.
    pub fn go_to(&mut self, page: usize) -> bool {
        if page == 0 || page > self.count || page == self.current {
            return false;
        }
        self.current = page;
        true
    }

    pub fn first(&mut self) -> bool {
        self.go_to(1)
    }

    pub fn previous(&mut self) -> bool {
        self.current > 1 && self.go_to(self.current - 1)
    }

    pub fn next(&mut self) -> bool {
        self.go_to(self.current + 1)
    }

    pub fn last(&mut self) -> bool {
        self.go_to(self.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moves_within_bounds() {
        let mut p = Pager::new(3);
        assert!(p.next());
        assert_eq!(p.current(), 2);
        assert!(p.last());
        assert_eq!(p.current(), 3);
        assert!(p.previous());
        assert!(p.first());
        assert_eq!(p.index(), 0);
    }

    #[test]
    fn boundaries_are_no_ops() {
        let mut p = Pager::new(2);
        assert!(!p.previous());
        assert!(!p.first());
        assert_eq!(p.current(), 1);
        p.last();
        assert!(!p.next());
        assert!(!p.last());
        assert_eq!(p.current(), 2);
    }

    #[test]
    fn go_to_rejects_out_of_range() {
        let mut p = Pager::new(5);
        assert!(!p.go_to(0));
        assert!(!p.go_to(6));
        assert!(p.go_to(4));
        assert_eq!(p.current(), 4);
    }

    #[test]
    fn single_page_document() {
        let mut p = Pager::new(1);
        assert!(!p.next());
        assert!(!p.previous());
        assert_eq!(Pager::new(0).count(), 1);
    }
}

//! Abstractions for offset-based pagination.

use std::future::Future;

/// Request of a single page: how many items to skip and how many to return.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Pageable {
    /// Number of items to skip.
    offset: u64,

    /// Maximum number of items on a page.
    size: u64,
}

impl Pageable {
    /// Creates a new [`Pageable`] skipping `offset` items and returning at most
    /// `size` items.
    ///
    /// [`None`] is returned if `size` is zero.
    #[must_use]
    pub fn new(offset: u64, size: u64) -> Option<Self> {
        (size > 0).then_some(Self { offset, size })
    }

    /// Returns number of items to skip.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.offset
    }

    /// Returns maximum number of items on a page.
    #[must_use]
    pub const fn size(&self) -> u64 {
        self.size
    }

    /// Infers the total number of items from the number of items `returned`
    /// for this [`Pageable`], if possible without counting.
    ///
    /// The total is known when:
    /// - this is the first page and it isn't full;
    /// - the page isn't empty and isn't full, so it's the last one.
    #[must_use]
    pub fn infer_total(&self, returned: usize) -> Option<u64> {
        let returned = u64::try_from(returned).ok()?;
        if self.offset == 0 {
            return (returned < self.size).then_some(returned);
        }
        (returned != 0 && returned < self.size)
            .then(|| self.offset.saturating_add(returned))
    }
}

/// A page of items along with the total number of items across all pages.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Page<T> {
    /// Items on this [`Page`].
    content: Vec<T>,

    /// Total number of items across all pages.
    total: u64,

    /// [`Pageable`] this [`Page`] was requested with.
    pageable: Pageable,
}

impl<T> Page<T> {
    /// Creates a new [`Page`] with the provided `content` and `total`.
    #[must_use]
    pub fn new(content: Vec<T>, pageable: Pageable, total: u64) -> Self {
        Self {
            content,
            total,
            pageable,
        }
    }

    /// Creates a new [`Page`] with the provided `content`, calling `count`
    /// only if the total can't be inferred from the `content` itself.
    ///
    /// See [`Pageable::infer_total()`] for the inference rules.
    ///
    /// # Errors
    ///
    /// If `count` is called and fails.
    pub async fn with_total<F, Fut, E>(
        content: Vec<T>,
        pageable: Pageable,
        count: F,
    ) -> Result<Self, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<u64, E>>,
    {
        let total = match pageable.infer_total(content.len()) {
            Some(total) => total,
            None => count().await?,
        };
        Ok(Self::new(content, pageable, total))
    }

    /// Returns items on this [`Page`].
    #[must_use]
    pub fn content(&self) -> &[T] {
        &self.content
    }

    /// Returns total number of items across all pages.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Returns [`Pageable`] this [`Page`] was requested with.
    #[must_use]
    pub const fn pageable(&self) -> Pageable {
        self.pageable
    }

    /// Returns total number of pages.
    #[must_use]
    pub const fn total_pages(&self) -> u64 {
        self.total.div_ceil(self.pageable.size)
    }

    /// Indicates whether there are items after this [`Page`].
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.pageable
            .offset
            .saturating_add(self.pageable.size)
            < self.total
    }
}

/// Sorting by a `K`ey.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Sort<K> {
    /// Key to sort by.
    pub key: K,

    /// [`Direction`] of sorting.
    pub direction: Direction,

    /// Placement of `NULL` values, if specified.
    ///
    /// `NULL`s are considered larger than any other value otherwise.
    pub nulls: Option<Nulls>,
}

impl<K> Sort<K> {
    /// Creates a new ascending [`Sort`] by the provided `key`.
    #[must_use]
    pub const fn asc(key: K) -> Self {
        Self {
            key,
            direction: Direction::Ascending,
            nulls: None,
        }
    }

    /// Creates a new descending [`Sort`] by the provided `key`.
    #[must_use]
    pub const fn desc(key: K) -> Self {
        Self {
            key,
            direction: Direction::Descending,
            nulls: None,
        }
    }

    /// Places `NULL` values first.
    #[must_use]
    pub fn nulls_first(mut self) -> Self {
        self.nulls = Some(Nulls::First);
        self
    }

    /// Places `NULL` values last.
    #[must_use]
    pub fn nulls_last(mut self) -> Self {
        self.nulls = Some(Nulls::Last);
        self
    }

    /// Returns the effective [`Nulls`] placement of this [`Sort`].
    ///
    /// Unless specified, `NULL`s go last in [`Direction::Ascending`] order and
    /// first in [`Direction::Descending`] one.
    #[must_use]
    pub const fn nulls_placement(&self) -> Nulls {
        match (self.nulls, self.direction) {
            (Some(nulls), _) => nulls,
            (None, Direction::Ascending) => Nulls::Last,
            (None, Direction::Descending) => Nulls::First,
        }
    }
}

/// Direction of sorting.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(
    feature = "juniper",
    derive(juniper::GraphQLEnum),
    graphql(name = "SortDirection")
)]
pub enum Direction {
    /// Ascending order.
    Ascending,

    /// Descending order.
    Descending,
}

impl Direction {
    #[cfg(feature = "postgres")]
    /// Returns SQL keyword representing this [`Direction`].
    #[must_use]
    pub const fn sql(&self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

/// Placement of `NULL` values in sorting.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(
    feature = "juniper",
    derive(juniper::GraphQLEnum),
    graphql(name = "SortNulls")
)]
pub enum Nulls {
    /// `NULL`s go before any other value.
    First,

    /// `NULL`s go after any other value.
    Last,
}

impl Nulls {
    #[cfg(feature = "postgres")]
    /// Returns SQL clause representing this [`Nulls`] placement.
    #[must_use]
    pub const fn sql(&self) -> &'static str {
        match self {
            Self::First => "NULLS FIRST",
            Self::Last => "NULLS LAST",
        }
    }
}

/// Defines pagination types.
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_pagination {
    ($node:ty, $key:ty) => {
        #[doc = "A page of list items."]
        pub type Page = $crate::pagination::Page<$node>;

        #[doc = "Sorting of list items."]
        pub type Sort = $crate::pagination::Sort<$key>;

        #[doc = "Request of a [`Page`]."]
        pub type Pageable = $crate::pagination::Pageable;
    };
}

#[cfg(test)]
mod spec {
    use std::{cell::Cell, convert::Infallible};

    use super::{Nulls, Page, Pageable, Sort};

    fn pageable(offset: u64, size: u64) -> Pageable {
        Pageable::new(offset, size).unwrap()
    }

    #[test]
    fn rejects_empty_page() {
        assert!(Pageable::new(0, 0).is_none());
        assert!(Pageable::new(10, 0).is_none());
        assert_eq!(pageable(15, 5).offset(), 15);
    }

    #[test]
    fn infers_total_of_short_first_page() {
        assert_eq!(pageable(0, 10).infer_total(0), Some(0));
        assert_eq!(pageable(0, 10).infer_total(4), Some(4));
        assert_eq!(pageable(0, 10).infer_total(10), None);
    }

    #[test]
    fn infers_total_of_short_last_page() {
        assert_eq!(pageable(20, 10).infer_total(3), Some(23));
        assert_eq!(pageable(1, 2).infer_total(1), Some(2));

        assert_eq!(pageable(20, 10).infer_total(10), None);
        // Empty page beyond the end reveals nothing.
        assert_eq!(pageable(20, 10).infer_total(0), None);
    }

    #[tokio::test]
    async fn counts_only_when_not_inferable() {
        let calls = Cell::new(0);
        let count = || {
            calls.set(calls.get() + 1);
            async { Ok::<_, Infallible>(42) }
        };

        let page = Page::with_total(vec![1, 2, 3], pageable(0, 10), count)
            .await
            .unwrap();
        assert_eq!(page.total(), 3);
        assert_eq!(calls.get(), 0);

        let page = Page::with_total(vec![1, 2], pageable(40, 10), count)
            .await
            .unwrap();
        assert_eq!(page.total(), 42);
        assert_eq!(calls.get(), 0);

        let page = Page::with_total(vec![1, 2], pageable(0, 2), count)
            .await
            .unwrap();
        assert_eq!(page.total(), 42);
        assert_eq!(calls.get(), 1);

        let page = Page::with_total(Vec::<u8>::new(), pageable(50, 10), count)
            .await
            .unwrap();
        assert_eq!(page.total(), 42);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn computes_page_info() {
        let page = Page::new(vec!['a', 'b'], pageable(1, 2), 4);
        assert_eq!(page.total_pages(), 2);
        assert!(page.has_next());

        let page = Page::new(vec!['d'], pageable(3, 2), 4);
        assert!(!page.has_next());

        let page = Page::new(Vec::<char>::new(), pageable(0, 3), 0);
        assert_eq!(page.total_pages(), 0);
        assert!(!page.has_next());
    }

    #[test]
    fn builds_sort() {
        let sort = Sort::asc("username").nulls_last();
        assert_eq!(sort.key, "username");
        assert_eq!(sort.nulls, Some(Nulls::Last));

        assert_eq!(Sort::desc("age").direction, super::Direction::Descending);
    }

    #[test]
    fn places_nulls_as_largest_values_by_default() {
        assert_eq!(Sort::asc("username").nulls_placement(), Nulls::Last);
        assert_eq!(Sort::desc("username").nulls_placement(), Nulls::First);

        assert_eq!(
            Sort::asc("username").nulls_first().nulls_placement(),
            Nulls::First,
        );
        assert_eq!(
            Sort::desc("username").nulls_last().nulls_placement(),
            Nulls::Last,
        );
    }
}

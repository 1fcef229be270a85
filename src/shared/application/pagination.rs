/// Keyset pagination support for queries
///
/// Pages are addressed by an exclusive cursor (the key of the last item
/// of the previous page) instead of an offset, so a walk can be resumed
/// after arbitrary interleaved mutations: inserts and deletes at or
/// before the cursor never shift what follows it.
use std::future::Future;

use futures::stream::{self, Stream, TryStreamExt};
use serde::{Deserialize, Serialize};

use crate::shared::errors::StoreResult;

/// Page size used when callers do not pick one.
pub const DEFAULT_PAGE_LIMIT: usize = 20;

/// A request for one page of an ordered sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRequest<C> {
    /// Resume strictly after this cursor; `None` starts at the beginning.
    pub after: Option<C>,
    /// Maximum number of items to return.
    pub limit: usize,
}

impl<C> PageRequest<C> {
    pub fn first(limit: usize) -> Self {
        Self { after: None, limit }
    }

    pub fn after(cursor: C, limit: usize) -> Self {
        Self {
            after: Some(cursor),
            limit,
        }
    }
}

impl<C> Default for PageRequest<C> {
    fn default() -> Self {
        Self {
            after: None,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

/// One page of results plus the cursor that continues the sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T, C> {
    pub items: Vec<T>,
    /// Cursor of the last item, present only when more may follow.
    pub next: Option<C>,
}

impl<T, C> Page<T, C> {
    pub fn new(items: Vec<T>, next: Option<C>) -> Self {
        Self { items, next }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether the sequence is exhausted after this page.
    pub fn is_last(&self) -> bool {
        self.next.is_none()
    }

    /// The request for the following page, if the sequence continues.
    pub fn next_request(&self, limit: usize) -> Option<PageRequest<C>>
    where
        C: Clone,
    {
        self.next.clone().map(|cursor| PageRequest::after(cursor, limit))
    }
}

/// Adapts a page-fetching closure into a flat stream of items.
///
/// Each chunk is fetched only when the consumer polls past the previous
/// one, and no store lock is held between chunks, so dropping the
/// stream abandons the walk at a page boundary.
pub fn stream_pages<'a, T, C, F, Fut>(
    first: PageRequest<C>,
    fetch: F,
) -> impl Stream<Item = StoreResult<T>> + 'a
where
    T: 'a,
    C: Clone + 'a,
    F: Fn(PageRequest<C>) -> Fut + 'a,
    Fut: Future<Output = StoreResult<Page<T, C>>> + 'a,
{
    stream::try_unfold(Some(first), move |request| {
        let step = request.map(|request| (request.limit, fetch(request)));
        async move {
            match step {
                None => Ok(None),
                Some((limit, pending)) => {
                    let page = pending.await?;
                    let next = page.next_request(limit);
                    Ok(Some((page.items, next)))
                }
            }
        }
    })
    .map_ok(|items| stream::iter(items.into_iter().map(Ok)))
    .try_flatten()
}

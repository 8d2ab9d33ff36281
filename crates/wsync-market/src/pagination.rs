//! Catalog pagination termination strategies.
//!
//! Ozon reports a running total and hands back the last id it served; Yandex
//! hands back an opaque next-page token that disappears on the last page.

use tracing::warn;

use crate::CatalogPage;

/// What the catalog fetcher should do after a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageStep {
    /// Request another page with this cursor.
    Continue(String),
    /// The catalog is complete.
    Done,
}

/// Decides, from the page just received, whether another page follows.
pub trait PageTermination: Send + Sync {
    /// `accumulated` counts every item received so far, this page included.
    fn next_step(&self, page: &CatalogPage, accumulated: usize) -> PageStep;
}

/// Stop when the server omits the next-page token or sends it empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct NextTokenTermination;

impl PageTermination for NextTokenTermination {
    fn next_step(&self, page: &CatalogPage, _accumulated: usize) -> PageStep {
        match page.next_cursor.as_deref().map(str::trim) {
            Some(token) if !token.is_empty() => PageStep::Continue(token.to_string()),
            _ => PageStep::Done,
        }
    }
}

/// Stop once the accumulated item count reaches the server-reported total.
///
/// A page that brings no items or no cursor before the total is reached also
/// ends pagination: the server has nothing more to give, and asking again
/// would repeat the same request forever.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunningTotalTermination;

impl PageTermination for RunningTotalTermination {
    fn next_step(&self, page: &CatalogPage, accumulated: usize) -> PageStep {
        let Some(total) = page.total else {
            return PageStep::Done;
        };
        if accumulated as u64 >= total {
            return PageStep::Done;
        }
        if page.offer_ids.is_empty() {
            warn!(
                accumulated,
                total, "catalog page came back empty before reaching reported total"
            );
            return PageStep::Done;
        }
        match page.next_cursor.as_deref().map(str::trim) {
            Some(cursor) if !cursor.is_empty() => PageStep::Continue(cursor.to_string()),
            _ => {
                warn!(
                    accumulated,
                    total, "catalog page has no cursor before reaching reported total"
                );
                PageStep::Done
            }
        }
    }
}

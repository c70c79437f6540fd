use crate::compose::compositor::PageSlot;
use crate::foundation::core::PageBox;
use crate::foundation::error::{FlipbookError, FlipbookResult};
use crate::interact::input::{FlipDirection, NavStatus};
use crate::pages::source::PageSource;

/// The single live document: its pages, the current page and the page box.
///
/// The page sequence is fixed for the session's lifetime. Loading another
/// document means building a new session.
#[derive(Debug)]
pub struct FlipbookSession<S> {
    pages: S,
    page_count: usize,
    current_page: usize,
    page_box: PageBox,
    aspect_ratio: f64,
}

impl<S: PageSource> FlipbookSession<S> {
    #[tracing::instrument(skip(pages), fields(page_count = pages.page_count()))]
    pub fn new(pages: S, page_box: PageBox) -> FlipbookResult<Self> {
        let page_count = pages.page_count();
        if page_count == 0 {
            return Err(FlipbookError::validation(
                "a flipbook session needs at least one page",
            ));
        }
        let aspect_ratio = pages
            .aspect_ratio()
            .filter(|a| a.is_finite() && *a > 0.0)
            .unwrap_or(page_box.width / page_box.height);
        Ok(Self {
            pages,
            page_count,
            current_page: 0,
            page_box,
            aspect_ratio,
        })
    }

    pub fn pages(&self) -> &S {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_box(&self) -> PageBox {
        self.page_box
    }

    /// Width over height of the first page.
    pub fn aspect_ratio(&self) -> f64 {
        self.aspect_ratio
    }

    pub fn set_page_box(&mut self, page_box: PageBox) {
        self.page_box = page_box;
    }

    pub fn neighbor(&self, direction: FlipDirection) -> Option<usize> {
        self.current_page
            .checked_add_signed(direction.sign())
            .filter(|&i| i < self.page_count)
    }

    pub fn current_slot(&self) -> PageSlot {
        PageSlot::Page(self.current_page)
    }

    /// The neighbor as a compositor slot; a placeholder past either end.
    pub fn neighbor_slot(&self, direction: FlipDirection) -> PageSlot {
        self.neighbor(direction)
            .map_or(PageSlot::Placeholder, PageSlot::Page)
    }

    /// Move to the neighbor in `direction`. Returns the new page, or `None`
    /// (leaving the index untouched) past either end.
    pub(crate) fn turn(&mut self, direction: FlipDirection) -> Option<usize> {
        let next = self.neighbor(direction)?;
        self.current_page = next;
        Some(next)
    }

    pub fn status(&self) -> NavStatus {
        NavStatus::new(self.current_page, self.page_count)
    }

    /// Tear the session down and hand the page source back.
    pub fn into_pages(self) -> S {
        self.pages
    }
}

#[cfg(test)]
#[path = "../../tests/unit/interact/session.rs"]
mod tests;

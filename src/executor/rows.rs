use log::trace;
use std::sync::Arc;

use crate::core::{DataSourceError, Result, RowView};
use crate::driver::Cursor;

/// Forward-only, single-pass cursor over a streamed result set.
///
/// Only one row is held at a time; the `&RowView` returned by [`Rows::next`]
/// is invalidated by the following call. Once the cursor reports the end of
/// the set, or fails, every further call returns `Ok(None)`.
pub struct Rows<'s> {
    cursor: Box<dyn Cursor + 's>,
    columns: Arc<[String]>,
    current: Option<RowView>,
    fetched: usize,
    finished: bool,
    operation: &'static str,
}

impl<'s> Rows<'s> {
    pub(crate) fn new(cursor: Box<dyn Cursor + 's>, operation: &'static str) -> Self {
        let columns = Arc::from(cursor.columns());
        Self {
            cursor,
            columns,
            current: None,
            fetched: 0,
            finished: false,
            operation,
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<Option<&RowView>> {
        self.current = None;
        if self.finished {
            return Ok(None);
        }

        match self.cursor.advance() {
            Ok(Some(values)) => {
                self.fetched += 1;
                trace!("{}: row {} fetched", self.operation, self.fetched);
                let row: &RowView = self.current.insert(RowView::new(Arc::clone(&self.columns), values));
                Ok(Some(row))
            }
            Ok(None) => {
                self.finished = true;
                Ok(None)
            }
            Err(e) => {
                self.finished = true;
                Err(DataSourceError::provider(self.operation)(e))
            }
        }
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows produced so far.
    #[must_use]
    pub const fn fetched(&self) -> usize {
        self.fetched
    }

    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Adapts the remaining rows into an [`Iterator`] of mapped values.
    pub fn mapped<F, T>(&mut self, map: F) -> MappedRows<'_, 's, F>
    where
        F: FnMut(&RowView) -> Result<T>,
    {
        MappedRows { rows: self, map }
    }
}

pub struct MappedRows<'r, 's, F> {
    rows: &'r mut Rows<'s>,
    map: F,
}

impl<F, T> Iterator for MappedRows<'_, '_, F>
where
    F: FnMut(&RowView) -> Result<T>,
{
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.rows.next() {
            Ok(Some(row)) => Some((self.map)(row)),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

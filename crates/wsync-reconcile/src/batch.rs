use std::slice::Chunks;

use crate::ReconcileError;

/// Split `items` into contiguous batches of at most `size` elements.
///
/// Order is preserved and only the last batch may be short. The returned
/// iterator is lazy; calling `chunk` again yields a fresh one. An empty input
/// yields no batches.
pub fn chunk<T>(items: &[T], size: usize) -> Result<Chunks<'_, T>, ReconcileError> {
    if size == 0 {
        return Err(ReconcileError::InvalidBatchSize(size));
    }
    Ok(items.chunks(size))
}

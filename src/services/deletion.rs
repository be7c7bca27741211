use crate::error::DeleteError;
use crate::models::ImageRecord;
use crate::services::ordering;
use crate::services::store::ImageStore;

/// Delete `images[index]` remotely, then locally.
///
/// The server must confirm before the record is dropped; on any failure the
/// caller keeps its collection untouched.
pub async fn delete_image(
    store: &dyn ImageStore,
    images: &[ImageRecord],
    index: usize,
) -> Result<Vec<ImageRecord>, DeleteError> {
    let record = images.get(index).ok_or(DeleteError::IndexOutOfRange(index))?;
    let key = match record.key.as_deref() {
        Some(key) if !key.is_empty() => key,
        _ => return Err(DeleteError::NotSynced(index)),
    };

    store.delete(key).await?;
    tracing::info!("Deleted image {} ({})", key, record.url);

    ordering::remove(images, index).ok_or(DeleteError::IndexOutOfRange(index))
}

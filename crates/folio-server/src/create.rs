use crate::sanitize::sanitize_html;
use crate::upload::ImageUploader;
use folio_core::{
    Author, ContentDocument, FolioError, ImageInput, NewDocument, NewDocumentRequest, Resource,
    Result,
};
use folio_storage::Storage;
use tracing::info;

fn duplicate<R: Resource + ?Sized>(resource: &R) -> FolioError {
    FolioError::Conflict(format!(
        "A {} with this title already exists",
        resource.label().to_lowercase()
    ))
}

/// Validates, sanitizes, checks title uniqueness, uploads images and inserts.
///
/// The lookup-then-insert pair is not atomic; the store's own unique-title
/// constraint decides a race and is reported the same way as the lookup.
pub async fn create_document<R: Resource + ?Sized>(
    store: &dyn Storage,
    uploader: &dyn ImageUploader,
    resource: &R,
    mut req: NewDocumentRequest,
) -> Result<ContentDocument> {
    resource.check_required(&req)?;
    req.retain_free_attributes();
    let title = req.title.take().unwrap_or_default().trim().to_string();
    let content = sanitize_html(req.content.as_deref().unwrap_or_default());

    if store.find_by_title(resource.kind(), &title).await?.is_some() {
        return Err(duplicate(resource));
    }

    let sources = req.images.take().map(ImageInput::into_sources).unwrap_or_default();
    let mut images = Vec::with_capacity(sources.len());
    for source in &sources {
        images.push(uploader.upload(source, resource.upload_folder()).await?);
    }

    let author = req.author.take().and_then(|a| match (a.name, a.email) {
        (Some(name), Some(email)) if !name.trim().is_empty() && !email.trim().is_empty() => {
            Some(Author { name, email })
        }
        _ => None,
    });

    let new = NewDocument {
        kind: resource.kind().to_string(),
        title,
        content,
        author,
        images,
        created_at: req.created_at,
        attributes: req.attributes,
    };
    let doc = store.insert(new).await.map_err(|e| match e {
        FolioError::Conflict(_) => duplicate(resource),
        other => other,
    })?;
    info!(kind = %doc.kind, id = %doc.id, title = %doc.title, images = doc.images.len(), "document created");
    Ok(doc)
}

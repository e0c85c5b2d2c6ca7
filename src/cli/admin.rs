//! Collection, document and health commands.

use color_eyre::eyre::WrapErr;
use color_eyre::Result;

use crate::api::ApiClient;
use crate::render::{render_collections, render_documents, render_health};
use crate::traits::HttpClient;

use super::args::{CollectionsAction, DocumentsAction};

pub async fn handle_collections<C: HttpClient>(
    api: &ApiClient<C>,
    action: CollectionsAction,
) -> Result<()> {
    match action {
        CollectionsAction::List => {
            let names = api
                .list_collections()
                .await
                .wrap_err("Failed to list collections")?;
            println!("{}", render_collections(&names));
        }
        CollectionsAction::Create(name) => {
            let info = api
                .create_collection(&name)
                .await
                .wrap_err_with(|| format!("Failed to create collection '{}'", name))?;
            println!("✓ Collection '{}' created", info.name);
        }
        CollectionsAction::Delete(name) => {
            api.delete_collection(&name)
                .await
                .wrap_err_with(|| format!("Failed to delete collection '{}'", name))?;
            println!("✓ Collection '{}' deleted", name);
        }
        CollectionsAction::Show(name) => {
            let info = api
                .get_collection(&name)
                .await
                .wrap_err_with(|| format!("Failed to fetch collection '{}'", name))?;
            println!("{}: {} document(s)", info.name, info.document_count);
        }
    }
    Ok(())
}

pub async fn handle_documents<C: HttpClient>(
    api: &ApiClient<C>,
    collection: &str,
    action: DocumentsAction,
) -> Result<()> {
    match action {
        DocumentsAction::List => {
            let documents = api
                .list_documents(collection)
                .await
                .wrap_err_with(|| format!("Failed to list documents of '{}'", collection))?;
            println!("{}", render_documents(&documents));
        }
        DocumentsAction::Upload { path, force } => {
            let result = api
                .upload_file(collection, &path, force)
                .await
                .wrap_err_with(|| format!("Failed to upload {}", path.display()))?;
            println!("✓ {} ({} chunks)", result.message, result.chunks);
        }
        DocumentsAction::Delete(document) => {
            api.delete_document(collection, &document)
                .await
                .wrap_err_with(|| format!("Failed to delete '{}'", document))?;
            println!("✓ Document '{}' deleted", document);
        }
    }
    Ok(())
}

pub async fn handle_health<C: HttpClient>(api: &ApiClient<C>) -> Result<()> {
    let report = api
        .health()
        .await
        .wrap_err_with(|| format!("Backend at {} is unreachable", api.base_url))?;
    println!("{}", render_health(&report));
    if report.is_degraded() {
        tracing::warn!("Backend reports degraded status");
    }
    Ok(())
}

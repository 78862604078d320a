use std::io::{Cursor, Write};
use std::path::Path;

use tracing::{debug, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::common::ExportError;
use crate::models::{is_valid_slug, NavbarLink, Project, ProjectAsset, ProjectPage};
use crate::render::paths;
use crate::render::{render_page, RenderMode};

/// A page queued for export together with its template's HTML.
/// Pages whose template went missing carry `None` and are skipped.
#[derive(Debug, Clone)]
pub struct ExportPage {
    pub page: ProjectPage,
    pub template_html: Option<String>,
}

/// Filename a page gets at the archive root. The `index` slug is the
/// canonical home page; empty or malformed slugs fall back to an
/// id-derived name.
pub fn page_export_filename(page: &ProjectPage) -> String {
    if is_valid_slug(&page.slug) {
        format!("{}.html", page.slug)
    } else {
        format!("page_{}.html", page.id)
    }
}

/// Packages a project into an in-memory zip archive: each page with a
/// template renders in export mode and lands as `<slug>.html` at the
/// archive root; each asset with a known kind mapping copies from disk
/// into its configured archive folder. Asset placement and the
/// relative URLs the renderer injected both come from [`paths`], which
/// keeps the bundle self-contained.
pub fn export_project_zip(
    project: &Project,
    pages: &[ExportPage],
    navbar: &[NavbarLink],
    assets: &[ProjectAsset],
    upload_root: &Path,
) -> Result<Vec<u8>, ExportError> {
    let mut archive = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for entry in pages {
        let Some(template_html) = entry.template_html.as_deref() else {
            warn!(
                page_id = %entry.page.id,
                title = %entry.page.title,
                "page has no template, skipping for export"
            );
            continue;
        };

        let rendered = render_page(
            template_html,
            &entry.page.content,
            Some(project),
            Some(&entry.page),
            navbar,
            RenderMode::Export,
        );

        let filename = page_export_filename(&entry.page);
        archive.start_file(filename.as_str(), options)?;
        archive.write_all(rendered.as_bytes())?;
        debug!(%filename, project_id = %project.id, "added page to archive");
    }

    for asset in assets {
        let (Some(zip_folder), Some(disk_folder)) = (
            paths::zip_folder(asset.kind),
            paths::disk_folder(asset.kind),
        ) else {
            warn!(
                asset_id = %asset.id,
                kind = %asset.kind,
                "asset kind has no archive or disk folder mapping, skipping"
            );
            continue;
        };

        let source = upload_root
            .join(project.id.to_string())
            .join(disk_folder)
            .join(&asset.stored_filename);

        if !source.exists() {
            warn!(
                asset_id = %asset.id,
                path = %source.display(),
                "asset file missing on disk, skipping"
            );
            continue;
        }

        let bytes = std::fs::read(&source)?;
        archive.start_file(format!("{}/{}", zip_folder, asset.stored_filename), options)?;
        archive.write_all(&bytes)?;
        debug!(
            source = %source.display(),
            folder = zip_folder,
            "added asset to archive"
        );
    }

    let cursor = archive.finish()?;
    Ok(cursor.into_inner())
}

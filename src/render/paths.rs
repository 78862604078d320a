//! The single path-configuration map shared by the renderer and the
//! export packager. The renderer injects relative asset URLs into
//! exported HTML; the packager places the files. Both must agree, so
//! both read from here.

use uuid::Uuid;

use crate::models::AssetKind;

/// Folder inside the zip archive where files of this kind land,
/// relative to the HTML files at the archive root.
pub fn zip_folder(kind: AssetKind) -> Option<&'static str> {
    match kind {
        AssetKind::Image => Some("assets/images"),
        AssetKind::Favicon => Some("assets/favicons"),
        AssetKind::Css | AssetKind::Js => None,
    }
}

/// Per-project subfolder on disk under `<upload_root>/<project_id>/`.
/// Matches the folder names accepted by the asset-serving route.
pub fn disk_folder(kind: AssetKind) -> Option<&'static str> {
    match kind {
        AssetKind::Image => Some("images"),
        AssetKind::Favicon => Some("favicons"),
        AssetKind::Css | AssetKind::Js => None,
    }
}

/// URL under which the running service serves an uploaded file.
pub fn preview_asset_url(project_id: Uuid, folder: &str, filename: &str) -> String {
    format!("/uploads/{}/{}/{}", project_id, folder, filename)
}

/// Prefix prepended to image values in export-mode contexts.
pub fn image_export_prefix() -> &'static str {
    zip_folder(AssetKind::Image).unwrap_or("assets/images")
}

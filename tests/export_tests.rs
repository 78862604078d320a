use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::path::PathBuf;

use chrono::Utc;
use sqlx::types::Json;
use uuid::Uuid;

use siteforge::models::{AssetKind, NavbarLink, Project, ProjectAsset, ProjectPage};
use siteforge::render::{export_project_zip, page_export_filename, ExportPage};
use siteforge::services::storage::{
    allowed_file, generate_stored_filename, is_safe_filename,
};
use siteforge::services::Storage;

fn project(name: &str) -> Project {
    Project {
        id: Uuid::new_v4(),
        name: name.to_string(),
        site_title: None,
        primary_color: None,
        secondary_color: None,
        accent_color: None,
        global_css: None,
        favicon_filename: None,
        created_at: Utc::now(),
        edited_at: Utc::now(),
    }
}

fn page(project_id: Uuid, slug: &str, content: &[(&str, &str)]) -> ProjectPage {
    ProjectPage {
        id: Uuid::new_v4(),
        project_id,
        template_id: Uuid::new_v4(),
        title: slug.to_string(),
        slug: slug.to_string(),
        content: Json(
            content
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>(),
        ),
        created_at: Utc::now(),
        edited_at: Utc::now(),
    }
}

fn asset(project_id: Uuid, kind: AssetKind, stored: &str) -> ProjectAsset {
    ProjectAsset {
        id: Uuid::new_v4(),
        project_id,
        kind,
        original_filename: format!("original-{}", stored),
        stored_filename: stored.to_string(),
        created_at: Utc::now(),
    }
}

/// Unique upload root under the system temp dir, removed on drop.
struct TempRoot(PathBuf);

impl TempRoot {
    fn new() -> Self {
        let dir = std::env::temp_dir().join(format!("siteforge-test-{}", Uuid::new_v4().simple()));
        std::fs::create_dir_all(&dir).expect("create temp upload root");
        Self(dir)
    }

    fn place(&self, project_id: Uuid, folder: &str, filename: &str, bytes: &[u8]) {
        let dir = self.0.join(project_id.to_string()).join(folder);
        std::fs::create_dir_all(&dir).expect("create asset folder");
        std::fs::write(dir.join(filename), bytes).expect("write asset file");
    }
}

impl Drop for TempRoot {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}

fn zip_names(bytes: &[u8]) -> Vec<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).expect("open archive");
    (0..archive.len())
        .map(|i| archive.by_index(i).expect("entry").name().to_string())
        .collect()
}

fn zip_entry(bytes: &[u8], name: &str) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).expect("open archive");
    let mut entry = archive.by_name(name).expect("entry by name");
    let mut out = String::new();
    entry.read_to_string(&mut out).expect("read entry");
    out
}

#[test]
fn export_filename_uses_slug_when_valid() {
    let p = page(Uuid::new_v4(), "about-us", &[]);
    assert_eq!(page_export_filename(&p), "about-us.html");

    let home = page(Uuid::new_v4(), "index", &[]);
    assert_eq!(page_export_filename(&home), "index.html");
}

#[test]
fn export_filename_falls_back_to_page_id() {
    let mut p = page(Uuid::new_v4(), "x", &[]);
    p.slug = "Bad Slug!".to_string();
    assert_eq!(page_export_filename(&p), format!("page_{}.html", p.id));

    p.slug = String::new();
    assert_eq!(page_export_filename(&p), format!("page_{}.html", p.id));
}

#[test]
fn archive_contains_pages_at_root_and_assets_in_folders() {
    let root = TempRoot::new();
    let project = project("Brew & Co");

    root.place(project.id, "images", "photo.png", b"png-bytes");
    root.place(project.id, "favicons", "fav.ico", b"ico-bytes");

    let pages = vec![
        ExportPage {
            page: page(project.id, "index", &[("hero.title", "Welcome")]),
            template_html: Some("<h1>{{ hero.title }}</h1>".to_string()),
        },
        ExportPage {
            page: page(project.id, "about", &[]),
            template_html: Some("<p>about</p>".to_string()),
        },
    ];
    let assets = vec![
        asset(project.id, AssetKind::Image, "photo.png"),
        asset(project.id, AssetKind::Favicon, "fav.ico"),
    ];

    let bytes = export_project_zip(&project, &pages, &[], &assets, &root.0).expect("export");

    let mut names = zip_names(&bytes);
    names.sort();
    assert_eq!(
        names,
        vec![
            "about.html",
            "assets/favicons/fav.ico",
            "assets/images/photo.png",
            "index.html",
        ]
    );
    assert_eq!(zip_entry(&bytes, "index.html"), "<h1>Welcome</h1>");
}

#[test]
fn exported_pages_reference_assets_relatively() {
    let root = TempRoot::new();
    let project = project("Gallery");
    root.place(project.id, "images", "shot.png", b"png");

    let pages = vec![ExportPage {
        page: page(project.id, "index", &[("hero.image", "shot.png")]),
        template_html: Some(r#"<img src="{{ hero.image }}">"#.to_string()),
    }];
    let assets = vec![asset(project.id, AssetKind::Image, "shot.png")];

    let bytes = export_project_zip(&project, &pages, &[], &assets, &root.0).expect("export");

    let html = zip_entry(&bytes, "index.html");
    assert!(html.contains(r#"src="assets/images/shot.png""#));
    assert!(zip_names(&bytes).contains(&"assets/images/shot.png".to_string()));
}

#[test]
fn exported_navbar_links_are_relative() {
    let root = TempRoot::new();
    let project = project("Nav");

    let navbar = vec![
        NavbarLink {
            link_text: "Home".to_string(),
            position: 1,
            slug: "index".to_string(),
        },
        NavbarLink {
            link_text: "About".to_string(),
            position: 2,
            slug: "about".to_string(),
        },
    ];

    let pages = vec![ExportPage {
        page: page(project.id, "index", &[]),
        template_html: Some("<body><!-- navbar --><main></main></body>".to_string()),
    }];

    let bytes = export_project_zip(&project, &pages, &navbar, &[], &root.0).expect("export");
    let html = zip_entry(&bytes, "index.html");
    assert!(html.contains(r#"<a href="index.html">Home</a>"#));
    assert!(html.contains(r#"<a href="about.html">About</a>"#));
}

#[test]
fn pages_without_templates_are_skipped_not_fatal() {
    let root = TempRoot::new();
    let project = project("Partial");

    let pages = vec![
        ExportPage {
            page: page(project.id, "kept", &[]),
            template_html: Some("<p>kept</p>".to_string()),
        },
        ExportPage {
            page: page(project.id, "orphan", &[]),
            template_html: None,
        },
    ];

    let bytes = export_project_zip(&project, &pages, &[], &[], &root.0).expect("export");
    let names = zip_names(&bytes);
    assert_eq!(names, vec!["kept.html"]);
}

#[test]
fn assets_missing_on_disk_are_skipped_not_fatal() {
    let root = TempRoot::new();
    let project = project("Sparse");

    let assets = vec![asset(project.id, AssetKind::Image, "never-written.png")];
    let bytes = export_project_zip(&project, &[], &[], &assets, &root.0).expect("export");
    assert!(zip_names(&bytes).is_empty());
}

#[test]
fn safe_filename_rejects_traversal() {
    assert!(is_safe_filename("photo.png"));
    assert!(!is_safe_filename(""));
    assert!(!is_safe_filename("../etc/passwd"));
    assert!(!is_safe_filename("a/b.png"));
    assert!(!is_safe_filename("a\\b.png"));
    assert!(!is_safe_filename("..hidden"));
}

#[test]
fn stored_filenames_keep_only_the_extension() {
    let stored = generate_stored_filename("Holiday Photo.JPG", None).expect("allowed");
    assert!(stored.ends_with(".jpg"));
    assert!(!stored.contains(' '));
    assert!(is_safe_filename(&stored));

    let prefixed = generate_stored_filename("icon.png", Some("favicon")).expect("allowed");
    assert!(prefixed.starts_with("favicon_"));
    assert!(prefixed.ends_with(".png"));

    assert!(generate_stored_filename("script.exe", None).is_none());
    assert!(generate_stored_filename("noextension", None).is_none());
}

#[test]
fn allowed_file_checks_extension_case_insensitively() {
    assert!(allowed_file("a.PNG"));
    assert!(allowed_file("b.svg"));
    assert!(!allowed_file("c.pdf"));
    assert!(!allowed_file("d"));
}

#[test]
fn storage_refuses_to_serve_unsafe_paths() {
    let root = TempRoot::new();
    let storage = Storage::new(&root.0);
    let pid = Uuid::new_v4();

    assert!(storage.resolve_for_serving(pid, "images", "ok.png").is_ok());
    assert!(storage.resolve_for_serving(pid, "images", "../secret").is_err());
    assert!(storage.resolve_for_serving(pid, "images", "").is_err());
}

#[test]
fn storage_save_and_delete_round_trip() {
    let root = TempRoot::new();
    let storage = Storage::new(&root.0);
    let pid = Uuid::new_v4();

    let path = storage.save(pid, "images", "x.png", b"bytes").expect("save");
    assert!(path.exists());

    storage.delete(pid, "images", "x.png").expect("delete");
    assert!(!path.exists());
    // Deleting again is not an error.
    storage.delete(pid, "images", "x.png").expect("idempotent delete");
}

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;
use tera::Tera;
use uuid::Uuid;

use crate::models::{AssetKind, NavbarLink, Project, ProjectPage};
use crate::render::paths;
use crate::render::{build_context, escape_html, extract_placeholders, RenderMode};

/// Literal string a template author places where the generated navbar
/// should be spliced in.
pub const NAVBAR_MARKER: &str = "<!-- navbar -->";

static BODY_OPEN_RE: OnceLock<Regex> = OnceLock::new();
static HEAD_CLOSE_RE: OnceLock<Regex> = OnceLock::new();

fn body_open_re() -> &'static Regex {
    BODY_OPEN_RE.get_or_init(|| Regex::new(r"(?i)<body[^>]*>").expect("body tag regex"))
}

fn head_close_re() -> &'static Regex {
    HEAD_CLOSE_RE.get_or_init(|| Regex::new(r"(?i)</head>").expect("head close regex"))
}

/// Builds the `<nav>` markup for a project's ordered navbar items.
/// Links are relative (`<slug>.html`) so the same markup works in live
/// preview and in the exported bundle.
pub fn build_navbar_html(items: &[NavbarLink]) -> String {
    if items.is_empty() {
        return String::new();
    }

    let mut list = String::new();
    for item in items {
        let href = if item.slug.is_empty() {
            "#".to_string()
        } else {
            format!("{}.html", item.slug)
        };
        list.push_str(&format!(
            r#"<li><a href="{}">{}</a></li>"#,
            href,
            escape_html(&item.link_text)
        ));
    }
    format!(r#"<nav class="site-navbar"><ul>{}</ul></nav>"#, list)
}

/// Splices navbar markup into the template text: at the literal marker
/// if present (exactly once), else right after the opening body tag,
/// else prepended to the document.
fn inject_navbar(html: &str, navbar_html: &str) -> String {
    if navbar_html.is_empty() {
        return html.to_string();
    }
    if html.contains(NAVBAR_MARKER) {
        return html.replacen(NAVBAR_MARKER, navbar_html, 1);
    }
    if let Some(m) = body_open_re().find(html) {
        let mut out = String::with_capacity(html.len() + navbar_html.len());
        out.push_str(&html[..m.end()]);
        out.push_str(navbar_html);
        out.push_str(&html[m.end()..]);
        return out;
    }
    format!("{}{}", navbar_html, html)
}

fn favicon_mime(filename: &str) -> &'static str {
    let ext = filename.rsplit('.').next().unwrap_or("").to_lowercase();
    match ext.as_str() {
        "ico" => "image/x-icon",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "svg" => "image/svg+xml",
        _ => "image/x-icon",
    }
}

/// Assembles the head block: theme-color CSS custom properties, a
/// favicon link whose URL depends on the render mode, and the
/// project's global CSS.
fn build_head_injections(project: &Project, mode: RenderMode) -> Vec<String> {
    let mut parts = Vec::new();

    let mut vars = Vec::new();
    if let Some(c) = project.primary_color.as_deref().filter(|c| !c.is_empty()) {
        vars.push(format!("  --theme-primary-color: {};", escape_html(c)));
    }
    if let Some(c) = project.secondary_color.as_deref().filter(|c| !c.is_empty()) {
        vars.push(format!("  --theme-secondary-color: {};", escape_html(c)));
    }
    if let Some(c) = project.accent_color.as_deref().filter(|c| !c.is_empty()) {
        vars.push(format!("  --theme-accent-color: {};", escape_html(c)));
    }
    if !vars.is_empty() {
        parts.push(format!(
            "<style id=\"theme-colors-vars\">\n:root {{\n{}\n}}\n</style>",
            vars.join("\n")
        ));
    }

    if let Some(favicon) = project.favicon_filename.as_deref().filter(|f| !f.is_empty()) {
        let url = match mode {
            RenderMode::Export => {
                let folder = paths::zip_folder(AssetKind::Favicon).unwrap_or("favicons");
                format!("{}/{}", folder.trim_matches('/'), favicon)
            }
            RenderMode::Preview => paths::preview_asset_url(project.id, "favicons", favicon),
        };
        parts.push(format!(
            r#"<link rel="icon" type="{}" href="{}">"#,
            favicon_mime(favicon),
            url
        ));
    }

    if let Some(css) = project.global_css.as_deref().filter(|c| !c.is_empty()) {
        parts.push(format!(
            "<style id=\"global-project-css\">\n{}\n</style>",
            css
        ));
    }

    parts
}

/// Inserts the combined head block immediately before the closing head
/// tag, or prepends it when the template has no head.
fn inject_head(html: &str, parts: &[String]) -> String {
    if parts.is_empty() {
        return html.to_string();
    }
    let block = format!("{}\n", parts.join("\n"));
    if let Some(m) = head_close_re().find(html) {
        let mut out = String::with_capacity(html.len() + block.len());
        out.push_str(&html[..m.start()]);
        out.push_str(&block);
        out.push_str(&html[m.start()..]);
        return out;
    }
    format!("{}{}", block, html)
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(s) = source {
        message.push_str(": ");
        message.push_str(&s.to_string());
        source = s.source();
    }
    message
}

fn syntax_error_panel(err: &tera::Error, processed_html: &str) -> String {
    // Tera embeds a line/column hint in the error chain.
    format!(
        "<div style='border: 3px solid red; padding: 15px;'>\
         <h2>Template Error</h2>\
         <p>Type: {}</p>\
         <p>Message: {}</p>\
         <pre>{}</pre>\
         </div>",
        escape_html("TemplateSyntaxError"),
        escape_html(&error_chain(err)),
        escape_html(processed_html)
    )
}

fn render_error_panel(err: &tera::Error) -> String {
    format!(
        "<div style='border: 2px solid orangered; padding: 10px;'>\
         <h2>Unexpected Error</h2>\
         <p>Type: {}</p>\
         <p>Details: {}</p>\
         </div>",
        escape_html("TemplateRenderError"),
        escape_html(&error_chain(err))
    )
}

/// Renders the final HTML for a page.
///
/// Stage 1 splices navbar, theme variables, favicon link and global
/// CSS into the raw template text. Stage 2 evaluates the spliced
/// string as a template against the nested content context plus the
/// project and page records.
///
/// `navbar` must already be in display order. Every placeholder found
/// in the spliced text is seeded as an empty string before the stored
/// content is overlaid, so missing content renders empty instead of
/// failing evaluation. Template errors degrade to an inline,
/// fully-escaped diagnostic panel; this function never fails the
/// request.
pub fn render_page(
    template_html: &str,
    content: &HashMap<String, String>,
    project: Option<&Project>,
    page: Option<&ProjectPage>,
    navbar: &[NavbarLink],
    mode: RenderMode,
) -> String {
    // Stage 1: string-level injection before template evaluation.
    let mut processed = template_html.to_string();

    if project.is_some() {
        processed = inject_navbar(&processed, &build_navbar_html(navbar));
    }
    if let Some(project) = project {
        processed = inject_head(&processed, &build_head_injections(project, mode));
    }

    // Stage 2: evaluate the spliced string with autoescaping.
    let project_id = project.map(|p| p.id);
    let image_prefix = match mode {
        RenderMode::Export => paths::image_export_prefix(),
        RenderMode::Preview => "",
    };

    let mut flat: HashMap<String, String> = extract_placeholders(&processed)
        .into_iter()
        .map(|key| (key, String::new()))
        .collect();
    flat.extend(content.clone());

    let mut context = build_context(&flat, mode, project_id, image_prefix);
    if let Some(p) = project {
        context.insert(
            "project".to_string(),
            serde_json::to_value(p).unwrap_or(Value::Null),
        );
    }
    if let Some(p) = page {
        context.insert(
            "page".to_string(),
            serde_json::to_value(p).unwrap_or(Value::Null),
        );
    }

    let mut engine = Tera::default();
    // Tera's default escaper also rewrites `/`, which would mangle the
    // asset paths the context builder just produced; escape only the
    // HTML-significant characters.
    engine.set_escape_fn(escape_html);
    engine.register_function("asset_url", make_asset_url_fn(mode, project_id));

    // Autoescaping keys off the template name suffix.
    if let Err(e) = engine.add_raw_template("page.html", &processed) {
        return syntax_error_panel(&e, &processed);
    }

    let tera_context = match tera::Context::from_value(Value::Object(context)) {
        Ok(c) => c,
        Err(e) => return render_error_panel(&e),
    };

    match engine.render("page.html", &tera_context) {
        Ok(html) => html,
        Err(e) => render_error_panel(&e),
    }
}

/// Template-language helper: `asset_url(file="pic.png")` resolves an
/// uploaded image the same way image placeholders do, in both modes.
fn make_asset_url_fn(
    mode: RenderMode,
    project_id: Option<Uuid>,
) -> impl tera::Function + 'static {
    move |args: &HashMap<String, Value>| -> tera::Result<Value> {
        let file = args
            .get("file")
            .and_then(Value::as_str)
            .ok_or_else(|| tera::Error::msg("asset_url requires a `file` argument"))?;
        let url = match (mode, project_id) {
            (RenderMode::Export, _) => {
                format!("{}/{}", paths::image_export_prefix(), file)
            }
            (RenderMode::Preview, Some(pid)) => paths::preview_asset_url(pid, "images", file),
            (RenderMode::Preview, None) => file.to_string(),
        };
        Ok(Value::String(url))
    }
}

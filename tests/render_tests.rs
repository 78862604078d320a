use std::collections::HashMap;

use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use siteforge::models::{NavbarLink, Project};
use siteforge::render::{
    build_context, build_navbar_html, extract_placeholders, insert_nested, is_image_key,
    render_page, RenderMode, NAVBAR_MARKER,
};

fn project() -> Project {
    Project {
        id: Uuid::new_v4(),
        name: "Test Site".to_string(),
        site_title: Some("Test Site".to_string()),
        primary_color: None,
        secondary_color: None,
        accent_color: None,
        global_css: None,
        favicon_filename: None,
        created_at: Utc::now(),
        edited_at: Utc::now(),
    }
}

fn link(text: &str, position: i32, slug: &str) -> NavbarLink {
    NavbarLink {
        link_text: text.to_string(),
        position,
        slug: slug.to_string(),
    }
}

fn content(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn extracts_dotted_keys_sorted_and_deduplicated() {
    let html = "<h1>{{ hero.title }}</h1><p>{{ about.body }}</p><h2>{{ hero.title }}</h2>";
    let keys = extract_placeholders(html);
    assert_eq!(keys, vec!["about.body", "hero.title"]);
}

#[test]
fn extraction_strips_filters_and_whitespace() {
    let keys = extract_placeholders("{{  hero.title | upper  }} {{footer.note|truncate(5)}}");
    assert_eq!(keys, vec!["footer.note", "hero.title"]);
}

#[test]
fn extraction_skips_control_flow_tokens() {
    let html = r#"
        {% for item in items %}{{ item }}{% endfor %}
        {{ asset_url(file="pic.png") }}
        {{ some['thing'] }}
        {{ hero.title }}
        {{ tagline }}
    "#;
    let keys = extract_placeholders(html);
    // `item` and `tagline` are undotted but control-free, so they stay;
    // undotted subscripts are noise. A call token survives here only
    // because its argument happens to contain a dot; the dotted rule
    // wins over the control-character filter.
    assert_eq!(
        keys,
        vec![
            r#"asset_url(file="pic.png")"#,
            "hero.title",
            "item",
            "tagline",
        ]
    );
}

#[test]
fn extraction_keeps_dotted_keys_even_in_noisy_templates() {
    let keys = extract_placeholders("{{ nav.links.home }} {{ (grouped) }}");
    assert_eq!(keys, vec!["nav.links.home"]);
}

#[test]
fn extraction_handles_empty_input() {
    assert!(extract_placeholders("").is_empty());
    assert!(extract_placeholders("<p>no tokens here</p>").is_empty());
}

#[test]
fn extraction_is_idempotent() {
    let html = "{{ b.two }} {{ a.one }} {{ b.two }}";
    let first = extract_placeholders(html);
    let second = extract_placeholders(html);
    assert_eq!(first, second);
    assert_eq!(first, vec!["a.one", "b.two"]);
}

#[test]
fn image_key_detection() {
    assert!(is_image_key("hero.image"));
    assert!(is_image_key("hero.background_image"));
    assert!(is_image_key("gallery.photo_src"));
    assert!(is_image_key("logo_url"));
    assert!(is_image_key("HERO.IMAGE"));
    assert!(!is_image_key("hero.title"));
    assert!(!is_image_key("footer.source_code"));
}

#[test]
fn nesting_builds_intermediate_objects() {
    let mut map = serde_json::Map::new();
    insert_nested(&mut map, "a.b.c", Value::String("deep".to_string()));
    insert_nested(&mut map, "a.b.d", Value::String("sibling".to_string()));
    assert_eq!(map["a"]["b"]["c"], "deep");
    assert_eq!(map["a"]["b"]["d"], "sibling");
}

#[test]
fn nesting_replaces_scalar_intermediates_instead_of_failing() {
    let mut map = serde_json::Map::new();
    insert_nested(&mut map, "a", Value::String("scalar".to_string()));
    insert_nested(&mut map, "a.b", Value::String("nested".to_string()));
    assert_eq!(map["a"]["b"], "nested");
}

#[test]
fn context_modes_agree_on_non_image_keys() {
    let flat = content(&[("hero.title", "Hello"), ("footer.note", "Bye")]);
    let pid = Some(Uuid::new_v4());
    let preview = build_context(&flat, RenderMode::Preview, pid, "");
    let export = build_context(&flat, RenderMode::Export, pid, "assets/images");
    assert_eq!(preview, export);
}

#[test]
fn context_resolves_image_values_per_mode() {
    let pid = Uuid::new_v4();
    let flat = content(&[("hero.image", "photo.png")]);

    let export = build_context(&flat, RenderMode::Export, Some(pid), "assets/images");
    assert_eq!(export["hero"]["image"], "assets/images/photo.png");

    let preview = build_context(&flat, RenderMode::Preview, Some(pid), "");
    assert_eq!(
        preview["hero"]["image"],
        format!("/uploads/{}/images/photo.png", pid)
    );
}

#[test]
fn preview_leaves_absolute_image_urls_untouched() {
    let pid = Some(Uuid::new_v4());
    let flat = content(&[
        ("a.image", "https://example.com/x.png"),
        ("b.image", "/already/rooted.png"),
    ]);
    let ctx = build_context(&flat, RenderMode::Preview, pid, "");
    assert_eq!(ctx["a"]["image"], "https://example.com/x.png");
    assert_eq!(ctx["b"]["image"], "/already/rooted.png");
}

#[test]
fn empty_content_renders_placeholders_as_empty_strings() {
    let html = "<p>[{{ hero.title }}]</p>";
    let out = render_page(html, &HashMap::new(), None, None, &[], RenderMode::Preview);
    assert_eq!(out, "<p>[]</p>");
}

#[test]
fn renders_stored_content_with_autoescaping() {
    let html = "<h1>{{ hero.title }}</h1>";
    let out = render_page(
        html,
        &content(&[("hero.title", "A&B")]),
        None,
        None,
        &[],
        RenderMode::Preview,
    );
    assert_eq!(out, "<h1>A&amp;B</h1>");
}

#[test]
fn plain_template_without_theme_renders_clean() {
    // No colors, favicon or CSS configured: nothing is injected.
    let html = "<html><head></head><body><h1>{{ hero.title }}</h1></body></html>";
    let out = render_page(
        html,
        &content(&[("hero.title", "Welcome")]),
        Some(&project()),
        None,
        &[],
        RenderMode::Preview,
    );
    assert_eq!(
        out,
        "<html><head></head><body><h1>Welcome</h1></body></html>"
    );
}

#[test]
fn navbar_links_are_relative_and_escaped() {
    let nav = build_navbar_html(&[
        link("Home", 1, "index"),
        link("Q&A", 2, "faq"),
        link("Broken", 3, ""),
    ]);
    assert!(nav.starts_with(r#"<nav class="site-navbar"><ul>"#));
    assert!(nav.contains(r#"<a href="index.html">Home</a>"#));
    assert!(nav.contains(r#"<a href="faq.html">Q&amp;A</a>"#));
    assert!(nav.contains(r##"<a href="#">Broken</a>"##));
    let home_pos = nav.find("Home").unwrap();
    let qa_pos = nav.find("Q&amp;A").unwrap();
    assert!(home_pos < qa_pos, "items must keep display order");
}

#[test]
fn empty_navbar_produces_no_markup() {
    assert_eq!(build_navbar_html(&[]), "");
}

#[test]
fn navbar_marker_is_replaced_exactly_once() {
    let html = format!("<body>{}<main></main>{}</body>", NAVBAR_MARKER, NAVBAR_MARKER);
    let out = render_page(
        &html,
        &HashMap::new(),
        Some(&project()),
        None,
        &[link("Home", 1, "index")],
        RenderMode::Preview,
    );
    assert_eq!(out.matches("site-navbar").count(), 1);
    // Second marker is an HTML comment, invisible in a browser.
    assert!(out.contains(NAVBAR_MARKER));
}

#[test]
fn navbar_falls_back_to_after_body_open() {
    let html = r#"<html><body class="page"><main>x</main></body></html>"#;
    let out = render_page(
        html,
        &HashMap::new(),
        Some(&project()),
        None,
        &[link("Home", 1, "index")],
        RenderMode::Preview,
    );
    let body_end = out.find(r#"<body class="page">"#).unwrap() + r#"<body class="page">"#.len();
    assert!(out[body_end..].starts_with(r#"<nav class="site-navbar">"#));
}

#[test]
fn navbar_prepends_when_template_has_no_body() {
    let out = render_page(
        "<main>fragment</main>",
        &HashMap::new(),
        Some(&project()),
        None,
        &[link("Home", 1, "index")],
        RenderMode::Preview,
    );
    assert!(out.starts_with(r#"<nav class="site-navbar">"#));
}

#[test]
fn theme_colors_are_injected_before_head_close() {
    let mut p = project();
    p.primary_color = Some("#112233".to_string());
    p.accent_color = Some("#abc".to_string());

    let out = render_page(
        "<html><head><title>t</title></head><body></body></html>",
        &HashMap::new(),
        Some(&p),
        None,
        &[],
        RenderMode::Preview,
    );
    assert!(out.contains(r#"<style id="theme-colors-vars">"#));
    assert!(out.contains("--theme-primary-color: #112233;"));
    assert!(out.contains("--theme-accent-color: #abc;"));
    assert!(!out.contains("--theme-secondary-color"));
    let style_pos = out.find("theme-colors-vars").unwrap();
    let head_close = out.find("</head>").unwrap();
    assert!(style_pos < head_close);
}

#[test]
fn favicon_link_carries_mime_type_and_mode_url() {
    let mut p = project();
    p.favicon_filename = Some("favicon_ab12cd34.png".to_string());

    let preview = render_page(
        "<html><head></head><body></body></html>",
        &HashMap::new(),
        Some(&p),
        None,
        &[],
        RenderMode::Preview,
    );
    assert!(preview.contains(r#"type="image/png""#));
    assert!(preview.contains(&format!(
        r#"href="/uploads/{}/favicons/favicon_ab12cd34.png""#,
        p.id
    )));

    let export = render_page(
        "<html><head></head><body></body></html>",
        &HashMap::new(),
        Some(&p),
        None,
        &[],
        RenderMode::Export,
    );
    assert!(export.contains(r#"href="assets/favicons/favicon_ab12cd34.png""#));
}

#[test]
fn global_css_is_injected_verbatim() {
    let mut p = project();
    p.global_css = Some("body { margin: 0; }".to_string());
    let out = render_page(
        "<html><head></head><body></body></html>",
        &HashMap::new(),
        Some(&p),
        None,
        &[],
        RenderMode::Preview,
    );
    assert!(out.contains(r#"<style id="global-project-css">"#));
    assert!(out.contains("body { margin: 0; }"));
}

#[test]
fn head_block_prepends_when_template_has_no_head() {
    let mut p = project();
    p.primary_color = Some("#000000".to_string());
    let out = render_page(
        "<main>{{ hero.title }}</main>",
        &content(&[("hero.title", "x")]),
        Some(&p),
        None,
        &[],
        RenderMode::Preview,
    );
    assert!(out.starts_with(r#"<style id="theme-colors-vars">"#));
}

#[test]
fn project_fields_are_available_to_templates() {
    let p = project();
    let out = render_page(
        "<title>{{ project.name }}</title>",
        &HashMap::new(),
        Some(&p),
        None,
        &[],
        RenderMode::Preview,
    );
    assert_eq!(out, "<title>Test Site</title>");
}

#[test]
fn syntax_errors_degrade_to_an_escaped_panel() {
    let out = render_page(
        "<p>{% if %}</p>",
        &HashMap::new(),
        None,
        None,
        &[],
        RenderMode::Preview,
    );
    assert!(out.contains("border: 3px solid red"));
    assert!(out.contains("Template Error"));
    // The offending source is shown escaped, not re-interpreted.
    assert!(out.contains("&lt;p&gt;"));
}

#[test]
fn runtime_errors_degrade_to_a_generic_panel() {
    let out = render_page(
        "{% for x in missing_list %}{{ x }}{% endfor %}",
        &HashMap::new(),
        None,
        None,
        &[],
        RenderMode::Preview,
    );
    assert!(out.contains("border: 2px solid orangered"));
    assert!(out.contains("Unexpected Error"));
}

#[test]
fn escaping_leaves_slashes_intact() {
    // Resolved asset paths must come through byte-for-byte; only the
    // HTML-significant characters are rewritten.
    let p = project();
    let out = render_page(
        r#"<img src="{{ hero.image }}" alt="{{ hero.title }}">"#,
        &content(&[("hero.image", "photo.png"), ("hero.title", "A&B")]),
        Some(&p),
        None,
        &[],
        RenderMode::Export,
    );
    assert_eq!(
        out,
        r#"<img src="assets/images/photo.png" alt="A&amp;B">"#
    );
}

#[test]
fn asset_url_helper_resolves_per_mode() {
    let p = project();
    let export = render_page(
        r#"<img src="{{ asset_url(file="pic.png") }}">"#,
        &HashMap::new(),
        Some(&p),
        None,
        &[],
        RenderMode::Export,
    );
    assert!(export.contains(r#"src="assets/images/pic.png""#));

    let preview = render_page(
        r#"<img src="{{ asset_url(file="pic.png") }}">"#,
        &HashMap::new(),
        Some(&p),
        None,
        &[],
        RenderMode::Preview,
    );
    assert!(preview.contains(&format!(r#"src="/uploads/{}/images/pic.png""#, p.id)));
}

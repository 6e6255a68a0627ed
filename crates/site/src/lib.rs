use anyhow::Result;
use onemalad_core::wards::{PLACES, WARDS};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use time::macros::format_description;
use time::Date;

pub struct SitePaths {
    pub root: PathBuf,
    pub sitemap: PathBuf,
    pub robots: PathBuf,
    pub manifest: PathBuf,
}

impl SitePaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            sitemap: root.join("sitemap.xml"),
            robots: root.join("robots.txt"),
            manifest: root.join("manifest.json"),
            root,
        }
    }

    pub fn ensure(&self) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SitemapEntry {
    pub url: String,
    pub change_frequency: &'static str,
    pub priority: f32,
}

const STATIC_PAGES: &[(&str, &str, f32)] = &[
    ("", "daily", 1.0),
    ("/our-work", "daily", 0.9),
    ("/volunteer", "weekly", 0.9),
    ("/gallery", "weekly", 0.8),
    ("/wards", "weekly", 0.8),
    ("/events", "daily", 0.7),
    ("/corporators", "monthly", 0.7),
];

const DISALLOWED: &[&str] = &["/admin", "/corporator-panel", "/api/"];

pub fn build_site(out_dir: &Path, base_url: &str, last_modified: Date) -> Result<()> {
    let paths = SitePaths::new(out_dir);
    paths.ensure()?;

    let entries = sitemap_entries(base_url);
    fs::write(&paths.sitemap, render_sitemap(&entries, last_modified)?)?;
    fs::write(&paths.robots, render_robots(base_url))?;
    fs::write(&paths.manifest, serde_json::to_string_pretty(&manifest())?)?;

    Ok(())
}

/// Static pages first, then one page per ward and per discover place.
pub fn sitemap_entries(base_url: &str) -> Vec<SitemapEntry> {
    let base_url = base_url.trim_end_matches('/');
    let mut entries: Vec<SitemapEntry> = STATIC_PAGES
        .iter()
        .map(|(path, change_frequency, priority)| SitemapEntry {
            url: format!("{base_url}{path}"),
            change_frequency: *change_frequency,
            priority: *priority,
        })
        .collect();

    entries.extend(WARDS.iter().map(|ward| SitemapEntry {
        url: format!("{base_url}/wards/{}", ward.number),
        change_frequency: "weekly",
        priority: 0.8,
    }));
    entries.extend(PLACES.iter().map(|place| SitemapEntry {
        url: format!("{base_url}/discover/{}", place.slug),
        change_frequency: "monthly",
        priority: 0.7,
    }));
    entries
}

pub fn render_sitemap(entries: &[SitemapEntry], last_modified: Date) -> Result<String> {
    let lastmod = last_modified.format(format_description!("[year]-[month]-[day]"))?;

    let mut lines: Vec<String> = Vec::new();
    lines.push(r#"<?xml version="1.0" encoding="UTF-8"?>"#.to_string());
    lines.push(r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#.to_string());
    for entry in entries {
        lines.push("  <url>".to_string());
        lines.push(format!("    <loc>{}</loc>", escape_xml(&entry.url)));
        lines.push(format!("    <lastmod>{lastmod}</lastmod>"));
        lines.push(format!("    <changefreq>{}</changefreq>", entry.change_frequency));
        lines.push(format!("    <priority>{:.1}</priority>", entry.priority));
        lines.push("  </url>".to_string());
    }
    lines.push("</urlset>".to_string());
    lines.push(String::new());
    Ok(lines.join("\n"))
}

pub fn render_robots(base_url: &str) -> String {
    let base_url = base_url.trim_end_matches('/');
    let mut lines = vec!["User-agent: *".to_string(), "Allow: /".to_string()];
    lines.extend(DISALLOWED.iter().map(|path| format!("Disallow: {path}")));
    lines.push(String::new());
    lines.push(format!("Sitemap: {base_url}/sitemap.xml"));
    lines.push(String::new());
    lines.join("\n")
}

pub fn manifest() -> serde_json::Value {
    json!({
        "name": "OneMalad — Civic Engagement Platform",
        "short_name": "OneMalad",
        "description": "Raise issues, track ward developments, and connect with your corporator in Malad, Mumbai.",
        "start_url": "/",
        "display": "standalone",
        "background_color": "#ffffff",
        "theme_color": "#2563eb",
        "icons": [
            { "src": "/favicon.ico", "sizes": "any", "type": "image/x-icon" },
            { "src": "/icon-192.png", "sizes": "192x192", "type": "image/png" },
            { "src": "/icon-512.png", "sizes": "512x512", "type": "image/png" }
        ]
    })
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn sitemap_lists_static_ward_and_place_pages() {
        let entries = sitemap_entries("https://onemalad.in/");
        assert_eq!(entries.len(), STATIC_PAGES.len() + WARDS.len() + PLACES.len());
        assert_eq!(entries[0].url, "https://onemalad.in");
        assert_eq!(entries[0].priority, 1.0);
        assert!(entries.iter().any(|e| e.url == "https://onemalad.in/wards/49"));
        assert!(entries.iter().any(|e| e.url == "https://onemalad.in/discover/madh-fort"));
    }

    #[test]
    fn sitemap_xml_carries_lastmod_and_priority() {
        let xml = render_sitemap(&sitemap_entries("https://onemalad.in"), date!(2026 - 10 - 18)).unwrap();
        assert!(xml.contains("<loc>https://onemalad.in/volunteer</loc>"));
        assert!(xml.contains("<lastmod>2026-10-18</lastmod>"));
        assert!(xml.contains("<priority>0.9</priority>"));
        assert!(xml.trim_end().ends_with("</urlset>"));
    }

    #[test]
    fn robots_hides_dashboards() {
        let robots = render_robots("https://onemalad.in");
        assert!(robots.contains("Disallow: /admin"));
        assert!(robots.contains("Disallow: /corporator-panel"));
        assert!(robots.contains("Sitemap: https://onemalad.in/sitemap.xml"));
    }

    #[test]
    fn build_writes_all_three_files() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("public");
        build_site(&out, "https://onemalad.in", date!(2026 - 10 - 18)).unwrap();

        let paths = SitePaths::new(&out);
        assert!(paths.sitemap.exists());
        assert!(paths.robots.exists());
        let manifest: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(paths.manifest).unwrap()).unwrap();
        assert_eq!(manifest["short_name"], "OneMalad");
    }
}

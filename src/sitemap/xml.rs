// src/sitemap/xml.rs
// =============================================================================
// Renders sitemap.xml and robots.txt for the directory site.
//
// Layout of the sitemap (sitemaps.org protocol 0.9):
//   <base>/             daily   1.0   lastmod = today
//   <base>/shops/<id>   weekly  0.8   lastmod = updated_at, else created_at
//
// Everything here is pure string building, so "today" is passed in.
// =============================================================================

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use quick_xml::escape::escape;
use url::Url;

use crate::store::SitemapEntry;

const SITEMAP_NAMESPACE: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// The site root without its trailing slash, e.g. "https://example.jp"
fn site_root(base_url: &Url) -> &str {
    base_url.as_str().trim_end_matches('/')
}

/// Builds the full sitemap document
pub fn generate_sitemap_xml(base_url: &Url, entries: &[SitemapEntry], today: NaiveDate) -> String {
    let root = site_root(base_url);

    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str(&format!("<urlset xmlns=\"{}\">\n", SITEMAP_NAMESPACE));

    // Home page first
    push_url(&mut xml, &format!("{}/", root), today, "daily", "1.0");

    for entry in entries {
        let loc = format!("{}/shops/{}", root, entry.id);
        push_url(&mut xml, &loc, lastmod(entry, today), "weekly", "0.8");
    }

    xml.push_str("</urlset>\n");
    xml
}

/// Builds robots.txt pointing crawlers at the sitemap
pub fn generate_robots_txt(base_url: &Url) -> String {
    let root = site_root(base_url);
    let host = base_url.host_str().unwrap_or(root);

    format!(
        "# robots.txt for {host}\n\
         User-agent: *\n\
         Allow: /\n\
         \n\
         # Sitemap\n\
         Sitemap: {root}/sitemap.xml\n\
         \n\
         # Crawl-delay\n\
         Crawl-delay: 1\n"
    )
}

fn push_url(xml: &mut String, loc: &str, lastmod: NaiveDate, changefreq: &str, priority: &str) {
    xml.push_str("  <url>\n");
    xml.push_str(&format!("    <loc>{}</loc>\n", escape(loc)));
    xml.push_str(&format!("    <lastmod>{}</lastmod>\n", lastmod.format("%Y-%m-%d")));
    xml.push_str(&format!("    <changefreq>{}</changefreq>\n", changefreq));
    xml.push_str(&format!("    <priority>{}</priority>\n", priority));
    xml.push_str("  </url>\n");
}

/// The date a listing page last changed
///
/// Falls back to `today` when neither timestamp is present or readable.
pub fn lastmod(entry: &SitemapEntry, today: NaiveDate) -> NaiveDate {
    [entry.updated_at.as_deref(), entry.created_at.as_deref()]
        .into_iter()
        .flatten()
        .find(|raw| !raw.trim().is_empty())
        .and_then(parse_date)
        .unwrap_or(today)
}

// Accepts RFC 3339 (timestamptz), a bare ISO datetime (timestamp without
// time zone) or anything starting with YYYY-MM-DD
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();

    if let Ok(datetime) = DateTime::parse_from_rfc3339(raw) {
        return Some(datetime.with_timezone(&Utc).date_naive());
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(datetime.date());
    }

    NaiveDate::parse_from_str(raw.get(..10)?, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::RecordId;

    fn base() -> Url {
        Url::parse("https://directory.example/").unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn entry(id: RecordId, updated_at: Option<&str>, created_at: Option<&str>) -> SitemapEntry {
        SitemapEntry {
            id,
            updated_at: updated_at.map(str::to_string),
            created_at: created_at.map(str::to_string),
        }
    }

    #[test]
    fn test_home_page_comes_first() {
        let xml = generate_sitemap_xml(&base(), &[], today());

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n"));
        assert!(xml.contains("<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">"));
        assert!(xml.contains(
            "  <url>\n    <loc>https://directory.example/</loc>\n    <lastmod>2026-10-19</lastmod>\n    <changefreq>daily</changefreq>\n    <priority>1.0</priority>\n  </url>\n"
        ));
        assert!(xml.ends_with("</urlset>\n"));
    }

    #[test]
    fn test_listing_pages_follow_in_order() {
        let entries = vec![
            entry(RecordId::Number(12), Some("2025-01-05T09:30:00+09:00"), None),
            entry(RecordId::Number(7), None, Some("2024-06-01T00:00:00Z")),
        ];

        let xml = generate_sitemap_xml(&base(), &entries, today());

        let first = xml.find("<loc>https://directory.example/shops/12</loc>").unwrap();
        let second = xml.find("<loc>https://directory.example/shops/7</loc>").unwrap();
        assert!(first < second);
        // 09:30+09:00 is 00:30 UTC, same day
        assert!(xml.contains("<lastmod>2025-01-05</lastmod>"));
        assert!(xml.contains("<lastmod>2024-06-01</lastmod>"));
        assert_eq!(xml.matches("<changefreq>weekly</changefreq>").count(), 2);
        assert_eq!(xml.matches("<priority>0.8</priority>").count(), 2);
    }

    #[test]
    fn test_ids_are_escaped() {
        let entries = vec![entry(RecordId::from("a&b<c>"), None, None)];

        let xml = generate_sitemap_xml(&base(), &entries, today());

        assert!(xml.contains("<loc>https://directory.example/shops/a&amp;b&lt;c&gt;</loc>"));
    }

    #[test]
    fn test_base_path_is_kept() {
        let base = Url::parse("https://example.jp/guide").unwrap();
        let xml = generate_sitemap_xml(&base, &[entry(RecordId::Number(1), None, None)], today());

        assert!(xml.contains("<loc>https://example.jp/guide/</loc>"));
        assert!(xml.contains("<loc>https://example.jp/guide/shops/1</loc>"));
    }

    #[test]
    fn test_lastmod_fallbacks() {
        let t = today();
        let day = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();

        assert_eq!(lastmod(&entry(RecordId::Number(1), Some("2024-03-01T10:00:00.123456+00:00"), None), t), day(2024, 3, 1));
        assert_eq!(lastmod(&entry(RecordId::Number(1), Some("2024-03-01T10:00:00"), None), t), day(2024, 3, 1));
        assert_eq!(lastmod(&entry(RecordId::Number(1), Some("2024-03-01 10:00:00+00"), None), t), day(2024, 3, 1));
        assert_eq!(lastmod(&entry(RecordId::Number(1), Some(""), Some("2023-12-24T00:00:00Z")), t), day(2023, 12, 24));
        assert_eq!(lastmod(&entry(RecordId::Number(1), None, None), t), t);
        assert_eq!(lastmod(&entry(RecordId::Number(1), Some("yesterday"), None), t), t);
    }

    #[test]
    fn test_robots_txt() {
        let robots = generate_robots_txt(&base());

        assert_eq!(
            robots,
            "# robots.txt for directory.example\nUser-agent: *\nAllow: /\n\n# Sitemap\nSitemap: https://directory.example/sitemap.xml\n\n# Crawl-delay\nCrawl-delay: 1\n"
        );
    }
}

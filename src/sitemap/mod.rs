// src/sitemap/mod.rs
// =============================================================================
// This module generates the files search engines read:
// - sitemap.xml: the home page plus one page per active listing
// - robots.txt: allows everything and points at the sitemap
//
// Rendering lives in xml.rs; this file writes the results to disk.
// =============================================================================

mod xml;

pub use xml::{generate_robots_txt, generate_sitemap_xml};

use chrono::NaiveDate;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use url::Url;

use crate::store::SitemapEntry;

/// Both rendered documents, ready to be written
#[derive(Debug, Clone)]
pub struct SiteFiles {
    pub sitemap_xml: String,
    pub robots_txt: String,
    /// Number of <url> entries, home page included
    pub url_count: usize,
}

/// Where the files ended up
#[derive(Debug)]
pub struct WrittenFiles {
    pub sitemap_path: PathBuf,
    pub robots_path: PathBuf,
    /// True when the output directory had to be created
    pub created_dir: bool,
}

impl SiteFiles {
    pub fn render(base_url: &Url, entries: &[SitemapEntry], today: NaiveDate) -> Self {
        Self {
            sitemap_xml: generate_sitemap_xml(base_url, entries, today),
            robots_txt: generate_robots_txt(base_url),
            url_count: entries.len() + 1,
        }
    }

    /// Writes sitemap.xml and robots.txt into `out_dir`, creating it if needed
    pub fn write_to(&self, out_dir: &Path) -> io::Result<WrittenFiles> {
        let created_dir = !out_dir.exists();
        if created_dir {
            fs::create_dir_all(out_dir)?;
        }

        let sitemap_path = out_dir.join("sitemap.xml");
        fs::write(&sitemap_path, &self.sitemap_xml)?;

        let robots_path = out_dir.join("robots.txt");
        fs::write(&robots_path, &self.robots_txt)?;

        Ok(WrittenFiles {
            sitemap_path,
            robots_path,
            created_dir,
        })
    }
}

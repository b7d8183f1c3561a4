//! Paginated Markdown rendering of a [`NewsDigest`].
//!
//! Records are grouped into fixed-size pages, each introduced by a
//! `Page i / n` heading and separated by a horizontal rule so the file prints
//! and converts cleanly.

use crate::error::Result;
use crate::models::{ArticleRecord, NewsDigest};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

pub fn document_filename(date: &str) -> String {
    format!("news_summary_{date}.md")
}

/// Render the digest as Markdown with `per_page` records per page.
pub fn render_document(digest: &NewsDigest, per_page: usize) -> String {
    let per_page = per_page.max(1);
    let pages = digest.articles.chunks(per_page).collect::<Vec<_>>();
    let mut md = String::new();

    md.push_str(&format!("# {} 세계 뉴스 요약\n\n", digest.date));
    md.push_str(&format!(
        "_Generated {} · {} articles · {} pages_\n",
        digest.generated_at,
        digest.articles.len(),
        pages.len()
    ));

    for (page_index, page) in pages.iter().enumerate() {
        md.push_str("\n---\n\n");
        md.push_str(&format!("## Page {} / {}\n", page_index + 1, pages.len()));
        for (offset, record) in page.iter().enumerate() {
            let number = page_index * per_page + offset + 1;
            push_record(&mut md, number, record);
        }
    }
    md
}

fn push_record(md: &mut String, number: usize, record: &ArticleRecord) {
    md.push_str(&format!("\n### {}. {}\n\n", number, record.title));
    md.push_str(&format!("- **Source:** {}\n", record.source));
    md.push_str(&format!("- **Category:** {}\n", record.category));
    md.push_str(&format!("- **Collected:** {}\n\n", record.timestamp));
    md.push_str(&format!("{}\n\n", record.summary));
    md.push_str(&format!("[Read the full article]({})\n", record.link));
}

/// Write the rendered document into `output_dir` and return its path.
#[instrument(level = "info", skip_all, fields(output_dir = %output_dir.display(), date = %digest.date))]
pub async fn write_document(
    digest: &NewsDigest,
    output_dir: &Path,
    per_page: usize,
) -> Result<PathBuf> {
    fs::create_dir_all(output_dir).await?;
    let path = output_dir.join(document_filename(&digest.date));
    fs::write(&path, render_document(digest, per_page)).await?;
    info!(path = %path.display(), articles = digest.articles.len(), "Wrote digest document");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(n: usize) -> ArticleRecord {
        ArticleRecord {
            title: format!("헤드라인 {n}"),
            summary: format!("요약 문장 {n}."),
            link: format!("https://n.news.naver.com/article/001/{n}"),
            source: "연합뉴스".to_string(),
            category: "세계".to_string(),
            timestamp: "2025-05-06 08:00:00".to_string(),
        }
    }

    fn digest(count: usize) -> NewsDigest {
        NewsDigest {
            date: "20250506".to_string(),
            generated_at: "2025-05-06 08:01:00".to_string(),
            articles: (1..=count).map(record).collect(),
        }
    }

    #[test]
    fn test_pagination() {
        let md = render_document(&digest(7), 3);

        assert!(md.starts_with("# 20250506 세계 뉴스 요약"));
        assert!(md.contains("7 articles · 3 pages"));
        assert!(md.contains("## Page 1 / 3"));
        assert!(md.contains("## Page 3 / 3"));
        assert!(!md.contains("## Page 4"));
        assert!(md.contains("### 7. 헤드라인 7"));

        let page3 = md.split("## Page 3 / 3").nth(1).unwrap();
        assert!(page3.contains("### 7."));
        assert!(!page3.contains("### 6."));
    }

    #[test]
    fn test_record_fields_rendered() {
        let md = render_document(&digest(1), 5);
        assert!(md.contains("- **Source:** 연합뉴스"));
        assert!(md.contains("요약 문장 1."));
        assert!(md.contains("(https://n.news.naver.com/article/001/1)"));
    }

    #[tokio::test]
    async fn test_write_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_document(&digest(2), dir.path(), 5).await.unwrap();

        assert_eq!(path, dir.path().join("news_summary_20250506.md"));
        let written = std::fs::read_to_string(path).unwrap();
        assert!(written.contains("### 2. 헤드라인 2"));
    }
}

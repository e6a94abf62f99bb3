use std::collections::HashSet;
use std::sync::LazyLock;

use reqwest::Url;
use scraper::{ElementRef, Html, Node, Selector};

use crate::error::PageError;

pub static PARAGRAPH_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p").unwrap());
pub static EMPHASIS_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p strong").unwrap());
static TITLE_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").unwrap());
static LINK_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());

/// A parsed HTML page.
pub struct Document {
    html: Html,
}

impl Document {
    pub fn parse(body: &str) -> Self {
        Document {
            html: Html::parse_document(body),
        }
    }

    /// One fragment per text line of every element matching `selector`, in
    /// document order. `<br>` and literal newlines both end a line; blank
    /// lines are kept, so an empty element or a trailing `<br>` still yields
    /// an empty fragment.
    pub fn fragments(&self, selector: &Selector) -> Vec<String> {
        let mut out = Vec::new();
        for element in self.html.select(selector) {
            let text = element_lines(element);
            out.extend(
                text.split('\n')
                    .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string()),
            );
        }
        out
    }

    /// Like [`Document::fragments`] for a selector given as text.
    pub fn select_fragments(&self, css: &str) -> Result<Vec<String>, PageError> {
        let selector = Selector::parse(css).map_err(|e| PageError::Selector {
            selector: css.to_string(),
            reason: e.to_string(),
        })?;
        Ok(self.fragments(&selector))
    }

    /// Text of the last `<title>`, or empty.
    pub fn title(&self) -> String {
        self.html
            .select(&TITLE_SEL)
            .last()
            .map(|t| t.text().collect::<String>().trim().to_string())
            .unwrap_or_default()
    }

    /// Hrefs of anchors whose visible text contains `needle`, resolved
    /// against `base` when given. First occurrence wins on duplicates.
    pub fn links_containing(&self, needle: &str, base: Option<&Url>) -> Vec<String> {
        let mut seen = HashSet::new();
        self.html
            .select(&LINK_SEL)
            .filter(|a| a.text().collect::<String>().contains(needle))
            .filter_map(|a| a.value().attr("href"))
            .filter_map(|href| match base {
                Some(base) => base.join(href.trim()).ok().map(String::from),
                None => Some(href.trim().to_string()),
            })
            .filter(|url| seen.insert(url.clone()))
            .collect()
    }
}

fn element_lines(element: ElementRef<'_>) -> String {
    let mut text = String::new();
    for node in element.descendants() {
        match node.value() {
            Node::Text(t) => text.push_str(t),
            Node::Element(e) if e.name() == "br" => text.push('\n'),
            _ => {}
        }
    }
    text
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn br_splits_paragraph() {
        let doc = Document::parse("<p>Regie: James Ivory<br/>Laufzeit: 130<br>Anbieter: Concorde</p>");
        assert_eq!(
            doc.fragments(&PARAGRAPH_SEL),
            vec!["Regie: James Ivory", "Laufzeit: 130", "Anbieter: Concorde"]
        );
    }

    #[test]
    fn inline_markup_is_flattened() {
        let doc = Document::parse("<p><strong>Regie:</strong> James&nbsp;Ivory</p>");
        assert_eq!(doc.fragments(&PARAGRAPH_SEL), vec!["Regie: James\u{a0}Ivory"]);
    }

    #[test]
    fn document_order_and_blank_lines_kept() {
        let doc = Document::parse("<p>a</p><div><p>b<br><br>c</p></div><p></p>");
        assert_eq!(doc.fragments(&PARAGRAPH_SEL), vec!["a", "b", "", "c", ""]);
    }

    #[test]
    fn empty_element_and_trailing_break_give_blank_fragments() {
        let doc = Document::parse("<p></p><p>Regie: James Ivory<br></p>");
        assert_eq!(doc.fragments(&PARAGRAPH_SEL), vec!["", "Regie: James Ivory", ""]);
    }

    #[test]
    fn emphasis_selector_only_sees_strong() {
        let doc = Document::parse(
            "<p>Bildqualität UHD: 10%</p><p>Fazit <strong>Bildqualität UHD: 85%</strong></p>",
        );
        assert_eq!(doc.fragments(&EMPHASIS_SEL), vec!["Bildqualität UHD: 85%"]);
    }

    #[test]
    fn no_paragraphs_is_empty() {
        let doc = Document::parse("<div>Regie: nobody</div>");
        assert!(doc.fragments(&PARAGRAPH_SEL).is_empty());
    }

    #[test]
    fn bad_selector_is_an_error() {
        let doc = Document::parse("<p>x</p>");
        assert!(matches!(doc.select_fragments("p[["), Err(PageError::Selector { .. })));
        assert_eq!(doc.select_fragments("p").unwrap(), vec!["x"]);
    }

    #[test]
    fn title_uses_last_title() {
        let doc = Document::parse("<html><head><title> Venom 4K UHD </title></head><body></body></html>");
        assert_eq!(doc.title(), "Venom 4K UHD");
        assert_eq!(Document::parse("<p>x</p>").title(), "");
    }

    #[test]
    fn links_filtered_resolved_and_deduped() {
        let doc = Document::parse(
            r#"<a href="/venom-4k-uhd/">Venom 4K UHD</a>
               <a href="/impressum/">Impressum</a>
               <a href="https://other.example/india-4k-uhd/">India UHD</a>
               <a href="/venom-4k-uhd/">Venom 4K UHD</a>
               <a>UHD without href</a>"#,
        );
        let base = Url::parse("https://blu-ray-rezensionen.net/ultra-hd-blu-ray").unwrap();
        assert_eq!(
            doc.links_containing("UHD", Some(&base)),
            vec![
                "https://blu-ray-rezensionen.net/venom-4k-uhd/",
                "https://other.example/india-4k-uhd/",
            ]
        );
        assert_eq!(doc.links_containing("UHD", None).len(), 2);
    }
}

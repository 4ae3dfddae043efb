//! Anchor collection from rendered HTML.
//!
//! Pure functions over an HTML string: the page engine is responsible for
//! producing the markup, these functions only walk it. Matches are returned
//! in DOM order with duplicates retained, and every href is resolved to
//! absolute form against the page URL.

use super::HarvestError;
use scraper::{Html, Selector};
use url::Url;

/// Collect every href matched by `selector`, resolved absolute against
/// `base_url`. DOM order, duplicates retained. Empty, fragment-only, and
/// `javascript:` hrefs are skipped.
pub fn matching_links(
    html: &str,
    base_url: &str,
    selector: &str,
) -> Result<Vec<String>, HarvestError> {
    let sel = Selector::parse(selector).map_err(|_| HarvestError::BadSelector {
        selector: selector.to_string(),
    })?;
    let document = Html::parse_document(html);
    let base = Url::parse(base_url).ok();

    let mut out = Vec::new();
    for element in document.select(&sel) {
        let href = element.value().attr("href").unwrap_or("");
        if href.is_empty() || href.starts_with('#') || href.starts_with("javascript:") {
            continue;
        }
        out.push(resolve(href, &base));
    }
    Ok(out)
}

/// Collect every anchor whose resolved URL path ends in `extension`
/// (case-insensitive). Relative hrefs are resolved the same way as product
/// links; a relative firmware href must not silently produce a malformed
/// download target.
pub fn archive_links(html: &str, base_url: &str, extension: &str) -> Vec<String> {
    let sel = Selector::parse("a[href]").expect("static selector");
    let document = Html::parse_document(html);
    let base = Url::parse(base_url).ok();
    let ext = extension.to_ascii_lowercase();

    let mut out = Vec::new();
    for element in document.select(&sel) {
        let href = element.value().attr("href").unwrap_or("");
        if href.is_empty() || href.starts_with('#') || href.starts_with("javascript:") {
            continue;
        }
        let resolved = resolve(href, &base);
        if has_extension(&resolved, &ext) {
            out.push(resolved);
        }
    }
    out
}

fn resolve(href: &str, base: &Option<Url>) -> String {
    match base {
        Some(base) => base
            .join(href)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| href.to_string()),
        None => href.to_string(),
    }
}

/// Extension predicate on the URL path, so query strings don't defeat the
/// match.
fn has_extension(link: &str, ext: &str) -> bool {
    match Url::parse(link) {
        Ok(url) => url.path().to_ascii_lowercase().ends_with(ext),
        Err(_) => link.to_ascii_lowercase().ends_with(ext),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://www.vendor.example/dk/support/download/";

    #[test]
    fn product_links_normalized_in_dom_order_with_duplicates() {
        let html = r#"
            <div>
              <a class="model" href="/dk/support/download/archer-c6/">Archer C6</a>
              <a class="model" href="https://www.vendor.example/dk/support/download/deco-m4/">Deco M4</a>
              <a class="model" href="/dk/support/download/archer-c6/">Archer C6 again</a>
              <a class="other" href="/dk/community/">Community</a>
            </div>
        "#;
        let links = matching_links(html, BASE, "a.model").expect("selector");
        assert_eq!(
            links,
            vec![
                "https://www.vendor.example/dk/support/download/archer-c6/",
                "https://www.vendor.example/dk/support/download/deco-m4/",
                "https://www.vendor.example/dk/support/download/archer-c6/",
            ]
        );
    }

    #[test]
    fn no_matches_yields_empty_sequence() {
        let html = "<p>firmware page is down for maintenance</p>";
        let links = matching_links(html, BASE, "a.model").expect("selector");
        assert!(links.is_empty());
    }

    #[test]
    fn bad_selector_is_a_typed_error() {
        let err = matching_links("<a href=\"/x\">x</a>", BASE, "a[").unwrap_err();
        assert!(matches!(err, HarvestError::BadSelector { .. }));
    }

    #[test]
    fn skips_fragment_and_javascript_hrefs() {
        let html = r##"
            <a href="#top">top</a>
            <a href="javascript:void(0)">noop</a>
            <a href="/dk/support/download/archer-c6/">real</a>
        "##;
        let links = matching_links(html, BASE, "a").expect("selector");
        assert_eq!(
            links,
            vec!["https://www.vendor.example/dk/support/download/archer-c6/"]
        );
    }

    #[test]
    fn archive_links_filter_by_extension() {
        let html = r#"
            <a href="/fw/archer-c6-v2.zip">fw v2</a>
            <a href="https://cdn.vendor.example/fw/archer-c6-v3.ZIP">fw v3</a>
            <a href="/fw/archer-c6-gpl.tar.gz">gpl sources</a>
            <a href="/docs/archer-c6-manual.pdf">manual</a>
            <a href="/fw/archer-c6-v1.zip?lang=dk">fw v1</a>
        "#;
        let links = archive_links(html, BASE, ".zip");
        assert_eq!(
            links,
            vec![
                "https://www.vendor.example/fw/archer-c6-v2.zip",
                "https://cdn.vendor.example/fw/archer-c6-v3.ZIP",
                "https://www.vendor.example/fw/archer-c6-v1.zip?lang=dk",
            ]
        );
    }

    #[test]
    fn archive_links_three_matching_two_not() {
        let html = r#"
            <a href="/fw/a.zip">a</a>
            <a href="/fw/b.zip">b</a>
            <a href="/fw/c.zip">c</a>
            <a href="/fw/readme.txt">readme</a>
            <a href="/fw/d.exe">installer</a>
        "#;
        let links = archive_links(html, BASE, ".zip");
        assert_eq!(links.len(), 3);
        assert!(links.iter().all(|l| l.ends_with(".zip")));
    }
}

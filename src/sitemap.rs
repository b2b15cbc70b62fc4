use std::io::Cursor;

use anyhow::Result;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::config::Settings;
use crate::registry::PageRegistry;

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Write a `<urlset>` with one `<url>` per registered page, in id order.
pub fn render(registry: &PageRegistry, settings: &Settings) -> Result<String> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    let mut urlset = BytesStart::new("urlset");
    urlset.push_attribute(("xmlns", SITEMAP_NS));
    writer.write_event(Event::Start(urlset))?;

    for page in registry.pages() {
        writer.write_event(Event::Start(BytesStart::new("url")))?;
        text_element(&mut writer, "loc", &settings.page_url(&page.id))?;
        text_element(&mut writer, "lastmod", &page.modified().to_string())?;
        writer.write_event(Event::End(BytesEnd::new("url")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("urlset")))?;
    let mut xml = String::from_utf8(writer.into_inner().into_inner())?;
    xml.push('\n');
    Ok(xml)
}

fn text_element(writer: &mut Writer<Cursor<Vec<u8>>>, name: &str, text: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::RawPage;

    fn raw(id: &str, updated: Option<&str>) -> RawPage {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "title": "T",
            "published": "2024-01-01",
            "updated": updated,
        }))
        .unwrap()
    }

    #[test]
    fn lists_every_page_in_order() {
        let (reg, _) = PageRegistry::build(&[raw("/b", Some("2024-02-03")), raw("/a&b", None)]);
        let xml = render(&reg, &Settings::default()).unwrap();

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains(SITEMAP_NS));
        assert!(xml.contains("<loc>https://example.com/a&amp;b</loc>"));
        assert!(xml.contains("<lastmod>2024-02-03</lastmod>"));
        assert!(xml.find("/a&amp;b").unwrap() < xml.find("example.com/b<").unwrap());
        assert_eq!(xml.matches("<url>").count(), 2);
    }
}

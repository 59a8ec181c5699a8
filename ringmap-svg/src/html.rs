/*!
# HTML Image Map

A small HTML page that shows a rendered map as an image and overlays one clickable `<area>` per
linked label, built from the label bounds of the render.
*/

use ringmap_core::LabelBounds;

use crate::canvas::escape;

const MAP_NAME: &str = "ringmap";

/// Rectangle corners rounded the way browsers hit-test `coords`: `x1,y1,x2,y2`.
fn area_coords(record: &LabelBounds) -> String {
    let r = record.bounds;
    let (x, y) = ((r.x + 0.5).floor() as i64, (r.y + 0.5).floor() as i64);
    let (w, h) = ((r.width + 0.5).floor() as i64, (r.height + 0.5).floor() as i64);
    format!("{},{},{},{}", x, y, x + w, y + h)
}

/// One `<area>` element, or `None` when the record has nothing to link or show.
pub fn area_element(record: &LabelBounds) -> Option<String> {
    if !record.active {
        return None;
    }
    let hyperlink = record.hyperlink.as_deref().filter(|h| !h.trim().is_empty());
    let mouseover = record.mouseover.as_deref().filter(|m| !m.trim().is_empty());
    if hyperlink.is_none() && mouseover.is_none() {
        return None;
    }

    let mut area = format!(r#"<area shape="rect" coords="{}""#, area_coords(record));
    if let Some(href) = hyperlink {
        area.push_str(&format!(r#" href="{}""#, escape(href)));
    }
    if let Some(text) = mouseover {
        area.push_str(&format!(r#" title="{}""#, escape(text)));
    }
    area.push_str(&format!(r#" alt="{}" />"#, escape(&record.label)));
    Some(area)
}

/// Complete page showing `image` at its pixel size with the label areas of `records`.
pub fn image_map_page(title: &str, image: &str, width: u32, height: u32, records: &[LabelBounds]) -> String {
    let mut page = String::new();
    page.push_str("<!DOCTYPE html>\n");
    page.push_str("<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\" />\n");
    page.push_str(&format!("<title>{}</title>\n", escape(title)));
    page.push_str("<style>body {background-color: #ffffff; font-family: arial, sans-serif; color: #000000}</style>\n");
    page.push_str("</head>\n<body>\n");
    page.push_str(&format!(
        r##"<img style="border:0" src="{}" width="{}" height="{}" alt="{}" usemap="#{}" />"##,
        escape(image),
        width,
        height,
        escape(title),
        MAP_NAME
    ));
    page.push('\n');
    page.push_str(&format!(r#"<map id="{0}" name="{0}">"#, MAP_NAME));
    page.push('\n');
    for area in records.iter().filter_map(area_element) {
        page.push_str(&area);
        page.push('\n');
    }
    page.push_str("</map>\n</body>\n</html>\n");
    page
}

#[cfg(test)]
mod tests {
    use super::*;
    use ringmap_core::{BoundsKind, Rect};

    fn linked(label: &str, href: Option<&str>, mouseover: Option<&str>) -> LabelBounds {
        LabelBounds::new(BoundsKind::Feature, Rect::new(10.4, 20.6, 30.5, 9.2), label, 120)
            .with_links(href.map(str::to_string), mouseover.map(str::to_string))
    }

    #[test]
    fn test_area_rounds_coordinates() {
        let area = area_element(&linked("lacZ", Some("https://example.org/lacZ"), None)).unwrap();
        assert_eq!(area, r#"<area shape="rect" coords="10,21,41,30" href="https://example.org/lacZ" alt="lacZ" />"#);
    }

    #[test]
    fn test_area_escapes_text() {
        let area = area_element(&linked("bla", Some("/q?a=1&b=2"), Some("beta-lactamase \"TEM-1\""))).unwrap();
        assert!(area.contains(r#"href="/q?a=1&amp;b=2""#));
        assert!(area.contains(r#"title="beta-lactamase &quot;TEM-1&quot;""#));
    }

    #[test]
    fn test_unlinked_and_inactive_records_are_skipped() {
        assert!(area_element(&linked("ori", None, None)).is_none());
        assert!(area_element(&linked("ori", None, Some("  "))).is_none());
        let mut inactive = linked("ori", Some("#ori"), None);
        inactive.active = false;
        assert!(area_element(&inactive).is_none());
    }

    #[test]
    fn test_page_wraps_image_and_areas() {
        let records = vec![linked("lacZ", Some("#lacZ"), None), linked("ori", None, None)];
        let page = image_map_page("pUC19 <map>", "pUC19.svg", 900, 900, &records);
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("<title>pUC19 &lt;map&gt;</title>"));
        assert!(page.contains(r##"src="pUC19.svg" width="900" height="900""##));
        assert!(page.contains(r##"usemap="#ringmap""##));
        assert_eq!(page.matches("<area ").count(), 1);
        assert!(page.trim_end().ends_with("</html>"));
    }
}

// Feed-XML parsing: <items><item> children become tag -> text records.
use crate::model::{ParseError, RawRecord};
use quick_xml::Reader;
use quick_xml::events::Event;

/// One page of a feed response: the extracted items plus the totalCount
/// field, when the body carries one.
#[derive(Debug, Default)]
pub struct ParsedPage {
    pub items: Vec<RawRecord>,
    pub total_count: Option<usize>,
}

/// Parses one response body. Every `<item>` under an `<items>` element
/// becomes a RawRecord of its direct children; text is trimmed, missing
/// or self-closed children become empty strings.
pub fn parse_page(xml: &str) -> Result<ParsedPage, ParseError> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<String> = Vec::new();
    let mut page = ParsedPage::default();
    let mut current: Option<RawRecord> = None;
    let mut item_depth: Option<usize> = None;

    loop {
        match reader.read_event().map_err(|e| ParseError::Xml(e.to_string()))? {
            Event::Start(e) => {
                let name = tag_name(e.name().as_ref());
                stack.push(name.clone());
                if item_depth.is_none() && name == "item" && parent_is(&stack, "items") {
                    item_depth = Some(stack.len());
                    current = Some(RawRecord::new());
                } else if let (Some(rec), Some(depth)) = (current.as_mut(), item_depth) {
                    // Direct child of the item: register it even if it has no text.
                    if stack.len() == depth + 1 {
                        rec.entry(name).or_default();
                    }
                }
            }
            Event::Empty(e) => {
                let name = tag_name(e.name().as_ref());
                if let (Some(rec), Some(depth)) = (current.as_mut(), item_depth) {
                    if stack.len() == depth {
                        rec.entry(name).or_default();
                    }
                }
            }
            Event::Text(e) => {
                let text = match e.unescape() {
                    Ok(t) => t.trim().to_string(),
                    Err(e) => return Err(ParseError::Xml(e.to_string())),
                };
                record_text(&stack, item_depth, current.as_mut(), &mut page, text);
            }
            Event::CData(e) => {
                let text = String::from_utf8_lossy(&e.into_inner()).trim().to_string();
                record_text(&stack, item_depth, current.as_mut(), &mut page, text);
            }
            Event::End(_) => {
                stack.pop();
                if let Some(depth) = item_depth {
                    if stack.len() < depth {
                        if let Some(rec) = current.take() {
                            page.items.push(rec);
                        }
                        item_depth = None;
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(page)
}

fn record_text(
    stack: &[String],
    item_depth: Option<usize>,
    current: Option<&mut RawRecord>,
    page: &mut ParsedPage,
    text: String,
) {
    if text.is_empty() {
        return;
    }
    if let (Some(rec), Some(depth)) = (current, item_depth) {
        if stack.len() == depth + 1 {
            if let Some(tag) = stack.last() {
                rec.insert(tag.clone(), text);
            }
        }
    } else if stack.last().map(String::as_str) == Some("totalCount") {
        page.total_count = text.parse().ok();
    }
}

fn tag_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}

fn parent_is(stack: &[String], name: &str) -> bool {
    stack.len() >= 2 && stack[stack.len() - 2] == name
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
        <response>
          <header><resultCode>00</resultCode></header>
          <body>
            <items>
              <item>
                <bidNtceNm> Radiation survey service </bidNtceNm>
                <asignBdgtAmt>1,000,000</asignBdgtAmt>
                <bidNtceUrl/>
              </item>
              <item>
                <bidNtceNm><![CDATA[Waste handling & disposal]]></bidNtceNm>
                <asignBdgtAmt></asignBdgtAmt>
              </item>
            </items>
            <totalCount>2</totalCount>
          </body>
        </response>"#;

    #[test]
    fn extracts_items_and_total_count() {
        let page = parse_page(SAMPLE).unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total_count, Some(2));
    }

    #[test]
    fn trims_text_and_unescapes_entities() {
        let page = parse_page(SAMPLE).unwrap();
        assert_eq!(
            page.items[0].get("bidNtceNm").map(String::as_str),
            Some("Radiation survey service")
        );
        assert_eq!(
            page.items[1].get("bidNtceNm").map(String::as_str),
            Some("Waste handling & disposal")
        );
    }

    #[test]
    fn empty_children_become_empty_strings() {
        let page = parse_page(SAMPLE).unwrap();
        assert_eq!(page.items[0].get("bidNtceUrl").map(String::as_str), Some(""));
        assert_eq!(page.items[1].get("asignBdgtAmt").map(String::as_str), Some(""));
    }

    #[test]
    fn no_items_yields_empty_page() {
        let page = parse_page("<response><body><items/></body></response>").unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total_count, None);
    }

    #[test]
    fn truncated_xml_does_not_panic() {
        // Truncated bodies either error out or yield no finished items.
        match parse_page("<response><items><item><a>1</a>") {
            Ok(page) => assert!(page.items.is_empty()),
            Err(ParseError::Xml(_)) => {}
        }
    }
}

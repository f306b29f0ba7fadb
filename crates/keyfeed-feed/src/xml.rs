//! YML document rendering.
//!
//! Layout of the emitted document:
//!
//! ```text
//! <?xml version="1.0" encoding="UTF-8"?>
//! <yml_catalog date="2026-01-31 12:00">
//!   <shop>
//!     <name/> <company/> <url/>
//!     <currencies><currency id="UAH" rate="1"/></currencies>
//!     <categories>...</categories>            (optional)
//!     <offers>
//!       <offer id="SKU" available="true">
//!         name, price, price_old, currencyId, stock, description, barcode,
//!         categoryId, color, size, param*, picture*
//!       </offer>
//!     </offers>
//!   </shop>
//! </yml_catalog>
//! ```
//!
//! Optional values that are absent produce no element at all.

use std::io::Write;

use keyfeed_core::{Category, FeedDocument, Offer};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::FeedError;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Renders `doc` as an indented UTF-8 YML document.
///
/// # Errors
///
/// Returns [`FeedError::Io`] or [`FeedError::Xml`] if the writer fails.
pub fn serialize(doc: &FeedDocument) -> Result<Vec<u8>, FeedError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let date = doc.generated_at.format(DATE_FORMAT).to_string();
    let mut root = BytesStart::new("yml_catalog");
    root.push_attribute(("date", date.as_str()));
    writer.write_event(Event::Start(root))?;
    writer.write_event(Event::Start(BytesStart::new("shop")))?;

    text_element(&mut writer, "name", &doc.shop.name)?;
    text_element(&mut writer, "company", &doc.shop.company)?;
    text_element(&mut writer, "url", &doc.shop.url)?;

    writer.write_event(Event::Start(BytesStart::new("currencies")))?;
    let mut currency = BytesStart::new("currency");
    currency.push_attribute(("id", doc.currency.id.as_str()));
    currency.push_attribute(("rate", doc.currency.rate.as_str()));
    writer.write_event(Event::Empty(currency))?;
    end(&mut writer, "currencies")?;

    if let Some(categories) = &doc.categories {
        write_categories(&mut writer, categories)?;
    }

    writer.write_event(Event::Start(BytesStart::new("offers")))?;
    for offer in &doc.offers {
        write_offer(&mut writer, offer)?;
    }
    end(&mut writer, "offers")?;

    end(&mut writer, "shop")?;
    end(&mut writer, "yml_catalog")?;

    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    Ok(bytes)
}

fn write_categories<W: Write>(
    writer: &mut Writer<W>,
    categories: &[Category],
) -> Result<(), FeedError> {
    writer.write_event(Event::Start(BytesStart::new("categories")))?;
    for category in categories {
        let mut start = BytesStart::new("category");
        start.push_attribute(("id", category.id.as_str()));
        if let Some(parent_id) = &category.parent_id {
            start.push_attribute(("parentId", parent_id.as_str()));
        }
        writer.write_event(Event::Start(start))?;
        writer.write_event(Event::Text(BytesText::new(&category.name)))?;
        end(writer, "category")?;
    }
    end(writer, "categories")
}

fn write_offer<W: Write>(writer: &mut Writer<W>, offer: &Offer) -> Result<(), FeedError> {
    let mut start = BytesStart::new("offer");
    start.push_attribute(("id", offer.id.as_str()));
    start.push_attribute(("available", if offer.available() { "true" } else { "false" }));
    writer.write_event(Event::Start(start))?;

    text_element(writer, "name", &offer.name)?;
    text_element(writer, "price", &offer.price_text())?;
    optional_element(writer, "price_old", offer.old_price_text().as_deref())?;
    text_element(writer, "currencyId", &offer.currency_id)?;
    text_element(writer, "stock", &offer.stock.to_string())?;
    optional_element(writer, "description", offer.description.as_deref())?;
    optional_element(writer, "barcode", offer.barcode.as_deref())?;
    optional_element(writer, "categoryId", offer.category_id.as_deref())?;
    optional_element(writer, "color", offer.color.as_deref())?;
    optional_element(writer, "size", offer.size.as_deref())?;

    for param in &offer.params {
        let mut start = BytesStart::new("param");
        start.push_attribute(("name", param.name.as_str()));
        writer.write_event(Event::Start(start))?;
        writer.write_event(Event::Text(BytesText::new(&param.value)))?;
        end(writer, "param")?;
    }

    for picture in &offer.pictures {
        text_element(writer, "picture", picture)?;
    }

    end(writer, "offer")
}

fn text_element<W: Write>(writer: &mut Writer<W>, name: &str, text: &str) -> Result<(), FeedError> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    end(writer, name)
}

fn optional_element<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    text: Option<&str>,
) -> Result<(), FeedError> {
    match text {
        Some(text) if !text.trim().is_empty() => text_element(writer, name, text),
        _ => Ok(()),
    }
}

fn end<W: Write>(writer: &mut Writer<W>, name: &str) -> Result<(), FeedError> {
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

#[cfg(test)]
#[path = "xml_test.rs"]
mod tests;

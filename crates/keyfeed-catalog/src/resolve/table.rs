//! Field-resolution table.
//!
//! Each [`FieldKind`] maps to an ordered list of candidate keys. The first
//! candidate holding a present value wins. Dotted keys (`category.id`)
//! descend into nested objects. Order matters: keys that upstream revisions
//! use for the same concept with different types (`in_stock` is sometimes a
//! boolean) are listed last.

/// A normalized field the resolver knows how to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Id,
    ProductId,
    ParentId,
    Name,
    Description,
    Price,
    OldPrice,
    Stock,
    Sku,
    Barcode,
    Unit,
    Weight,
    Length,
    Width,
    Height,
    CategoryId,
    Color,
    Size,
    Images,
}

impl FieldKind {
    /// Candidate keys in precedence order.
    #[must_use]
    pub fn candidates(self) -> &'static [&'static str] {
        match self {
            FieldKind::Id => &["id", "uuid"],
            FieldKind::ProductId => &["product_id", "product.id"],
            FieldKind::ParentId => &["parent_id", "parent.id"],
            FieldKind::Name => &["name", "title", "product_name", "назва", "название"],
            FieldKind::Description => &[
                "description",
                "description_html",
                "body_html",
                "опис",
                "описание",
            ],
            FieldKind::Price => &[
                "price",
                "selling_price",
                "sale_price",
                "retail_price",
                "ціна",
                "цена",
            ],
            FieldKind::OldPrice => &[
                "old_price",
                "price_old",
                "compare_at_price",
                "regular_price",
                "original_price",
                "стара_ціна",
                "старая_цена",
            ],
            FieldKind::Stock => &[
                "stock",
                "quantity",
                "qty",
                "stock_quantity",
                "available_quantity",
                "залишок",
                "остаток",
                "in_stock",
            ],
            FieldKind::Sku => &["sku", "article", "vendor_code", "артикул"],
            FieldKind::Barcode => &["barcode", "ean", "gtin", "upc", "штрихкод"],
            FieldKind::Unit => &["unit_type", "unit", "measure_unit", "одиниця"],
            FieldKind::Weight => &["weight", "вага", "вес"],
            FieldKind::Length => &["length", "довжина", "длина"],
            FieldKind::Width => &["width", "ширина"],
            FieldKind::Height => &["height", "висота", "высота"],
            FieldKind::CategoryId => &["category_id", "category.id", "categoryId"],
            FieldKind::Color => &["color", "colour", "колір", "цвет"],
            FieldKind::Size => &["size", "розмір", "размер"],
            FieldKind::Images => &[
                "pictures",
                "images",
                "gallery",
                "photos",
                "picture",
                "image",
                "thumbnail_url",
            ],
        }
    }
}

/// Custom-field names that mean "color", matched as lowercase substrings.
pub(crate) const COLOR_SYNONYMS: &[&str] = &[
    "color", "colour", "колір", "цвет", "колор", "kolir", "tsvet", "kolor",
];

/// Custom-field names that mean "size", matched as lowercase substrings.
pub(crate) const SIZE_SYNONYMS: &[&str] = &["size", "розмір", "размер", "rozmir", "razmer"];

/// Keys under which records carry their list of custom fields.
pub(crate) const CUSTOM_FIELD_LISTS: &[&str] =
    &["custom_fields", "properties", "params", "characteristics"];

/// Keys naming a custom field inside one list entry.
pub(crate) const CUSTOM_FIELD_NAME_KEYS: &[&str] = &["name", "title", "label", "key"];

/// Keys holding a custom field's value inside one list entry.
pub(crate) const CUSTOM_FIELD_VALUE_KEYS: &[&str] = &["value", "values"];

/// Keys holding the URL inside an image object.
pub(crate) const IMAGE_URL_KEYS: &[&str] = &["url", "src", "original", "full"];

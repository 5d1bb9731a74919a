use serde::Serialize;
use streaming::MarkerSpec;

/// Currency suffix for property prices.
pub const PRICE_CURRENCY: &str = "€";

/// Text content of a marker popup.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Popup {
    pub title: String,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub property_type: Option<String>,
    pub rooms: Option<u32>,
}

impl Popup {
    /// Label-only popup, as used by `add_marker`.
    pub fn label(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn for_marker(spec: &MarkerSpec) -> Self {
        Self {
            title: spec.label.clone(),
            description: spec.description.clone(),
            price: spec.price,
            property_type: spec.kind.clone(),
            rooms: spec.rooms,
        }
    }

    /// HTML fragment for the map popup. All text is escaped.
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        html.push_str("<div class=\"popup\">");
        html.push_str("<strong>");
        html.push_str(&escape_html(&self.title));
        html.push_str("</strong>");

        if let Some(desc) = self.description.as_deref().filter(|d| !d.is_empty()) {
            html.push_str("<p>");
            html.push_str(&escape_html(desc));
            html.push_str("</p>");
        }

        let facts: Vec<String> = [
            self.property_type.as_deref().map(escape_html),
            self.rooms.map(|r| format!("{r} rooms")),
        ]
        .into_iter()
        .flatten()
        .collect();
        if !facts.is_empty() {
            html.push_str("<p>");
            html.push_str(&facts.join(" · "));
            html.push_str("</p>");
        }

        if let Some(price) = self.price {
            html.push_str("<p class=\"price\">");
            html.push_str(&escape_html(&format_price(price)));
            html.push_str("</p>");
        }

        html.push_str("</div>");
        html
    }
}

/// `250000.0` -> `"250 000 €"`; rounded to whole units.
pub fn format_price(price: f64) -> String {
    let rounded = price.round();
    let digits = format!("{}", rounded.abs() as u64);
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(ch);
    }
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{sign}{grouped} {PRICE_CURRENCY}")
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

use serde::Serialize;

/// Visual style of a marker overlay.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct MarkerStyle {
    /// CSS color of the pin.
    pub color: &'static str,
}

impl MarkerStyle {
    pub const DEFAULT: Self = Self::new("#2563eb");
    pub const HOUSE: Self = Self::new("#16a34a");
    pub const APARTMENT: Self = Self::new("#9333ea");
    pub const PIN: Self = Self::new("#dc2626");

    pub const fn new(color: &'static str) -> Self {
        Self { color }
    }

    /// Style for a property result, keyed by its (French or English) type name.
    pub fn for_property(kind: Option<&str>) -> Self {
        match kind.map(str::to_ascii_lowercase).as_deref() {
            Some("maison" | "house") => Self::HOUSE,
            Some("appartement" | "apartment") => Self::APARTMENT,
            _ => Self::DEFAULT,
        }
    }
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self::DEFAULT
    }
}

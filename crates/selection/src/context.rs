use crate::area::AreaSelection;

/// Why the selection is attached to an outgoing message.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum ContextIntent {
    /// The area is background for whatever the user asked.
    #[default]
    Informational,
    /// The user explicitly asked for an analysis of the area.
    Analyze,
}

impl ContextIntent {
    fn header(self) -> &'static str {
        match self {
            ContextIntent::Informational => "Selected area on the map (context only):",
            ContextIntent::Analyze => "Analyze this area drawn on the map:",
        }
    }

    fn instruction(self) -> &'static str {
        match self {
            ContextIntent::Informational => {
                "Use this area as context if it is relevant to the question. Do not run an area analysis unless asked."
            }
            ContextIntent::Analyze => {
                "Use analyze_drawn_area to analyze this area and identify nearby elements, points of interest, risks and opportunities."
            }
        }
    }
}

/// Structured description of `selection` for the backend agent.
pub fn area_context(selection: &AreaSelection, intent: ContextIntent) -> String {
    let center = selection.center();
    let b = selection.bounds();
    format!(
        "{header}\n\n\
         AREA DATA:\n\
         - Address: {address}\n\
         - Center: [{}, {}] (lat, lng)\n\
         - Area: {area_km2:.4} km²\n\
         - Coordinates: {points} polygon points\n\
         - SW Bounds: [{}, {}]\n\
         - NE Bounds: [{}, {}]\n\n\
         {instruction}",
        center.lat,
        center.lng,
        b.southwest.lat,
        b.southwest.lng,
        b.northeast.lat,
        b.northeast.lng,
        header = intent.header(),
        address = selection.address(),
        area_km2 = selection.area_square_meters() / 1_000_000.0,
        points = selection.point_count(),
        instruction = intent.instruction(),
    )
}

/// The text actually sent for `text`: unchanged without a selection, otherwise
/// followed by the area context block.
pub fn compose_outgoing(
    text: &str,
    selection: Option<&AreaSelection>,
    intent: ContextIntent,
) -> String {
    match selection {
        None => text.to_string(),
        Some(sel) => format!("{text}\n\n{}", area_context(sel, intent)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foundation::{LngLat, Ring};
    use pretty_assertions::assert_eq;

    fn selection() -> AreaSelection {
        let ring = Ring::new(vec![
            LngLat::new(2.0, 48.0),
            LngLat::new(2.0, 49.0),
            LngLat::new(3.0, 49.0),
            LngLat::new(3.0, 48.0),
        ])
        .unwrap();
        AreaSelection::new(ring, "Somewhere, France")
    }

    #[test]
    fn analyze_block_lists_area_data() {
        let block = area_context(&selection(), ContextIntent::Analyze);
        let lines: Vec<&str> = block.lines().collect();
        assert_eq!(lines[0], "Analyze this area drawn on the map:");
        assert_eq!(lines[2], "AREA DATA:");
        assert_eq!(lines[3], "- Address: Somewhere, France");
        assert_eq!(lines[4], "- Center: [48.5, 2.5] (lat, lng)");
        assert!(lines[5].starts_with("- Area: ") && lines[5].ends_with(" km²"));
        assert_eq!(lines[6], "- Coordinates: 4 polygon points");
        assert_eq!(lines[7], "- SW Bounds: [48, 2]");
        assert_eq!(lines[8], "- NE Bounds: [49, 3]");
        assert!(lines[10].starts_with("Use analyze_drawn_area"));
    }

    #[test]
    fn informational_block_differs_only_in_framing() {
        let info = area_context(&selection(), ContextIntent::Informational);
        let analyze = area_context(&selection(), ContextIntent::Analyze);
        assert_ne!(info, analyze);
        assert!(info.starts_with("Selected area on the map (context only):"));
        assert!(info.contains("Do not run an area analysis unless asked."));

        let data = |s: &str| -> Vec<String> {
            s.lines()
                .filter(|l| l.starts_with("- "))
                .map(str::to_string)
                .collect()
        };
        assert_eq!(data(&info), data(&analyze));
    }

    #[test]
    fn outgoing_text_is_untouched_without_selection() {
        assert_eq!(
            compose_outgoing("hello", None, ContextIntent::Analyze),
            "hello"
        );

        let sel = selection();
        let out = compose_outgoing("hello", Some(&sel), ContextIntent::Informational);
        assert!(out.starts_with("hello\n\nSelected area on the map"));
    }
}

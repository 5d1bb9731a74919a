use std::rc::Rc;

use crate::area::AreaSelection;

/// Identifies one draw gesture in flight between completion and geocoding.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DrawId(u64);

/// The page's single live area selection.
///
/// Geocoding makes completion asynchronous, so draws are ordered:
/// - [`CurrentSelection::begin_draw`] hands out a [`DrawId`];
/// - only the most recently begun draw may [`commit`](CurrentSelection::commit);
/// - [`clear`](CurrentSelection::clear) also invalidates any draw in flight.
#[derive(Debug, Default)]
pub struct CurrentSelection {
    current: Option<Rc<AreaSelection>>,
    latest_draw: u64,
}

impl CurrentSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<Rc<AreaSelection>> {
        self.current.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_none()
    }

    pub fn begin_draw(&mut self) -> DrawId {
        self.latest_draw += 1;
        DrawId(self.latest_draw)
    }

    /// Replaces the current selection if `draw` is still the latest one.
    ///
    /// Returns the shared handle on success, `None` if the draw was superseded.
    pub fn commit(&mut self, draw: DrawId, selection: AreaSelection) -> Option<Rc<AreaSelection>> {
        if draw.0 != self.latest_draw {
            tracing::debug!(draw = draw.0, latest = self.latest_draw, "dropping superseded selection");
            return None;
        }
        let shared = Rc::new(selection);
        self.current = Some(Rc::clone(&shared));
        Some(shared)
    }

    /// Drops the current selection and any draw still resolving.
    ///
    /// Returns `true` if a selection was present.
    pub fn clear(&mut self) -> bool {
        self.latest_draw += 1;
        self.current.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::CurrentSelection;
    use crate::area::AreaSelection;
    use foundation::{LngLat, Ring};

    fn selection(address: &str) -> AreaSelection {
        let ring = Ring::new(vec![
            LngLat::new(0.0, 0.0),
            LngLat::new(1.0, 0.0),
            LngLat::new(1.0, 1.0),
        ])
        .unwrap();
        AreaSelection::new(ring, address)
    }

    #[test]
    fn commit_replaces_previous_selection() {
        let mut cur = CurrentSelection::new();
        let d1 = cur.begin_draw();
        cur.commit(d1, selection("first")).unwrap();
        let d2 = cur.begin_draw();
        cur.commit(d2, selection("second")).unwrap();
        assert_eq!(cur.get().unwrap().address(), "second");
    }

    #[test]
    fn superseded_draw_cannot_commit() {
        let mut cur = CurrentSelection::new();
        let slow = cur.begin_draw();
        let fast = cur.begin_draw();
        cur.commit(fast, selection("fast")).unwrap();
        assert!(cur.commit(slow, selection("slow")).is_none());
        assert_eq!(cur.get().unwrap().address(), "fast");
    }

    #[test]
    fn clear_invalidates_in_flight_draw() {
        let mut cur = CurrentSelection::new();
        let pending = cur.begin_draw();
        assert!(!cur.clear());
        assert!(cur.commit(pending, selection("late")).is_none());
        assert!(cur.is_empty());

        let d = cur.begin_draw();
        cur.commit(d, selection("kept")).unwrap();
        assert!(cur.clear());
        assert!(cur.get().is_none());
    }

    #[test]
    fn handles_share_one_allocation() {
        let mut cur = CurrentSelection::new();
        let d = cur.begin_draw();
        let a = cur.commit(d, selection("x")).unwrap();
        let b = cur.get().unwrap();
        assert!(std::rc::Rc::ptr_eq(&a, &b));
    }
}

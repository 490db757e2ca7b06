use serde::{Deserialize, Serialize};

use super::panel::Panel;
use crate::error::{Error, Result};

/// Canvas width in layout columns. The sheet scrolls vertically, so there is
/// no height limit.
pub const GRID_COLUMNS: u32 = 24;

/// A panel's position and size on the dashboard canvas, in layout units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridRect {
    pub h: u32,
    pub w: u32,
    pub x: u32,
    pub y: u32,
}

impl GridRect {
    pub fn new(h: u32, w: u32, x: u32, y: u32) -> Self {
        Self { h, w, x, y }
    }

    fn check(&self) -> std::result::Result<(), String> {
        if self.w == 0 {
            return Err("width is zero".to_string());
        }
        if self.h == 0 {
            return Err("height is zero".to_string());
        }
        if self.x.checked_add(self.w).map_or(true, |edge| edge > GRID_COLUMNS) {
            return Err(format!(
                "right edge at column {} exceeds the {GRID_COLUMNS}-column canvas",
                self.x.saturating_add(self.w)
            ));
        }
        Ok(())
    }
}

/// Checks every panel's grid rectangle against the canvas.
///
/// Overlap between panels is allowed: stacked and layered arrangements are a
/// layout policy decided by whoever authors the dashboard, not a defect.
pub fn validate(panels: &[Panel]) -> Result<()> {
    for panel in panels {
        if let Err(reason) = panel.grid_pos.check() {
            return Err(Error::InvalidLayout {
                panel: panel.title.clone(),
                reason,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::panel::{PanelBuilder, PanelKind};

    fn panel_with_rect(h: u32, w: u32, x: u32, y: u32) -> Panel {
        let query = crate::dashboard::Query::builder().expr("up").build().unwrap();
        PanelBuilder::new()
            .title("probe")
            .kind(PanelKind::Stat)
            .datasource("${datasource}")
            .target(query)
            .grid_pos(h, w, x, y)
            .build()
            .unwrap()
    }

    #[test]
    fn rects_inside_the_canvas_pass() {
        let cases = vec![(5, 4, 0, 0), (8, 12, 12, 5), (12, 24, 0, 45), (1, 1, 23, 0)];
        for (h, w, x, y) in cases {
            let rect = GridRect::new(h, w, x, y);
            assert!(rect.check().is_ok(), "rect {rect:?} should be valid");
        }
    }

    #[test]
    fn degenerate_and_overflowing_rects_fail() {
        assert!(GridRect::new(0, 4, 0, 0).check().is_err());
        assert!(GridRect::new(4, 0, 0, 0).check().is_err());
        assert!(GridRect::new(4, 30, 0, 0).check().is_err());
        assert!(GridRect::new(4, 12, 13, 0).check().is_err());
        assert!(GridRect::new(4, 1, u32::MAX, 0).check().is_err());
    }

    #[test]
    fn validate_names_the_offending_panel() {
        let panels = vec![panel_with_rect(5, 4, 0, 0)];
        assert!(validate(&panels).is_ok());

        // PanelBuilder rejects bad rects itself, so widen one after the fact
        // to exercise the dashboard-level sweep.
        let mut bad = panel_with_rect(4, 24, 0, 0);
        bad.grid_pos.w = 30;
        let err = validate(&[bad]).unwrap_err();
        match err {
            Error::InvalidLayout { panel, .. } => assert_eq!(panel, "probe"),
            other => panic!("expected InvalidLayout, got {other:?}"),
        }
    }

    #[test]
    fn overlapping_panels_are_permitted() {
        let panels = vec![panel_with_rect(5, 4, 0, 0), panel_with_rect(5, 4, 0, 0)];
        assert!(validate(&panels).is_ok());
    }
}

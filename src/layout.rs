//! Viewport-responsive layout
//!
//! Recomputed on every terminal resize. Only presentation depends on it:
//! the result-count preference, grid columns, spacing and header size.

use crate::config::AppConfig;

/// Upper bound on grid columns, whatever the width
pub const MAX_COLUMNS: u16 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportClass {
    Narrow,
    Wide,
}

/// Layout derived from the current terminal width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub width: u16,
    pub class: ViewportClass,
    /// Result-count preference sent as `top_k`
    pub top_k: u32,
    pub columns: u16,
    /// Blank columns between cards
    pub gap: u16,
    /// Whether cards show the description line
    pub show_description: bool,
    /// Header height in rows (banner vs. single line)
    pub header_height: u16,
}

/// Thresholds the layout is derived from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutRules {
    pub narrow_width: u16,
    pub card_min_width: u16,
    pub top_k_wide: u32,
    pub top_k_narrow: u32,
}

impl Default for LayoutRules {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for LayoutRules {
    fn from(config: &AppConfig) -> Self {
        Self {
            narrow_width: config.narrow_width,
            card_min_width: config.card_min_width.max(1),
            top_k_wide: config.top_k_wide,
            top_k_narrow: config.top_k_narrow,
        }
    }
}

impl LayoutRules {
    pub fn compute(&self, width: u16) -> Layout {
        if width < self.narrow_width {
            Layout {
                width,
                class: ViewportClass::Narrow,
                top_k: self.top_k_narrow,
                columns: 1,
                gap: 0,
                show_description: false,
                header_height: 1,
            }
        } else {
            let columns = (width / self.card_min_width).clamp(1, MAX_COLUMNS);
            Layout {
                width,
                class: ViewportClass::Wide,
                top_k: self.top_k_wide,
                columns,
                gap: 1,
                show_description: true,
                header_height: 3,
            }
        }
    }
}

impl Layout {
    pub fn is_narrow(&self) -> bool {
        self.class == ViewportClass::Narrow
    }

    /// Width of one card given the space the grid gets
    pub fn card_width(&self, grid_width: u16) -> u16 {
        let gaps = self.gap * self.columns.saturating_sub(1);
        (grid_width.saturating_sub(gaps) / self.columns.max(1)).max(1)
    }

    /// Height of one card in rows, borders included
    pub fn card_height(&self) -> u16 {
        // title, price/rating, badge, image status (+ description)
        if self.show_description {
            7
        } else {
            6
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrow_terminal_uses_smaller_page() {
        let layout = LayoutRules::default().compute(80);
        assert!(layout.is_narrow());
        assert_eq!(layout.columns, 1);
        assert_eq!(layout.top_k, 6);
        assert!(!layout.show_description);
    }

    #[test]
    fn wide_terminal_fills_columns() {
        let rules = LayoutRules::default();
        assert_eq!(rules.compute(160).columns, 4);
        assert_eq!(rules.compute(160).top_k, 12);
        assert_eq!(rules.compute(110).columns, 3);
        assert_eq!(rules.compute(400).columns, MAX_COLUMNS);
    }

    #[test]
    fn breakpoint_is_exclusive() {
        let rules = LayoutRules::default();
        assert!(rules.compute(99).is_narrow());
        assert!(!rules.compute(100).is_narrow());
    }

    #[test]
    fn card_width_accounts_for_gaps() {
        let layout = LayoutRules::default().compute(160);
        assert_eq!(layout.card_width(160), (160 - 3) / 4);
    }
}

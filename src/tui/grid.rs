/// Selection and scrolling for the product card grid.
///
/// Cards are laid out row-major; `scroll_row` is the first visible grid row.
pub struct GridState {
    pub selected: Option<usize>,
    pub scroll_row: usize,
    pub visible_rows: usize,
    pub columns: usize,
}

impl Default for GridState {
    fn default() -> Self {
        Self {
            selected: None,
            scroll_row: 0,
            visible_rows: 3,
            columns: 1,
        }
    }
}

impl GridState {
    /// Forget the old selection when a new result set arrives
    pub fn reset(&mut self, total: usize) {
        self.selected = if total == 0 { None } else { Some(0) };
        self.scroll_row = 0;
    }

    /// Adopt a new column count, keeping the selected card visible
    pub fn set_columns(&mut self, columns: usize) {
        self.columns = columns.max(1);
        if let Some(i) = self.selected {
            self.ensure_visible(i);
        }
    }

    pub fn select_next(&mut self, total: usize) {
        self.move_by(total, 1);
    }

    pub fn select_prev(&mut self, total: usize) {
        self.move_by(total, -1);
    }

    pub fn select_down(&mut self, total: usize) {
        self.move_by(total, self.columns as isize);
    }

    pub fn select_up(&mut self, total: usize) {
        self.move_by(total, -(self.columns as isize));
    }

    pub fn page_down(&mut self, total: usize) {
        let jump = self.visible_rows.max(1) * self.columns;
        self.move_by(total, jump as isize);
    }

    pub fn page_up(&mut self, total: usize) {
        let jump = self.visible_rows.max(1) * self.columns;
        self.move_by(total, -(jump as isize));
    }

    pub fn select_first(&mut self, total: usize) {
        if total == 0 {
            return;
        }
        self.selected = Some(0);
        self.scroll_row = 0;
    }

    pub fn select_last(&mut self, total: usize) {
        if total == 0 {
            return;
        }
        self.selected = Some(total - 1);
        self.ensure_visible(total - 1);
    }

    /// Whether the selection sits on the first grid row
    pub fn on_first_row(&self) -> bool {
        self.selected.map_or(true, |i| i < self.columns)
    }

    fn move_by(&mut self, total: usize, delta: isize) {
        if total == 0 {
            self.selected = None;
            return;
        }
        let current = self.selected.unwrap_or(0) as isize;
        let next = (current + delta).clamp(0, total as isize - 1) as usize;
        self.selected = Some(next);
        self.ensure_visible(next);
    }

    fn ensure_visible(&mut self, index: usize) {
        let row = index / self.columns.max(1);
        if row < self.scroll_row {
            self.scroll_row = row;
        } else if self.visible_rows > 0 && row >= self.scroll_row + self.visible_rows {
            self.scroll_row = row + 1 - self.visible_rows;
        }
    }
}

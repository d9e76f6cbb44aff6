//! Components compiled from `templates/` by the build script, and the
//! hand-written halves they call into: handler methods and controller
//! implementations.

pub mod ui {
    include!(concat!(env!("OUT_DIR"), "/ui/mod.rs"));
}

use ui::*;

impl Hello {
    fn on_click(&mut self) {
        self.clicks += 1;
        log::debug!("hello clicked {} time(s)", self.clicks);
    }
}

impl Toggle {
    /// Prevents the default action on every other click.
    fn flip(&mut self) -> bool {
        self.flips += 1;
        self.flips % 2 == 1
    }
}

impl TodoItemController for TodoList {
    fn removed(&mut self, label: String) {
        self.removed_labels.push(label);
    }
}

impl Search {
    fn search(&mut self, query: String, size: String) {
        self.submitted.push(format!("{} {}", query, size));
    }

    fn pressed(&mut self, key: String) {
        self.keys.push(key);
    }
}

use std::collections::HashMap;

use crate::catalog::model::{display_label, ChildEntry};
use crate::catalog::Step;
use crate::config::PortalConfig;

/// Display labels for selected keys, learned from configuration presets and from every listing
/// the navigator applies.
#[derive(Debug, Clone)]
pub struct LabelBook {
    home: String,
    labels: HashMap<(Step, String), String>,
}

impl LabelBook {
    pub fn new<S: Into<String>>(home: S) -> Self {
        Self { home: home.into(), labels: HashMap::new() }
    }

    pub fn from_config(config: &PortalConfig) -> Self {
        let mut book = Self::new(config.home_label.clone());
        for class in &config.classes {
            book.insert(Step::Class, &class.class_id, &class.name);
        }
        for tt in &config.test_types {
            book.insert(Step::TestType, &tt.type_id, &tt.name);
        }
        book
    }

    pub fn home(&self) -> &str { &self.home }

    pub fn insert(&mut self, step: Step, id: &str, label: &str) {
        self.labels.insert((step, id.to_string()), label.to_string());
    }

    /// Remember the labels of a listing whose children stand for `step`.
    pub fn learn(&mut self, step: Step, entries: &[ChildEntry]) {
        for e in entries {
            self.insert(step, &e.id, &e.label);
        }
    }

    /// Known label, else the id with its first letter upper-cased.
    pub fn label(&self, step: Step, id: &str) -> String {
        self.labels
            .get(&(step, id.to_string()))
            .cloned()
            .unwrap_or_else(|| display_label(id))
    }
}

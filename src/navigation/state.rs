use serde::{Deserialize, Serialize};

use super::labels::LabelBook;
use crate::catalog::{Depth, Selections, Step};

/// Read-only snapshot of where the navigator is. The breadcrumb is recomputed from the
/// selections on every snapshot and never edited on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationState {
    pub depth: Depth,
    pub selections: Selections,
    pub breadcrumb: Vec<String>,
}

impl NavigationState {
    pub fn project(selections: &Selections, labels: &LabelBook) -> Self {
        Self {
            depth: selections.depth(),
            selections: selections.clone(),
            breadcrumb: breadcrumb(selections, labels),
        }
    }
}

/// `[home, class, subject, type, chapter]`, as deep as the selections go. The coaching is
/// represented by the home label.
pub fn breadcrumb(selections: &Selections, labels: &LabelBook) -> Vec<String> {
    let mut trail = vec![labels.home().to_string()];
    for (step, key) in Step::ALL.iter().zip(selections.path()).skip(1) {
        trail.push(labels.label(*step, key));
    }
    trail
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PortalConfig;

    #[test]
    fn breadcrumb_projects_selections() {
        let labels = LabelBook::from_config(&PortalConfig::default());
        let root = Selections::root();
        assert_eq!(breadcrumb(&root, &labels), vec!["Home"]);

        let s = root
            .select(Step::Coaching, "demo").unwrap()
            .select(Step::Class, "class-9").unwrap()
            .select(Step::Subject, "mathematics").unwrap();
        let state = NavigationState::project(&s, &labels);
        assert_eq!(state.depth, Depth::Types);
        assert_eq!(state.breadcrumb, vec!["Home", "Class IX", "Mathematics"]);
    }
}

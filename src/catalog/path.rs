use serde::{Deserialize, Serialize};

/// How deep into the taxonomy a view is; also names the kind of children that view lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Depth {
    /// Choosing a coaching.
    Root,
    Classes,
    Subjects,
    Types,
    Chapters,
    Pdfs,
}

impl Depth {
    pub fn as_str(&self) -> &'static str {
        match self {
            Depth::Root => "root",
            Depth::Classes => "classes",
            Depth::Subjects => "subjects",
            Depth::Types => "types",
            Depth::Chapters => "chapters",
            Depth::Pdfs => "pdfs",
        }
    }

    /// The selection a child listed at this depth stands for. PDFs are leaves.
    pub fn step(&self) -> Option<Step> {
        match self {
            Depth::Root => Some(Step::Coaching),
            Depth::Classes => Some(Step::Class),
            Depth::Subjects => Some(Step::Subject),
            Depth::Types => Some(Step::TestType),
            Depth::Chapters => Some(Step::Chapter),
            Depth::Pdfs => None,
        }
    }

    fn from_len(len: usize) -> Depth {
        match len {
            0 => Depth::Root,
            1 => Depth::Classes,
            2 => Depth::Subjects,
            3 => Depth::Types,
            4 => Depth::Chapters,
            _ => Depth::Pdfs,
        }
    }
}

/// One labelled edge of the taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Coaching,
    Class,
    Subject,
    TestType,
    Chapter,
}

impl Step {
    pub const ALL: [Step; 5] = [Step::Coaching, Step::Class, Step::Subject, Step::TestType, Step::Chapter];

    pub fn index(&self) -> usize {
        match self {
            Step::Coaching => 0,
            Step::Class => 1,
            Step::Subject => 2,
            Step::TestType => 3,
            Step::Chapter => 4,
        }
    }
}

/// Selected keys from the coaching downwards.
///
/// Stored as a path so a key can only be present when every key above it is. Deserialization
/// rejects payloads with gaps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawSelections", into = "RawSelections")]
pub struct Selections {
    path: Vec<String>,
}

impl Selections {
    pub fn root() -> Self { Self::default() }

    pub fn depth(&self) -> Depth { Depth::from_len(self.path.len()) }

    pub fn path(&self) -> &[String] { &self.path }

    pub fn get(&self, step: Step) -> Option<&str> { self.path.get(step.index()).map(String::as_str) }

    pub fn coaching(&self) -> Option<&str> { self.get(Step::Coaching) }
    pub fn class_id(&self) -> Option<&str> { self.get(Step::Class) }
    pub fn subject_id(&self) -> Option<&str> { self.get(Step::Subject) }
    pub fn type_id(&self) -> Option<&str> { self.get(Step::TestType) }
    pub fn chapter_key(&self) -> Option<&str> { self.get(Step::Chapter) }

    /// Selections after choosing `key` for `step`, dropping anything deeper.
    /// `None` when a parent of `step` is not selected yet or the key is blank.
    pub fn select(&self, step: Step, key: &str) -> Option<Selections> {
        let key = key.trim();
        if key.is_empty() || self.path.len() < step.index() {
            return None;
        }
        let mut path: Vec<String> = self.path[..step.index()].to_vec();
        path.push(key.to_string());
        Some(Selections { path })
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSelections {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    coaching: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    class_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    subject_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    type_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    chapter_key: Option<String>,
}

impl TryFrom<RawSelections> for Selections {
    type Error = String;

    fn try_from(r: RawSelections) -> Result<Self, Self::Error> {
        let slots = [r.coaching, r.class_id, r.subject_id, r.type_id, r.chapter_key];
        let mut path = Vec::new();
        let mut ended = false;
        for (i, slot) in slots.into_iter().enumerate() {
            match slot {
                Some(_) if ended => return Err(format!("{:?} selected without its parent", Step::ALL[i])),
                Some(k) if k.trim().is_empty() => return Err("blank selection key".to_string()),
                Some(k) => path.push(k),
                None => ended = true,
            }
        }
        Ok(Selections { path })
    }
}

impl From<Selections> for RawSelections {
    fn from(s: Selections) -> Self {
        let mut it = s.path.into_iter();
        RawSelections {
            coaching: it.next(),
            class_id: it.next(),
            subject_id: it.next(),
            type_id: it.next(),
            chapter_key: it.next(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_requires_parents_and_truncates() {
        let root = Selections::root();
        assert_eq!(root.depth(), Depth::Root);
        assert!(root.select(Step::Class, "class-9").is_none());

        let s = root
            .select(Step::Coaching, "demo").unwrap()
            .select(Step::Class, "class-9").unwrap()
            .select(Step::Subject, "mathematics").unwrap();
        assert_eq!(s.depth(), Depth::Types);
        assert_eq!(s.subject_id(), Some("mathematics"));
        assert!(s.select(Step::Chapter, "c1").is_none());

        // choosing a shallower step drops deeper keys
        let jumped = s.select(Step::Class, "class-10").unwrap();
        assert_eq!(jumped.depth(), Depth::Subjects);
        assert_eq!(jumped.subject_id(), None);
        assert!(s.select(Step::Subject, "  ").is_none());
    }

    #[test]
    fn serde_rejects_gaps() {
        let s = Selections::root().select(Step::Coaching, "demo").unwrap().select(Step::Class, "class-9").unwrap();
        let v = serde_json::to_value(&s).unwrap();
        assert_eq!(v, serde_json::json!({"coaching": "demo", "classId": "class-9"}));
        assert_eq!(serde_json::from_value::<Selections>(v).unwrap(), s);

        let gap = serde_json::json!({"coaching": "demo", "subjectId": "physics"});
        assert!(serde_json::from_value::<Selections>(gap).is_err());
        let empty: Selections = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(empty.depth(), Depth::Root);
    }

    #[test]
    fn depth_steps() {
        assert_eq!(Depth::Root.step(), Some(Step::Coaching));
        assert_eq!(Depth::Types.step(), Some(Step::TestType));
        assert_eq!(Depth::Pdfs.step(), None);
    }
}

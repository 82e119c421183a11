use std::collections::BTreeSet;

use flatjl_schema::Namespace;

/// Separator used to flatten a namespace into one Julia identifier.
pub const IMPORT_NAME_SEPARATOR: &str = "__";

/// One foreign namespace referenced by generated code.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Import {
    /// `A__B__C`, usable as a module qualifier.
    pub name: String,
    /// `A/B/C`, where the module's files live.
    pub path: String,
}

impl Import {
    pub fn render(&self) -> String {
        format!("import ..{}  # {}", self.name, self.path)
    }
}

pub fn import_name(ns: &Namespace) -> String {
    ns.components.join(IMPORT_NAME_SEPARATOR)
}

pub fn import_path(ns: &Namespace) -> String {
    ns.components.join("/")
}

/// Foreign namespaces referenced while emitting a single entity.
///
/// A tracker is created for each entity and consumed when that entity's code
/// is finished, so nothing carries over to the next one.
#[derive(Debug, Default)]
pub struct ImportTracker {
    tracked: BTreeSet<Namespace>,
}

impl ImportTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track(&mut self, ns: &Namespace) {
        if !self.tracked.contains(ns) {
            self.tracked.insert(ns.clone());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tracked.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tracked.len()
    }

    /// Imports in namespace order.
    pub fn render(&self) -> Vec<Import> {
        self.tracked
            .iter()
            .map(|ns| Import {
                name: import_name(ns),
                path: import_path(ns),
            })
            .collect()
    }

    pub fn into_imports(self) -> Vec<Import> {
        self.render()
    }
}

/// Qualifies `name` with its namespace's import name when it is defined outside
/// `current`, recording the dependency.
pub fn wrap_in_namespace_and_track(
    tracker: &mut ImportTracker,
    current: &Namespace,
    defined_in: &Namespace,
    name: &str,
) -> String {
    if current == defined_in {
        return name.to_string();
    }
    tracker.track(defined_in);
    format!("{}.{}", import_name(defined_in), name)
}

#[test]
fn tracking_is_idempotent() {
    let mut tracker = ImportTracker::new();
    let ns = Namespace::from_dotted("MyGame.Sample");
    tracker.track(&ns);
    tracker.track(&ns);
    assert_eq!(tracker.len(), 1);
    assert_eq!(
        tracker.render(),
        vec![Import {
            name: "MyGame__Sample".into(),
            path: "MyGame/Sample".into(),
        }]
    );
}

#[test]
fn imports_render_in_namespace_order() {
    let mut tracker = ImportTracker::new();
    tracker.track(&Namespace::from_dotted("B"));
    tracker.track(&Namespace::from_dotted("A.Z"));
    tracker.track(&Namespace::from_dotted("A"));
    let names: Vec<_> = tracker.render().into_iter().map(|i| i.name).collect();
    assert_eq!(names, vec!["A", "A__Z", "B"]);
}

#[test]
fn local_names_are_not_qualified() {
    let mut tracker = ImportTracker::new();
    let here = Namespace::from_dotted("Game");
    let there = Namespace::from_dotted("Game.Items");
    assert_eq!(wrap_in_namespace_and_track(&mut tracker, &here, &here, "Monster"), "Monster");
    assert!(tracker.is_empty());
    assert_eq!(
        wrap_in_namespace_and_track(&mut tracker, &here, &there, "Sword"),
        "Game__Items.Sword"
    );
    assert_eq!(tracker.render()[0].render(), "import ..Game__Items  # Game/Items");
}

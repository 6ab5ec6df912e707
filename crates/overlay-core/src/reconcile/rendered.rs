use std::collections::HashMap;

use serde::Serialize;

use super::partition;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    Checkbox,
    Date,
    Text,
}

/// The parts of a control that are refreshed on every pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ControlState {
    pub active: bool,
    pub checked: bool,
    pub disabled: bool,
    /// Label drawn muted
    pub deemphasized: bool,
    pub tooltip: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Secondary buttons (zoom to data) unavailable
    pub actions_disabled: bool,
}

/// One materialized list entry.
///
/// `classes`, `label` and `input` are fixed when the entry is created. Only
/// `state` changes afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlItem {
    pub key: String,
    pub classes: Vec<String>,
    pub label: String,
    pub input: InputKind,
    pub state: ControlState,
}

impl ControlItem {
    pub fn new(key: impl Into<String>, label: impl Into<String>, input: InputKind) -> Self {
        Self {
            key: key.into(),
            classes: Vec::new(),
            label: label.into(),
            input,
            state: ControlState::default(),
        }
    }

    pub fn with_classes<I, S>(mut self, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.classes = classes.into_iter().map(Into::into).collect();
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

/// A change to a materialized list, in the order it has to be applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Patch {
    Remove { key: String },
    Create { item: ControlItem },
    Update { key: String, state: ControlState },
}

impl Patch {
    pub fn key(&self) -> &str {
        match self {
            Patch::Remove { key } | Patch::Update { key, .. } => key,
            Patch::Create { item } => &item.key,
        }
    }
}

/// How one section turns its data into controls.
pub trait SectionRules<T> {
    /// Identity of a datum across passes.
    fn key(&self, datum: &T) -> String;

    /// Build the fixed part of a new control. Its state is filled in by
    /// [`SectionRules::update`].
    fn enter(&self, datum: &T) -> ControlItem;

    fn update(&self, datum: &T) -> ControlState;
}

/// A keyed list of controls kept in step with its data.
#[derive(Debug, Default)]
pub struct RenderedList {
    items: Vec<ControlItem>,
}

impl RenderedList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[ControlItem] {
        &self.items
    }

    pub fn keys(&self) -> Vec<String> {
        self.items.iter().map(|item| item.key.clone()).collect()
    }

    pub fn get(&self, key: &str) -> Option<&ControlItem> {
        self.items.iter().find(|item| item.key == key)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Bring the list in line with `data` and return what changed.
    ///
    /// Removals come first, then creations, then state updates for entries
    /// that survived. A surviving entry whose state is unchanged produces no
    /// patch. Afterwards the list is in data order.
    pub fn reconcile<T, R>(&mut self, data: Vec<T>, rules: &R) -> Vec<Patch>
    where
        R: SectionRules<T> + ?Sized,
    {
        let order: Vec<String> = data.iter().map(|datum| rules.key(datum)).collect();
        let split = partition(&self.keys(), data, |datum| rules.key(datum));
        let mut patches = Vec::with_capacity(split.exit.len() + split.enter.len());

        let mut by_key: HashMap<String, ControlItem> = self
            .items
            .drain(..)
            .map(|item| (item.key.clone(), item))
            .collect();

        for key in split.exit {
            by_key.remove(&key);
            patches.push(Patch::Remove { key });
        }

        for datum in &split.enter {
            let key = rules.key(datum);
            let mut item = rules.enter(datum);
            item.key = key.clone();
            item.state = rules.update(datum);
            patches.push(Patch::Create { item: item.clone() });
            by_key.insert(key, item);
        }

        for datum in &split.update {
            let key = rules.key(datum);
            let state = rules.update(datum);
            if let Some(item) = by_key.get_mut(&key) {
                if item.state != state {
                    item.state = state.clone();
                    patches.push(Patch::Update { key, state });
                }
            }
        }

        self.items = order.iter().filter_map(|key| by_key.remove(key)).collect();
        patches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::cell::RefCell;
    use std::collections::HashSet;

    /// Rows keyed by name, checked while listed in `active`.
    struct Rows {
        active: RefCell<HashSet<&'static str>>,
    }

    impl Rows {
        fn new() -> Self {
            Self {
                active: RefCell::new(HashSet::new()),
            }
        }
    }

    impl SectionRules<&'static str> for Rows {
        fn key(&self, datum: &&'static str) -> String {
            datum.to_string()
        }

        fn enter(&self, datum: &&'static str) -> ControlItem {
            ControlItem::new(*datum, format!("{datum}.title"), InputKind::Checkbox)
                .with_classes(["row", *datum])
        }

        fn update(&self, datum: &&'static str) -> ControlState {
            let active = self.active.borrow().contains(datum);
            ControlState {
                active,
                checked: active,
                ..Default::default()
            }
        }
    }

    fn ops(patches: &[Patch]) -> Vec<(&'static str, String)> {
        patches
            .iter()
            .map(|p| {
                let op = match p {
                    Patch::Remove { .. } => "remove",
                    Patch::Create { .. } => "create",
                    Patch::Update { .. } => "update",
                };
                (op, p.key().to_string())
            })
            .collect()
    }

    #[test]
    fn test_first_pass_creates_everything() {
        let rules = Rows::new();
        rules.active.borrow_mut().insert("b");
        let mut list = RenderedList::new();

        let patches = list.reconcile(vec!["a", "b"], &rules);
        assert_eq!(
            ops(&patches),
            vec![("create", "a".to_string()), ("create", "b".to_string())]
        );

        let b = list.get("b").unwrap();
        assert!(b.state.checked);
        assert_eq!(b.label, "b.title");
        assert!(b.has_class("row"));
    }

    #[test]
    fn test_unchanged_pass_is_silent() {
        let rules = Rows::new();
        let mut list = RenderedList::new();
        list.reconcile(vec!["a", "b"], &rules);
        assert!(list.reconcile(vec!["a", "b"], &rules).is_empty());
    }

    #[test]
    fn test_state_change_produces_update() {
        let rules = Rows::new();
        let mut list = RenderedList::new();
        list.reconcile(vec!["a", "b"], &rules);

        rules.active.borrow_mut().insert("a");
        let patches = list.reconcile(vec!["a", "b"], &rules);
        assert_eq!(ops(&patches), vec![("update", "a".to_string())]);
        assert!(list.get("a").unwrap().state.active);
    }

    #[test]
    fn test_removals_come_before_creations() {
        let rules = Rows::new();
        let mut list = RenderedList::new();
        list.reconcile(vec!["a", "b", "c"], &rules);

        rules.active.borrow_mut().insert("b");
        let patches = list.reconcile(vec!["d", "b"], &rules);
        assert_eq!(
            ops(&patches),
            vec![
                ("remove", "a".to_string()),
                ("remove", "c".to_string()),
                ("create", "d".to_string()),
                ("update", "b".to_string()),
            ]
        );
        assert_eq!(list.keys(), vec!["d", "b"]);
    }

    #[test]
    fn test_fixed_parts_survive_updates() {
        let rules = Rows::new();
        let mut list = RenderedList::new();
        list.reconcile(vec!["a"], &rules);
        rules.active.borrow_mut().insert("a");
        list.reconcile(vec!["a"], &rules);

        let item = list.get("a").unwrap();
        assert_eq!(item.classes, vec!["row", "a"]);
        assert_eq!(item.input, InputKind::Checkbox);
    }

    #[test]
    fn test_empty_data_clears_list() {
        let rules = Rows::new();
        let mut list = RenderedList::new();
        list.reconcile(vec!["a", "b"], &rules);

        let patches = list.reconcile(Vec::new(), &rules);
        assert_eq!(ops(&patches), vec![("remove", "a".to_string()), ("remove", "b".to_string())]);
        assert!(list.is_empty());
    }

    /// Owned-string rows for generated data.
    struct Named;

    impl SectionRules<String> for Named {
        fn key(&self, datum: &String) -> String {
            datum.clone()
        }

        fn enter(&self, datum: &String) -> ControlItem {
            ControlItem::new(datum.as_str(), datum.as_str(), InputKind::Checkbox)
        }

        fn update(&self, _datum: &String) -> ControlState {
            ControlState::default()
        }
    }

    proptest! {
        #[test]
        fn test_reconcile_leaves_keys_in_data_order(
            passes in prop::collection::vec(prop::collection::vec("[a-f]", 0..10), 1..5),
        ) {
            let mut list = RenderedList::new();
            for data in passes {
                let mut seen = HashSet::new();
                let expected: Vec<String> =
                    data.iter().filter(|key| seen.insert(key.as_str())).cloned().collect();

                let before: HashSet<String> = list.keys().into_iter().collect();
                let patches = list.reconcile(data.clone(), &Named);
                prop_assert_eq!(list.keys(), expected.clone());

                let created: Vec<&str> = patches
                    .iter()
                    .filter(|p| matches!(p, Patch::Create { .. }))
                    .map(Patch::key)
                    .collect();
                let fresh: Vec<&str> = expected
                    .iter()
                    .map(String::as_str)
                    .filter(|key| !before.contains(*key))
                    .collect();
                prop_assert_eq!(created, fresh);
            }
        }
    }

    #[test]
    fn test_patch_serializes_with_op_tag() {
        let patch = Patch::Update {
            key: "mapillary".into(),
            state: ControlState {
                checked: true,
                ..Default::default()
            },
        };
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json["op"], "update");
        assert_eq!(json["key"], "mapillary");
        assert_eq!(json["state"]["checked"], true);
        assert!(json["state"].get("value").is_none());
    }
}

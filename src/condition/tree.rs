//! Copy-on-write transforms over a condition tree.
//!
//! Every search is depth-first pre-order with children in stored order, and
//! the first match wins. An id that is not in the tree is never an error:
//! the transforms hand back an equal tree and the lookups return nothing.

use super::{Condition, ConditionPatch, ExitCondition};

/// Appends `new_condition` to the children of the node with `target_id`.
pub fn insert(root: &Condition, target_id: &str, new_condition: Condition) -> Condition {
    rewrite_first(root, target_id, |node| node.conditions.push(new_condition))
}

/// Merges `patch` over the node with `target_id`.
pub fn update(root: &Condition, target_id: &str, patch: &ConditionPatch) -> Condition {
    rewrite_first(root, target_id, |node| patch.apply(node))
}

/// Excises the node with `target_id` and its subtree. Removing the root yields `None`.
pub fn remove(root: &Condition, target_id: &str) -> Option<Condition> {
    if root.id == target_id {
        return None;
    }

    let mut next = root.clone();
    remove_first(&mut next, target_id);
    Some(next)
}

pub fn find<'a>(root: &'a Condition, target_id: &str) -> Option<&'a Condition> {
    if root.id == target_id {
        return Some(root);
    }
    root.conditions
        .iter()
        .find_map(|child| find(child, target_id))
}

pub fn exists(root: &Condition, target_id: &str) -> bool {
    find(root, target_id).is_some()
}

/// Calls `on_found` with the first node whose direct children include
/// `target_id`, then stops. Returns whether a parent was found.
pub fn select_parent(root: &Condition, target_id: &str, on_found: impl FnOnce(&Condition)) -> bool {
    match parent_of(root, target_id) {
        Some(parent) => {
            on_found(parent);
            true
        }
        None => false,
    }
}

pub fn parent_of<'a>(root: &'a Condition, target_id: &str) -> Option<&'a Condition> {
    if root.conditions.iter().any(|child| child.id == target_id) {
        return Some(root);
    }
    root.conditions
        .iter()
        .find_map(|child| parent_of(child, target_id))
}

/// Replaces the exit routes of the node with `target_id`.
pub fn set_exit_conditions(
    root: &Condition,
    target_id: &str,
    exits: Vec<ExitCondition>,
) -> Condition {
    rewrite_first(root, target_id, |node| node.exit_conditions = exits)
}

/// Ids from the root down to `target_id`, inclusive.
pub fn path_to(root: &Condition, target_id: &str) -> Option<Vec<String>> {
    if root.id == target_id {
        return Some(vec![root.id.clone()]);
    }
    root.conditions.iter().find_map(|child| {
        path_to(child, target_id).map(|mut path| {
            path.insert(0, root.id.clone());
            path
        })
    })
}

fn rewrite_first(root: &Condition, target_id: &str, edit: impl FnOnce(&mut Condition)) -> Condition {
    let mut next = root.clone();
    if let Some(node) = find_mut(&mut next, target_id) {
        edit(node);
    }
    next
}

fn find_mut<'a>(node: &'a mut Condition, target_id: &str) -> Option<&'a mut Condition> {
    if node.id == target_id {
        return Some(node);
    }
    for child in &mut node.conditions {
        if let Some(found) = find_mut(child, target_id) {
            return Some(found);
        }
    }
    None
}

fn remove_first(node: &mut Condition, target_id: &str) -> bool {
    for index in 0..node.conditions.len() {
        if node.conditions[index].id == target_id {
            node.conditions.remove(index);
            return true;
        }
        if remove_first(&mut node.conditions[index], target_id) {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::condition::{ConditionKind, Logic, Operator};

    fn sample() -> Condition {
        let root = Condition::default_root("root".into(), "exit-root".into());
        let a = Condition::child_of(&root, "a".into());
        let b = Condition::child_of(&root, "b".into());
        let a1 = Condition::child_of(&a, "a1".into());
        let tree = insert(&root, "root", a);
        let tree = insert(&tree, "root", b);
        insert(&tree, "a", a1)
    }

    #[test]
    fn missing_ids_leave_tree_unchanged() {
        let tree = sample();
        let stray = Condition::child_of(&tree, "stray".into());

        assert_eq!(insert(&tree, "nope", stray), tree);
        assert_eq!(update(&tree, "nope", &ConditionPatch::label("x")), tree);
        assert_eq!(remove(&tree, "nope"), Some(tree.clone()));
        assert_eq!(set_exit_conditions(&tree, "nope", Vec::new()), tree);
        assert!(find(&tree, "nope").is_none());
        assert!(!exists(&tree, "nope"));
    }

    #[test]
    fn insert_then_find_returns_inserted_node() {
        let tree = sample();
        let parent = find(&tree, "a1").unwrap();
        let node = Condition::child_of(parent, "deep".into());

        let next = insert(&tree, "a1", node.clone());
        assert_eq!(find(&next, "deep"), Some(&node));
        assert!(find(&tree, "deep").is_none(), "input tree must not change");
    }

    #[test]
    fn remove_after_insert_round_trips() {
        let tree = sample();
        let node = Condition::child_of(&tree, "extra".into());
        let grown = insert(&tree, "b", node);
        assert_eq!(remove(&grown, "extra"), Some(tree));
    }

    #[test]
    fn remove_prunes_whole_subtree() {
        let tree = sample();
        let pruned = remove(&tree, "a").unwrap();
        assert!(!exists(&pruned, "a"));
        assert!(!exists(&pruned, "a1"));
        assert!(exists(&pruned, "b"));
    }

    #[test]
    fn removing_root_yields_none() {
        assert!(remove(&sample(), "root").is_none());
    }

    #[test]
    fn update_merges_only_given_fields() {
        let tree = sample();
        let patch = ConditionPatch {
            logic: Some(Logic::Or),
            operator: Some(Operator::Greater),
            ..ConditionPatch::default()
        };
        let next = update(&tree, "b", &patch);
        let b = find(&next, "b").unwrap();
        assert_eq!(b.logic, Logic::Or);
        assert_eq!(b.operator, Operator::Greater);
        assert_eq!(b.label, crate::condition::DEFAULT_LABEL);
        assert_eq!(find(&next, "a"), find(&tree, "a"));
    }

    #[test]
    fn update_can_change_kind() {
        let next = update(&sample(), "a1", &ConditionPatch::kind(ConditionKind::Amount));
        assert_eq!(find(&next, "a1").unwrap().kind(), ConditionKind::Amount);
    }

    #[test]
    fn select_parent_finds_direct_parent_once() {
        let tree = sample();
        let mut seen = Vec::new();
        let found = select_parent(&tree, "a1", |parent| seen.push(parent.id.clone()));
        assert!(found);
        assert_eq!(seen, vec!["a".to_owned()]);

        assert!(!select_parent(&tree, "root", |_| panic!("root has no parent")));
    }

    #[test]
    fn duplicate_ids_resolve_to_first_in_preorder() {
        let tree = sample();
        let dup_under_a1 = Condition::child_of(find(&tree, "a1").unwrap(), "dup".into());
        let dup_under_b = Condition::child_of(find(&tree, "b").unwrap(), "dup".into());
        let tree = insert(&tree, "a1", dup_under_a1);
        let tree = insert(&tree, "b", dup_under_b);

        assert_eq!(find(&tree, "dup").unwrap().level, 4);
        assert_eq!(parent_of(&tree, "dup").unwrap().id, "a1");

        let next = update(&tree, "dup", &ConditionPatch::label("first"));
        assert_eq!(find(&next, "a1").unwrap().conditions[0].label, "first");
        assert_eq!(
            find(&next, "b").unwrap().conditions[0].label,
            crate::condition::DEFAULT_LABEL
        );
    }

    #[test]
    fn set_exit_conditions_replaces_target_only() {
        let tree = sample();
        let mut exit = ExitCondition::new("e-9".into(), 2);
        exit.value = Decimal::new(40, 0);
        exit.wallet_id = Some("w-2".into());

        let next = set_exit_conditions(&tree, "a", vec![exit.clone()]);
        assert_eq!(find(&next, "a").unwrap().exit_conditions, vec![exit]);
        assert_eq!(next.exit_conditions, tree.exit_conditions);
    }

    #[test]
    fn path_to_lists_ancestors() {
        let tree = sample();
        assert_eq!(
            path_to(&tree, "a1"),
            Some(vec!["root".to_owned(), "a".to_owned(), "a1".to_owned()])
        );
        assert!(path_to(&tree, "nope").is_none());
    }

    #[test]
    fn nested_levels_increase_by_one() {
        let root = Condition::default_root("l1".into(), "e".into());
        let l2 = Condition::child_of(&root, "l2".into());
        let l3 = Condition::child_of(&l2, "l3".into());
        let l4 = Condition::child_of(&l3, "l4".into());
        let tree = insert(&root, "l1", l2);
        let tree = insert(&tree, "l2", l3);
        let tree = insert(&tree, "l3", l4);

        let levels = ["l1", "l2", "l3", "l4"]
            .iter()
            .map(|id| find(&tree, id).unwrap().level)
            .collect::<Vec<_>>();
        assert_eq!(levels, vec![1, 2, 3, 4]);
        assert_eq!(tree.depth(), 4);
        assert_eq!(tree.count(), 4);
    }

    #[test]
    fn update_keeps_an_operator_the_kind_does_not_list() {
        let root = Condition::default_root("c".into(), "e".into());
        let tree = update(&root, "c", &ConditionPatch::kind(ConditionKind::Expiration));
        assert_eq!(tree.operator, Operator::Equals);

        let tree = update(&tree, "c", &ConditionPatch::operator(Operator::Between));
        assert_eq!(tree.kind(), ConditionKind::Expiration);
        assert_eq!(tree.operator, Operator::Between);
    }
}

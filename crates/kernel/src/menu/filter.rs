//! Recursive filtering of navigation trees against a user context.

use super::condition::ConditionalNavigationItem;
use crate::models::UserContext;

/// How a failing item affects its subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterPolicy {
    /// `true`: a failing item is removed with all its children.
    /// `false`: the failing item is removed, its visible children take its
    /// place among its siblings.
    pub prune_on_parent_failure: bool,
}

impl Default for FilterPolicy {
    fn default() -> Self {
        Self {
            prune_on_parent_failure: true,
        }
    }
}

/// True when the item has no condition or its condition passes.
pub fn can_user_access(item: &ConditionalNavigationItem, context: &UserContext) -> bool {
    item.condition
        .as_ref()
        .is_none_or(|condition| condition.matches(context))
}

/// Filter a tree level by level; each level is stable-sorted by `order`.
pub fn filter_menu_items(
    items: &[ConditionalNavigationItem],
    context: &UserContext,
    policy: FilterPolicy,
) -> Vec<ConditionalNavigationItem> {
    let mut visible = Vec::with_capacity(items.len());

    for item in items {
        let allowed = can_user_access(item, context);

        if !allowed && policy.prune_on_parent_failure {
            continue;
        }

        let children = filter_menu_items(&item.children, context, policy);

        if allowed {
            visible.push(ConditionalNavigationItem {
                children,
                ..item.clone()
            });
        } else {
            visible.extend(children);
        }
    }

    visible.sort_by_key(|item| item.order);
    visible
}

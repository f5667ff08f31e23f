use crate::OptimizerResult;

/// Expressions and logical plans are both rooted trees whose children are
/// of the same family. This trait captures the two structural operations a
/// family has to supply; the traversals are derived from them.
///
/// Rewrite closures return `Ok(None)` to signal "unchanged". Callers keep
/// the original node in that case, so untouched subtrees are never
/// reallocated and the executor can detect convergence cheaply.
pub trait TreeNode: Sized + Clone {
    fn children(&self) -> Vec<&Self>;

    /// Rebuild this node with new children, same arity, all other
    /// attributes intact. Never called for leaves.
    fn with_children(&self, children: Vec<Self>) -> OptimizerResult<Self>;

    /// Pre-order rewrite: apply `func` to self first, then recurse into the
    /// children of the result.
    fn transform_down<F>(&self, func: &mut F) -> OptimizerResult<Option<Self>>
    where
        F: FnMut(&Self) -> OptimizerResult<Option<Self>>,
    {
        let applied = func(self)?;
        let base = applied.as_ref().unwrap_or(self);
        let children = base.children();
        if children.is_empty() {
            return Ok(applied);
        }
        let mut any_child_updated = false;
        let mut new_children = Vec::with_capacity(children.len());
        for child in &children {
            match child.transform_down(func)? {
                Some(updated) => {
                    any_child_updated = true;
                    new_children.push(updated);
                }
                None => new_children.push((*child).clone()),
            }
        }
        if any_child_updated {
            base.with_children(new_children).map(Some)
        } else {
            Ok(applied)
        }
    }

    /// Post-order rewrite: recurse first, then apply `func`.
    fn transform_up<F>(&self, func: &mut F) -> OptimizerResult<Option<Self>>
    where
        F: FnMut(&Self) -> OptimizerResult<Option<Self>>,
    {
        let children = self.children();
        if children.is_empty() {
            return func(self);
        }
        let mut any_child_updated = false;
        let mut new_children = Vec::with_capacity(children.len());
        for child in &children {
            match child.transform_up(func)? {
                Some(updated) => {
                    any_child_updated = true;
                    new_children.push(updated);
                }
                None => new_children.push((*child).clone()),
            }
        }
        if any_child_updated {
            let updated_self = self.with_children(new_children)?;
            match func(&updated_self)? {
                Some(updated_again) => Ok(Some(updated_again)),
                None => Ok(Some(updated_self)),
            }
        } else {
            func(self)
        }
    }

    /// Pre-order fold over the tree, document order.
    fn collect<T, F>(&self, func: &mut F, out: &mut Vec<T>)
    where
        F: FnMut(&Self) -> Option<T>,
    {
        if let Some(item) = func(self) {
            out.push(item);
        }
        for child in self.children() {
            child.collect(func, out);
        }
    }

    /// Whether any node in the tree satisfies the predicate.
    fn any<F>(&self, pred: &mut F) -> bool
    where
        F: FnMut(&Self) -> bool,
    {
        pred(self) || self.children().into_iter().any(|c| c.any(pred))
    }
}

//! Pass 1: record every node's immediate structural parent.

use crate::registry::MetadataRegistry;
use crate::registry::MetaKey;
use crate::registry::MetaValue;
use crate::traverse::traverse;
use crate::traverse::Flow;
use crate::traverse::TraverseCtx;
use crate::traverse::Visit;
use crate::Node;

pub(super) fn run(root: &Node, meta: &mut MetadataRegistry) {
    let mut pass = AttachParents { meta };
    traverse(root, &mut pass);
}

struct AttachParents<'a> {
    meta: &'a mut MetadataRegistry,
}

impl Visit for AttachParents<'_> {
    fn enter(&mut self, node: &Node, ctx: &TraverseCtx<'_>) -> Flow {
        match ctx.ancestors.last() {
            Some(parent) => {
                self.meta
                    .set(node.id(), MetaKey::Parent, MetaValue::Id(parent.id()));
            }
            // The root has no parent; clear any stale entry.
            None => self.meta.remove(node.id(), MetaKey::Parent),
        }
        Flow::Continue
    }
}

//! A generic pre-order walk over one method's operation tree, used by passes that need to visit
//! every operation but don't need the walker's dataflow event semantics. The same lambda/
//! local-function boundary still applies: this never enters a not-yet-analyzed body.

use crate::ir::OperationId;
use crate::method::MethodIr;

pub fn preorder(method: &MethodIr, root: OperationId, visit: &mut impl FnMut(OperationId)) {
    visit(root);
    for child in method.operations.children(root) {
        preorder(method, child, visit);
    }
}

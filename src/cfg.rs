//! The control-flow graph.

use rustc_hash::FxHashMap;

use crate::ir::OperationId;
use crate::symbol::SymbolId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockId(pub(crate) u32);

#[derive(Debug, Clone, Default)]
pub struct BasicBlock {
    pub operations: Vec<OperationId>,
    /// Evaluated after `operations`; its truthiness selects `conditional_successor` vs.
    /// `fallthrough_successor`.
    pub branch_value: Option<OperationId>,
    pub conditional_successor: Option<BlockId>,
    pub fallthrough_successor: Option<BlockId>,
    pub reachable: bool,
}

impl BasicBlock {
    pub fn successors(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.conditional_successor
            .into_iter()
            .chain(self.fallthrough_successor)
    }
}

/// One method body's (or one lambda/local-function body's) control-flow graph.
///
/// Blocks are stored in an arbitrary order; `entry` and `exit` name the `Entry`/`Exit`
/// sentinel blocks, exactly one of each. `nested_cfgs` maps the `FlowAnonymousFunction`
/// operation (or local-function declaring operation) to its own, independently-numbered CFG;
/// [`Cfg::parent`] on a nested graph should be thought of as "the CFG this one was found inside
/// of" and is tracked by the caller (the coordinator), not stored on `Cfg` itself, since a bare
/// struct field would let a nested `Cfg` outlive or be moved independently of its parent.
#[derive(Debug, Clone)]
pub struct Cfg {
    pub blocks: Vec<BasicBlock>,
    pub entry: BlockId,
    pub exit: BlockId,
    pub parameters: Vec<SymbolId>,
    pub nested_cfgs: FxHashMap<OperationId, Cfg>,
}

impl Cfg {
    pub fn block(&self, id: BlockId) -> &BasicBlock {
        &self.blocks[id.0 as usize]
    }

    pub fn predecessors(&self, target: BlockId) -> Vec<BlockId> {
        self.blocks
            .iter()
            .enumerate()
            .filter_map(|(i, b)| {
                b.successors()
                    .any(|s| s == target)
                    .then_some(BlockId(i as u32))
            })
            .collect()
    }

    pub fn block_ids(&self) -> impl Iterator<Item = BlockId> {
        (0..self.blocks.len() as u32).map(BlockId)
    }
}

/// Builder used by tests and by any host that wants to construct a [`Cfg`] by hand rather than
/// lowering from a richer representation.
#[derive(Debug, Default)]
pub struct CfgBuilder {
    blocks: Vec<BasicBlock>,
    parameters: Vec<SymbolId>,
}

impl CfgBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parameters(mut self, parameters: Vec<SymbolId>) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn add_block(&mut self) -> BlockId {
        let id = BlockId(self.blocks.len() as u32);
        self.blocks.push(BasicBlock {
            reachable: true,
            ..Default::default()
        });
        id
    }

    pub fn block_mut(&mut self, id: BlockId) -> &mut BasicBlock {
        &mut self.blocks[id.0 as usize]
    }

    /// `entry` and `exit` must each name a block already added via [`Self::add_block`].
    pub fn build(self, entry: BlockId, exit: BlockId) -> Cfg {
        Cfg {
            blocks: self.blocks,
            entry,
            exit,
            parameters: self.parameters,
            nested_cfgs: FxHashMap::default(),
        }
    }
}

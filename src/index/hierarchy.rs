//! Compact slot index over the state forest.
//!
//! Every configured state gets a one-byte [`Slot`] in encounter order, and
//! each slot records its parent slot. Branch enumeration writes the slots of a
//! state and all its ancestors, leaf to root, into a fixed-capacity
//! [`Branch`] living on the caller's stack.
//!
//! Capacity limits are checked when the index is built: more than
//! [`MAX_STATES`] states, or any branch longer than [`BRANCH_CAPACITY`], is a
//! configuration error. Once built, enumeration can never overflow.

use crate::core::StateId;
use crate::error::{render, HfsmError, Result};
use std::collections::HashMap;

/// Maximum number of states one index can hold.
pub const MAX_STATES: usize = 255;

/// Maximum branch length (a state plus all of its ancestors).
pub const BRANCH_CAPACITY: usize = 32;

/// Numeric position of a state inside a [`HierarchyIndex`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Slot(u8);

impl Slot {
    /// Position as a table index.
    pub fn index(self) -> usize {
        usize::from(self.0)
    }
}

/// Fixed-capacity, stack-allocated list of slots.
#[derive(Clone, Copy)]
pub struct Branch {
    slots: [Slot; BRANCH_CAPACITY],
    len: u8,
}

impl Branch {
    /// Empty branch.
    pub const fn new() -> Self {
        Self {
            slots: [Slot(0); BRANCH_CAPACITY],
            len: 0,
        }
    }

    /// Number of filled slots.
    pub fn len(&self) -> usize {
        usize::from(self.len)
    }

    /// Whether no slot is filled.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Filled slots, in order.
    pub fn as_slice(&self) -> &[Slot] {
        &self.slots[..self.len()]
    }

    /// Iterate the filled slots.
    pub fn iter(&self) -> std::slice::Iter<'_, Slot> {
        self.as_slice().iter()
    }

    /// Drop every slot, keeping the buffer.
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Append a slot. Callers stay within capacity because every branch
    /// length is validated when the index is built.
    pub(crate) fn push(&mut self, slot: Slot) {
        debug_assert!(self.len() < BRANCH_CAPACITY, "branch capacity exceeded");
        self.slots[self.len()] = slot;
        self.len += 1;
    }

    /// Keep only the first `len` slots.
    pub(crate) fn truncate(&mut self, len: usize) {
        if len < self.len() {
            self.len = len as u8;
        }
    }
}

impl PartialEq for Branch {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Eq for Branch {}

impl Default for Branch {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Branch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a> IntoIterator for &'a Branch {
    type Item = &'a Slot;
    type IntoIter = std::slice::Iter<'a, Slot>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Bounds-checked slot table over a state forest.
///
/// # Example
///
/// ```rust
/// use hfsm::index::HierarchyIndex;
///
/// let forest = [("Root", None), ("Idle", Some("Root"))];
/// let index = HierarchyIndex::build(forest.iter().map(|(s, p)| (s, p.as_ref())))?;
/// let idle = index.slot_of(&"Idle").unwrap();
/// let root = index.slot_of(&"Root").unwrap();
///
/// assert_eq!(index.parent_of(idle), Some(root));
/// assert_eq!(index.branch(idle).as_slice(), &[idle, root]);
/// assert!(index.contains(&"Root") && !index.is_empty());
/// # Ok::<(), hfsm::HfsmError>(())
/// ```
#[derive(Clone, Debug)]
pub struct HierarchyIndex<S> {
    slots: HashMap<S, Slot>,
    states: Vec<S>,
    parents: Vec<Option<Slot>>,
    depths: Vec<u8>,
}

impl<S: StateId> HierarchyIndex<S> {
    /// Build the index from `(state, parent)` pairs in declaration order.
    ///
    /// # Errors
    ///
    /// - [`HfsmError::TooManyStates`] when more than [`MAX_STATES`] states are declared
    /// - [`HfsmError::DuplicateState`] when a state is declared twice
    /// - [`HfsmError::UnknownParent`] when a parent is not itself declared
    /// - [`HfsmError::HierarchyTooDeep`] when a branch exceeds [`BRANCH_CAPACITY`]
    ///   (parent cycles end up here too)
    pub fn build<'a, I>(declarations: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a S, Option<&'a S>)>,
    {
        let declarations: Vec<(&S, Option<&S>)> = declarations.into_iter().collect();
        if declarations.len() > MAX_STATES {
            return Err(HfsmError::TooManyStates {
                count: declarations.len(),
                max: MAX_STATES,
            });
        }

        let mut slots = HashMap::with_capacity(declarations.len());
        let mut states = Vec::with_capacity(declarations.len());
        for (position, (state, _)) in declarations.iter().enumerate() {
            if slots.contains_key(*state) {
                return Err(HfsmError::DuplicateState {
                    state: render(*state),
                });
            }
            // position < MAX_STATES <= u8::MAX
            slots.insert((*state).clone(), Slot(position as u8));
            states.push((*state).clone());
        }

        let mut parents = Vec::with_capacity(declarations.len());
        for (state, parent) in &declarations {
            let parent_slot = match parent {
                Some(parent) => Some(*slots.get(*parent).ok_or_else(|| {
                    HfsmError::UnknownParent {
                        state: render(*state),
                        parent: render(*parent),
                    }
                })?),
                None => None,
            };
            parents.push(parent_slot);
        }

        let mut depths = Vec::with_capacity(states.len());
        for (position, state) in states.iter().enumerate() {
            let mut depth = 1usize;
            let mut cursor = parents[position];
            while let Some(parent) = cursor {
                depth += 1;
                if depth > BRANCH_CAPACITY {
                    return Err(HfsmError::HierarchyTooDeep {
                        state: render(state),
                        max: BRANCH_CAPACITY,
                    });
                }
                cursor = parents[parent.index()];
            }
            depths.push(depth as u8);
        }

        Ok(Self {
            slots,
            states,
            parents,
            depths,
        })
    }

    /// Number of indexed states.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether the index holds no state.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Whether `state` was declared.
    pub fn contains(&self, state: &S) -> bool {
        self.slots.contains_key(state)
    }

    /// Slot assigned to `state`, if declared.
    pub fn slot_of(&self, state: &S) -> Option<Slot> {
        self.slots.get(state).copied()
    }

    /// State identifier stored at `slot`.
    ///
    /// # Panics
    ///
    /// Panics if `slot` was not produced by this index.
    pub fn state_at(&self, slot: Slot) -> &S {
        &self.states[slot.index()]
    }

    /// Parent slot, or `None` for a root.
    pub fn parent_of(&self, slot: Slot) -> Option<Slot> {
        self.parents[slot.index()]
    }

    /// Length of the branch starting at `slot` (1 for a root).
    pub fn depth(&self, slot: Slot) -> usize {
        usize::from(self.depths[slot.index()])
    }

    /// Write the branch of `slot`, leaf to root, into `out`.
    pub fn branch_into(&self, slot: Slot, out: &mut Branch) {
        out.clear();
        let mut cursor = Some(slot);
        while let Some(current) = cursor {
            out.push(current);
            cursor = self.parents[current.index()];
        }
    }

    /// Branch of `slot`, leaf to root, in a fresh buffer.
    pub fn branch(&self, slot: Slot) -> Branch {
        let mut branch = Branch::new();
        self.branch_into(slot, &mut branch);
        branch
    }

    /// All slots in encounter order.
    pub fn slots(&self) -> impl Iterator<Item = Slot> + '_ {
        (0..self.states.len()).map(|position| Slot(position as u8))
    }
}

//! Variable names, arena handles and the reference allocator.
//!
//! Boundary keys look like `x3`, `y3`, `l0`, `f1`: a one-letter role prefix and
//! a numeric suffix. Inside the core every key is resolved once to a `VarId`,
//! an index into the linkage's value slots.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use super::error::ModelError;

/// Role prefix of a variable key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    /// Point x coordinate (also the local-frame `xt` of internal hinges).
    X,
    /// Point y coordinate (also the local-frame `yt` of internal hinges).
    Y,
    /// Link length (also the reference anchor distance `l2t`).
    Length,
    /// Rotary phase offset.
    Phase,
}

impl Role {
    #[inline]
    pub fn prefix(self) -> char {
        match self {
            Role::X => 'x',
            Role::Y => 'y',
            Role::Length => 'l',
            Role::Phase => 'f',
        }
    }

    #[inline]
    fn from_prefix(c: char) -> Option<Self> {
        match c {
            'x' => Some(Role::X),
            'y' => Some(Role::Y),
            'l' => Some(Role::Length),
            'f' => Some(Role::Phase),
            _ => None,
        }
    }

    #[inline]
    fn slot(self) -> usize {
        self as usize
    }
}

/// Parsed variable key: role prefix plus instance suffix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarName {
    pub role: Role,
    pub index: u32,
}

impl VarName {
    #[inline]
    pub fn new(role: Role, index: u32) -> Self {
        Self { role, index }
    }
}

impl fmt::Display for VarName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.role.prefix(), self.index)
    }
}

impl FromStr for VarName {
    type Err = ModelError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        let malformed = || ModelError::MalformedRef {
            key: key.to_string(),
        };
        let mut chars = key.chars();
        let role = chars.next().and_then(Role::from_prefix).ok_or_else(malformed)?;
        let digits = chars.as_str();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        let index = digits.parse().map_err(|_| malformed())?;
        Ok(Self { role, index })
    }
}

/// Handle into the value arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub usize);

/// The x/y handle pair of one point. Points are identified by their x handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointRef {
    pub x: VarId,
    pub y: VarId,
}

impl PointRef {
    #[inline]
    pub fn new(x: VarId, y: VarId) -> Self {
        Self { x, y }
    }
}

/// Name ↔ handle table. Slots are never reused; removed names leave a retired slot.
#[derive(Clone, Debug, Default)]
pub struct VarTable {
    names: Vec<Option<VarName>>,
    lookup: HashMap<VarName, VarId>,
}

impl VarTable {
    /// Number of slots, retired ones included.
    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lookup.is_empty()
    }

    #[inline]
    pub fn name(&self, id: VarId) -> Option<VarName> {
        self.names.get(id.0).copied().flatten()
    }

    #[inline]
    pub fn get(&self, name: VarName) -> Option<VarId> {
        self.lookup.get(&name).copied()
    }

    /// Resolve a boundary key to its handle.
    pub fn resolve(&self, key: &str) -> Result<VarId, ModelError> {
        let name: VarName = key.parse()?;
        self.get(name).ok_or_else(|| ModelError::UnknownRef {
            key: key.to_string(),
        })
    }

    /// Handle for `name`, allocating a slot on first use.
    pub fn intern(&mut self, name: VarName) -> VarId {
        if let Some(id) = self.get(name) {
            return id;
        }
        let id = VarId(self.names.len());
        self.names.push(Some(name));
        self.lookup.insert(name, id);
        id
    }

    /// Retire a slot; its name becomes available to the allocator again.
    pub fn retire(&mut self, id: VarId) {
        if let Some(slot) = self.names.get_mut(id.0) {
            if let Some(name) = slot.take() {
                self.lookup.remove(&name);
            }
        }
    }

    /// Live `(handle, name)` pairs in slot order.
    pub fn live(&self) -> impl Iterator<Item = (VarId, VarName)> + '_ {
        self.names
            .iter()
            .enumerate()
            .filter_map(|(i, n)| n.map(|n| (VarId(i), n)))
    }
}

/// Mints unused names per role prefix.
///
/// Must be created with `scan` right before every insertion: counters captured
/// from an older table would hand out names that already exist.
#[derive(Clone, Debug)]
pub struct RefAllocator {
    next: [u32; 4],
}

impl RefAllocator {
    pub fn scan(table: &VarTable) -> Self {
        let mut next = [0u32; 4];
        for (_, name) in table.live() {
            let slot = &mut next[name.role.slot()];
            *slot = (*slot).max(name.index + 1);
        }
        Self { next }
    }

    /// Next unused name for `role` (does not reserve it).
    #[inline]
    pub fn peek(&self, role: Role) -> VarName {
        VarName::new(role, self.next[role.slot()])
    }

    pub fn mint(&mut self, table: &mut VarTable, role: Role) -> VarId {
        let name = self.peek(role);
        self.next[role.slot()] += 1;
        table.intern(name)
    }

    /// Mint an x/y pair sharing one suffix.
    pub fn mint_point(&mut self, table: &mut VarTable) -> PointRef {
        let index = self.next[Role::X.slot()].max(self.next[Role::Y.slot()]);
        self.next[Role::X.slot()] = index + 1;
        self.next[Role::Y.slot()] = index + 1;
        PointRef {
            x: table.intern(VarName::new(Role::X, index)),
            y: table.intern(VarName::new(Role::Y, index)),
        }
    }
}

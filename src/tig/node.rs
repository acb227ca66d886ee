//! `ufNode`: one placed read inside a `Unitig` (`spec.md` §3).

use serde::{Deserialize, Serialize};

use crate::read_info::ReadId;

/// Signed, half-open-by-convention coordinate pair. `bgn < end` means
/// the read is forward-oriented in the unitig's frame; `bgn > end`
/// means reverse. `spec.md` §3 invariant 3 requires both endpoints to
/// fall within `[0, unitig.length]` after every public operation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub bgn: i64,
    pub end: i64,
}

impl Position {
    pub fn new(bgn: i64, end: i64) -> Self {
        Position { bgn, end }
    }

    pub fn min(&self) -> i64 {
        self.bgn.min(self.end)
    }

    pub fn max(&self) -> i64 {
        self.bgn.max(self.end)
    }

    pub fn is_forward(&self) -> bool {
        self.bgn < self.end
    }

    pub fn len(&self) -> i64 {
        (self.end - self.bgn).abs()
    }

    pub fn shifted(&self, delta: i64) -> Position {
        Position::new(self.bgn + delta, self.end + delta)
    }
}

/// A read placed at a coordinate inside some `Unitig`.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UfNode {
    pub ident: ReadId,
    /// Read id of the container, or 0 if this node is not contained.
    pub contained: ReadId,
    /// Read id from which this node's coordinates were derived, or 0.
    pub parent: ReadId,
    pub ahang: i32,
    pub bhang: i32,
    pub position: Position,
    pub containment_depth: u32,
}

impl UfNode {
    pub fn new(ident: ReadId, position: Position) -> Self {
        UfNode {
            ident,
            contained: 0,
            parent: 0,
            ahang: 0,
            bhang: 0,
            position,
            containment_depth: 0,
        }
    }

    pub fn is_contained(&self) -> bool {
        self.contained != 0
    }

    /// Sort key for `spec.md` §3 invariant 5: `(min asc, max desc,
    /// containment_depth asc)`, which places containers before the
    /// reads they contain.
    pub fn sort_key(&self) -> (i64, std::cmp::Reverse<i64>, u32) {
        (
            self.position.min(),
            std::cmp::Reverse(self.position.max()),
            self.containment_depth,
        )
    }
}

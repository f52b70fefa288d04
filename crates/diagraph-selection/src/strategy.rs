//! Set-mutation strategies for `update_selection`.

/// How a set of ids is folded into a bucket's current selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// New set becomes exactly the passed ids (or empty if `select=false`).
    Replace,
    /// Union with the passed ids; no effect for `select=false` on an id that
    /// is not already selected.
    Append,
    /// Difference; passed ids are removed regardless of `select`.
    Subtract,
    /// Symmetric difference; `select=false` only ever removes.
    Toggle,
}

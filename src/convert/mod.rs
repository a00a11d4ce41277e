//! Delegating conversion to an external program.

pub(crate) mod external;

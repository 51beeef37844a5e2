mod aggregate;
mod column_roles;

pub use aggregate::*;
pub use column_roles::*;

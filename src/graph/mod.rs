//! Entity graph: the typed, attributed model the evaluation runs against.
//!
//! Nodes are [`Entity`](crate::entity::Entity) values, edges are
//! [`Association`]s whose ends may each be qualified by a [`Role`].
//!
//! - **Storage and role-aware queries** ([`EntityGraph`]): `petgraph` backed
//! - **Typed queries** (`query`): the relation vocabulary the search core speaks

pub mod index;
pub mod query;

use serde::{Deserialize, Serialize};

use crate::entity::Role;

pub use index::EntityGraph;

/// Edge data: an association between two entities.
///
/// The graph stores each association once, directed from the end it was
/// declared with first; queries look at both directions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Association {
    /// Role qualifying the first (source) end.
    pub role_at_source: Option<Role>,
    /// Role qualifying the second (target) end.
    pub role_at_target: Option<Role>,
}

impl Association {
    /// Association without roles.
    pub fn plain() -> Self {
        Self::default()
    }

    /// Association whose second end plays `role`.
    pub fn to_role(role: Role) -> Self {
        Self {
            role_at_source: None,
            role_at_target: Some(role),
        }
    }

    /// Roles as seen from one end: `(near, far)`.
    fn oriented(&self, from_source: bool) -> (Option<Role>, Option<Role>) {
        if from_source {
            (self.role_at_source, self.role_at_target)
        } else {
            (self.role_at_target, self.role_at_source)
        }
    }
}

/// Role constraint on an association query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleFilter {
    /// Any association, regardless of roles.
    Any,
    /// The related entity's end plays this role.
    Far(Role),
    /// The queried entity's own end plays this role.
    Near(Role),
}

impl RoleFilter {
    fn accepts(self, near: Option<Role>, far: Option<Role>) -> bool {
        match self {
            RoleFilter::Any => true,
            RoleFilter::Far(role) => far == Some(role),
            RoleFilter::Near(role) => near == Some(role),
        }
    }
}

//! Role-scoped expense visibility.

use uuid::Uuid;

use crate::identity::{Actor, Role};

/// The set of expense owners an actor may read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisibilityScope {
    /// Every expense of the company.
    Company(Uuid),
    /// Expenses of the listed owners within the company.
    Owners {
        /// Company the owners belong to.
        company_id: Uuid,
        /// Permitted owners.
        owner_ids: Vec<Uuid>,
    },
}

impl VisibilityScope {
    /// Whether an expense with this company and owner is in scope.
    #[must_use]
    pub fn permits(&self, company_id: Uuid, owner_id: Uuid) -> bool {
        match self {
            Self::Company(c) => *c == company_id,
            Self::Owners {
                company_id: c,
                owner_ids,
            } => *c == company_id && owner_ids.contains(&owner_id),
        }
    }

    /// Company the scope is confined to.
    #[must_use]
    pub fn company_id(&self) -> Uuid {
        match self {
            Self::Company(c) | Self::Owners { company_id: c, .. } => *c,
        }
    }
}

/// Computes visibility scopes.
pub struct VisibilityFilter;

impl VisibilityFilter {
    /// Admin sees the company, a manager sees self plus direct reports, an
    /// employee sees only self. `team_member_ids` is ignored for other roles.
    #[must_use]
    pub fn scope(actor: &Actor, team_member_ids: &[Uuid]) -> VisibilityScope {
        match actor.role {
            Role::Admin => VisibilityScope::Company(actor.company_id),
            Role::Manager => {
                let mut owner_ids = Vec::with_capacity(team_member_ids.len() + 1);
                owner_ids.push(actor.id);
                owner_ids.extend(team_member_ids.iter().copied().filter(|id| *id != actor.id));
                VisibilityScope::Owners {
                    company_id: actor.company_id,
                    owner_ids,
                }
            }
            Role::Employee => VisibilityScope::Owners {
                company_id: actor.company_id,
                owner_ids: vec![actor.id],
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(role: Role, company_id: Uuid) -> Actor {
        Actor {
            id: Uuid::new_v4(),
            company_id,
            role,
            manager_id: None,
        }
    }

    #[test]
    fn test_admin_sees_company() {
        let company = Uuid::new_v4();
        let scope = VisibilityFilter::scope(&actor(Role::Admin, company), &[]);
        assert!(scope.permits(company, Uuid::new_v4()));
        assert!(!scope.permits(Uuid::new_v4(), Uuid::new_v4()));
    }

    #[test]
    fn test_manager_sees_self_and_team() {
        let company = Uuid::new_v4();
        let m = actor(Role::Manager, company);
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let scope = VisibilityFilter::scope(&m, &[a, b]);
        assert!(scope.permits(company, m.id));
        assert!(scope.permits(company, a));
        assert!(scope.permits(company, b));
        assert!(!scope.permits(company, c));
        assert!(!scope.permits(Uuid::new_v4(), a));
    }

    #[test]
    fn test_employee_sees_only_self() {
        let company = Uuid::new_v4();
        let e = actor(Role::Employee, company);
        let other = Uuid::new_v4();
        let scope = VisibilityFilter::scope(&e, &[other]);
        assert!(scope.permits(company, e.id));
        assert!(!scope.permits(company, other));
        assert_eq!(scope.company_id(), company);
    }
}

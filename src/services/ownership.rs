use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::{
    entity::{
        discounts::{self, DiscountScope},
        stans::{self, Entity as Stans},
        students::{self, Entity as Students},
        users::UserRole,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
};

/// The tenant a principal acts for, resolved once per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tenant {
    Platform,
    Stan(Uuid),
    Student(Uuid),
}

/// Who owns a resource for authorization purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceOwner {
    Platform,
    Stan(Uuid),
    Student(Uuid),
    Order { stan_id: Uuid, student_id: Uuid },
}

impl Tenant {
    pub fn stan_id(&self) -> Option<Uuid> {
        match self {
            Tenant::Stan(id) => Some(*id),
            _ => None,
        }
    }

    pub fn is_platform(&self) -> bool {
        matches!(self, Tenant::Platform)
    }

    pub fn can_access(&self, owner: ResourceOwner) -> bool {
        match (self, owner) {
            (Tenant::Platform, _) => true,
            (Tenant::Stan(own), ResourceOwner::Stan(id)) => *own == id,
            (Tenant::Stan(own), ResourceOwner::Order { stan_id, .. }) => *own == stan_id,
            (Tenant::Student(own), ResourceOwner::Student(id)) => *own == id,
            (Tenant::Student(own), ResourceOwner::Order { student_id, .. }) => *own == student_id,
            _ => false,
        }
    }

    pub fn ensure_can_access(&self, owner: ResourceOwner) -> AppResult<()> {
        if self.can_access(owner) {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }
}

impl ResourceOwner {
    pub fn of_discount(discount: &discounts::Model) -> Self {
        match (discount.scope, discount.stan_id) {
            (DiscountScope::Global, _) | (_, None) => ResourceOwner::Platform,
            (_, Some(stan_id)) => ResourceOwner::Stan(stan_id),
        }
    }
}

pub async fn find_own_stan<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
) -> AppResult<Option<stans::Model>> {
    let stan = Stans::find()
        .filter(stans::Column::UserId.eq(user_id))
        .filter(stans::Column::DeletedAt.is_null())
        .one(conn)
        .await?;
    Ok(stan)
}

pub async fn find_own_student<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
) -> AppResult<Option<students::Model>> {
    let student = Students::find()
        .filter(students::Column::UserId.eq(user_id))
        .filter(students::Column::DeletedAt.is_null())
        .one(conn)
        .await?;
    Ok(student)
}

/// Map the principal onto its tenant. A vendor admin or student without a
/// live profile cannot act on tenant-scoped resources.
pub async fn resolve_tenant<C: ConnectionTrait>(conn: &C, user: &AuthUser) -> AppResult<Tenant> {
    match user.role {
        UserRole::Superadmin => Ok(Tenant::Platform),
        UserRole::AdminStan => find_own_stan(conn, user.user_id)
            .await?
            .map(|stan| Tenant::Stan(stan.id))
            .ok_or(AppError::Forbidden),
        UserRole::Siswa => find_own_student(conn, user.user_id)
            .await?
            .map(|student| Tenant::Student(student.id))
            .ok_or(AppError::Forbidden),
    }
}

/// The caller's own stan; only vendor admins have one.
pub async fn require_stan<C: ConnectionTrait>(conn: &C, user: &AuthUser) -> AppResult<stans::Model> {
    if user.role != UserRole::AdminStan {
        return Err(AppError::Forbidden);
    }
    find_own_stan(conn, user.user_id)
        .await?
        .ok_or(AppError::Forbidden)
}

pub async fn require_student<C: ConnectionTrait>(
    conn: &C,
    user: &AuthUser,
) -> AppResult<students::Model> {
    if user.role != UserRole::Siswa {
        return Err(AppError::Forbidden);
    }
    find_own_student(conn, user.user_id)
        .await?
        .ok_or(AppError::Forbidden)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_reaches_everything() {
        let owner = ResourceOwner::Order {
            stan_id: Uuid::new_v4(),
            student_id: Uuid::new_v4(),
        };
        assert!(Tenant::Platform.can_access(owner));
        assert!(Tenant::Platform.can_access(ResourceOwner::Platform));
    }

    #[test]
    fn stan_only_reaches_its_own_resources() {
        let own = Uuid::new_v4();
        let other = Uuid::new_v4();
        let tenant = Tenant::Stan(own);
        assert!(tenant.can_access(ResourceOwner::Stan(own)));
        assert!(!tenant.can_access(ResourceOwner::Stan(other)));
        assert!(!tenant.can_access(ResourceOwner::Platform));
        assert!(tenant.can_access(ResourceOwner::Order {
            stan_id: own,
            student_id: other,
        }));
        assert!(matches!(
            tenant.ensure_can_access(ResourceOwner::Stan(other)),
            Err(AppError::Forbidden)
        ));
    }

    #[test]
    fn student_reaches_own_orders_only() {
        let own = Uuid::new_v4();
        let tenant = Tenant::Student(own);
        assert!(tenant.can_access(ResourceOwner::Order {
            stan_id: Uuid::new_v4(),
            student_id: own,
        }));
        assert!(!tenant.can_access(ResourceOwner::Order {
            stan_id: own,
            student_id: Uuid::new_v4(),
        }));
        assert!(!tenant.can_access(ResourceOwner::Stan(own)));
    }
}

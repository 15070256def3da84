//! Role checks shared by the service modules.
//!
//! Every check takes the caller as an [`AuthUser`] freshly loaded for the
//! current request.

use models::user::Role;

use crate::auth::domain::AuthUser;
use crate::errors::ServiceError;

pub fn require_admin(actor: &AuthUser) -> Result<(), ServiceError> {
    if actor.role.is_admin() {
        Ok(())
    } else {
        Err(ServiceError::forbidden("admin role required"))
    }
}

/// Admin writes; a blocked admin keeps read access only.
pub fn require_admin_write(actor: &AuthUser) -> Result<(), ServiceError> {
    require_active(actor)?;
    require_admin(actor)
}

pub fn require_head_admin(actor: &AuthUser) -> Result<(), ServiceError> {
    if actor.role == Role::HeadAdmin {
        Ok(())
    } else {
        Err(ServiceError::forbidden("head_admin role required"))
    }
}

/// Blocked accounts keep read access but cannot write.
pub fn require_active(actor: &AuthUser) -> Result<(), ServiceError> {
    if actor.is_blocked {
        Err(ServiceError::forbidden("account is blocked"))
    } else {
        Ok(())
    }
}

/// Admin actions on another account need a strictly higher rank and never
/// target the caller.
pub fn require_outranks(actor: &AuthUser, target_id: i32, target_role: Role) -> Result<(), ServiceError> {
    require_admin_write(actor)?;
    if actor.id == target_id {
        return Err(ServiceError::forbidden("cannot act on own account"));
    }
    if !actor.role.outranks(target_role) {
        return Err(ServiceError::forbidden(format!("{} cannot manage {}", actor.role, target_role)));
    }
    Ok(())
}

/// Managers may act on their own restaurant; admins on any.
pub fn require_restaurant_staff(actor: &AuthUser, restaurant_id: i32) -> Result<(), ServiceError> {
    match actor.role {
        r if r.is_admin() => Ok(()),
        Role::Manager if actor.restaurant_id == Some(restaurant_id) => Ok(()),
        Role::Manager => Err(ServiceError::forbidden("not the manager of this restaurant")),
        _ => Err(ServiceError::forbidden("manager role required")),
    }
}

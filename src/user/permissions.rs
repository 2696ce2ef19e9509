use crate::user::model::User;

/// Active superusers hold every permission implicitly; there is no
/// finer-grained role model, so everyone else holds none.
pub fn has_permission(user: &User, _permission: &str) -> bool {
    user.is_active && user.is_superuser
}

use crate::{error::ServiceError, model::role::Role};
use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload};
use futures::future::{Ready, ready};

/// Caller identity, placed in request extensions by the auth middleware.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
    pub email: String,
    pub role: Role,

    /// Present only if this user is linked to an employee record
    pub employee_id: Option<String>,
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthUser>() {
            Some(user) => ready(Ok(user.clone())),
            None => ready(Err(
                ServiceError::Unauthorized("Missing authentication".into()).into()
            )),
        }
    }
}

impl AuthUser {
    pub fn require_super_admin(&self) -> Result<(), ServiceError> {
        if self.role == Role::SuperAdmin {
            Ok(())
        } else {
            Err(ServiceError::Forbidden("Super admin only".into()))
        }
    }

    pub fn require_hr_or_admin(&self) -> Result<(), ServiceError> {
        if self.role.manages_people() {
            Ok(())
        } else {
            Err(ServiceError::Forbidden("HR/Admin only".into()))
        }
    }

    /// Only a super admin may create another super admin.
    pub fn require_can_grant(&self, role: Role) -> Result<(), ServiceError> {
        if role == Role::SuperAdmin && self.role != Role::SuperAdmin {
            return Err(ServiceError::Forbidden(
                "Only a super admin can grant SUPER_ADMIN".into(),
            ));
        }
        Ok(())
    }

    /// HR and admins may read anyone; everyone else only their own profile.
    pub fn require_can_view(&self, employee_id: &str) -> Result<(), ServiceError> {
        if self.role.manages_people() || self.employee_id.as_deref() == Some(employee_id) {
            Ok(())
        } else {
            Err(ServiceError::Forbidden("Not allowed to view this employee".into()))
        }
    }
}

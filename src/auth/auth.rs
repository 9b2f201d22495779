use crate::auth::jwt::verify_access_token;
use crate::auth::permission::{Action, Module, Permission};
use crate::config::Config;
use crate::error::ApiError;
use crate::model::role::Role;
use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload, web::Data};
use futures::future::{Ready, ready};

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: u64,
    pub username: String,
    pub role: Role,
    pub permissions: Vec<Permission>,
}

impl AuthUser {
    pub fn new(user_id: u64, username: String, role: Role) -> Self {
        AuthUser {
            user_id,
            username,
            role,
            permissions: role.permissions(),
        }
    }

    pub fn from_bearer(header: Option<&str>, secret: &str) -> Result<Self, ApiError> {
        let token = header
            .and_then(|h| h.strip_prefix("Bearer "))
            .ok_or_else(|| ApiError::unauthorized("Missing token"))?;

        let claims = verify_access_token(token, secret)
            .map_err(|_| ApiError::unauthorized("Invalid or expired token"))?;

        let role =
            Role::from_id(claims.role).ok_or_else(|| ApiError::unauthorized("Invalid role"))?;

        Ok(AuthUser::new(claims.user_id, claims.sub, role))
    }

    pub fn can(&self, module: Module, action: Action) -> bool {
        self.permissions.iter().any(|p| p.grants(module, action))
    }

    pub fn require(&self, module: Module, action: Action) -> Result<(), ApiError> {
        if self.can(module, action) {
            Ok(())
        } else {
            Err(ApiError::forbidden(format!(
                "Missing permission {module}:{action}"
            )))
        }
    }
}

impl FromRequest for AuthUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        // auth_middleware already verified the token on protected scopes
        if let Some(user) = req.extensions().get::<AuthUser>() {
            return ready(Ok(user.clone()));
        }

        let config = match req.app_data::<Data<Config>>() {
            Some(c) => c,
            None => return ready(Err(ApiError::Unhandled("Config missing".into()))),
        };

        let header = req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok());

        ready(AuthUser::from_bearer(header, &config.jwt_secret))
    }
}

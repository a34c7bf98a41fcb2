use std::future::{ready, Ready};

use actix_web::{http::header::Header, web, FromRequest, HttpRequest};
use actix_web_httpauth::headers::authorization::{Authorization, Bearer};

use crate::{
    auth::{JwtVerifier, Principal},
    errors::AppError,
};

/// Extractor resolving the bearer token to a principal, if any.
///
/// Missing or invalid credentials yield `None` rather than rejecting the
/// request, so services report `AuthenticationRequired` themselves.
pub struct OptionalPrincipal(pub Option<Principal>);

impl OptionalPrincipal {
    pub fn principal(&self) -> Option<&Principal> {
        self.0.as_ref()
    }
}

pub fn principal_from_request(req: &HttpRequest) -> Option<Principal> {
    let verifier = req.app_data::<web::Data<JwtVerifier>>()?;

    let bearer = Authorization::<Bearer>::parse(req).ok()?.into_scheme();

    match verifier.validate_token(bearer.token()) {
        Ok(claims) => Some(claims.principal()),
        Err(err) => {
            log::debug!("Rejected bearer token: {}", err);
            None
        }
    }
}

impl FromRequest for OptionalPrincipal {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        ready(Ok(OptionalPrincipal(principal_from_request(req))))
    }
}

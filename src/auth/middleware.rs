use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::rc::Rc;

use crate::auth::{resolve, token_from_headers, AuthSettings, AuthState, AuthenticatedUser};
use crate::error::AppError;
use crate::store::Store;

/// Resolves the `x-auth` header to a user and stores it as an
/// [`AuthenticatedUser`] in the request extensions.
///
/// Needs `web::Data<dyn Store>` and `web::Data<AuthSettings>` in app data.
/// Rejections are rendered through `AppError`, so a 401 carries an empty JSON body.
#[derive(Debug, Clone, Copy)]
pub struct AuthMiddleware {
    required: bool,
}

impl AuthMiddleware {
    /// Rejects unauthenticated requests with 401.
    pub fn required() -> Self {
        Self { required: true }
    }

    /// Lets unauthenticated requests through without a user attached.
    pub fn optional() -> Self {
        Self { required: false }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
            required: self.required,
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
    required: bool,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let required = self.required;

        Box::pin(async move {
            let store = req.app_data::<web::Data<dyn Store>>().cloned();
            let settings = req.app_data::<web::Data<AuthSettings>>().cloned();
            let (Some(store), Some(settings)) = (store, settings) else {
                let app_err = AppError::InternalServerError(
                    "AuthMiddleware requires store and auth settings in app data".into(),
                );
                return Ok(req.error_response(app_err).map_into_right_body());
            };

            let token = token_from_headers(req.headers());
            match resolve(store.get_ref(), settings.get_ref(), token).await {
                Ok(AuthState::Authenticated { user, token }) => {
                    req.extensions_mut()
                        .insert(AuthenticatedUser { user, token });
                }
                Ok(AuthState::Unauthenticated) if required => {
                    let app_err = AppError::Unauthorized(format!(
                        "No valid token for {} {}",
                        req.method(),
                        req.path()
                    ));
                    return Ok(req.error_response(app_err).map_into_right_body());
                }
                Ok(AuthState::Unauthenticated) => {}
                Err(app_err) => return Ok(req.error_response(app_err).map_into_right_body()),
            }

            service
                .call(req)
                .await
                .map(ServiceResponse::map_into_left_body)
        })
    }
}

//! Account token middleware.
//!
//! Reads verified OIDC claims from request extensions, resolves the
//! claimed email to a stable account id (cache first, directory on a
//! miss), mints a short-lived signed token for the resolved identity
//! and injects it as the `x-access-token` header before forwarding.
//! Requests without claims pass through untouched.
//!
//! Failures never fall through to the proxied backend: the middleware
//! renders the problem response itself (404 for no match, 403 for an
//! ambiguous match, 500 for infrastructure errors) and the inner
//! service is not called.
//!
//! Ordering: an upstream layer must have already verified the incoming
//! identity and inserted [`OidcClaims`] into `req.extensions()`.
//! Register this middleware so it runs after that layer; with actix's
//! outside-in wrapping that means `.wrap()` it **before** the
//! authenticator, e.g.:
//!
//! App::new()
//!     .wrap(AccountToken::new(resolver, minter))
//!     .wrap(OidcAuthenticator)   // verifies and stores OidcClaims
//!     // routes...

use std::rc::Rc;
use std::sync::Arc;
use std::time::SystemTime;

use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::error::ResponseError;
use actix_web::http::header::{HeaderName, HeaderValue};
use actix_web::{Error, HttpMessage};
use futures_util::future::{ready, LocalBoxFuture, Ready};
use tracing::{debug, warn};

use crate::auth::claims::{OidcClaims, ResolvedIdentity};
use crate::auth::jwt::TokenMinter;
use crate::error::AccountTokenError;
use crate::logging::pii::Redacted;
use crate::resolver::AccountResolver;

/// Header carrying the minted token to the proxied backend. Any value
/// the client sent under this name is replaced, never forwarded.
pub const ACCOUNT_TOKEN_HEADER: &str = "x-access-token";

pub struct AccountToken {
    resolver: AccountResolver,
    minter: Arc<TokenMinter>,
}

impl AccountToken {
    pub fn new(resolver: AccountResolver, minter: Arc<TokenMinter>) -> Self {
        Self { resolver, minter }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AccountToken
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AccountTokenMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AccountTokenMiddleware {
            service: Rc::new(service),
            resolver: self.resolver.clone(),
            minter: self.minter.clone(),
        }))
    }
}

pub struct AccountTokenMiddleware<S> {
    // Rc because the call future owns the service across awaits.
    service: Rc<S>,
    resolver: AccountResolver,
    minter: Arc<TokenMinter>,
}

/// Terminate the request with the problem response for `err`.
fn terminate<B>(req: ServiceRequest, err: AccountTokenError) -> ServiceResponse<EitherBody<B>> {
    warn!(
        status = err.status().as_u16(),
        error = %err,
        "Request terminated at account token middleware"
    );
    let response = err.error_response().map_into_right_body();
    req.into_response(response)
}

impl<S, B> Service<ServiceRequest> for AccountTokenMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        // Claims are cloned out before moving req; the Ref guard from
        // extensions() must not live across an await.
        let claims = req.extensions().get::<OidcClaims>().cloned();

        let Some(claims) = claims else {
            debug!("No verified claims; forwarding without account token");
            let fut = self.service.call(req);
            return Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) });
        };

        let service = Rc::clone(&self.service);
        let resolver = self.resolver.clone();
        let minter = Arc::clone(&self.minter);

        Box::pin(async move {
            let account_id = match resolver.resolve(&claims.email).await {
                Ok(id) => id,
                Err(err) => return Ok(terminate(req, AccountTokenError::from(err))),
            };

            let email = claims.email.clone();
            let identity = ResolvedIdentity::new(account_id, claims);
            let token = match minter.mint(&identity, SystemTime::now()) {
                Ok(token) => token,
                Err(err) => return Ok(terminate(req, AccountTokenError::from(err))),
            };

            let header_value = match HeaderValue::from_str(&token) {
                Ok(value) => value,
                Err(err) => {
                    let err = AccountTokenError::TokenSigningFailed {
                        detail: format!("minted token is not a valid header value: {err}"),
                    };
                    return Ok(terminate(req, err));
                }
            };
            req.headers_mut()
                .insert(HeaderName::from_static(ACCOUNT_TOKEN_HEADER), header_value);

            debug!(
                email = %Redacted(&email),
                account_id = %identity.account_id,
                "Account token attached"
            );

            service
                .call(req)
                .await
                .map(ServiceResponse::map_into_left_body)
        })
    }
}

use axum::{
    extract::{ConnectInfo, Request},
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;

use crate::audit::{actor, Actor, RequestMeta};
use crate::middleware::auth::AuthUser;
use crate::tenancy::directory::CompanyDirectory;
use crate::tenancy::{slug, ResolvedCompany};

/// Per-request context: resolves the tenant and scopes the acting user.
///
/// Runs after JWT authentication and before any handler, so company
/// resolution is always visible downstream. Resolution is infallible by
/// construction (the signature returns `Response`, not `Result`); a missing,
/// unknown, inactive or malformed company header all degrade to an
/// untenanted request, and whether that is acceptable is the downstream
/// authorization layer's decision.
pub async fn request_context_middleware(mut request: Request, next: Next) -> Response {
    let company = match slug::candidate_from_headers(request.headers()) {
        Some(candidate) => CompanyDirectory::instance().lookup(&candidate).await,
        None => None,
    };

    let resolved = match company {
        Some(company) => {
            tracing::debug!("resolved company '{}' for request", company.slug);
            ResolvedCompany::resolved(company)
        }
        None => ResolvedCompany::none(),
    };

    let remote = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip());
    let meta = RequestMeta::from_request(request.headers(), remote);

    let acting_user = request
        .extensions()
        .get::<AuthUser>()
        .map(|user| Actor { user_id: user.user_id, email: user.email.clone() });

    request.extensions_mut().insert(resolved);
    request.extensions_mut().insert(meta);

    // The rest of the request runs inside the actor scope; the actor
    // vanishes with the scope, so the next request starts clean.
    actor::scope(acting_user, next.run(request)).await
}

use crate::{
    middlewares::{authentication, authorization},
    modules::{friend::handle::*, user::schema::UserRole},
};
use actix_web::{
    middleware::from_fn,
    web::{ServiceConfig, scope},
};

pub fn configure(cfg: &mut ServiceConfig) {
    // literal paths before `/requests/{request_id}`
    cfg.service(
        scope("/friends")
            .service(send_friend_request)
            .service(list_sent_requests)
            .service(list_received_requests)
            .service(get_friend_request)
            .service(accept_friend_request)
            .service(reject_friend_request)
            .service(cancel_friend_request)
            .service(list_friends)
            .service(list_user_friends)
            .service(search_users),
    );
}

pub fn admin_configure(cfg: &mut ServiceConfig) {
    cfg.service(remove_friend_request);
}

/// Everything mounted under `/api`: the admin scope first, since the empty
/// scope would otherwise swallow `/admin/...`.
pub fn configure_api(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/admin")
            .wrap(from_fn(authorization(vec![UserRole::Admin])))
            .wrap(from_fn(authentication))
            .configure(admin_configure),
    )
    .service(
        scope("")
            .wrap(from_fn(authorization(vec![UserRole::User, UserRole::Admin])))
            .wrap(from_fn(authentication))
            .configure(configure),
    );
}

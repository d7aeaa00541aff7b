use actix_web::{delete, get, patch, post, web, HttpRequest};
use uuid::Uuid;

use crate::{
    api::{error, success},
    middlewares::get_claims,
    modules::{
        friend::{
            model::{FriendRequestView, SendFriendRequestBody},
            schema::FriendRequestEntity,
            service::FriendService,
        },
        user::model::{UserSearchQuery, UserSummary},
    },
    utils::{
        pagination::{PageQuery, Paged},
        ValidatedJson, ValidatedQuery,
    },
};

#[post("/requests")]
pub async fn send_friend_request(
    friend_service: web::Data<FriendService>,
    body: ValidatedJson<SendFriendRequestBody>,
    req: HttpRequest,
) -> Result<success::Success<FriendRequestEntity>, error::Error> {
    let requester_id = get_claims(&req)?.sub;
    let request =
        friend_service.send_friend_request(requester_id, &body.0.recipient_username).await?;

    Ok(success::Success::created(Some(request)).message("Friend request sent successfully"))
}

#[get("/requests/sent")]
pub async fn list_sent_requests(
    friend_service: web::Data<FriendService>,
    query: ValidatedQuery<PageQuery>,
    req: HttpRequest,
) -> Result<success::Success<Paged<FriendRequestView>>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    let requests = friend_service.get_pending_sent_requests(user_id, query.0.into()).await?;

    Ok(success::Success::ok(Some(requests)).message("Sent friend requests retrieved successfully"))
}

#[get("/requests/received")]
pub async fn list_received_requests(
    friend_service: web::Data<FriendService>,
    query: ValidatedQuery<PageQuery>,
    req: HttpRequest,
) -> Result<success::Success<Paged<FriendRequestView>>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    let requests = friend_service.get_pending_received_requests(user_id, query.0.into()).await?;

    Ok(success::Success::ok(Some(requests))
        .message("Received friend requests retrieved successfully"))
}

#[get("/requests/{request_id}")]
pub async fn get_friend_request(
    friend_service: web::Data<FriendService>,
    request_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<FriendRequestEntity>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    let request = friend_service.get_friend_request(user_id, *request_id).await?;

    Ok(success::Success::ok(Some(request)).message("Friend request retrieved successfully"))
}

#[patch("/requests/{request_id}/accept")]
pub async fn accept_friend_request(
    friend_service: web::Data<FriendService>,
    request_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<FriendRequestEntity>, error::Error> {
    let recipient_id = get_claims(&req)?.sub;
    let request = friend_service.accept_friend_request(recipient_id, *request_id).await?;

    Ok(success::Success::ok(Some(request)).message("Friend request accepted successfully"))
}

#[patch("/requests/{request_id}/reject")]
pub async fn reject_friend_request(
    friend_service: web::Data<FriendService>,
    request_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<FriendRequestEntity>, error::Error> {
    let recipient_id = get_claims(&req)?.sub;
    let request = friend_service.reject_friend_request(recipient_id, *request_id).await?;

    Ok(success::Success::ok(Some(request)).message("Friend request rejected successfully"))
}

#[delete("/requests/{request_id}")]
pub async fn cancel_friend_request(
    friend_service: web::Data<FriendService>,
    request_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let requester_id = get_claims(&req)?.sub;
    friend_service.cancel_friend_request(requester_id, *request_id).await?;
    Ok(success::Success::no_content())
}

#[get("/list")]
pub async fn list_friends(
    friend_service: web::Data<FriendService>,
    query: ValidatedQuery<PageQuery>,
    req: HttpRequest,
) -> Result<success::Success<Paged<FriendRequestView>>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    let friends = friend_service.get_friends_list(user_id, query.0.into()).await?;

    Ok(success::Success::ok(Some(friends)).message("Friends retrieved successfully"))
}

#[get("/users/{user_id}/friends")]
pub async fn list_user_friends(
    friend_service: web::Data<FriendService>,
    user_id: web::Path<Uuid>,
    query: ValidatedQuery<PageQuery>,
) -> Result<success::Success<Paged<FriendRequestView>>, error::Error> {
    let friends = friend_service.get_user_friends_list(*user_id, query.0.into()).await?;

    Ok(success::Success::ok(Some(friends)).message("Friends retrieved successfully"))
}

#[get("/search")]
pub async fn search_users(
    friend_service: web::Data<FriendService>,
    query: ValidatedQuery<UserSearchQuery>,
) -> Result<success::Success<Paged<UserSummary>>, error::Error> {
    let query = query.0;
    let users =
        friend_service.search_users(query.search.as_deref(), query.page, query.limit).await?;

    Ok(success::Success::ok(Some(users)).message("Users retrieved successfully"))
}

#[delete("/friend-requests/{request_id}")]
pub async fn remove_friend_request(
    friend_service: web::Data<FriendService>,
    request_id: web::Path<Uuid>,
) -> Result<success::Success<()>, error::Error> {
    friend_service.remove_friend_request(*request_id).await?;
    Ok(success::Success::no_content())
}

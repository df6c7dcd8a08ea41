// Route definitions

use std::convert::Infallible;

use warp::Filter;

use crate::config::AllowedOrigins;
use crate::handlers;
use crate::state::AppState;

/// Largest JSON body accepted on any endpoint
const MAX_BODY_BYTES: u64 = 64 * 1024;

fn with_state(state: AppState) -> impl Filter<Extract = (AppState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

fn json_body<T>() -> impl Filter<Extract = (T,), Error = warp::Rejection> + Clone
where
    T: serde::de::DeserializeOwned + Send,
{
    warp::body::content_length_limit(MAX_BODY_BYTES).and(warp::body::json())
}

fn cors(origins: &AllowedOrigins) -> warp::cors::Builder {
    let builder = warp::cors()
        .allow_methods(vec!["GET", "POST", "OPTIONS"])
        .allow_headers(vec!["content-type", "authorization"])
        .allow_credentials(true);

    match origins {
        AllowedOrigins::Any => builder.allow_any_origin(),
        AllowedOrigins::List(list) => builder.allow_origins(list.iter().map(String::as_str)),
    }
}

pub fn configure_routes(
    state: AppState,
    origins: &AllowedOrigins,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let api = warp::path("api").and(warp::path("v1"));

    // GET /
    let root = warp::path::end()
        .and(warp::get())
        .and_then(handlers::root_handler);

    // GET /health
    let health = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(handlers::health_handler);

    // POST /api/v1/users
    let create_user = api
        .and(warp::path("users"))
        .and(warp::path::end())
        .and(warp::post())
        .and(json_body())
        .and(with_state(state.clone()))
        .and_then(handlers::create_user_handler);

    // GET /api/v1/users/{userId}
    let get_user = api
        .and(warp::path("users"))
        .and(warp::path::param::<String>())
        .and(warp::path::end())
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(handlers::get_user_handler);

    // GET /api/v1/users/{userId}/chats
    let user_chats = api
        .and(warp::path("users"))
        .and(warp::path::param::<String>())
        .and(warp::path("chats"))
        .and(warp::path::end())
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(handlers::user_chats_handler);

    // POST /api/v1/chats
    let create_chat = api
        .and(warp::path("chats"))
        .and(warp::path::end())
        .and(warp::post())
        .and(json_body())
        .and(with_state(state.clone()))
        .and_then(handlers::create_chat_handler);

    // GET /api/v1/chats/{chatId}
    let chat_history = api
        .and(warp::path("chats"))
        .and(warp::path::param::<String>())
        .and(warp::path::end())
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(handlers::chat_history_handler);

    // GET /api/v1/chats/{chatId}/logs
    let chat_logs = api
        .and(warp::path("chats"))
        .and(warp::path::param::<String>())
        .and(warp::path("logs"))
        .and(warp::path::end())
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(handlers::chat_logs_handler);

    // POST /api/v1/chat/message
    let send_message = api
        .and(warp::path("chat"))
        .and(warp::path("message"))
        .and(warp::path::end())
        .and(warp::post())
        .and(json_body())
        .and(with_state(state.clone()))
        .and_then(handlers::send_message_handler);

    // POST /generate-response
    let generate_response = warp::path("generate-response")
        .and(warp::path::end())
        .and(warp::post())
        .and(json_body())
        .and(with_state(state))
        .and_then(handlers::generate_response_handler);

    // Combine routes
    root.or(health)
        .or(create_user)
        .or(get_user)
        .or(user_chats)
        .or(create_chat)
        .or(chat_history)
        .or(chat_logs)
        .or(send_message)
        .or(generate_response)
        .recover(handlers::handle_rejection)
        .with(cors(origins))
}

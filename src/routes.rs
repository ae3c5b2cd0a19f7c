use std::sync::Arc;

use bytes::Bytes;
use log::{debug, error, Logger};
use warp::http::StatusCode;
use warp::reject;
use warp::reply::{json, with_status, Reply};
use warp::Filter;

use crate::environment::Environment;
use crate::errors::BackendError;

pub mod admin;
mod handlers;
mod rejection;
mod response;

pub use internal::*;

/// The path under which all videos live.
pub const VIDEOS_PATH: &str = "videos";

/// Combines every video route into one filter, with rejections turned
/// into responses.
pub fn make_video_routes(
    environment: Environment,
) -> impl Filter<Extract = (impl Reply,), Error = reject::Rejection> + Clone {
    let logger = environment.logger.clone();

    make_list_route(environment.clone())
        .or(make_create_route(environment.clone()))
        .or(make_retrieve_route(environment.clone()))
        .or(make_update_route(environment.clone()))
        .or(make_delete_route(environment))
        .recover(move |r| format_rejection(logger.clone(), r))
}

pub async fn format_rejection(
    logger: Arc<Logger>,
    rej: reject::Rejection,
) -> Result<Box<dyn Reply>, reject::Rejection> {
    if let Some(r) = rej.find::<rejection::Rejection>() {
        let e = &r.error;
        let status = status_code_for(e);

        let reply: Box<dyn Reply> = match e {
            BackendError::Validation(report) => {
                debug!(logger, "Rejected submission"; "context" => ?r.context, "fields" => ?report.fields(), "status" => %status);
                Box::new(with_status(json(report), status))
            }
            BackendError::NotFound(..) | BackendError::InvalidId(..) => {
                debug!(logger, "Video not found"; "context" => ?r.context, "status" => %status);
                Box::new(status)
            }
            _ if status.is_client_error() => {
                debug!(logger, "Bad request"; "context" => ?r.context, "error" => ?r.error, "status" => %status, "message" => %r.error);
                Box::new(with_status(json(&r.flatten()), status))
            }
            _ => {
                error!(logger, "Backend error"; "context" => ?r.context, "error" => ?r.error, "status" => %status, "message" => %r.error);
                Box::new(with_status(json(&r.flatten()), status))
            }
        };

        return Ok(reply);
    }

    Err(rej)
}

fn status_code_for(e: &BackendError) -> StatusCode {
    use BackendError::*;

    match e {
        Validation(..) | MalformedBody(..) => StatusCode::BAD_REQUEST,
        BodyTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        NotFound(..) | InvalidId(..) => StatusCode::NOT_FOUND,
        DuplicateId(..) | StorePoisoned | TimestampFormat { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn body() -> impl Filter<Extract = (Bytes,), Error = reject::Rejection> + Clone {
    warp::body::bytes()
}

mod internal {
    use warp::filters::BoxedFilter;
    use warp::path::end;
    use warp::Filter;
    use warp::Reply;
    use warp::{delete, get as g, path as p, path::param as par, post, put};

    use super::{body, handlers, VIDEOS_PATH};
    use crate::environment::Environment;

    type Route = BoxedFilter<(Box<dyn Reply>,)>;

    macro_rules! route_filter {
    ($route_variable:ident; $first:expr) => (let $route_variable = $route_variable.and($first););
    ($route_variable:ident; $first:expr, $($rest:expr),+) => (
        let $route_variable = $route_variable.and($first);
        route_filter!($route_variable; $($rest),+);
    )
}

    macro_rules! route {
    ($name:ident => $handler:ident, $route_variable:ident; $($filters:expr),+) => (
        pub fn $name(environment: Environment) -> Route {
            let $route_variable = warp::any()
                .map(move || environment.clone())
                .and(p(VIDEOS_PATH));

            route_filter!($route_variable; $($filters),+);

            $route_variable.and_then(handlers::$handler)
                .boxed()
        }
    );
}

    route!(make_list_route => list, rt; end(), g());
    route!(make_create_route => create, rt; end(), post(), body());
    route!(make_retrieve_route => retrieve, rt; par::<String>(), end(), g());
    route!(make_update_route => update, rt; par::<String>(), end(), put(), body());
    route!(make_delete_route => delete, rt; par::<String>(), end(), delete());
}

use std::time::{Duration, Instant};

use bytes::Bytes;
use log::{debug, o};
use warp::{
    http::StatusCode,
    reject,
    reply::{json, with_header, with_status, Reply},
};

use crate::environment::Environment;
use crate::errors::BackendError;
use crate::routes::{
    rejection::{Context, Rejection},
    VIDEOS_PATH,
};
use crate::validation::{validate_creation, validate_update};
use crate::video::{Video, VideoId, VideoInput};

const SERVER_TIMING_HEADER: &str = "server-timing";
type RouteResult = Result<Box<dyn Reply>, reject::Rejection>;

macro_rules! timed {
    ($($body:tt)+) => {{
        let start = Instant::now();

        // rejections skip this and get no timing header
        let result = { $($body)+ };

        Ok(Box::new(with_header(
            result,
            SERVER_TIMING_HEADER,
            format_server_timing(start.elapsed()),
        )) as Box<dyn Reply>)
    }};
}

pub async fn list(environment: Environment) -> RouteResult {
    timed! {
        let videos = environment
            .store
            .list()
            .map_err(|e| reject::custom(Rejection::new(Context::list(), e)))?;

        json(&videos)
    }
}

pub async fn create(environment: Environment, body: Bytes) -> RouteResult {
    timed! {
        let error_handler = |e: BackendError| reject::custom(Rejection::new(Context::create(None), e));

        debug!(environment.logger, "Parsing submission...");
        let input = VideoInput::from_slice(&body).map_err(error_handler)?;

        debug!(environment.logger, "Validating submission...");
        let fields = validate_creation(&input)
            .map_err(BackendError::Validation)
            .map_err(error_handler)?;

        let now = environment.now();
        let id = environment.ids.next(now);
        let logger = environment.logger.new(o!("id" => id));

        let error_handler = |e: BackendError| reject::custom(Rejection::new(Context::create(Some(id)), e));

        let video = Video::create(id, fields, now).map_err(error_handler)?;

        debug!(logger, "Saving video...");
        environment.store.append(video.clone()).map_err(error_handler)?;

        with_header(
            with_status(json(&video), StatusCode::CREATED),
            "location",
            video_path(id),
        )
    }
}

pub async fn retrieve(environment: Environment, id: String) -> RouteResult {
    timed! {
        let error_handler = |e: BackendError| reject::custom(Rejection::new(Context::retrieve(id.clone()), e));

        let id = parse_id(&id).map_err(&error_handler)?;
        debug!(environment.logger, "Retrieving video..."; "id" => id);

        let video = environment
            .store
            .find(id)
            .map_err(&error_handler)?
            .ok_or(BackendError::NotFound(id))
            .map_err(&error_handler)?;

        with_status(json(&video), StatusCode::OK)
    }
}

pub async fn update(environment: Environment, id: String, body: Bytes) -> RouteResult {
    timed! {
        let error_handler = |e: BackendError| reject::custom(Rejection::new(Context::update(id.clone()), e));

        let id = parse_id(&id).map_err(&error_handler)?;
        let logger = environment.logger.new(o!("id" => id));

        // unknown IDs take precedence over invalid submissions
        debug!(logger, "Checking video exists...");
        environment
            .store
            .find(id)
            .map_err(&error_handler)?
            .ok_or(BackendError::NotFound(id))
            .map_err(&error_handler)?;

        debug!(logger, "Validating submission...");
        let input = VideoInput::from_slice(&body).map_err(&error_handler)?;
        let update = validate_update(&input)
            .map_err(BackendError::Validation)
            .map_err(&error_handler)?;

        debug!(logger, "Updating video...");
        environment
            .store
            .update(id, update)
            .map_err(&error_handler)?
            .ok_or(BackendError::NotFound(id))
            .map_err(&error_handler)?;

        StatusCode::NO_CONTENT
    }
}

pub async fn delete(environment: Environment, id: String) -> RouteResult {
    timed! {
        let error_handler = |e: BackendError| reject::custom(Rejection::new(Context::delete(id.clone()), e));

        let id = parse_id(&id).map_err(&error_handler)?;
        debug!(environment.logger, "Deleting video..."; "id" => id);

        let removed = environment.store.remove(id).map_err(&error_handler)?;

        if !removed {
            return Err(error_handler(BackendError::NotFound(id)));
        }

        StatusCode::NO_CONTENT
    }
}

fn parse_id(id: &str) -> Result<VideoId, BackendError> {
    id.parse().map_err(|_| BackendError::InvalidId(id.to_owned()))
}

fn video_path(id: VideoId) -> String {
    format!("/{}/{}", VIDEOS_PATH, id)
}

fn format_server_timing(seconds: Duration) -> String {
    format!("handler;dur={}", seconds.as_secs_f64() * 1000.0)
}

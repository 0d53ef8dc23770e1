//! Web module - the planner page served with axum
//!
//! Every form posts to one route, the route makes one Planner call and
//! redirects back to the page, which is rendered fresh from state.

pub mod page;

use std::io::SeekFrom;
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::{DefaultBodyLimit, Form, Multipart, Path, Query, State, multipart::MultipartError},
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio::sync::Mutex;
use tokio_util::io::ReaderStream;
use tracing::{debug, error, info, warn};

use crate::app::Planner;
use crate::error::Error;
use crate::plan::{UnknownWeekday, Weekday};
use crate::videos;
use page::Notice;

pub type SharedPlanner = Arc<Mutex<Planner>>;

pub fn router(planner: SharedPlanner, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/plan", post(add_exercise))
        .route("/sessions", post(record_session))
        .route(
            "/videos",
            post(upload_video).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/media/{file}", get(media))
        .with_state(planner)
}

/// Serve the page until Ctrl-C
pub async fn serve(planner: Planner, bind: &str, max_upload_bytes: usize) -> anyhow::Result<()> {
    let app = router(Arc::new(Mutex::new(planner)), max_upload_bytes);
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("Serving planner at http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    Ok(())
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub day: Option<Weekday>,
    pub notice: Option<Notice>,
}

#[derive(Debug, Deserialize)]
pub struct ExerciseForm {
    pub day: Weekday,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sets_reps: String,
    #[serde(default)]
    pub video_url: String,
}

#[derive(Debug, Deserialize)]
pub struct SessionForm {
    pub day: Weekday,
    pub exercise: String,
    #[serde(default)]
    pub weight_used: String,
    #[serde(default)]
    pub notes: String,
}

/// Error page with a status matching the failure
#[derive(Debug)]
pub enum WebError {
    App(Error),
    /// Malformed or oversized multipart body
    BadUpload(StatusCode, String),
}

impl From<Error> for WebError {
    fn from(err: Error) -> Self {
        WebError::App(err)
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            WebError::App(err) if err.is_user_error() => {
                warn!("Rejected: {}", err);
                (StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
            }
            WebError::App(err @ Error::MissingFile { .. }) => {
                warn!("{}", err);
                (StatusCode::NOT_FOUND, err.to_string())
            }
            WebError::App(err) => {
                error!("{}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
            WebError::BadUpload(status, msg) => {
                warn!("Bad upload ({}): {}", status, msg);
                (*status, msg.clone())
            }
        };
        match page::render_error(&message) {
            Ok(html) => (status, Html(html)).into_response(),
            Err(_) => (status, message).into_response(),
        }
    }
}

fn back_to(day: Weekday, notice: Notice) -> Redirect {
    Redirect::to(&format!("/?day={}&notice={}", day.key(), notice.key()))
}

pub async fn index(
    State(planner): State<SharedPlanner>,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>, WebError> {
    let day = query.day.unwrap_or_else(Weekday::today);
    let planner = planner.lock().await;
    let html = page::render_page(&planner, day, query.notice).map_err(Error::from)?;
    Ok(Html(html))
}

pub async fn add_exercise(
    State(planner): State<SharedPlanner>,
    Form(form): Form<ExerciseForm>,
) -> Result<Redirect, WebError> {
    let mut planner = planner.lock().await;
    planner.add_exercise(form.day, &form.name, &form.sets_reps, &form.video_url)?;
    Ok(back_to(form.day, Notice::Exercise))
}

pub async fn record_session(
    State(planner): State<SharedPlanner>,
    Form(form): Form<SessionForm>,
) -> Result<Redirect, WebError> {
    let mut planner = planner.lock().await;
    planner.record_session(None, form.day, &form.exercise, &form.weight_used, &form.notes)?;
    Ok(back_to(form.day, Notice::Session))
}

pub async fn upload_video(
    State(planner): State<SharedPlanner>,
    mut multipart: Multipart,
) -> Result<Redirect, WebError> {
    let mut day = Weekday::today();
    let mut description = String::new();
    let mut upload = None;

    while let Some(field) = multipart.next_field().await.map_err(bad_upload)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "video" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await.map_err(bad_upload)?;
                upload = Some((filename, data));
            }
            "description" => {
                description = field.text().await.map_err(bad_upload)?;
            }
            "day" => {
                let text = field.text().await.map_err(bad_upload)?;
                day = text.parse().map_err(|e: UnknownWeekday| {
                    WebError::BadUpload(StatusCode::BAD_REQUEST, e.to_string())
                })?;
            }
            _ => {}
        }
    }

    let Some((filename, data)) = upload else {
        return Err(Error::Validation { field: "video" }.into());
    };

    let mut planner = planner.lock().await;
    planner.store_video(&mut &data[..], &filename, &description)?;
    Ok(back_to(day, Notice::Video))
}

fn bad_upload(err: MultipartError) -> WebError {
    WebError::BadUpload(err.status(), err.body_text())
}

/// Requested slice of a media file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ByteRange {
    Full,
    /// Inclusive bounds
    Partial { start: u64, end: u64 },
    Unsatisfiable,
}

/// Interpret a `Range` header against a file of `total` bytes.
///
/// Only a single `bytes=` range is honoured; anything else is served whole.
fn byte_range(header: Option<&str>, total: u64) -> ByteRange {
    let Some(ranges) = header.and_then(|h| h.trim().strip_prefix("bytes=")) else {
        return ByteRange::Full;
    };
    let Some((first, last)) = ranges.split_once('-') else {
        return ByteRange::Full;
    };
    if ranges.contains(',') {
        return ByteRange::Full;
    }
    let (first, last) = (first.trim(), last.trim());

    let (start, end) = if first.is_empty() {
        // suffix form: the final `n` bytes
        let Ok(n) = last.parse::<u64>() else {
            return ByteRange::Full;
        };
        if n == 0 || total == 0 {
            return ByteRange::Unsatisfiable;
        }
        (total.saturating_sub(n), total - 1)
    } else {
        let Ok(start) = first.parse::<u64>() else {
            return ByteRange::Full;
        };
        let end = if last.is_empty() {
            u64::MAX
        } else {
            match last.parse::<u64>() {
                Ok(end) if end >= start => end,
                _ => return ByteRange::Full,
            }
        };
        if start >= total {
            return ByteRange::Unsatisfiable;
        }
        (start, end.min(total - 1))
    };

    ByteRange::Partial { start, end }
}

/// Stream a catalogued video back to the page's player, honouring a
/// single byte range so the browser can seek
pub async fn media(
    State(planner): State<SharedPlanner>,
    Path(file): Path<String>,
    headers: HeaderMap,
) -> Result<Response, WebError> {
    let path = {
        let planner = planner.lock().await;
        if planner.catalog().find(&file).is_none() {
            return Err(Error::MissingFile { path: file.into() }.into());
        }
        planner.video_dir().join(&file)
    };

    let mut video = match File::open(&path).await {
        Ok(video) => video,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::MissingFile { path }.into());
        }
        Err(source) => return Err(Error::Read { path, source }.into()),
    };
    let total = match video.metadata().await {
        Ok(meta) => meta.len(),
        Err(source) => return Err(Error::Read { path, source }.into()),
    };

    let content_type = videos::content_type(&file);
    let range = headers.get(header::RANGE).and_then(|v| v.to_str().ok());

    match byte_range(range, total) {
        ByteRange::Full => {
            let headers = [
                (header::CONTENT_TYPE, content_type),
                (header::CONTENT_LENGTH, total.to_string()),
                (header::ACCEPT_RANGES, "bytes".to_string()),
            ];
            Ok((headers, Body::from_stream(ReaderStream::new(video))).into_response())
        }
        ByteRange::Partial { start, end } => {
            if let Err(source) = video.seek(SeekFrom::Start(start)).await {
                return Err(Error::Read { path, source }.into());
            }
            let len = end - start + 1;
            debug!("Serving {} bytes {}-{}/{}", file, start, end, total);
            let headers = [
                (header::CONTENT_TYPE, content_type),
                (header::CONTENT_LENGTH, len.to_string()),
                (header::CONTENT_RANGE, format!("bytes {start}-{end}/{total}")),
                (header::ACCEPT_RANGES, "bytes".to_string()),
            ];
            let body = Body::from_stream(ReaderStream::new(video.take(len)));
            Ok((StatusCode::PARTIAL_CONTENT, headers, body).into_response())
        }
        ByteRange::Unsatisfiable => {
            let headers = [(header::CONTENT_RANGE, format!("bytes */{total}"))];
            Ok((StatusCode::RANGE_NOT_SATISFIABLE, headers).into_response())
        }
    }
}

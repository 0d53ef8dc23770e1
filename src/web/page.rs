//! HTML rendering for the planner page (askama templates under `templates/`)

use askama::Template;
use serde::Deserialize;

use crate::app::Planner;
use crate::plan::Weekday;
use crate::videos::VIDEO_EXTENSIONS;

/// Confirmation shown after a successful action
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Notice {
    Exercise,
    Session,
    Video,
}

impl Notice {
    pub fn key(&self) -> &'static str {
        match self {
            Notice::Exercise => "exercise",
            Notice::Session => "session",
            Notice::Video => "video",
        }
    }

    fn message(&self, day: Weekday) -> String {
        match self {
            Notice::Exercise => format!("✅ Exercise added to {}", day.label()),
            Notice::Session => "✅ Session recorded".to_string(),
            Notice::Video => "✅ Video uploaded".to_string(),
        }
    }
}

struct DayOption {
    key: &'static str,
    label: &'static str,
    selected: bool,
}

struct ExerciseView {
    name: String,
    sets_reps: String,
    video_url: String,
    youtube: Option<String>,
}

struct HistoryRow {
    date: String,
    day: String,
    exercise: String,
    weight: String,
    notes: String,
}

struct VideoView {
    description: String,
    date: String,
    stored_filename: String,
    media_segment: String,
    present: bool,
}

#[derive(Template)]
#[template(path = "page.html")]
struct PageTemplate {
    notice: Option<String>,
    day_key: &'static str,
    day_label: &'static str,
    days: Vec<DayOption>,
    exercises: Vec<ExerciseView>,
    history: Vec<HistoryRow>,
    accept: String,
    videos: Vec<VideoView>,
}

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorTemplate<'a> {
    message: &'a str,
}

pub fn render_page(planner: &Planner, day: Weekday, notice: Option<Notice>) -> askama::Result<String> {
    let days = Weekday::all()
        .iter()
        .map(|d| DayOption {
            key: d.key(),
            label: d.label(),
            selected: *d == day,
        })
        .collect();

    let exercises = planner
        .list_exercises(day)
        .iter()
        .map(|ex| ExerciseView {
            name: ex.name.clone(),
            sets_reps: ex.sets_reps.clone(),
            video_url: ex.video_url.clone(),
            youtube: youtube_embed(&ex.video_url),
        })
        .collect();

    let history = planner
        .history()
        .iter()
        .map(|r| HistoryRow {
            date: r.date.format("%Y-%m-%d").to_string(),
            day: r.day_label().to_string(),
            exercise: r.exercise_name.clone(),
            weight: r.weight_used.clone(),
            notes: r.notes.clone(),
        })
        .collect();

    let videos = planner
        .list_videos()
        .iter()
        .map(|v| VideoView {
            description: v.entry.description.clone(),
            date: v.entry.date.format("%Y-%m-%d").to_string(),
            stored_filename: v.entry.stored_filename.clone(),
            media_segment: urlencoding::encode(&v.entry.stored_filename).into_owned(),
            present: v.present,
        })
        .collect();

    let accept: Vec<String> = VIDEO_EXTENSIONS.iter().map(|e| format!(".{e}")).collect();

    PageTemplate {
        notice: notice.map(|n| n.message(day)),
        day_key: day.key(),
        day_label: day.label(),
        days,
        exercises,
        history,
        accept: accept.join(","),
        videos,
    }
    .render()
}

pub fn render_error(message: &str) -> askama::Result<String> {
    ErrorTemplate { message }.render()
}

/// Embeddable form of a YouTube watch or short link
pub fn youtube_embed(url: &str) -> Option<String> {
    let rest = url
        .trim()
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_start_matches("www.")
        .trim_start_matches("m.");

    let id = if let Some(path) = rest.strip_prefix("youtu.be/") {
        path.split(['?', '&', '#']).next()
    } else if let Some(query) = rest.strip_prefix("youtube.com/watch?") {
        query
            .split('&')
            .find_map(|kv| kv.strip_prefix("v="))
            .and_then(|v| v.split('#').next())
    } else if let Some(path) = rest.strip_prefix("youtube.com/shorts/") {
        path.split(['?', '&', '#']).next()
    } else {
        None
    };
    let id = id?;

    if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return None;
    }
    Some(format!("https://www.youtube.com/embed/{id}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use chrono::NaiveDate;

    #[test]
    fn test_youtube_embed() {
        assert_eq!(
            youtube_embed("https://www.youtube.com/watch?v=abc_123-X&t=10").as_deref(),
            Some("https://www.youtube.com/embed/abc_123-X")
        );
        assert_eq!(
            youtube_embed("https://youtu.be/abc123?si=x").as_deref(),
            Some("https://www.youtube.com/embed/abc123")
        );
        assert_eq!(youtube_embed("https://example.com/clip.mp4"), None);
    }

    #[test]
    fn test_render_empty_page() {
        let dir = tempfile::tempdir().unwrap();
        let planner = Planner::open(Config::new(dir.path())).unwrap();
        let html = render_page(&planner, Weekday::Wednesday, None).unwrap();

        assert!(html.contains("<option value=\"wednesday\" selected>"));
        assert!(html.contains("No exercises planned for this day."));
        assert!(html.contains("No sessions recorded yet."));
        assert!(html.contains("No videos uploaded yet."));
        assert!(!html.contains("class=\"notice\""));
    }

    #[test]
    fn test_render_populated_page() {
        let dir = tempfile::tempdir().unwrap();
        let mut planner = Planner::open(Config::new(dir.path())).unwrap();
        planner.add_exercise(Weekday::Monday, "Squat <heavy>", "4x10", "").unwrap();
        planner
            .record_session(NaiveDate::from_ymd_opt(2024, 5, 1), Weekday::Monday, "Squat", "60kg", "")
            .unwrap();
        let when = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap().and_hms_opt(10, 0, 0).unwrap();
        planner.store_video_at(&mut &b"x"[..], "clip.mp4", "Squat 4x10", when).unwrap();

        let html = render_page(&planner, Weekday::Monday, Some(Notice::Exercise)).unwrap();
        assert!(html.contains("Exercise added to Monday"));
        assert!(html.contains("<b>Squat &lt;heavy&gt;</b> – 4x10"));
        assert!(!html.contains("<heavy>"));
        assert!(html.contains("<td>2024-05-01</td><td>Monday</td><td>Squat</td><td>60kg</td>"));
        assert!(html.contains("src=\"/media/20240501_100000_clip.mp4\""));
    }

    #[test]
    fn test_media_link_is_percent_encoded() {
        let dir = tempfile::tempdir().unwrap();
        let mut planner = Planner::open(Config::new(dir.path())).unwrap();
        let when = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap().and_hms_opt(10, 0, 0).unwrap();
        planner.store_video_at(&mut &b"x"[..], "my clip#1.mp4", "Row", when).unwrap();

        let html = render_page(&planner, Weekday::Monday, None).unwrap();
        assert!(html.contains("src=\"/media/20240501_100000_my%20clip%231.mp4\""));
    }

    #[test]
    fn test_missing_video_marked() {
        let dir = tempfile::tempdir().unwrap();
        let mut planner = Planner::open(Config::new(dir.path())).unwrap();
        let when = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap().and_hms_opt(10, 0, 0).unwrap();
        planner.store_video_at(&mut &b"x"[..], "clip.mp4", "gone", when).unwrap();
        std::fs::remove_file(dir.path().join("videos/20240501_100000_clip.mp4")).unwrap();

        let html = render_page(&planner, Weekday::Monday, None).unwrap();
        assert!(html.contains("Video file missing: 20240501_100000_clip.mp4"));
    }

    #[test]
    fn test_error_page_escapes_message() {
        let html = render_error("bad <input>").unwrap();
        assert!(html.contains("bad &lt;input&gt;"));
    }
}

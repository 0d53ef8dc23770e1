//! Planner - the three documents plus where they live
//!
//! Each user action is one method: validate, mutate in memory, write the
//! affected document back. A failed write leaves the in-memory change in
//! place; it is not rolled back.

use std::io::Read;
use std::path::Path;

use chrono::{Local, NaiveDate, NaiveDateTime};
use tracing::{error, info};

use crate::config::Config;
use crate::error::Result;
use crate::plan::{Exercise, Plan, Weekday};
use crate::sessions::{SessionLog, SessionRecord};
use crate::store;
use crate::videos::{VideoCatalog, VideoEntry, VideoListing};

pub struct Planner {
    config: Config,
    plan: Plan,
    log: SessionLog,
    catalog: VideoCatalog,
}

impl Planner {
    /// Load all documents (defaults when absent) and create the video directory
    pub fn open(config: Config) -> Result<Self> {
        store::ensure_dir(&config.video_dir)?;
        let plan = store::load(&config.plan_path, Plan::default())?;
        let log = store::load(&config.log_path, SessionLog::default())?;
        let catalog = store::load(&config.catalog_path, VideoCatalog::default())?;

        info!(
            "Loaded {} planned exercises, {} sessions, {} videos",
            plan.total_exercises(),
            log.len(),
            catalog.len()
        );

        Ok(Self {
            config,
            plan,
            log,
            catalog,
        })
    }

    /// Re-read every document from disk
    pub fn reload(&mut self) -> Result<()> {
        *self = Self::open(self.config.clone())?;
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn video_dir(&self) -> &Path {
        &self.config.video_dir
    }

    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    pub fn list_exercises(&self, day: Weekday) -> &[Exercise] {
        self.plan.list_exercises(day)
    }

    pub fn history(&self) -> &[SessionRecord] {
        self.log.history()
    }

    pub fn catalog(&self) -> &VideoCatalog {
        &self.catalog
    }

    pub fn list_videos(&self) -> Vec<VideoListing<'_>> {
        self.catalog.list_videos(&self.config.video_dir)
    }

    pub fn add_exercise(
        &mut self,
        day: Weekday,
        name: &str,
        sets_reps: &str,
        video_url: &str,
    ) -> Result<Exercise> {
        let exercise = self.plan.add_exercise(day, name, sets_reps, video_url)?.clone();
        persist(&self.config.plan_path, &self.plan)?;
        info!("Added {} ({}) to {}", exercise.name, exercise.sets_reps, day);
        Ok(exercise)
    }

    pub fn record_session(
        &mut self,
        date: Option<NaiveDate>,
        day: Weekday,
        exercise_name: &str,
        weight_used: &str,
        notes: &str,
    ) -> Result<SessionRecord> {
        let record = self
            .log
            .record_session(date, day, exercise_name, weight_used, notes)
            .clone();
        persist(&self.config.log_path, &self.log)?;
        info!("Recorded {} on {} ({})", record.exercise_name, record.date, record.weight_used);
        Ok(record)
    }

    /// Store an upload stamped with the current local time
    pub fn store_video(
        &mut self,
        stream: &mut impl Read,
        original_filename: &str,
        description: &str,
    ) -> Result<VideoEntry> {
        self.store_video_at(stream, original_filename, description, Local::now().naive_local())
    }

    pub fn store_video_at(
        &mut self,
        stream: &mut impl Read,
        original_filename: &str,
        description: &str,
        now: NaiveDateTime,
    ) -> Result<VideoEntry> {
        let entry = self
            .catalog
            .store_video(&self.config.video_dir, stream, original_filename, description, now)?
            .clone();
        persist(&self.config.catalog_path, &self.catalog)?;
        Ok(entry)
    }
}

fn persist<T: serde::Serialize>(path: &Path, document: &T) -> Result<()> {
    store::save(path, document).inspect_err(|err| error!("{}", err))
}

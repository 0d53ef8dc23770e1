//! Session log - append-only record of completed exercises

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::plan::Weekday;

/// Completed session record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionRecord {
    #[serde(rename = "data")]
    pub date: NaiveDate,
    /// Day key as written; unknown names are kept rather than rejected
    #[serde(rename = "dia")]
    pub weekday: String,
    #[serde(rename = "exercicio")]
    pub exercise_name: String,
    #[serde(rename = "peso_usado")]
    pub weight_used: String, // free-form, no unit
    #[serde(rename = "observacao", default)]
    pub notes: String,
}

impl SessionRecord {
    /// Known day keys (English or Portuguese) as a display label
    pub fn day_label(&self) -> &str {
        match self.weekday.parse::<Weekday>() {
            Ok(day) => day.label(),
            Err(_) => &self.weekday,
        }
    }
}

/// SessionLog document
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct SessionLog(Vec<SessionRecord>);

impl SessionLog {
    /// Append a record. `date` defaults to today (local calendar).
    ///
    /// The exercise name is not checked against the plan, so records survive
    /// renamed or removed exercises.
    pub fn record_session(
        &mut self,
        date: Option<NaiveDate>,
        weekday: Weekday,
        exercise_name: &str,
        weight_used: &str,
        notes: &str,
    ) -> &SessionRecord {
        self.0.push(SessionRecord {
            date: date.unwrap_or_else(|| Local::now().date_naive()),
            weekday: weekday.key().to_string(),
            exercise_name: exercise_name.to_string(),
            weight_used: weight_used.to_string(),
            notes: notes.to_string(),
        });
        &self.0[self.0.len() - 1]
    }

    /// All records, oldest first
    pub fn history(&self) -> &[SessionRecord] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

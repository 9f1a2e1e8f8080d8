//! This file defines the `Goal` type: a savings target with a deadline,
//! e.g. "Emergency Fund" or "New Laptop".

use serde::{Deserialize, Serialize};
use time::Date;

use crate::Error;

/// The display status of a goal, derived from the stored record and the
/// current date. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalStatus {
    /// The user marked the goal as achieved.
    Achieved,
    /// The deadline has passed without the goal being achieved.
    Overdue,
    /// The deadline is still ahead.
    InProgress,
}

/// A financial goal the user is saving towards.
///
/// The `achieved` flag is stored and only ever changed by explicit user
/// action; computed progress (see
/// [goal_progress](crate::aggregation::goal_progress)) is advisory and
/// never writes it back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    title: String,
    target_amount: f64,
    deadline: Date,
    achieved: bool,
}

impl Goal {
    /// Create a goal. New goals start not achieved.
    ///
    /// # Errors
    ///
    /// This function will return a:
    /// - [Error::EmptyField] if `title` is empty,
    /// - or [Error::NonPositiveAmount] if `target_amount` is not greater
    ///   than zero.
    pub fn new(title: impl Into<String>, target_amount: f64, deadline: Date) -> Result<Self, Error> {
        let title = title.into();

        if title.is_empty() {
            return Err(Error::EmptyField("title"));
        }

        if !target_amount.is_finite() || target_amount <= 0.0 {
            return Err(Error::NonPositiveAmount(target_amount));
        }

        Ok(Self {
            title,
            target_amount,
            deadline,
            achieved: false,
        })
    }

    /// The title of the goal.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The amount the user wants to reach.
    pub fn target_amount(&self) -> f64 {
        self.target_amount
    }

    /// The day the goal should be reached by.
    pub fn deadline(&self) -> Date {
        self.deadline
    }

    /// Whether the user marked the goal as achieved.
    pub fn achieved(&self) -> bool {
        self.achieved
    }

    /// Set the stored achieved flag. Only explicit user action should call
    /// this; nothing in the engine does.
    pub fn set_achieved(&mut self, achieved: bool) {
        self.achieved = achieved;
    }

    /// The status of the goal as of `today`.
    pub fn status(&self, today: Date) -> GoalStatus {
        if self.achieved {
            GoalStatus::Achieved
        } else if self.deadline < today {
            GoalStatus::Overdue
        } else {
            GoalStatus::InProgress
        }
    }
}

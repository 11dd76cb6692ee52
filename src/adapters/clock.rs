//! System clock. Implements Clock with the host's local date.

use crate::ports::Clock;
use chrono::{Local, NaiveDate};

pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

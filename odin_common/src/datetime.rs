/*
 * Copyright © 2024, United States Government, as represented by the Administrator of
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License. You may obtain a copy
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};

const MICROS_PER_DAY: f64 = 86_400_000_000.0;

/// get a DateTime<Utc> from a NaiveDate that is supposed to be in Utc
pub fn naive_utc_date_to_utc_datetime (nd: NaiveDate) -> DateTime<Utc> {
    let ndt = NaiveDateTime::new(nd, NaiveTime::MIN);
    DateTime::from_naive_utc_and_offset(ndt,Utc)
}

/// the calendar date for a 1-based (day-of-year) ordinal. This is computed as Jan 1 + (day - 1) days
/// so that out-of-year ordinals (0 or 366 in non-leap years) roll over into the adjacent year
pub fn date_from_day_of_year (year: i32, day: i64) -> Option<NaiveDate> {
    let jan1 = NaiveDate::from_ymd_opt( year, 1, 1)?;
    jan1.checked_add_signed( TimeDelta::try_days( day - 1)?)
}

/// the UTC time for a fractional, 1-based day-of-year (e.g. 1.5 is Jan 1 12:00). Resolution is microseconds
pub fn datetime_from_fractional_day_of_year (year: i32, day: f64) -> Option<DateTime<Utc>> {
    if !day.is_finite() { return None }

    let jan1 = naive_utc_date_to_utc_datetime( NaiveDate::from_ymd_opt( year, 1, 1)?);
    let micros = ((day - 1.0) * MICROS_PER_DAY).round() as i64;
    jan1.checked_add_signed( TimeDelta::microseconds( micros))
}

/// compact "YYYYMMDD" date format as used for daily file names
pub fn yyyymmdd (date: &NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

pub fn short_utc_datetime_string (dt: &DateTime<Utc>) -> String {
    format!("{}", dt.format("%Y-%m-%dT%H:%M:%S%Z"))
}

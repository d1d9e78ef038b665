/*
 * Copyright © 2025, United States Government, as represented by the Administrator of
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

use chrono::{NaiveDate, TimeZone, Utc};
use odin_common::datetime::*;

#[test]
fn test_date_from_day_of_year() {
    let d = |y,m,d| NaiveDate::from_ymd_opt(y,m,d).unwrap();

    assert_eq!( date_from_day_of_year( 2021, 1), Some( d(2021,1,1)));
    assert_eq!( date_from_day_of_year( 2021, 60), Some( d(2021,3,1)));
    assert_eq!( date_from_day_of_year( 2020, 60), Some( d(2020,2,29)));
    assert_eq!( date_from_day_of_year( 2021, 0), Some( d(2020,12,31)));
    assert_eq!( date_from_day_of_year( 2021, 366), Some( d(2022,1,1)));
}

#[test]
fn test_fractional_day_of_year() {
    assert_eq!( datetime_from_fractional_day_of_year( 2021, 1.5), Some( Utc.with_ymd_and_hms( 2021,1,1, 12,0,0).unwrap()));
    assert_eq!( datetime_from_fractional_day_of_year( 2008, 264.75), Some( Utc.with_ymd_and_hms( 2008,9,20, 18,0,0).unwrap()));
    assert_eq!( datetime_from_fractional_day_of_year( 2021, f64::NAN), None);
}

#[test]
fn test_formats() {
    let dt = Utc.with_ymd_and_hms( 2021,2,3, 4,5,6).unwrap();
    assert_eq!( yyyymmdd( &dt.date_naive()), "20210203");
    assert_eq!( short_utc_datetime_string( &dt), "2021-02-03T04:05:06UTC");
    assert_eq!( naive_utc_date_to_utc_datetime( dt.date_naive()), Utc.with_ymd_and_hms( 2021,2,3, 0,0,0).unwrap());
}

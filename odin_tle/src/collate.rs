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

use std::{collections::BTreeMap, fmt::Debug};
use hashbrown::HashSet;
use tracing::warn;
use crate::{errors::Result, tle::TleRecord};

/// drop duplicate records, keeping the first occurrence and the input order
pub fn unique (tles: impl IntoIterator<Item=TleRecord>) -> Vec<TleRecord> {
    let mut seen: HashSet<TleRecord> = HashSet::new();
    tles.into_iter().filter(|tle| seen.insert( tle.clone())).collect()
}

/// unique records grouped by key
#[derive(Debug)]
pub struct Collated<K> {
    /// groups in key order, each in first-seen order
    pub groups: BTreeMap<K,Vec<TleRecord>>,
    /// number of records for which the key could not be computed
    pub n_skipped: usize,
}

impl<K> Collated<K> {
    pub fn n_unique (&self) -> usize {
        self.groups.values().map(|v| v.len()).sum()
    }
}

/// split records into de-duplicated groups for the given key function.
/// Since keys are pure functions of the record a duplicate always falls into the same group, so we can
/// use a single seen-set for all groups
pub fn collate<K,F> (tles: impl IntoIterator<Item=TleRecord>, key: F) -> Collated<K>
    where K: Ord + Debug, F: Fn(&TleRecord)->Result<K>
{
    let mut groups: BTreeMap<K,Vec<TleRecord>> = BTreeMap::new();
    let mut seen: HashSet<TleRecord> = HashSet::new();
    let mut n_skipped = 0;

    for tle in tles {
        if seen.contains( &tle) { continue }

        match key(&tle) {
            Ok(k) => {
                seen.insert( tle.clone());
                if let Some(group) = groups.get_mut(&k) {
                    group.push(tle);
                } else {
                    groups.insert( k, vec![tle]);
                }
            }
            Err(e) => {
                warn!("skipping TLE without key: {e}");
                n_skipped += 1;
            }
        }
    }

    Collated { groups, n_skipped }
}

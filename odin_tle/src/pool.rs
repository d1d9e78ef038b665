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

use std::{sync::Arc, thread::available_parallelism};
use tokio::{sync::Semaphore, task::{self, JoinHandle}};
use crate::errors::{OdinTleError, Result, op_failed};

/// a bounded pool for blocking (file IO) jobs. Each job runs on the tokio blocking thread pool but
/// only after obtaining one of `size` permits, so no matter how many jobs a phase fans out at most
/// `size` of them execute concurrently. Clones share the same permits
#[derive(Debug,Clone)]
pub struct WorkerPool {
    permits: Arc<Semaphore>,
    size: usize,
}

impl WorkerPool {
    pub fn new (size: usize) -> Self {
        let size = size.max(1);
        WorkerPool { permits: Arc::new( Semaphore::new(size)), size }
    }

    pub fn with_available_parallelism () -> Self {
        WorkerPool::new( default_pool_size())
    }

    pub fn size (&self) -> usize { self.size }

    /// fan out `f` over all items and wait for all of them (fan-in barrier). Results are returned in item
    /// order. A job that panics shows up as a JoinError for its item, it does not affect the others
    pub async fn map<T,R,F> (&self, items: impl IntoIterator<Item=T>, f: F) -> Vec<Result<R>>
        where T: Send + 'static, R: Send + 'static, F: Fn(T)->R + Send + Sync + 'static
    {
        let f = Arc::new(f);

        let handles: Vec<JoinHandle<Result<R>>> = items.into_iter().map( |item| {
            let permits = self.permits.clone();
            let f = f.clone();

            tokio::spawn( async move {
                let _permit = permits.acquire_owned().await.map_err(|e| op_failed!("worker pool closed: {e}"))?;
                let res = task::spawn_blocking( move || f(item)).await?;
                Ok::<R,OdinTleError>(res)
            })
        }).collect();

        let mut results = Vec::with_capacity( handles.len());
        for handle in handles {
            results.push( handle.await.unwrap_or_else(|e| Err(OdinTleError::from(e))));
        }
        results
    }
}

pub fn default_pool_size () -> usize {
    available_parallelism().map(|n| n.get()).unwrap_or(4)
}

// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

/// Split `/container/blob` into the container and the optional rest.
///
/// One leading `/` is stripped. The rest is `None` when nothing follows
/// the container, never `Some("")`.
///
/// ```
/// use blobsign_azure_blob::split_path;
///
/// assert_eq!(split_path("/a/b/c"), ("a", Some("b/c")));
/// assert_eq!(split_path("/a/"), ("a", None));
/// ```
pub fn split_path(path: &str) -> (&str, Option<&str>) {
    let path = path.strip_prefix('/').unwrap_or(path);

    match path.split_once('/') {
        Some((container, rest)) if !rest.is_empty() => (container, Some(rest)),
        Some((container, _)) => (container, None),
        None => (path, None),
    }
}

// Copyright 2025 dentsusoken
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::error::P2SiteError;

pub fn get_exit_code(error: &P2SiteError) -> i32 {
    match error {
        P2SiteError::Validation(_)
        | P2SiteError::Config(_)
        | P2SiteError::InvalidCoordinate(_)
        | P2SiteError::InvalidVersionFormat(_) => 2,

        P2SiteError::Resolution(_) => 20,

        P2SiteError::Bundling(_) => 30,

        P2SiteError::Publishing(_) => 40,

        P2SiteError::Interrupted(_) => 130,

        _ => 1,
    }
}

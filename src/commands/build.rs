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

use crate::config::SiteConfig;
use crate::error::Result;
use crate::orchestrator::Orchestrator;

pub struct BuildCommand {
    config: SiteConfig,
}

impl BuildCommand {
    pub fn new(config: SiteConfig) -> Result<Self> {
        Ok(Self { config })
    }

    pub fn execute(self) -> Result<()> {
        let summary = Orchestrator::new(self.config)?.run()?;

        println!(
            "Published {} bundle(s) to {}",
            summary.bundles,
            summary.destination.display()
        );
        if summary.source_warnings > 0 {
            println!(
                "{} source artifact(s) could not be found (see warnings above)",
                summary.source_warnings
            );
        }
        Ok(())
    }
}

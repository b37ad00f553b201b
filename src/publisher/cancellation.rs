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

use log::warn;
use signal_hook::consts::signal::{SIGINT, SIGTERM};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

#[cfg(windows)]
use signal_hook::consts::signal::SIGBREAK;

#[cfg(windows)]
const INTERRUPT_SIGNALS: [i32; 3] = [SIGINT, SIGTERM, SIGBREAK];
#[cfg(not(windows))]
const INTERRUPT_SIGNALS: [i32; 2] = [SIGINT, SIGTERM];

/// Shared flag raised when the user interrupts the run.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }
}

static INTERRUPTED: OnceLock<CancellationToken> = OnceLock::new();

/// Token raised by SIGINT/SIGTERM. Handlers are installed on first use and stay
/// installed for the life of the process.
pub fn interrupt_token() -> CancellationToken {
    INTERRUPTED
        .get_or_init(|| {
            let token = CancellationToken::new();
            for signal in INTERRUPT_SIGNALS {
                if let Err(err) = signal_hook::flag::register(signal, token.cancelled.clone()) {
                    warn!("Failed to install interrupt handler for signal {signal}: {err}");
                }
            }
            token
        })
        .clone()
}

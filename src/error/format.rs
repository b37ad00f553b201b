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

use crate::error::{ErrorContext, P2SiteError};
use std::error::Error;

pub fn format_error_chain(error: &P2SiteError) -> String {
    let mut output = ErrorContext::new(error).to_string();

    let mut source = error.source();
    while let Some(cause) = source {
        output.push_str(&format!("\n  caused by: {cause}"));
        source = cause.source();
    }

    output
}

/// Plain or ANSI-highlighted rendering, depending on whether stderr is a terminal.
pub fn format_error_with_color(error: &P2SiteError, use_color: bool) -> String {
    if !use_color {
        return format_error_chain(error);
    }

    let context = ErrorContext::new(error);
    let mut output = format!("\x1b[31m\x1b[1mError:\x1b[0m {error}\n");
    if let Some(details) = &context.details {
        output.push_str(&format!("\n{details}\n"));
    }
    if let Some(suggestion) = &context.suggestion {
        output.push_str(&format!("\n\x1b[33m\x1b[1mSuggestion:\x1b[0m {suggestion}\n"));
    }
    output
}

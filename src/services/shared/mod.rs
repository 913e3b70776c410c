// Copyright (c) 2024-2026, Daily
// SPDX-License-Identifier: BSD-2-Clause

//! Shared plumbing for the HTTP speech service adapters.

pub mod multipart;
pub mod wav;

/// Pull the backend request id out of a response, if the server sent one.
pub(crate) fn request_id_header(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

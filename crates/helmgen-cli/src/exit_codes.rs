//! Exit codes for `helm-generate`

#![allow(dead_code)]

/// Success, including runs that produced no manifests
pub const SUCCESS: i32 = 0;

/// General error - unspecified failure
pub const ERROR: i32 = 1;

/// Missing chart configuration, malformed `--set`, unparseable override file
pub const CONFIG_ERROR: i32 = 2;

/// Missing required values or a manifest without metadata
pub const VALIDATION_ERROR: i32 = 3;

/// Chart render, post-render hook or YAML decode failure
pub const RENDER_ERROR: i32 = 4;

/// IO error - root not found, unreadable file, etc.
pub const IO_ERROR: i32 = 5;

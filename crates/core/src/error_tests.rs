// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn unknown_job_message_includes_name() {
    let err = EngineError::UnknownJob(JobName::new("hello"));
    assert_eq!(err.to_string(), "unknown job: hello");
}

#[test]
fn exec_failed_message_includes_script() {
    let err = EngineError::ExecFailed {
        script: "/cfg/jobs/hello.run".to_string(),
        source: std::io::Error::other("enoent"),
    };
    assert!(err.to_string().contains("/cfg/jobs/hello.run"));
}

#[test]
fn storage_failure_message_includes_the_underlying_text() {
    let err = EngineError::StorageFailure("disk full".to_string());
    assert!(err.to_string().contains("disk full"));
}
